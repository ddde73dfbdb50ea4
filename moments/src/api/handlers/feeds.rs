use axum::extract::State;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::api::response::FeedResponse;
use crate::api::state::AppState;
use crate::content::summary::{detect_elements, summarize, to_plain_text, truncate_plain};
use crate::content::ContentElements;
use crate::moments::MomentRecord;

const SHORT_CHARS: usize = 100;
const SUMMARY_CHARS: usize = 300;
const RECENT_DAYS: i64 = 7;
const LATEST_LIMIT: usize = 10;

/// Element flags for a moment; serializes to `{}` when the moment has no content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MomentElements {
    #[serde(flatten)]
    found: Option<ContentElements>,
    #[serde(skip_serializing_if = "Option::is_none")]
    videos: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedMoment {
    #[serde(flatten)]
    pub moment: MomentRecord,
    pub content_summary: String,
    pub content_short: String,
    pub content_elements: MomentElements,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedContent {
    pub raw: String,
    pub plain: String,
    pub summary: String,
    pub short: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedMoment {
    pub id: String,
    pub icon: String,
    pub username: String,
    pub title: String,
    pub date: String,
    pub mood: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<RenderedContent>,
    pub images: Vec<String>,
    pub videos: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatestMoment {
    pub logo: String,
    pub title: String,
    pub date: String,
    pub mood: String,
}

impl From<&MomentRecord> for AnnotatedMoment {
    fn from(moment: &MomentRecord) -> Self {
        let content = moment.content.as_str();

        let (content_summary, content_short, content_elements) = if content.is_empty() {
            (String::new(), String::new(), MomentElements::default())
        } else {
            (
                to_plain_text(content),
                summarize(content, SHORT_CHARS),
                MomentElements {
                    found: Some(detect_elements(content)),
                    videos: Some(!moment.videos.is_empty()),
                },
            )
        };

        Self {
            moment: moment.clone(),
            content_summary,
            content_short,
            content_elements,
        }
    }
}

impl From<&MomentRecord> for RenderedMoment {
    fn from(moment: &MomentRecord) -> Self {
        let content = (!moment.content.is_empty()).then(|| {
            let plain = to_plain_text(&moment.content);
            RenderedContent {
                raw: moment.content.clone(),
                summary: truncate_plain(&plain, SUMMARY_CHARS),
                short: summarize(&moment.content, SHORT_CHARS),
                plain,
            }
        });

        Self {
            id: moment.id.clone(),
            icon: moment.icon.clone(),
            username: moment.username.clone(),
            title: moment.title.clone(),
            date: moment.date.clone(),
            mood: moment.mood.clone(),
            content,
            images: moment.images.clone(),
            videos: moment.videos.clone(),
        }
    }
}

impl From<&MomentRecord> for LatestMoment {
    fn from(moment: &MomentRecord) -> Self {
        Self {
            logo: moment.icon.clone(),
            title: moment.title.clone(),
            date: moment.date.clone(),
            mood: moment.mood.clone(),
        }
    }
}

/// Parses a stored moment date: full RFC 3339, or a bare `YYYY-MM-DD` read as
/// UTC midnight.
pub fn parse_moment_date(date: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// Moments dated strictly after `now - 7 days`. Unparseable dates are left out.
pub fn recent_since(moments: &[MomentRecord], now: DateTime<Utc>) -> Vec<MomentRecord> {
    let cutoff = now - Duration::days(RECENT_DAYS);
    moments
        .iter()
        .filter(|m| parse_moment_date(&m.date).is_some_and(|date| date > cutoff))
        .cloned()
        .collect()
}

/// `GET /api/moments.json`
pub async fn all_moments(State(state): State<AppState>) -> FeedResponse<AnnotatedMoment> {
    match state.moments().await {
        Ok(moments) => FeedResponse::success(moments.iter().map(AnnotatedMoment::from).collect()),
        Err(e) => FeedResponse::failure("Failed to fetch moments", &e),
    }
}

/// `GET /api/moments-recent.json`
pub async fn recent_moments(State(state): State<AppState>) -> FeedResponse<MomentRecord> {
    match state.moments().await {
        Ok(moments) => FeedResponse::success(recent_since(&moments, Utc::now())),
        Err(e) => FeedResponse::failure("Failed to fetch moments from the last 7 days", &e),
    }
}

/// `GET /api/moments-rendered.json`
pub async fn rendered_moments(State(state): State<AppState>) -> FeedResponse<RenderedMoment> {
    match state.moments().await {
        Ok(moments) => FeedResponse::success(moments.iter().map(RenderedMoment::from).collect()),
        Err(e) => FeedResponse::failure("Failed to fetch rendered moments", &e),
    }
}

/// `GET /recent-moments.json`
pub async fn latest_moments(State(state): State<AppState>) -> FeedResponse<LatestMoment> {
    match state.moments().await {
        Ok(moments) => FeedResponse::success(
            moments
                .iter()
                .take(LATEST_LIMIT)
                .map(LatestMoment::from)
                .collect(),
        ),
        Err(e) => FeedResponse::failure("Failed to fetch recent moments", &e),
    }
}
