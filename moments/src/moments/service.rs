use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, TimeDelta, Utc};
use tracing::{debug, error, info, warn};

use crate::config::{Config, FeedConfig, RequestConfig};
use crate::content::{blocks_to_markdown, collect_images, collect_videos, BlockTreeFetcher};
use crate::error::{MomentsError, Result};
use crate::notion::{ContentSource, DatabaseQuery, NotionClient, RawPage};
use crate::retry::{with_retry, RetryPolicy};

use super::model::{EntryFields, MomentRecord};

/// Builds the moment feed from the Notion database.
#[derive(Clone)]
pub struct MomentService {
    source: Arc<dyn ContentSource>,
    fetcher: BlockTreeFetcher,
    policy: RetryPolicy,
    database_id: String,
    feed: FeedConfig,
}

impl MomentService {
    pub fn new(
        source: Arc<dyn ContentSource>,
        database_id: impl Into<String>,
        request: &RequestConfig,
        feed: FeedConfig,
    ) -> Self {
        let policy = RetryPolicy::from(request);
        let fetcher = BlockTreeFetcher::new(source.clone(), policy, feed.max_block_depth);

        Self {
            source,
            fetcher,
            policy,
            database_id: database_id.into(),
            feed,
        }
    }

    /// Service backed by the Notion API, using the token and database from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let (_, database_id) = config.notion.credentials()?;
        let client = NotionClient::new(&config.notion)?;

        Ok(Self::new(
            Arc::new(client),
            database_id,
            &config.request,
            config.feed.clone(),
        ))
    }

    /// Published moments inside the configured day range, newest first.
    ///
    /// A failed database query reruns the whole batch up to
    /// `feed.batch_retries` more times; after that the error is returned.
    /// Failures inside a single entry only blank that entry's content.
    pub async fn get_moments(&self) -> Result<Vec<MomentRecord>> {
        let mut remaining = self.feed.batch_retries;
        let delay = Duration::from_millis(self.feed.batch_retry_delay_ms);

        loop {
            match self.fetch_batch().await {
                Ok(moments) => return Ok(moments),
                Err(e) if remaining > 0 && !matches!(e, MomentsError::Config(_)) => {
                    warn!(
                        error = %e,
                        remaining,
                        "Moment fetch failed, retrying whole batch"
                    );
                    remaining -= 1;
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    error!(error = %e, "Moment fetch failed after retries");
                    return Err(e);
                }
            }
        }
    }

    /// First date included in the feed (`today - day_range`, UTC).
    pub fn window_start(&self, today: NaiveDate) -> Result<NaiveDate> {
        TimeDelta::try_days(self.feed.day_range)
            .and_then(|range| today.checked_sub_signed(range))
            .ok_or_else(|| {
                MomentsError::Config(format!(
                    "day range of {} days is outside the supported date range",
                    self.feed.day_range
                ))
            })
    }

    fn should_throttle(&self, index: usize) -> bool {
        self.feed.throttle_every > 0 && index > 0 && index % self.feed.throttle_every == 0
    }

    async fn fetch_batch(&self) -> Result<Vec<MomentRecord>> {
        let since = self.window_start(Utc::now().date_naive())?;
        let query = DatabaseQuery::published_since(
            &self.database_id,
            &self.feed.properties,
            &self.feed.published_status,
            since,
        );

        let source = &self.source;
        let query_ref = &query;
        let pages = with_retry(&self.policy, "query_database", move || {
            source.query_database(query_ref)
        })
        .await?;

        info!(count = pages.len(), since = %since, "Fetched moment entries");

        let throttle = Duration::from_millis(self.feed.throttle_ms);
        let mut moments = Vec::with_capacity(pages.len());

        for (index, page) in pages.iter().enumerate() {
            if self.should_throttle(index) {
                debug!(index, "Pausing to stay under the API rate limit");
                tokio::time::sleep(throttle).await;
            }
            moments.push(self.assemble(page).await);
        }

        Ok(moments)
    }

    async fn assemble(&self, page: &RawPage) -> MomentRecord {
        let fields = EntryFields::from_page(page, &self.feed.properties);

        let (content, images, videos) = match self.fetcher.fetch_page(&page.id).await {
            Ok(blocks) => (
                blocks_to_markdown(&blocks, 0).trim().to_string(),
                collect_images(&blocks),
                collect_videos(&blocks),
            ),
            Err(e) => {
                warn!(page_id = %page.id, error = %e, "Failed to fetch blocks for page");
                (String::new(), Vec::new(), Vec::new())
            }
        };

        debug!(
            page_id = %page.id,
            content_len = content.len(),
            images = images.len(),
            videos = videos.len(),
            "Assembled moment"
        );

        MomentRecord::new(page.id.clone(), fields, content, images, videos)
    }
}
