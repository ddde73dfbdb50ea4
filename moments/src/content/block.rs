use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::notion::{file_url, RawBlock};

use super::rich_text::{self, TextRun};

/// Block kinds the renderer understands. Anything else becomes [`BlockKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Heading1,
    Heading2,
    Heading3,
    Paragraph,
    BulletedItem,
    NumberedItem,
    Todo { checked: bool },
    Quote,
    Code { language: String },
    Callout,
    Image { url: Option<String> },
    Video { url: Option<String> },
    Other,
}

/// One node of a page's content tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    /// Inline markdown for the node's own text.
    pub text: String,
    pub children: Vec<Block>,
}

impl Block {
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            children: Vec::new(),
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self::new(
            BlockKind::Image {
                url: Some(url.into()),
            },
            "",
        )
    }

    /// Video node with the same link text ingestion would synthesize.
    pub fn video(url: impl Into<String>) -> Self {
        let url = url.into();
        let text = video_link(&url);
        Self::new(BlockKind::Video { url: Some(url) }, text)
    }

    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.children = children;
        self
    }

    pub fn media_url(&self) -> Option<&str> {
        match &self.kind {
            BlockKind::Image { url } | BlockKind::Video { url } => url.as_deref(),
            _ => None,
        }
    }

    /// Maps a raw Notion block onto the closed kind set. Children are left
    /// empty; the fetcher attaches them.
    pub fn from_raw(raw: &RawBlock) -> Self {
        let body = raw.body();
        let mut text = extract_text(body);

        let kind = match raw.block_type.as_str() {
            "heading_1" => BlockKind::Heading1,
            "heading_2" => BlockKind::Heading2,
            "heading_3" => BlockKind::Heading3,
            "paragraph" => BlockKind::Paragraph,
            "bulleted_list_item" => BlockKind::BulletedItem,
            "numbered_list_item" => BlockKind::NumberedItem,
            "to_do" => BlockKind::Todo {
                checked: body
                    .and_then(|b| b.get("checked"))
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            },
            "quote" => BlockKind::Quote,
            "code" => BlockKind::Code {
                language: body
                    .and_then(|b| b.get("language"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            "callout" => BlockKind::Callout,
            "image" => BlockKind::Image {
                url: body.and_then(file_url),
            },
            "video" => {
                let url = body.and_then(file_url);
                if let Some(url) = &url {
                    text = video_link(url);
                }
                BlockKind::Video { url }
            }
            _ => BlockKind::Other,
        };

        Self {
            kind,
            text,
            children: Vec::new(),
        }
    }
}

/// Own text of a block body: its `rich_text` runs, or a bare `text` field.
fn extract_text(body: Option<&Value>) -> String {
    let Some(body) = body else {
        return String::new();
    };

    if let Some(runs) = body.get("rich_text").filter(|v| v.is_array()) {
        return runs_to_markdown(runs);
    }

    match body.get("text") {
        Some(Value::String(text)) => text.clone(),
        Some(runs @ Value::Array(_)) => runs_to_markdown(runs),
        _ => String::new(),
    }
}

fn runs_to_markdown(value: &Value) -> String {
    match serde_json::from_value::<Vec<TextRun>>(value.clone()) {
        Ok(runs) => rich_text::to_markdown(&runs),
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable rich text, using empty text");
            String::new()
        }
    }
}

fn bilibili_id_regex() -> &'static Regex {
    static BV_REGEX: OnceLock<Regex> = OnceLock::new();
    BV_REGEX.get_or_init(|| Regex::new(r"BV[0-9A-Za-z]+").unwrap())
}

fn youtube_id_regex() -> &'static Regex {
    static YT_REGEX: OnceLock<Regex> = OnceLock::new();
    YT_REGEX.get_or_init(|| {
        Regex::new(r"(?:youtube\.com/(?:watch\?(?:[^#]*&)?v=|embed/|shorts/)|youtu\.be/)([A-Za-z0-9_-]{11})")
            .unwrap()
    })
}

/// Markdown link line standing in for a video in the text body.
pub fn video_link(url: &str) -> String {
    if url.contains("bilibili.com/video/") {
        if let Some(id) = bilibili_id_regex().find(url) {
            let id = id.as_str();
            return format!("[Bilibili video: {id}](https://www.bilibili.com/video/{id})");
        }
    }

    if let Some(id) = youtube_id_regex()
        .captures(url)
        .and_then(|caps| caps.get(1))
    {
        let id = id.as_str();
        return format!("[YouTube video: {id}](https://www.youtube.com/watch?v={id})");
    }

    format!("[video]({url})")
}
