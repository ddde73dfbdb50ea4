use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::PropertyNames;
use crate::notion::{file_url, RawPage};

/// One published feed entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentRecord {
    pub id: String,
    pub icon: String,
    pub username: String,
    pub title: String,
    /// Raw date string from the database, as stored.
    pub date: String,
    /// Mood tags joined by single spaces.
    pub mood: String,
    /// Rendered markdown body.
    pub content: String,
    pub images: Vec<String>,
    pub videos: Vec<String>,
}

/// Display fields read from a database row's properties and icon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFields {
    pub icon: String,
    pub username: String,
    pub title: String,
    pub date: String,
    pub mood: String,
}

impl EntryFields {
    pub fn from_page(page: &RawPage, names: &PropertyNames) -> Self {
        let prop = |name: &str| page.properties.get(name);

        Self {
            icon: page.icon.as_ref().map(icon_value).unwrap_or_default(),
            username: prop(&names.username).map(property_text).unwrap_or_default(),
            title: prop(&names.title).map(property_text).unwrap_or_default(),
            date: prop(&names.date)
                .and_then(|p| p.pointer("/date/start"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            mood: prop(&names.mood).map(multi_select_names).unwrap_or_default(),
        }
    }
}

impl MomentRecord {
    pub fn new(
        id: impl Into<String>,
        fields: EntryFields,
        content: String,
        images: Vec<String>,
        videos: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            icon: fields.icon,
            username: fields.username,
            title: fields.title,
            date: fields.date,
            mood: fields.mood,
            content,
            images,
            videos,
        }
    }
}

/// Emoji character or icon image URL, or empty.
fn icon_value(icon: &Value) -> String {
    match icon.get("type").and_then(Value::as_str) {
        Some("emoji") => icon
            .get("emoji")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Some("file") | Some("external") => file_url(icon).unwrap_or_default(),
        _ => String::new(),
    }
}

/// Plain text of a `title` or `rich_text` property, or a `select` name.
fn property_text(property: &Value) -> String {
    let runs = property
        .get("title")
        .or_else(|| property.get("rich_text"))
        .and_then(Value::as_array);

    if let Some(runs) = runs {
        return runs
            .iter()
            .filter_map(|run| run.get("plain_text").and_then(Value::as_str))
            .collect();
    }

    property
        .pointer("/select/name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn multi_select_names(property: &Value) -> String {
    property
        .get("multi_select")
        .and_then(Value::as_array)
        .map(|options| {
            options
                .iter()
                .filter_map(|option| option.get("name").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}
