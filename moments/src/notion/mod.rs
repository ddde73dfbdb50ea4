mod client;
mod types;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::config::PropertyNames;
use crate::error::Result;

pub use client::NotionClient;
pub use types::{file_url, RawBlock, RawPage};

/// Filtered, sorted database query.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseQuery {
    pub database_id: String,
    pub filter: Value,
    pub sorts: Value,
}

impl DatabaseQuery {
    /// Rows dated on or after `since` whose status equals `published_status`,
    /// newest first.
    pub fn published_since(
        database_id: &str,
        properties: &PropertyNames,
        published_status: &str,
        since: NaiveDate,
    ) -> Self {
        Self {
            database_id: database_id.to_string(),
            filter: json!({
                "and": [
                    {
                        "property": properties.date,
                        "date": { "on_or_after": since.format("%Y-%m-%d").to_string() }
                    },
                    {
                        "property": properties.status,
                        "select": { "equals": published_status }
                    }
                ]
            }),
            sorts: json!([{ "property": properties.date, "direction": "descending" }]),
        }
    }
}

/// The two remote operations the feed pipeline needs.
///
/// Both may fail or hang; callers wrap them in [`crate::retry::with_retry`].
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Direct children of a block (or page), in document order.
    async fn list_block_children(&self, block_id: &str) -> Result<Vec<RawBlock>>;

    /// All rows matching the query, in the order the database returns them.
    async fn query_database(&self, query: &DatabaseQuery) -> Result<Vec<RawPage>>;
}
