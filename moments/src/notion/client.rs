use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER},
    Client, RequestBuilder, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

use crate::config::NotionConfig;
use crate::error::{MomentsError, Result};

use super::types::{ErrorBody, ListResponse, RawBlock, RawPage};
use super::{ContentSource, DatabaseQuery};

const PAGE_SIZE: u32 = 100;
const NOTION_VERSION_HEADER: &str = "notion-version";

/// reqwest-backed client for the Notion REST API.
#[derive(Clone, Debug)]
pub struct NotionClient {
    client: Client,
    base_url: String,
}

impl NotionClient {
    pub fn new(config: &NotionConfig) -> Result<Self> {
        let token = config
            .token
            .as_deref()
            .ok_or_else(|| MomentsError::Config("NOTION_TOKEN is not set".to_string()))?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| MomentsError::Config(format!("Invalid NOTION_TOKEN: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            NOTION_VERSION_HEADER,
            HeaderValue::from_str(&config.api_version)
                .map_err(|e| MomentsError::Config(format!("Invalid NOTION_VERSION: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("notion-moments/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MomentsError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok());
            return Err(MomentsError::RateLimit { retry_after });
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let message = if body.message.is_empty() {
                status.to_string()
            } else {
                body.message
            };
            return Err(MomentsError::Auth(message));
        }

        Err(MomentsError::Api {
            status: status.as_u16(),
            code: if body.code.is_empty() {
                "unknown".to_string()
            } else {
                body.code
            },
            message: body.message,
        })
    }
}

#[async_trait]
impl ContentSource for NotionClient {
    async fn list_block_children(&self, block_id: &str) -> Result<Vec<RawBlock>> {
        let url = format!("{}/blocks/{}/children", self.base_url, block_id);
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .query(&[("page_size", PAGE_SIZE.to_string())]);
            if let Some(start) = &cursor {
                request = request.query(&[("start_cursor", start)]);
            }

            let page: ListResponse<RawBlock> = self.send(request).await?;
            blocks.extend(page.results);

            match page.next_cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }

        tracing::debug!(block_id, count = blocks.len(), "Listed block children");
        Ok(blocks)
    }

    async fn query_database(&self, query: &DatabaseQuery) -> Result<Vec<RawPage>> {
        let url = format!("{}/databases/{}/query", self.base_url, query.database_id);
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = json!({
                "filter": query.filter,
                "sorts": query.sorts,
                "page_size": PAGE_SIZE,
            });
            if let Some(start) = &cursor {
                body["start_cursor"] = json!(start);
            }

            let page: ListResponse<RawPage> = self.send(self.client.post(&url).json(&body)).await?;
            pages.extend(page.results);

            match page.next_cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }

        tracing::debug!(database_id = %query.database_id, count = pages.len(), "Queried database");
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notion_config(token: Option<&str>) -> NotionConfig {
        NotionConfig {
            token: token.map(str::to_string),
            database_id: Some("db".to_string()),
            base_url: "https://api.notion.com/v1/".to_string(),
            api_version: "2022-06-28".to_string(),
        }
    }

    #[test]
    fn test_client_requires_token() {
        let result = NotionClient::new(&notion_config(None));
        assert!(matches!(result, Err(MomentsError::Config(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = NotionClient::new(&notion_config(Some("secret"))).unwrap();
        assert_eq!(client.base_url, "https://api.notion.com/v1");
    }
}
