use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use crate::error::Result;
use crate::notion::{ContentSource, RawBlock};
use crate::retry::{with_retry, RetryPolicy};

use super::block::Block;

/// Resolves a page's block hierarchy into an in-memory [`Block`] tree.
///
/// Listings run one at a time: a child's whole subtree is fetched before its
/// next sibling's listing is issued.
#[derive(Clone)]
pub struct BlockTreeFetcher {
    source: Arc<dyn ContentSource>,
    policy: RetryPolicy,
    max_depth: usize,
}

impl BlockTreeFetcher {
    pub fn new(source: Arc<dyn ContentSource>, policy: RetryPolicy, max_depth: usize) -> Self {
        Self {
            source,
            policy,
            max_depth: max_depth.max(1),
        }
    }

    /// Content tree of a page. Failure to list the page itself is returned;
    /// failures further down only empty the affected subtree.
    pub async fn fetch_page(&self, page_id: &str) -> Result<Vec<Block>> {
        let raw = self.list(page_id).await?;
        Ok(self.resolve(raw, 0).await)
    }

    /// Children of `block_id`, fully resolved. A failed listing yields an empty list.
    pub async fn fetch_children(&self, block_id: &str) -> Vec<Block> {
        self.fetch_level(block_id, 0).await
    }

    fn fetch_level<'a>(&'a self, block_id: &'a str, depth: usize) -> BoxFuture<'a, Vec<Block>> {
        async move {
            match self.list(block_id).await {
                Ok(raw) => self.resolve(raw, depth).await,
                Err(e) => {
                    tracing::warn!(
                        block_id,
                        depth,
                        error = %e,
                        "Failed to list block children, skipping subtree"
                    );
                    Vec::new()
                }
            }
        }
        .boxed()
    }

    /// `raw` are the nodes at `depth` (0 for a page's top-level blocks).
    async fn resolve(&self, raw: Vec<RawBlock>, depth: usize) -> Vec<Block> {
        let mut blocks = Vec::with_capacity(raw.len());

        for node in raw {
            let mut block = Block::from_raw(&node);

            if node.has_children {
                if depth + 1 < self.max_depth {
                    block.children = self.fetch_level(&node.id, depth + 1).await;
                } else {
                    tracing::warn!(
                        block_id = %node.id,
                        max_depth = self.max_depth,
                        "Block tree too deep, children not fetched"
                    );
                }
            }

            blocks.push(block);
        }

        blocks
    }

    async fn list(&self, block_id: &str) -> Result<Vec<RawBlock>> {
        let source = &self.source;
        with_retry(&self.policy, "list_block_children", move || {
            source.list_block_children(block_id)
        })
        .await
    }
}
