use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::moments::{MomentRecord, MomentService};

use super::cache::MomentCache;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub service: Arc<MomentService>,
    cache: MomentCache,
}

impl AppState {
    pub fn new(config: Config, service: MomentService) -> Self {
        let cache = MomentCache::new(Duration::from_secs(config.server.revalidate_secs));

        Self {
            config: Arc::new(config),
            service: Arc::new(service),
            cache,
        }
    }

    /// Current moment list, rebuilt once the revalidation window has passed.
    pub async fn moments(&self) -> Result<Arc<Vec<MomentRecord>>> {
        let service = &self.service;
        self.cache.get_or_refresh(|| service.get_moments()).await
    }
}
