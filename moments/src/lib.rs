//! Published Notion database entries as a JSON moment feed.

pub mod api;
pub mod config;
pub mod content;
pub mod error;
pub mod moments;
pub mod notion;
pub mod retry;

pub use config::Config;
pub use error::{MomentsError, Result};
pub use moments::{MomentRecord, MomentService};
