pub mod block;
pub mod fetcher;
pub mod render;
pub mod rich_text;
pub mod summary;

pub use block::{Block, BlockKind};
pub use fetcher::BlockTreeFetcher;
pub use render::{blocks_to_markdown, collect_images, collect_videos};
pub use rich_text::TextRun;
pub use summary::ContentElements;
