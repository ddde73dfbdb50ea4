pub mod model;
pub mod service;

pub use model::{EntryFields, MomentRecord};
pub use service::MomentService;
