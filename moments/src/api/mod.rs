mod cache;
mod handlers;
mod response;
mod routes;
mod state;

pub use cache::MomentCache;
pub use response::FeedResponse;
pub use routes::create_router;
pub use state::AppState;
