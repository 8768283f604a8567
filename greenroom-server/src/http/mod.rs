mod app;
mod error;
mod handlers;

pub use app::{AppState, router};
pub use error::ApiError;
