pub mod error;
pub mod model;
pub mod time;

pub use error::{Error, ErrorCode};
pub use model::*;
