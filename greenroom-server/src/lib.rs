mod consensus;
mod directory;
mod http;
mod registry;
mod relay;
mod store;

pub use consensus::*;
pub use directory::*;
pub use http::*;
pub use registry::*;
pub use relay::*;
pub use store::*;
