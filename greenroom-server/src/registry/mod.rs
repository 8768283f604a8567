mod session_registry;

pub use session_registry::{SessionRecord, SessionRegistry};
