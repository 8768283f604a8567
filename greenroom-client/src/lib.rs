pub mod engine;
pub mod manager;
pub mod transport;

pub use engine::{EngineError, EngineEvent, MediaEngine, MediaSession};
pub use manager::{
    LinkState, ManagerCommand, ManagerConfig, ManagerEvent, PeerManager, PeerManagerHandle,
};
pub use transport::{SignalTransport, TransportError};
