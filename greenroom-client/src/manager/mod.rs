mod manager_command;
mod manager_config;
mod manager_event;
mod peer_link;
mod peer_manager;

pub use manager_command::ManagerCommand;
pub use manager_config::ManagerConfig;
pub use manager_event::ManagerEvent;
pub use peer_link::LinkState;
pub use peer_manager::{PeerManager, PeerManagerHandle};
