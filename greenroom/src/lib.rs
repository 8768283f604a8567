pub use greenroom_core::{ParticipantId, RoomId, SessionId};

pub mod model {
    pub use greenroom_core::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use greenroom_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use greenroom_client::*;
}
