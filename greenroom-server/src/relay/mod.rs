mod signaling_relay;

pub use signaling_relay::{RelayConfig, SignalingRelay};
