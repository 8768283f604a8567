mod coordinator;

pub use coordinator::{Coordinator, CoordinatorConfig, InitiatorVote};
