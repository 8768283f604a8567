mod static_directory;

pub use static_directory::StaticDirectory;

use async_trait::async_trait;
use greenroom_core::{ParticipantId, RoomId};

/// Room membership as seen by this subsystem. Membership and identity are
/// owned elsewhere; this trait is the seam the real registry plugs into.
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    async fn room_exists(&self, room: &RoomId) -> bool;

    /// Participants currently online in the room, hosts included.
    async fn online_participants(&self, room: &RoomId) -> Vec<ParticipantId>;

    async fn is_online(&self, room: &RoomId, participant: &ParticipantId) -> bool {
        self.online_participants(room).await.contains(participant)
    }

    /// Hosts may stop sessions they did not initiate.
    async fn is_host(&self, room: &RoomId, participant: &ParticipantId) -> bool;
}
