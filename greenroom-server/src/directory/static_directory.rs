use crate::directory::RoomDirectory;
use async_trait::async_trait;
use dashmap::DashMap;
use greenroom_core::{ParticipantId, RoomId};

#[derive(Default)]
struct Roster {
    host: Option<ParticipantId>,
    online: Vec<ParticipantId>,
}

/// Fixed in-process roster, for the standalone binary and tests.
#[derive(Default)]
pub struct StaticDirectory {
    rooms: DashMap<RoomId, Roster>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_room(&self, room: RoomId) {
        self.rooms.entry(room).or_default();
    }

    pub fn set_host(&self, room: &RoomId, host: ParticipantId) {
        self.rooms.entry(room.clone()).or_default().host = Some(host);
    }

    pub fn set_online(&self, room: &RoomId, participant: ParticipantId, online: bool) {
        let mut roster = self.rooms.entry(room.clone()).or_default();
        roster.online.retain(|p| p != &participant);
        if online {
            roster.online.push(participant);
        }
    }
}

#[async_trait]
impl RoomDirectory for StaticDirectory {
    async fn room_exists(&self, room: &RoomId) -> bool {
        self.rooms.contains_key(room)
    }

    async fn online_participants(&self, room: &RoomId) -> Vec<ParticipantId> {
        self.rooms
            .get(room)
            .map(|r| r.online.clone())
            .unwrap_or_default()
    }

    async fn is_host(&self, room: &RoomId, participant: &ParticipantId) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|r| r.host.as_ref() == Some(participant))
    }
}
