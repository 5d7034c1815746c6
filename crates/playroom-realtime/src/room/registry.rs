//! Room registry — named groups of users for scoped broadcast.
//!
//! Rooms are lightweight labels, currently one per game session. Both the
//! forward map (room → members) and the reverse map (user → rooms) are
//! maintained so disconnect teardown never scans.

use dashmap::DashMap;
use uuid::Uuid;

/// Room name for a game session.
pub fn game_room(game_id: Uuid) -> String {
    format!("game:{game_id}")
}

/// Tracks which users belong to which rooms.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Room name → member user IDs.
    members: DashMap<String, Vec<Uuid>>,
    /// User ID → rooms the user belongs to.
    rooms_by_user: DashMap<Uuid, Vec<String>>,
}

impl RoomRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user to a room. Joining a room twice is a no-op.
    pub fn join(&self, room: &str, user_id: Uuid) {
        let mut members = self.members.entry(room.to_string()).or_default();
        if !members.contains(&user_id) {
            members.push(user_id);
        }
        drop(members);

        let mut rooms = self.rooms_by_user.entry(user_id).or_default();
        if !rooms.iter().any(|r| r == room) {
            rooms.push(room.to_string());
        }
    }

    /// Remove a user from a specific room.
    pub fn leave(&self, room: &str, user_id: Uuid) {
        if let Some(mut members) = self.members.get_mut(room) {
            members.retain(|id| *id != user_id);
        }
        self.members.remove_if(room, |_, members| members.is_empty());

        if let Some(mut rooms) = self.rooms_by_user.get_mut(&user_id) {
            rooms.retain(|r| r != room);
        }
        self.rooms_by_user
            .remove_if(&user_id, |_, rooms| rooms.is_empty());
    }

    /// Remove a user from every room they belong to.
    pub fn leave_all(&self, user_id: Uuid) {
        let rooms = self
            .rooms_by_user
            .remove(&user_id)
            .map(|(_, rooms)| rooms)
            .unwrap_or_default();

        for room in rooms {
            if let Some(mut members) = self.members.get_mut(&room) {
                members.retain(|id| *id != user_id);
            }
            self.members
                .remove_if(&room, |_, members| members.is_empty());
        }
    }

    /// Drop a room and all its memberships.
    pub fn remove_room(&self, room: &str) {
        let members = self
            .members
            .remove(room)
            .map(|(_, members)| members)
            .unwrap_or_default();

        for user_id in members {
            if let Some(mut rooms) = self.rooms_by_user.get_mut(&user_id) {
                rooms.retain(|r| r != room);
            }
            self.rooms_by_user
                .remove_if(&user_id, |_, rooms| rooms.is_empty());
        }
    }

    /// Current members of a room.
    pub fn members(&self, room: &str) -> Vec<Uuid> {
        self.members
            .get(room)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_is_idempotent() {
        let registry = RoomRegistry::new();
        let user = Uuid::new_v4();

        registry.join("game:1", user);
        registry.join("game:1", user);
        assert_eq!(registry.members("game:1"), vec![user]);
    }

    #[test]
    fn test_leave_all_clears_every_room() {
        let registry = RoomRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        registry.join("game:1", a);
        registry.join("game:1", b);
        registry.join("game:2", a);

        registry.leave_all(a);
        assert_eq!(registry.members("game:1"), vec![b]);
        assert!(registry.members("game:2").is_empty());
    }

    #[test]
    fn test_remove_room_clears_reverse_map() {
        let registry = RoomRegistry::new();
        let a = Uuid::new_v4();

        registry.join("game:1", a);
        registry.remove_room("game:1");

        assert!(registry.members("game:1").is_empty());
        // A later leave_all must not touch the removed room.
        registry.leave_all(a);
    }
}
