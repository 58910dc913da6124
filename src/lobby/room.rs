//! Room and player records owned by the registry

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sim::state::Vec3;
use crate::util::time::unix_millis;

/// Fixed palette assigned to players on join
pub const COLOR_PALETTE: [&str; 12] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#98D8C8", "#F7DC6F",
    "#BB8FCE", "#85C1E9", "#F8B500", "#00CED1",
];

pub const DEFAULT_MAX_PLAYERS: usize = 10;

/// Room lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomPhase {
    Lobby,
    Playing,
    Ended,
}

/// Player record, owned exclusively by the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub nickname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    /// Rotation in radians (pitch, heading, roll)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_kmh: Option<f32>,
    /// Aircraft model identifier chosen by the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plane: Option<String>,
    pub color: String,
    pub is_ready: bool,
    pub joined_at: u64,
}

impl Player {
    pub fn new(id: Uuid, nickname: String, color: String) -> Self {
        Self {
            id,
            nickname,
            position: None,
            rotation: None,
            speed_kmh: None,
            plane: None,
            color,
            is_ready: false,
            joined_at: unix_millis(),
        }
    }
}

/// A multiplayer session room.
///
/// `players` preserves join order; host reassignment takes the front
/// of the remaining membership.
#[derive(Debug, Clone)]
pub struct Room {
    /// 6-character uppercase alphanumeric code
    pub id: String,
    pub name: String,
    pub host_id: Uuid,
    pub players: Vec<Player>,
    pub max_players: usize,
    /// Presence of a password makes the room private
    pub password: Option<String>,
    pub phase: RoomPhase,
    pub created_at: u64,
}

impl Room {
    pub fn is_private(&self) -> bool {
        self.password.is_some()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players
    }

    pub fn player(&self, id: Uuid) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: Uuid) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Public lobby-listing projection; omits the password and the
    /// full player records
    pub fn info(&self) -> RoomInfo {
        RoomInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            player_count: self.players.len(),
            max_players: self.max_players,
            is_private: self.is_private(),
            host_id: self.host_id,
            created_at: self.created_at,
        }
    }

    /// Wire-safe projection for room members; never carries the password
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            host_id: self.host_id,
            max_players: self.max_players,
            is_private: self.is_private(),
            phase: self.phase,
            created_at: self.created_at,
        }
    }

    /// Room-wide gameplay snapshot timestamped now
    pub fn game_snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            room_id: self.id.clone(),
            players: self.players.clone(),
            timestamp: unix_millis(),
        }
    }
}

/// Lobby discovery entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub id: String,
    pub name: String,
    pub player_count: usize,
    pub max_players: usize,
    pub is_private: bool,
    pub host_id: Uuid,
    pub created_at: u64,
}

/// Room projection sent to members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub id: String,
    pub name: String,
    pub host_id: Uuid,
    pub max_players: usize,
    pub is_private: bool,
    pub phase: RoomPhase,
    pub created_at: u64,
}

/// Full player-state snapshot for a room at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub room_id: String,
    pub players: Vec<Player>,
    pub timestamp: u64,
}

/// Chat line, ephemeral beyond the broadcast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Derived from timestamp + sender id
    pub id: String,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub text: String,
    pub timestamp: u64,
    pub room_id: String,
}

impl ChatMessage {
    pub fn new(sender: &Player, room_id: String, text: String) -> Self {
        let timestamp = unix_millis();
        Self {
            id: format!("{}-{}", timestamp, sender.id.simple()),
            sender_id: sender.id,
            sender_name: sender.nickname.clone(),
            text,
            timestamp,
            room_id,
        }
    }
}
