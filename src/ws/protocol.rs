//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lobby::room::{ChatMessage, GameSnapshot, Player, RoomInfo, RoomSnapshot};
use crate::sim::state::Vec3;

/// Partial player update. Absent fields keep their prior values;
/// present fields replace them, merged field by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    /// Rotation in radians (pitch, heading, roll)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec3>,
    /// Speed in km/h
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    /// Aircraft model identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plane: Option<String>,
}

impl PlayerPatch {
    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.rotation.is_none()
            && self.speed.is_none()
            && self.plane.is_none()
    }
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Create a room and become its host
    CreateRoom {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_players: Option<usize>,
    },

    /// Join an existing room by its 6-character code
    JoinRoom {
        room_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
    },

    /// Leave the current room
    LeaveRoom,

    /// Request a room-list snapshot
    GetRooms,

    /// Partial update of the sender's player record
    UpdatePlayer { data: PlayerPatch },

    /// Toggle the sender's ready flag
    SetReady { is_ready: bool },

    /// Start the game (host only)
    StartGame,

    /// Send a chat line to the sender's room
    SendChat { message: String },
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Confirmation of room creation, sent to the host only
    RoomCreated {
        room: RoomSnapshot,
        players: Vec<Player>,
    },

    /// Confirmation of a successful join, sent to the joiner only
    RoomJoined {
        room: RoomSnapshot,
        players: Vec<Player>,
    },

    /// Another player joined the room
    PlayerJoined { player: Player },

    /// A player left the room
    PlayerLeft { player_id: Uuid },

    /// Lobby discovery snapshot, pushed periodically and on request
    RoomList { rooms: Vec<RoomInfo> },

    /// Full room player-state snapshot (game start)
    GameState { state: GameSnapshot },

    /// Another player's partial update
    PlayerUpdate { player_id: Uuid, data: PlayerPatch },

    /// Another player toggled ready
    PlayerReady { player_id: Uuid, is_ready: bool },

    /// Chat line, echoed to the whole room including the sender
    Chat { message: ChatMessage },

    /// Typed error, sent to the originating connection only
    Error { code: String, message: String },
}
