//! Authoritative room registry
//!
//! Single writer for all room and player state. Every mutation takes
//! the registry lock, so handlers that mutate and then broadcast see a
//! consistent membership view. The message router owns the fan-out;
//! the registry never touches connections.

use std::collections::HashMap;

use parking_lot::Mutex;
use rand::Rng;
use tracing::debug;
use uuid::Uuid;

use crate::lobby::room::{
    ChatMessage, GameSnapshot, Player, Room, RoomInfo, RoomPhase, COLOR_PALETTE,
    DEFAULT_MAX_PLAYERS,
};
use crate::util::time::unix_millis;
use crate::ws::protocol::PlayerPatch;

const ROOM_CODE_LEN: usize = 6;
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Recoverable room-operation failures, surfaced to the originating
/// connection only
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    #[error("Room not found")]
    RoomNotFound,
    #[error("Game already in progress")]
    GameInProgress,
    #[error("Room is full")]
    RoomFull,
    #[error("Invalid password")]
    InvalidPassword,
    #[error("You are not in a room")]
    NotInRoom,
    #[error("Only the host can start the game")]
    NotHost,
}

impl RoomError {
    /// Stable machine-readable code for the wire
    pub fn code(&self) -> &'static str {
        match self {
            Self::RoomNotFound => "room_not_found",
            Self::GameInProgress => "game_in_progress",
            Self::RoomFull => "room_full",
            Self::InvalidPassword => "invalid_password",
            Self::NotInRoom => "not_in_room",
            Self::NotHost => "not_host",
        }
    }
}

/// Options carried by the create-room intent
#[derive(Debug, Clone, Default)]
pub struct CreateRoomOptions {
    pub name: String,
    pub password: Option<String>,
    pub max_players: Option<usize>,
}

/// Outcome of a player leaving their room
#[derive(Debug, Clone)]
pub enum Departure {
    /// The room lost its last member and was destroyed
    Closed { room_id: String },
    /// Other members remain; host may have been reassigned
    Remaining { room: Room },
}

#[derive(Default)]
struct RegistryInner {
    rooms: HashMap<String, Room>,
    /// Connection -> room index; a player is in at most one room
    player_rooms: HashMap<Uuid, String>,
    /// Latest room-wide gameplay snapshot per room
    snapshots: HashMap<String, GameSnapshot>,
}

/// Server-authoritative room and player registry
#[derive(Default)]
pub struct RoomRegistry {
    inner: Mutex<RegistryInner>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a room with the caller as host and sole member
    pub fn create_room(&self, host_id: Uuid, host_name: &str, options: CreateRoomOptions) -> Room {
        let mut inner = self.inner.lock();

        let room_id = generate_room_code(&inner.rooms);
        let name = if options.name.trim().is_empty() {
            format!("Room {}", room_id)
        } else {
            options.name
        };

        let host = Player::new(host_id, host_name.to_string(), pick_color());
        let room = Room {
            id: room_id.clone(),
            name,
            host_id,
            players: vec![host],
            max_players: options.max_players.unwrap_or(DEFAULT_MAX_PLAYERS),
            password: options.password,
            phase: RoomPhase::Lobby,
            created_at: unix_millis(),
        };

        inner.player_rooms.insert(host_id, room_id.clone());
        inner.rooms.insert(room_id, room.clone());

        debug!(room_id = %room.id, host_id = %host_id, "Room created");
        room
    }

    /// Join an existing room. Fails if the room is missing, already
    /// playing, full, or password-protected with a mismatch.
    pub fn join_room(
        &self,
        room_id: &str,
        player_id: Uuid,
        player_name: &str,
        password: Option<&str>,
    ) -> Result<Room, RoomError> {
        let mut inner = self.inner.lock();

        let room = inner
            .rooms
            .get_mut(room_id)
            .ok_or(RoomError::RoomNotFound)?;

        if room.phase != RoomPhase::Lobby {
            return Err(RoomError::GameInProgress);
        }
        if room.is_full() {
            return Err(RoomError::RoomFull);
        }
        if let Some(expected) = &room.password {
            if password != Some(expected.as_str()) {
                return Err(RoomError::InvalidPassword);
            }
        }

        room.players
            .push(Player::new(player_id, player_name.to_string(), pick_color()));
        let joined = room.clone();
        inner.player_rooms.insert(player_id, room_id.to_string());

        debug!(room_id = %room_id, player_id = %player_id, "Player joined room");
        Ok(joined)
    }

    /// Remove a player from their room. Idempotent: returns `None` if
    /// the player is not in any room. Destroys the room when the last
    /// member leaves, and reassigns the host to the earliest-joined
    /// remaining member otherwise.
    pub fn leave_room(&self, player_id: Uuid) -> Option<Departure> {
        let mut inner = self.inner.lock();

        let room_id = inner.player_rooms.remove(&player_id)?;
        let room = match inner.rooms.get_mut(&room_id) {
            Some(room) => room,
            None => return None,
        };

        room.players.retain(|p| p.id != player_id);

        if room.players.is_empty() {
            inner.rooms.remove(&room_id);
            inner.snapshots.remove(&room_id);
            debug!(room_id = %room_id, "Room closed");
            return Some(Departure::Closed { room_id });
        }

        if room.host_id == player_id {
            room.host_id = room.players[0].id;
            debug!(room_id = %room_id, new_host = %room.host_id, "Host reassigned");
        }

        Some(Departure::Remaining { room: room.clone() })
    }

    pub fn room(&self, room_id: &str) -> Option<Room> {
        self.inner.lock().rooms.get(room_id).cloned()
    }

    pub fn room_by_player(&self, player_id: Uuid) -> Option<Room> {
        let inner = self.inner.lock();
        let room_id = inner.player_rooms.get(&player_id)?;
        inner.rooms.get(room_id).cloned()
    }

    /// Public projections of all rooms, secrets excluded
    pub fn list_rooms(&self) -> Vec<RoomInfo> {
        self.inner.lock().rooms.values().map(Room::info).collect()
    }

    /// Merge a partial update onto the player record. No-op if the
    /// player is not in a room. Returns the room for fan-out.
    pub fn update_player(&self, player_id: Uuid, patch: &PlayerPatch) -> Option<Room> {
        let mut inner = self.inner.lock();

        let room_id = inner.player_rooms.get(&player_id)?.clone();
        let room = inner.rooms.get_mut(&room_id)?;
        let player = room.player_mut(player_id)?;

        if let Some(position) = patch.position {
            player.position = Some(position);
        }
        if let Some(rotation) = patch.rotation {
            player.rotation = Some(rotation);
        }
        if let Some(speed) = patch.speed {
            player.speed_kmh = Some(speed);
        }
        if let Some(plane) = &patch.plane {
            player.plane = Some(plane.clone());
        }

        let updated = room.clone();
        if patch.position.is_some() || patch.rotation.is_some() || patch.speed.is_some() {
            let snapshot = updated.game_snapshot();
            inner.snapshots.insert(room_id, snapshot);
        }

        Some(updated)
    }

    /// Set the ready flag. No-op if the player is not in a room.
    pub fn set_ready(&self, player_id: Uuid, is_ready: bool) -> Option<Room> {
        let mut inner = self.inner.lock();

        let room_id = inner.player_rooms.get(&player_id)?.clone();
        let room = inner.rooms.get_mut(&room_id)?;
        room.player_mut(player_id)?.is_ready = is_ready;
        Some(room.clone())
    }

    /// Latest recorded gameplay snapshot for a room
    pub fn game_state(&self, room_id: &str) -> Option<GameSnapshot> {
        self.inner.lock().snapshots.get(room_id).cloned()
    }

    /// Transition the caller's room to the playing phase. Host only.
    pub fn start_game(&self, player_id: Uuid) -> Result<GameSnapshot, RoomError> {
        let mut inner = self.inner.lock();

        let room_id = inner
            .player_rooms
            .get(&player_id)
            .ok_or(RoomError::NotInRoom)?
            .clone();
        let room = inner.rooms.get_mut(&room_id).ok_or(RoomError::NotInRoom)?;

        if room.host_id != player_id {
            return Err(RoomError::NotHost);
        }

        room.phase = RoomPhase::Playing;
        Ok(room.game_snapshot())
    }

    /// Build a chat message from the sender's player record.
    /// `None` if the sender is not in a room.
    pub fn build_chat(&self, sender_id: Uuid, text: String) -> Option<ChatMessage> {
        let inner = self.inner.lock();

        let room_id = inner.player_rooms.get(&sender_id)?;
        let room = inner.rooms.get(room_id)?;
        let sender = room.player(sender_id)?;
        Some(ChatMessage::new(sender, room_id.clone(), text))
    }

    pub fn room_count(&self) -> usize {
        self.inner.lock().rooms.len()
    }

    pub fn player_count(&self) -> usize {
        self.inner.lock().player_rooms.len()
    }
}

fn generate_room_code(rooms: &HashMap<String, Room>) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let code: String = (0..ROOM_CODE_LEN)
            .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
            .collect();
        if !rooms.contains_key(&code) {
            return code;
        }
    }
}

fn pick_color() -> String {
    let idx = rand::thread_rng().gen_range(0..COLOR_PALETTE.len());
    COLOR_PALETTE[idx].to_string()
}
