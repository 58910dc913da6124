//! Room lifecycle and membership

pub mod registry;
pub mod room;

pub use registry::{CreateRoomOptions, Departure, RoomError, RoomRegistry};
pub use room::{ChatMessage, GameSnapshot, Player, Room, RoomInfo, RoomPhase, RoomSnapshot};
