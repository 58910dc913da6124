//! Intent dispatch and room fan-out
//!
//! One logical connection per player. The router owns the connection
//! table and an explicit session record per connection; the registry
//! owns room/player state. Intents are processed under a dispatch
//! lock, so within a room every broadcast goes out in the order the
//! corresponding intent was handled.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::lobby::registry::{CreateRoomOptions, Departure, RoomRegistry};
use crate::lobby::room::Player;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// Per-connection session state, looked up by connection id
#[derive(Debug, Clone)]
pub struct ConnectionSession {
    pub connection_id: Uuid,
    pub nickname: String,
    pub current_room_id: Option<String>,
}

struct Connection {
    session: ConnectionSession,
    outbound: mpsc::UnboundedSender<ServerMsg>,
}

/// Routes client intents into registry mutations and fans the
/// resulting events out to affected connections
pub struct MessageRouter {
    registry: Arc<RoomRegistry>,
    connections: DashMap<Uuid, Connection>,
    /// Serializes intent processing; mutation plus broadcast run to
    /// completion before the next intent is handled
    dispatch: Mutex<()>,
}

impl MessageRouter {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self {
            registry,
            connections: DashMap::new(),
            dispatch: Mutex::new(()),
        }
    }

    /// Register a new connection. Returns the assigned nickname and
    /// the receiving half of its outbound message queue.
    pub fn register(&self, connection_id: Uuid) -> (String, mpsc::UnboundedReceiver<ServerMsg>) {
        let nickname = format!("Player_{}", &connection_id.simple().to_string()[..4]);
        let (outbound, rx) = mpsc::unbounded_channel();

        self.connections.insert(
            connection_id,
            Connection {
                session: ConnectionSession {
                    connection_id,
                    nickname: nickname.clone(),
                    current_room_id: None,
                },
                outbound,
            },
        );

        info!(conn_id = %connection_id, nickname = %nickname, "Connection registered");
        (nickname, rx)
    }

    /// Drop a connection. Implies leave-room; safe to call more than
    /// once or for an unknown id.
    pub fn disconnect(&self, connection_id: Uuid) {
        let _guard = self.dispatch.lock();
        self.leave_current_room(connection_id);
        if self.connections.remove(&connection_id).is_some() {
            info!(conn_id = %connection_id, "Connection closed");
        }
    }

    /// Process one client intent to completion
    pub fn handle(&self, connection_id: Uuid, msg: ClientMsg) {
        let _guard = self.dispatch.lock();

        match msg {
            ClientMsg::CreateRoom {
                name,
                password,
                max_players,
            } => self.handle_create_room(connection_id, name, password, max_players),
            ClientMsg::JoinRoom { room_id, password } => {
                self.handle_join_room(connection_id, &room_id, password.as_deref())
            }
            ClientMsg::LeaveRoom => self.leave_current_room(connection_id),
            ClientMsg::GetRooms => {
                self.send_to(
                    connection_id,
                    ServerMsg::RoomList {
                        rooms: self.registry.list_rooms(),
                    },
                );
            }
            ClientMsg::UpdatePlayer { data } => {
                if data.is_empty() {
                    return;
                }
                if let Some(room) = self.registry.update_player(connection_id, &data) {
                    self.broadcast(
                        &room.players,
                        Some(connection_id),
                        ServerMsg::PlayerUpdate {
                            player_id: connection_id,
                            data,
                        },
                    );
                }
            }
            ClientMsg::SetReady { is_ready } => {
                if let Some(room) = self.registry.set_ready(connection_id, is_ready) {
                    self.broadcast(
                        &room.players,
                        Some(connection_id),
                        ServerMsg::PlayerReady {
                            player_id: connection_id,
                            is_ready,
                        },
                    );
                }
            }
            ClientMsg::StartGame => self.handle_start_game(connection_id),
            ClientMsg::SendChat { message } => self.handle_chat(connection_id, message),
        }
    }

    /// Push the current room list to every connection. Driven by a
    /// fixed-interval task as well as explicit get-rooms requests.
    pub fn broadcast_room_list(&self) {
        let rooms = self.registry.list_rooms();
        for entry in self.connections.iter() {
            let _ = entry.outbound.send(ServerMsg::RoomList {
                rooms: rooms.clone(),
            });
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Session snapshot for a connection
    pub fn session(&self, connection_id: Uuid) -> Option<ConnectionSession> {
        self.connections
            .get(&connection_id)
            .map(|c| c.session.clone())
    }

    fn handle_create_room(
        &self,
        connection_id: Uuid,
        name: String,
        password: Option<String>,
        max_players: Option<usize>,
    ) {
        let nickname = match self.session(connection_id) {
            Some(session) => session.nickname,
            None => return,
        };

        let room = self.registry.create_room(
            connection_id,
            &nickname,
            CreateRoomOptions {
                name,
                password,
                max_players,
            },
        );

        self.set_current_room(connection_id, Some(room.id.clone()));

        info!(conn_id = %connection_id, room_id = %room.id, "Room created");
        self.send_to(
            connection_id,
            ServerMsg::RoomCreated {
                room: room.snapshot(),
                players: room.players,
            },
        );
    }

    fn handle_join_room(&self, connection_id: Uuid, room_id: &str, password: Option<&str>) {
        let nickname = match self.session(connection_id) {
            Some(session) => session.nickname,
            None => return,
        };

        match self
            .registry
            .join_room(room_id, connection_id, &nickname, password)
        {
            Ok(room) => {
                self.set_current_room(connection_id, Some(room.id.clone()));

                info!(conn_id = %connection_id, room_id = %room.id, "Joined room");

                let joined: Option<&Player> = room.player(connection_id);
                if let Some(player) = joined {
                    self.broadcast(
                        &room.players,
                        Some(connection_id),
                        ServerMsg::PlayerJoined {
                            player: player.clone(),
                        },
                    );
                }

                self.send_to(
                    connection_id,
                    ServerMsg::RoomJoined {
                        room: room.snapshot(),
                        players: room.players,
                    },
                );
            }
            Err(err) => {
                debug!(conn_id = %connection_id, room_id = %room_id, error = %err, "Join rejected");
                self.send_error(connection_id, err.code(), &err.to_string());
            }
        }
    }

    fn handle_start_game(&self, connection_id: Uuid) {
        match self.registry.start_game(connection_id) {
            Ok(snapshot) => {
                info!(conn_id = %connection_id, room_id = %snapshot.room_id, "Game started");
                let players = snapshot.players.clone();
                self.broadcast(&players, None, ServerMsg::GameState { state: snapshot });
            }
            Err(err) => {
                warn!(conn_id = %connection_id, error = %err, "Start game rejected");
                self.send_error(connection_id, err.code(), &err.to_string());
            }
        }
    }

    fn handle_chat(&self, connection_id: Uuid, text: String) {
        // Silently ignored for senders outside any room
        let Some(message) = self.registry.build_chat(connection_id, text) else {
            debug!(conn_id = %connection_id, "Chat from roomless connection dropped");
            return;
        };

        if let Some(room) = self.registry.room(&message.room_id) {
            self.broadcast(&room.players, None, ServerMsg::Chat { message });
        }
    }

    /// Leave-room semantics shared by the explicit intent and
    /// disconnect. Idempotent.
    fn leave_current_room(&self, connection_id: Uuid) {
        self.set_current_room(connection_id, None);

        match self.registry.leave_room(connection_id) {
            Some(Departure::Remaining { room }) => {
                info!(conn_id = %connection_id, room_id = %room.id, "Left room");
                self.broadcast(
                    &room.players,
                    None,
                    ServerMsg::PlayerLeft {
                        player_id: connection_id,
                    },
                );
            }
            Some(Departure::Closed { room_id }) => {
                info!(conn_id = %connection_id, room_id = %room_id, "Left room, room closed");
            }
            None => {}
        }
    }

    fn set_current_room(&self, connection_id: Uuid, room_id: Option<String>) {
        // Entry ref dropped before any fan-out touches the map again
        if let Some(mut conn) = self.connections.get_mut(&connection_id) {
            conn.session.current_room_id = room_id;
        }
    }

    fn send_to(&self, connection_id: Uuid, msg: ServerMsg) {
        if let Some(conn) = self.connections.get(&connection_id) {
            let _ = conn.outbound.send(msg);
        }
    }

    fn send_error(&self, connection_id: Uuid, code: &str, message: &str) {
        self.send_to(
            connection_id,
            ServerMsg::Error {
                code: code.to_string(),
                message: message.to_string(),
            },
        );
    }

    /// Deliver `msg` to every listed player except `exclude`
    fn broadcast(&self, players: &[Player], exclude: Option<Uuid>, msg: ServerMsg) {
        for player in players {
            if Some(player.id) == exclude {
                continue;
            }
            self.send_to(player.id, msg.clone());
        }
    }
}
