use std::fmt::{self, Display};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("The room session is closed")]
    Closed,

    #[error("The room rejected the request: {0}")]
    Rejected(String),
}

/// A user present in the room
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomUser {
    /// The id the platform knows the user by
    pub id: String,
    pub username: String,
}

impl RoomUser {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}

impl Display for RoomUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    #[default]
    FrontRight,
    FrontLeft,
    BackRight,
    BackLeft,
}

/// Where someone stands in the room
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub facing: Facing,
}

impl Position {
    /// The spot diagonally behind this one
    pub fn behind(&self) -> Self {
        Self {
            x: self.x + 1.,
            z: self.z + 1.,
            ..*self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    /// An invitation to join a room
    Invite { room_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: String,
}

/// A message in a private conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateMessage {
    pub id: String,
    /// The platform id of the sender
    pub user_id: String,
    pub content: String,
}

/// The operations a bot can perform in a room.
///
/// This is implemented by whatever connects the bot to the hosting platform.
#[async_trait]
pub trait RoomSession: Send + Sync {
    /// Sends a message to the room chat
    async fn chat(&self, text: &str) -> Result<(), SessionError>;

    async fn send_private_message(
        &self,
        conversation_id: &str,
        text: &str,
        kind: MessageKind,
    ) -> Result<(), SessionError>;

    async fn send_emote(&self, emote: &str) -> Result<(), SessionError>;

    /// Walks the bot to a position
    async fn walk_to(&self, position: Position) -> Result<(), SessionError>;

    /// Everyone in the room, with their positions
    async fn room_users(&self) -> Result<Vec<(RoomUser, Position)>, SessionError>;

    async fn conversations(&self, not_joined: bool) -> Result<Vec<Conversation>, SessionError>;

    /// Messages of a conversation, newest first
    async fn messages(
        &self,
        conversation_id: &str,
        since_id: Option<&str>,
    ) -> Result<Vec<PrivateMessage>, SessionError>;
}
