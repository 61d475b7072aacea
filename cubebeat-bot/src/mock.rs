use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use cubebeat_core::{BotConfig, CubeLedger, Platform, RolePolicy, SongRecord};
use cubebeat_search::{SearchError, SongSearch};
use parking_lot::Mutex;

use crate::{
    BotController, BotServices, Conversation, MessageKind, Position, PrivateMessage, RoomSession,
    RoomUser, SessionError,
};

pub const ROOM: &str = "room";

/// A room that records everything the bot does in it
#[derive(Default)]
pub struct MockSession {
    pub said: Mutex<Vec<String>>,
    pub emotes: Mutex<Vec<String>>,
    pub walks: Mutex<Vec<Position>>,
    pub private: Mutex<Vec<(String, String, MessageKind)>>,
    pub users: Mutex<Vec<(RoomUser, Position)>>,
    pub conversations: Mutex<Option<Vec<Conversation>>>,
    pub inbox: Mutex<HashMap<String, Vec<PrivateMessage>>>,
}

impl MockSession {
    pub fn said(&self) -> Vec<String> {
        self.said.lock().clone()
    }

    pub fn last_said(&self) -> String {
        self.said.lock().last().cloned().unwrap_or_default()
    }

    pub fn clear(&self) {
        self.said.lock().clear();
    }

    pub fn receive(&self, conversation_id: &str, user_id: &str, content: &str) {
        let message = PrivateMessage {
            id: format!("{}-{}", conversation_id, content.len()),
            user_id: user_id.to_string(),
            content: content.to_string(),
        };

        self.inbox
            .lock()
            .entry(conversation_id.to_string())
            .or_default()
            .insert(0, message);
    }
}

#[async_trait]
impl RoomSession for MockSession {
    async fn chat(&self, text: &str) -> Result<(), SessionError> {
        self.said.lock().push(text.to_string());
        Ok(())
    }

    async fn send_private_message(
        &self,
        conversation_id: &str,
        text: &str,
        kind: MessageKind,
    ) -> Result<(), SessionError> {
        self.private
            .lock()
            .push((conversation_id.to_string(), text.to_string(), kind));
        Ok(())
    }

    async fn send_emote(&self, emote: &str) -> Result<(), SessionError> {
        self.emotes.lock().push(emote.to_string());
        Ok(())
    }

    async fn walk_to(&self, position: Position) -> Result<(), SessionError> {
        self.walks.lock().push(position);
        Ok(())
    }

    async fn room_users(&self) -> Result<Vec<(RoomUser, Position)>, SessionError> {
        Ok(self.users.lock().clone())
    }

    async fn conversations(&self, _not_joined: bool) -> Result<Vec<Conversation>, SessionError> {
        self.conversations
            .lock()
            .clone()
            .ok_or_else(|| SessionError::Rejected("conversations unavailable".to_string()))
    }

    async fn messages(
        &self,
        conversation_id: &str,
        _since_id: Option<&str>,
    ) -> Result<Vec<PrivateMessage>, SessionError> {
        Ok(self
            .inbox
            .lock()
            .get(conversation_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Resolves every query to a song titled like the query
pub struct StubSearch;

pub fn song(title: &str, seconds: u32) -> SongRecord {
    SongRecord {
        id: title.to_lowercase(),
        title: title.to_string(),
        artist: "Someone".to_string(),
        duration_seconds: Some(seconds),
        platform: Platform::YouTube,
        url: format!("https://example.com/{}", title.to_lowercase()),
        thumbnail: String::new(),
    }
}

/// Queries starting with "nothing" find no songs
fn lookup(query: &str, platform: Platform) -> Vec<SongRecord> {
    if query.starts_with("nothing") {
        return vec![];
    }

    let seconds = query
        .rsplit_once(' ')
        .and_then(|(_, s)| s.parse().ok())
        .unwrap_or(200);

    vec![SongRecord {
        platform,
        ..song(query, seconds)
    }]
}

#[async_trait]
impl SongSearch for StubSearch {
    async fn search_all(&self, query: &str, limit: usize) -> Vec<SongRecord> {
        lookup(query, Platform::YouTube).into_iter().take(limit).collect()
    }

    async fn search_platform(
        &self,
        platform: Platform,
        query: &str,
        _limit: usize,
    ) -> Result<Vec<SongRecord>, SearchError> {
        Ok(lookup(query, platform))
    }

    async fn recommend(&self, _username: &str) -> Vec<SongRecord> {
        vec![song("Blinding Lights", 200)]
    }
}

pub struct TestBot {
    pub bot: Arc<BotController>,
    pub session: Arc<MockSession>,
    pub ledger: Arc<CubeLedger>,
}

pub fn test_bot(config: BotConfig) -> TestBot {
    let session = Arc::new(MockSession::default());
    let ledger = Arc::new(CubeLedger::in_memory(config.daily_reward));

    let services = BotServices {
        ledger: ledger.clone(),
        search: Arc::new(StubSearch),
        roles: Arc::new(RolePolicy::new(config.owners.clone())),
    };

    let bot = BotController::new(ROOM, config, session.clone(), services);

    TestBot {
        bot,
        session,
        ledger,
    }
}

pub fn owner() -> RoomUser {
    RoomUser::new("owner-id", "admin")
}

pub fn regular(name: &str) -> RoomUser {
    RoomUser::new(format!("{}-id", name), name)
}

pub fn bot_user() -> RoomUser {
    RoomUser::new("bot-id", "musicbot")
}
