use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// What the bot remembers about a user while they are around.
/// Balances are not kept here, the ledger is asked instead.
#[derive(Debug, Clone)]
pub struct UserSession {
    pub platform_user_id: String,
    pub songs_played: u32,
    pub songs_liked: u32,
    pub joined_at: DateTime<Utc>,
}

/// Sessions of every user seen since the bot started, keyed by username
#[derive(Debug, Default)]
pub struct UserSessions {
    sessions: Mutex<HashMap<String, UserSession>>,
}

impl UserSessions {
    /// Records a join, returning true if the user has not been seen before
    pub fn join(&self, username: &str, platform_user_id: &str) -> bool {
        let mut sessions = self.sessions.lock();

        if let Some(session) = sessions.get_mut(username) {
            session.platform_user_id = platform_user_id.to_string();
            return false;
        }

        sessions.insert(
            username.to_string(),
            UserSession {
                platform_user_id: platform_user_id.to_string(),
                songs_played: 0,
                songs_liked: 0,
                joined_at: Utc::now(),
            },
        );

        true
    }

    pub fn get(&self, username: &str) -> Option<UserSession> {
        self.sessions.lock().get(username).cloned()
    }

    /// Finds the username belonging to a platform id
    pub fn username_of(&self, platform_user_id: &str) -> Option<String> {
        self.sessions
            .lock()
            .iter()
            .find(|(_, s)| s.platform_user_id == platform_user_id)
            .map(|(name, _)| name.clone())
    }

    pub fn record_play(&self, username: &str) {
        if let Some(session) = self.sessions.lock().get_mut(username) {
            session.songs_played += 1;
        }
    }

    pub fn record_like(&self, username: &str) {
        if let Some(session) = self.sessions.lock().get_mut(username) {
            session.songs_liked += 1;
        }
    }
}

/// Users who opted in over private message
#[derive(Debug, Default)]
pub struct Registrations {
    users: Mutex<BTreeSet<String>>,
}

impl Registrations {
    /// Returns false if the user was already registered
    pub fn register(&self, username: &str) -> bool {
        self.users.lock().insert(username.to_string())
    }

    pub fn is_registered(&self, username: &str) -> bool {
        self.users.lock().contains(username)
    }

    pub fn len(&self) -> usize {
        self.users.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered usernames in alphabetical order
    pub fn list(&self) -> Vec<String> {
        self.users.lock().iter().cloned().collect()
    }
}
