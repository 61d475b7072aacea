mod data;
mod store;
mod timestamp;

pub use data::*;
pub use store::*;
pub use timestamp::parse_timestamp;

use std::io;

use chrono::{DateTime, Utc};
use log::{debug, info};
use parking_lot::Mutex;
use thiserror::Error;

/// The room used when a caller doesn't name one
pub const DEFAULT_ROOM: &str = "default";

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Could not access the ledger: {0}")]
    Io(#[from] io::Error),
    #[error("Ledger is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// A user's standing in a room
#[derive(Debug, Clone, PartialEq)]
pub struct UserStats {
    pub balance: u64,
    pub total_earned: u64,
    pub total_spent: u64,
    pub last_daily_reward_at: Option<DateTime<Utc>>,
    pub can_claim_daily: bool,
}

/// Totals for a room, computed from every account in it
#[derive(Debug, Clone, PartialEq)]
pub struct RoomStats {
    pub active_users: usize,
    pub total_in_circulation: u64,
    pub total_distributed: u64,
    pub daily_reset_at: DateTime<Utc>,
}

/// The authoritative record of cube balances for every room.
///
/// Mutations are applied to a copy of the ledger, the copy is persisted,
/// and only then does it replace the in-memory state. A failed write leaves
/// the ledger exactly as it was.
pub struct CubeLedger {
    daily_reward: u64,
    store: Box<dyn LedgerStore>,
    data: Mutex<LedgerData>,
}

impl CubeLedger {
    /// Opens the ledger, loading whatever the store has saved
    pub fn open<S>(store: S, daily_reward: u64) -> LedgerResult<Self>
    where
        S: LedgerStore + 'static,
    {
        let data = store.load()?;
        info!("Loaded cube ledger with {} rooms", data.rooms.len());

        Ok(Self {
            daily_reward,
            store: Box::new(store),
            data: data.into(),
        })
    }

    /// A ledger that is never written to disk
    pub fn in_memory(daily_reward: u64) -> Self {
        Self {
            daily_reward,
            store: Box::<MemoryStore>::default(),
            data: Default::default(),
        }
    }

    /// The daily grant, which is also what new users start with
    pub fn daily_reward(&self) -> u64 {
        self.daily_reward
    }

    /// Ensures the room exists
    pub fn initialize_room(&self, room_id: &str) -> LedgerResult<()> {
        let now = Utc::now();
        self.mutate(|data| {
            data.room_mut(room_id, now);
        })
    }

    /// Returns the user's balance, creating the room and user as needed
    pub fn balance(&self, username: &str, room_id: &str) -> LedgerResult<u64> {
        let now = Utc::now();
        let grant = self.daily_reward;

        self.mutate(|data| {
            data.room_mut(room_id, now)
                .account_mut(username, grant)
                .balance
        })
    }

    /// Adds cubes to a user, returning the new balance
    pub fn credit(&self, username: &str, amount: u64, room_id: &str) -> LedgerResult<u64> {
        let now = Utc::now();
        let grant = self.daily_reward;

        let balance = self.mutate(|data| {
            data.room_mut(room_id, now)
                .credit(username, amount, grant)
        })?;

        debug!("Credited {} cubes to {} in {}", amount, username, room_id);
        Ok(balance)
    }

    /// Takes cubes from a user. Returns false without spending anything if the balance is too low.
    pub fn debit(&self, username: &str, amount: u64, room_id: &str) -> LedgerResult<bool> {
        let now = Utc::now();
        let grant = self.daily_reward;

        self.mutate(|data| data.room_mut(room_id, now).debit(username, amount, grant))
    }

    /// Grants the daily reward if the user hasn't claimed one in the last 24 hours
    pub fn claim_daily(&self, username: &str, room_id: &str) -> LedgerResult<bool> {
        self.claim_daily_at(username, room_id, Utc::now())
    }

    pub fn claim_daily_at(
        &self,
        username: &str,
        room_id: &str,
        now: DateTime<Utc>,
    ) -> LedgerResult<bool> {
        let reward = self.daily_reward;

        self.mutate(|data| {
            let room = data.room_mut(room_id, now);

            if !room.account_mut(username, reward).can_claim_daily(now) {
                return false;
            }

            room.credit(username, reward, reward);
            room.account_mut(username, reward).last_daily_reward_at = Some(now);
            true
        })
    }

    /// Whether [CubeLedger::claim_daily] would grant a reward. Never mutates.
    pub fn can_claim_daily(&self, username: &str, room_id: &str) -> bool {
        self.can_claim_daily_at(username, room_id, Utc::now())
    }

    pub fn can_claim_daily_at(&self, username: &str, room_id: &str, now: DateTime<Utc>) -> bool {
        self.data
            .lock()
            .room(room_id)
            .and_then(|room| room.users.get(username))
            .map(|account| account.can_claim_daily(now))
            .unwrap_or(true)
    }

    pub fn user_stats(&self, username: &str, room_id: &str) -> LedgerResult<UserStats> {
        let now = Utc::now();
        let grant = self.daily_reward;

        self.mutate(|data| {
            let account = data.room_mut(room_id, now).account_mut(username, grant);

            UserStats {
                balance: account.balance,
                total_earned: account.total_earned,
                total_spent: account.total_spent,
                last_daily_reward_at: account.last_daily_reward_at,
                can_claim_daily: account.can_claim_daily(now),
            }
        })
    }

    /// Sums every balance in the room
    pub fn room_stats(&self, room_id: &str) -> LedgerResult<RoomStats> {
        let now = Utc::now();

        self.mutate(|data| {
            let room = data.room_mut(room_id, now);

            RoomStats {
                active_users: room.users.len(),
                total_in_circulation: room.circulating(),
                total_distributed: room.total_distributed,
                daily_reset_at: room.daily_reset_at,
            }
        })
    }

    /// Marks the room's daily reset. Eligibility is still decided per user by the rolling window.
    pub fn reset_daily(&self, room_id: &str) -> LedgerResult<()> {
        let now = Utc::now();

        self.mutate(|data| {
            data.room_mut(room_id, now).daily_reset_at = now;
        })
    }

    /// The richest users of a room, highest balance first. Ties are ordered by name.
    pub fn leaderboard(&self, room_id: &str, limit: usize) -> Vec<(String, u64)> {
        let data = self.data.lock();

        let mut entries: Vec<_> = data
            .room(room_id)
            .map(|room| {
                room.users
                    .iter()
                    .map(|(name, account)| (name.clone(), account.balance))
                    .collect()
            })
            .unwrap_or_default();

        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(limit);
        entries
    }

    /// A copy of the whole ledger
    pub fn snapshot(&self) -> LedgerData {
        self.data.lock().clone()
    }

    fn mutate<T, F>(&self, mutation: F) -> LedgerResult<T>
    where
        F: FnOnce(&mut LedgerData) -> T,
    {
        let mut data = self.data.lock();

        let mut next = data.clone();
        let result = mutation(&mut next);

        if next != *data {
            self.store.save(&next)?;
            *data = next;
        }

        Ok(result)
    }
}
