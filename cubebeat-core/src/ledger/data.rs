use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How long a user must wait between daily claims. This is a rolling window, not a calendar day.
pub fn daily_window() -> Duration {
    Duration::days(1)
}

/// Every room's ledger, keyed by room id. This is the unit that gets persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerData {
    pub rooms: BTreeMap<String, RoomLedger>,
}

/// The balances of a single room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomLedger {
    pub users: BTreeMap<String, UserAccount>,
    #[serde(rename = "total_cubes_distributed")]
    pub total_distributed: u64,
    #[serde(rename = "daily_reset_time", with = "super::timestamp")]
    pub daily_reset_at: DateTime<Utc>,
}

/// A user's balance in one room. `balance` always equals `total_earned - total_spent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    #[serde(rename = "cubes")]
    pub balance: u64,
    #[serde(
        rename = "last_daily_reward",
        default,
        with = "super::timestamp::optional"
    )]
    pub last_daily_reward_at: Option<DateTime<Utc>>,
    pub total_earned: u64,
    pub total_spent: u64,
}

impl LedgerData {
    /// Returns the room, creating it if it doesn't exist yet
    pub fn room_mut(&mut self, room_id: &str, now: DateTime<Utc>) -> &mut RoomLedger {
        self.rooms
            .entry(room_id.to_string())
            .or_insert_with(|| RoomLedger::new(now))
    }

    pub fn room(&self, room_id: &str) -> Option<&RoomLedger> {
        self.rooms.get(room_id)
    }
}

impl RoomLedger {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            users: Default::default(),
            total_distributed: 0,
            daily_reset_at: now,
        }
    }

    /// Returns the user's account, seeding new users with `starting_grant` cubes
    pub fn account_mut(&mut self, username: &str, starting_grant: u64) -> &mut UserAccount {
        self.users
            .entry(username.to_string())
            .or_insert_with(|| UserAccount::seeded(starting_grant))
    }

    pub fn credit(&mut self, username: &str, amount: u64, starting_grant: u64) -> u64 {
        let account = self.account_mut(username, starting_grant);
        account.balance += amount;
        account.total_earned += amount;
        let balance = account.balance;

        self.total_distributed += amount;
        balance
    }

    pub fn debit(&mut self, username: &str, amount: u64, starting_grant: u64) -> bool {
        let account = self.account_mut(username, starting_grant);

        if account.balance < amount {
            return false;
        }

        account.balance -= amount;
        account.total_spent += amount;
        true
    }

    pub fn circulating(&self) -> u64 {
        self.users.values().map(|u| u.balance).sum()
    }
}

impl UserAccount {
    pub fn seeded(starting_grant: u64) -> Self {
        Self {
            balance: starting_grant,
            last_daily_reward_at: None,
            total_earned: starting_grant,
            total_spent: 0,
        }
    }

    pub fn can_claim_daily(&self, now: DateTime<Utc>) -> bool {
        match self.last_daily_reward_at {
            Some(last) => now - last >= daily_window(),
            None => true,
        }
    }
}
