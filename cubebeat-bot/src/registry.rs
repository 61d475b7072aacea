use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use log::info;

use crate::{BotController, BotError, BotResult};

struct RunningBot {
    controller: Arc<BotController>,
    started_at: DateTime<Utc>,
}

/// A summary of a running bot
#[derive(Debug, Clone)]
pub struct BotStatus {
    pub room_id: String,
    pub started_at: DateTime<Utc>,
    pub uptime: Duration,
    pub now_playing: Option<String>,
    pub queued: usize,
    pub dancing: bool,
}

/// Every bot this process runs, one per room
#[derive(Default)]
pub struct BotRegistry {
    bots: DashMap<String, RunningBot>,
}

impl BotRegistry {
    /// Registers a bot and starts it. Fails if its room already has a bot.
    pub async fn start(&self, controller: Arc<BotController>) -> BotResult<()> {
        let room_id = controller.room_id().to_string();

        match self.bots.entry(room_id.clone()) {
            Entry::Occupied(_) => return Err(BotError::AlreadyRunning(room_id)),
            Entry::Vacant(entry) => {
                entry.insert(RunningBot {
                    controller: controller.clone(),
                    started_at: Utc::now(),
                });
            }
        }

        info!("Starting bot for room {}", room_id);
        controller.on_start().await;

        Ok(())
    }

    /// Stops the bot of a room and forgets it
    pub async fn stop(&self, room_id: &str) -> BotResult<()> {
        let (_, running) = self
            .bots
            .remove(room_id)
            .ok_or_else(|| BotError::NotRunning(room_id.to_string()))?;

        running.controller.shutdown().await;
        Ok(())
    }

    /// Stops every bot
    pub async fn stop_all(&self) {
        let rooms: Vec<_> = self.bots.iter().map(|b| b.key().clone()).collect();

        for room_id in rooms {
            // Another caller may have stopped it in the meantime
            let _ = self.stop(&room_id).await;
        }
    }

    pub fn get(&self, room_id: &str) -> Option<Arc<BotController>> {
        self.bots.get(room_id).map(|b| b.controller.clone())
    }

    pub fn is_running(&self, room_id: &str) -> bool {
        self.bots.contains_key(room_id)
    }

    pub fn status(&self, room_id: &str) -> Option<BotStatus> {
        self.bots.get(room_id).map(|b| status_of(b.key(), b.value()))
    }

    /// The status of every running bot, ordered by room id
    pub fn statuses(&self) -> Vec<BotStatus> {
        let mut statuses: Vec<_> = self
            .bots
            .iter()
            .map(|b| status_of(b.key(), b.value()))
            .collect();

        statuses.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        statuses
    }
}

fn status_of(room_id: &str, running: &RunningBot) -> BotStatus {
    let controller = &running.controller;

    BotStatus {
        room_id: room_id.to_string(),
        started_at: running.started_at,
        uptime: Utc::now() - running.started_at,
        now_playing: controller.playback().current().map(|i| i.song.title),
        queued: controller.playback().len(),
        dancing: controller.is_dancing(),
    }
}
