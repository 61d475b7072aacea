use cubebeat_core::{Platform, QueueItem, Role, SongRecord};
use log::{info, warn};

use crate::{BotController, BotResult, RoomUser};

/// How many results a play request looks at. Only the first is used.
const PLAY_SEARCH_LIMIT: usize = 3;
const SEARCH_RESULTS: usize = 3;
const QUEUE_PREVIEW: usize = 5;

impl BotController {
    pub(crate) async fn play(&self, user: &RoomUser, query: &str) -> BotResult<()> {
        if query.is_empty() {
            return self.say("Usage: -play <song name>").await;
        }

        let Some(role) = self.admit_request(user).await? else {
            return Ok(());
        };

        match self.resolve(query).await {
            Some(song) => self.request(user, role, song).await,
            None => self.say(format!("❌ No songs found for '{}'", query)).await,
        }
    }

    /// Plays the first result of a single platform
    pub(crate) async fn play_from(
        &self,
        user: &RoomUser,
        platform: Platform,
        query: &str,
    ) -> BotResult<()> {
        if query.is_empty() {
            return self
                .say(format!("Usage: -{} <song name>", platform.name().to_lowercase()))
                .await;
        }

        let Some(role) = self.admit_request(user).await? else {
            return Ok(());
        };

        let song = match self.search.search_platform(platform, query, 1).await {
            Ok(results) => results.into_iter().next(),
            Err(e) => {
                warn!("{} search failed: {}", platform, e);
                None
            }
        };

        match song {
            Some(song) => self.request(user, role, song).await,
            None => {
                self.say(format!("❌ No {} results for '{}'", platform, query))
                    .await
            }
        }
    }

    /// Checks whether a user may request a song, telling them why not.
    /// Returns the user's role if they may.
    async fn admit_request(&self, user: &RoomUser) -> BotResult<Option<Role>> {
        let role = self.role_of(&user.username);

        if role != Role::Owner && !self.registrations.is_registered(&user.username) {
            self.say(format!(
                "❌ {}, you must send me '{}' in PM first to use the bot!",
                user.username,
                crate::REGISTRATION_KEYWORD
            ))
            .await?;

            return Ok(None);
        }

        self.playback.ensure_capacity()?;

        if !role.is_privileged() {
            let balance = self.ledger.balance(&user.username, &self.room_id)?;

            if balance < self.config.song_cost {
                self.say(format!(
                    "❌ {}, you need {} cubes to request a song. You have {}.",
                    user.username, self.config.song_cost, balance
                ))
                .await?;

                return Ok(None);
            }
        }

        Ok(Some(role))
    }

    /// Searches the preferred platform, or all of them
    async fn resolve(&self, query: &str) -> Option<SongRecord> {
        match self.config.preferred_platform() {
            Some(platform) => match self.search.search_platform(platform, query, 1).await {
                Ok(results) => results.into_iter().next(),
                Err(e) => {
                    warn!("{} search failed: {}", platform, e);
                    None
                }
            },
            None => self
                .search
                .search_all(query, PLAY_SEARCH_LIMIT)
                .await
                .into_iter()
                .next(),
        }
    }

    /// Charges the user and queues the song
    async fn request(&self, user: &RoomUser, role: Role, song: SongRecord) -> BotResult<()> {
        let cost = if role.is_privileged() {
            0
        } else {
            self.config.song_cost
        };

        if cost > 0 && !self.ledger.debit(&user.username, cost, &self.room_id)? {
            let balance = self.ledger.balance(&user.username, &self.room_id)?;

            return self
                .say(format!(
                    "❌ {}, you need {} cubes to request a song. You have {}.",
                    user.username, cost, balance
                ))
                .await;
        }

        let item = QueueItem::new(song.clone(), &user.username, cost);

        let advance = match self.playback.enqueue(item) {
            Ok(advance) => advance,
            Err(e) => {
                // The queue filled up while searching
                if cost > 0 {
                    self.ledger.credit(&user.username, cost, &self.room_id)?;
                }

                return Err(e.into());
            }
        };

        info!(
            "{} requested {} by {} ({} cubes)",
            user.username, song.title, song.artist, cost
        );

        self.users.record_play(&user.username);
        self.say(format!(
            "🎵 {} by {} added to queue by {}!",
            song.title, song.artist, user.username
        ))
        .await?;

        if !song.url.is_empty() {
            self.say(format!("🔗 Listen here: {}", song.url)).await?;
        }

        match advance {
            Some(advance) => self.announce(advance).await,
            None => Ok(()),
        }
    }

    pub(crate) async fn show_queue(&self) -> BotResult<()> {
        let upcoming = self.playback.upcoming();

        if upcoming.is_empty() {
            return self
                .say("🎵 The music queue is empty. Use -play to add songs!")
                .await;
        }

        let mut text = "🎵 Music Queue:\n".to_string();

        for (i, item) in upcoming.iter().take(QUEUE_PREVIEW).enumerate() {
            text += &format!(
                "{}. {} by {} (👤 {}, ❤️ {})\n",
                i + 1,
                item.song.title,
                item.song.artist,
                item.requested_by,
                item.likes
            );
        }

        if upcoming.len() > QUEUE_PREVIEW {
            text += &format!("... and {} more songs", upcoming.len() - QUEUE_PREVIEW);
        }

        self.say(text.trim_end()).await
    }

    pub(crate) async fn skip(&self, user: &RoomUser) -> BotResult<()> {
        if !self.playback.is_playing() {
            return self.say("❌ No song is currently playing.").await;
        }

        if !self.role_of(&user.username).is_privileged() {
            return self.say("❌ Only VIP/Owner users can skip songs.").await;
        }

        self.say(format!("⏭️ {} skipped the current song.", user.username))
            .await?;

        self.cancel_scheduled_advance();
        let advance = self.playback.advance();

        self.announce(advance).await
    }

    pub(crate) async fn like(&self, user: &RoomUser) -> BotResult<()> {
        let Some(item) = self.playback.like_current() else {
            return self.say("❌ No song is currently playing to like.").await;
        };

        self.users.record_like(&user.username);
        self.say(format!(
            "❤️ {} liked the current song! ({} likes)",
            user.username, item.likes
        ))
        .await
    }

    pub(crate) async fn song_link(&self) -> BotResult<()> {
        let Some(item) = self.playback.current() else {
            return self.say("❌ No song is currently playing.").await;
        };

        if item.song.url.is_empty() {
            return self.say("❌ No URL available for the current song.").await;
        }

        self.say(format!(
            "🔗 Current song: {} by {}",
            item.song.title, item.song.artist
        ))
        .await?;

        self.say(format!("🎧 Listen here: {}", item.song.url)).await
    }

    pub(crate) async fn search(&self, query: &str) -> BotResult<()> {
        if query.is_empty() {
            return self.say("Usage: -search <song name>").await;
        }

        let results = self.search.search_all(query, SEARCH_RESULTS).await;

        if results.is_empty() {
            return self.say(format!("❌ No songs found for '{}'", query)).await;
        }

        let mut text = format!("🔍 Search results for '{}':\n", query);
        text += &song_lines(&results);
        text += "\nUse -play <song name> to add to queue!";

        self.say(text).await
    }

    pub(crate) async fn recommend(&self, user: &RoomUser) -> BotResult<()> {
        let songs = self.search.recommend(&user.username).await;

        let mut text = format!("🤖 Recommendations for {}:\n", user.username);
        text += &song_lines(&songs[..songs.len().min(3)]);

        self.say(text.trim_end()).await
    }

    pub(crate) async fn sync_music(&self) -> BotResult<()> {
        match self.playback.current() {
            Some(item) => {
                self.say(format!(
                    "🎵 Now Playing: {} by {} ({})",
                    item.song.title, item.song.artist, item.song.platform
                ))
                .await
            }
            None => self.say("🎵 No song currently playing.").await,
        }
    }
}

fn song_lines(songs: &[SongRecord]) -> String {
    songs
        .iter()
        .enumerate()
        .map(|(i, song)| format!("{}. {} by {} ({})\n", i + 1, song.title, song.artist, song.platform))
        .collect()
}
