use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use cubebeat_core::{
    cubes_for_tip, Advance, BotConfig, CompetitionSlot, CubeLedger, Generation, Playback, Role,
    RolePolicy,
};
use cubebeat_search::SongSearch;
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use tokio::{task::AbortHandle, time::sleep};

use crate::{
    BotResult, Command, DanceLoop, MessageKind, Position, Registrations, RoomSession, RoomUser,
    UnknownCommand, UserSessions,
};

/// The private message that registers a user
pub const REGISTRATION_KEYWORD: &str = "-buyvisa";

/// The shared services a bot runs on
#[derive(Clone)]
pub struct BotServices {
    pub ledger: Arc<CubeLedger>,
    pub search: Arc<dyn SongSearch>,
    pub roles: Arc<RolePolicy>,
}

/// Runs a bot in one room: reacts to room events and keeps the room's playback,
/// competition, and user state.
pub struct BotController {
    me: Weak<Self>,
    pub(crate) room_id: String,
    pub(crate) config: BotConfig,
    pub(crate) session: Arc<dyn RoomSession>,
    pub(crate) ledger: Arc<CubeLedger>,
    pub(crate) search: Arc<dyn SongSearch>,
    pub(crate) roles: Arc<RolePolicy>,
    pub(crate) playback: Playback,
    pub(crate) competition: CompetitionSlot,
    pub(crate) users: UserSessions,
    pub(crate) registrations: Registrations,
    pub(crate) dancing: DanceLoop,
    scheduled_advance: Mutex<Option<AbortHandle>>,
}

impl BotController {
    pub fn new(
        room_id: impl Into<String>,
        config: BotConfig,
        session: Arc<dyn RoomSession>,
        services: BotServices,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            room_id: room_id.into(),
            playback: Playback::new(config.max_queue_size),
            config,
            session,
            ledger: services.ledger,
            search: services.search,
            roles: services.roles,
            competition: Default::default(),
            users: Default::default(),
            registrations: Default::default(),
            dancing: Default::default(),
            scheduled_advance: Default::default(),
        })
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn registrations(&self) -> &Registrations {
        &self.registrations
    }

    pub fn users(&self) -> &UserSessions {
        &self.users
    }

    pub fn is_dancing(&self) -> bool {
        self.dancing.is_dancing()
    }

    pub fn role_of(&self, username: &str) -> Role {
        self.roles.role_of(username)
    }

    /// Called once the bot is connected to the room
    pub async fn on_start(&self) {
        info!(
            "Bot started in room {} (max queue: {}, song cost: {} cubes)",
            self.room_id, self.config.max_queue_size, self.config.song_cost
        );

        if let Err(e) = self.ledger.initialize_room(&self.room_id) {
            error!("Failed to initialize cubes for room {}: {}", self.room_id, e);
        }

        let mut notices = vec![];

        if !self.config.welcome_message.is_empty() {
            notices.push(self.config.welcome_message.clone());
        }

        notices.push("🎵 Music Bot is now online! Type -help for commands.".to_string());
        notices.push(format!(
            "📧 Send me '{}' in PM to register and access the bot!",
            REGISTRATION_KEYWORD
        ));

        for notice in notices {
            self.report(&notice).await;
        }
    }

    pub async fn on_join(&self, user: &RoomUser, _position: Position) {
        info!("User joined: {}", user.username);

        if let Err(e) = self.welcome(user).await {
            error!("Failed to welcome {}: {}", user.username, e);
        }
    }

    pub async fn on_leave(&self, user: &RoomUser) {
        info!("User left: {}", user.username);
    }

    pub async fn on_chat(&self, user: &RoomUser, message: &str) {
        info!("Chat from {}: {}", user.username, message);

        let command = match Command::parse(message) {
            None => return,
            Some(Ok(command)) => command,
            Some(Err(UnknownCommand(name))) => {
                let reply = format!(
                    "Unknown command: {}. Type -help for available commands.",
                    name
                );

                return self.report(&reply).await;
            }
        };

        let name = command.name();

        if let Err(e) = self.execute(user, command).await {
            error!("Error executing command {}: {}", name, e);
            self.report(&format!("Error: {}", e)).await;
        }
    }

    /// Tips to the bot are converted to cubes, tips between other users are ignored
    pub async fn on_tip(&self, sender: &RoomUser, receiver: &RoomUser, gold: u64) {
        if receiver.username != self.config.bot_username {
            debug!(
                "Ignoring tip from {} to {}",
                sender.username, receiver.username
            );
            return;
        }

        info!("Tip received from {}: {} gold", sender.username, gold);

        if let Err(e) = self.reward_tip(sender, gold).await {
            error!("Failed to reward tip from {}: {}", sender.username, e);
            self.report(&format!("Error: {}", e)).await;
        }
    }

    pub async fn on_private_message(&self, user_id: &str, conversation_id: &str) {
        if let Err(e) = self.handle_private_message(user_id, conversation_id).await {
            error!("Error handling private message: {}", e);
        }
    }

    /// Stops background work. The bot can't be used afterwards.
    pub async fn shutdown(&self) {
        self.cancel_scheduled_advance();
        self.dancing.stop().await;

        info!("Bot in room {} shut down", self.room_id);
    }

    pub(crate) async fn say(&self, text: impl AsRef<str>) -> BotResult<()> {
        self.session.chat(text.as_ref()).await?;
        Ok(())
    }

    /// Like [BotController::say], for when there's nobody left to return an error to
    async fn report(&self, text: &str) {
        if let Err(e) = self.session.chat(text).await {
            error!("Failed to send chat message: {}", e);
        }
    }

    async fn welcome(&self, user: &RoomUser) -> BotResult<()> {
        let is_new = self.users.join(&user.username, &user.id);

        if is_new && self.ledger.claim_daily(&user.username, &self.room_id)? {
            info!("{} claimed their daily reward", user.username);
        }

        match self.role_of(&user.username) {
            Role::Owner => {
                self.say(format!(
                    "Welcome {}! 👑 You have UNLIMITED cubes as an owner.",
                    user.username
                ))
                .await
            }
            _ => {
                let balance = self.ledger.balance(&user.username, &self.room_id)?;
                self.say(format!("Welcome {}! 🎵 You have {} cubes.", user.username, balance))
                    .await
            }
        }
    }

    async fn reward_tip(&self, sender: &RoomUser, gold: u64) -> BotResult<()> {
        let cubes = cubes_for_tip(gold);

        if cubes == 0 {
            return self
                .say(format!(
                    "💝 Thanks for the tip {}! Tip 10+ gold to get cubes.",
                    sender.username
                ))
                .await;
        }

        self.ledger.credit(&sender.username, cubes, &self.room_id)?;
        self.say(format!(
            "🎁 {} received {} cubes! Thanks for the tip!",
            sender.username, cubes
        ))
        .await
    }

    async fn handle_private_message(&self, user_id: &str, conversation_id: &str) -> BotResult<()> {
        let messages = self.session.messages(conversation_id, None).await?;

        let Some(latest) = messages.first() else {
            return Ok(());
        };

        let sender_id = if latest.user_id.is_empty() {
            user_id
        } else {
            latest.user_id.as_str()
        };

        if !latest.content.trim().eq_ignore_ascii_case(REGISTRATION_KEYWORD) {
            let hint = format!(
                "📧 Send '{}' to register and access the music bot features!",
                REGISTRATION_KEYWORD
            );

            return self
                .session
                .send_private_message(conversation_id, &hint, MessageKind::Text)
                .await
                .map_err(Into::into);
        }

        let username = self.resolve_username(sender_id).await?;
        self.registrations.register(&username);
        info!("User {} registered via {} in PM", username, REGISTRATION_KEYWORD);

        self.session
            .send_private_message(
                conversation_id,
                "✅ Registration successful! You can now use the music bot in the room. Welcome to the community!",
                MessageKind::Text,
            )
            .await?;

        Ok(())
    }

    /// Finds the username behind a platform id, from known sessions or the room's user list
    async fn resolve_username(&self, user_id: &str) -> BotResult<String> {
        if let Some(username) = self.users.username_of(user_id) {
            return Ok(username);
        }

        let in_room = self
            .session
            .room_users()
            .await?
            .into_iter()
            .find(|(user, _)| user.id == user_id)
            .map(|(user, _)| user.username);

        Ok(in_room.unwrap_or_else(|| {
            warn!("Could not resolve a username for {}, registering the id", user_id);
            user_id.to_string()
        }))
    }

    /// Announces an advance and schedules the next one
    pub(crate) async fn announce(&self, advance: Advance) -> BotResult<()> {
        match advance {
            Advance::Playing { item, generation } => {
                let duration = item
                    .song
                    .play_duration(self.config.default_song_duration());

                self.schedule_advance(duration, generation);
                self.say(format!(
                    "🎵 Now Playing: {} by {} (Requested by {})",
                    item.song.title, item.song.artist, item.requested_by
                ))
                .await
            }
            Advance::Empty { .. } => {
                self.say("🎵 Queue is empty. Add songs with -play!").await
            }
        }
    }

    /// Moves to the next song once `after` has passed, unless playback moved on since
    fn schedule_advance(&self, after: Duration, generation: Generation) {
        let me = self.me.clone();

        let handle = tokio::spawn(async move {
            sleep(after).await;

            let Some(bot) = me.upgrade() else {
                return;
            };

            if let Some(advance) = bot.playback.advance_from(generation) {
                if let Err(e) = bot.announce(advance).await {
                    error!("Failed to announce the next song: {}", e);
                }
            }
        });

        debug!("Next song in {:?} (generation {})", after, generation);
        *self.scheduled_advance.lock() = Some(handle.abort_handle());
    }

    pub(crate) fn cancel_scheduled_advance(&self) {
        if let Some(handle) = self.scheduled_advance.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for BotController {
    fn drop(&mut self) {
        self.cancel_scheduled_advance();
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use cubebeat_core::BotConfig;
    use tokio::time::sleep;

    use crate::mock::{bot_user, owner, regular, test_bot, ROOM};
    use crate::Conversation;

    use super::*;

    async fn register(bot: &BotController, session: &crate::mock::MockSession, user: &RoomUser) {
        let conversation = format!("conv-{}", user.username);

        session.receive(&conversation, &user.id, "-BuyVisa ");
        bot.on_private_message(&user.id, &conversation).await;
    }

    #[tokio::test]
    async fn test_unregistered_user_cannot_play() {
        let t = test_bot(BotConfig::default());
        let john = regular("john");

        t.bot.on_join(&john, Position::default()).await;
        let before = t.ledger.balance("john", ROOM).unwrap();

        t.bot.on_chat(&john, "-play some song").await;

        assert_eq!(
            t.session.last_said(),
            "❌ john, you must send me '-buyvisa' in PM first to use the bot!"
        );
        assert!(!t.bot.playback().is_playing());
        assert_eq!(t.ledger.balance("john", ROOM).unwrap(), before);
    }

    #[tokio::test]
    async fn test_registration_over_private_message() {
        let t = test_bot(BotConfig::default());
        let john = regular("john");

        t.bot.on_join(&john, Position::default()).await;
        register(&t.bot, &t.session, &john).await;

        assert!(t.bot.registrations().is_registered("john"));

        let private = t.session.private.lock().clone();
        assert!(private[0].1.starts_with("✅ Registration successful!"));

        t.session.receive("conv-john", &john.id, "hello");
        t.bot.on_private_message(&john.id, "conv-john").await;

        let private = t.session.private.lock().clone();
        assert!(private[1].1.contains("-buyvisa"));
    }

    #[tokio::test]
    async fn test_registered_user_pays_for_songs() {
        let t = test_bot(BotConfig::default());
        let john = regular("john");

        t.bot.on_join(&john, Position::default()).await;
        register(&t.bot, &t.session, &john).await;

        // 50 to start with, and 50 for the first daily claim
        assert_eq!(t.ledger.balance("john", ROOM).unwrap(), 100);

        t.bot.on_chat(&john, "-play Levitating").await;

        assert_eq!(t.ledger.balance("john", ROOM).unwrap(), 90);
        assert_eq!(
            t.session.last_said(),
            "🎵 Now Playing: Levitating by Someone (Requested by john)"
        );

        let current = t.bot.playback().current().unwrap();
        assert_eq!(current.cubes_spent, 10);
        assert_eq!(t.bot.users().get("john").unwrap().songs_played, 1);
    }

    #[tokio::test]
    async fn test_poor_user_is_rejected() {
        let t = test_bot(BotConfig {
            song_cost: 500,
            ..Default::default()
        });
        let john = regular("john");

        t.bot.on_join(&john, Position::default()).await;
        register(&t.bot, &t.session, &john).await;
        t.bot.on_chat(&john, "-play Levitating").await;

        assert_eq!(
            t.session.last_said(),
            "❌ john, you need 500 cubes to request a song. You have 100."
        );
        assert!(!t.bot.playback().is_playing());
    }

    #[tokio::test]
    async fn test_owner_plays_for_free() {
        let t = test_bot(BotConfig::default());

        t.bot.on_chat(&owner(), "-play Levitating").await;
        t.bot.on_chat(&owner(), "-play nothing at all").await;

        assert_eq!(t.session.last_said(), "❌ No songs found for 'nothing at all'");
        assert_eq!(t.bot.playback().current().unwrap().cubes_spent, 0);
        assert_eq!(t.ledger.balance("admin", ROOM).unwrap(), 50);
    }

    #[tokio::test(start_paused = true)]
    async fn test_songs_play_in_order() {
        let t = test_bot(BotConfig::default());

        t.bot.on_chat(&owner(), "-play A 100").await;
        t.bot.on_chat(&owner(), "-play B 100").await;
        t.bot.on_chat(&owner(), "-play C 100").await;

        let current = || t.bot.playback().current().map(|i| i.song.title);

        assert_eq!(current().as_deref(), Some("A 100"));

        sleep(Duration::from_secs(101)).await;
        assert_eq!(current().as_deref(), Some("B 100"));

        sleep(Duration::from_secs(100)).await;
        assert_eq!(current().as_deref(), Some("C 100"));

        sleep(Duration::from_secs(100)).await;
        assert_eq!(current(), None);
        assert_eq!(t.session.last_said(), "🎵 Queue is empty. Add songs with -play!");
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_does_not_double_advance() {
        let t = test_bot(BotConfig::default());

        t.bot.on_chat(&owner(), "-play A 100").await;
        t.bot.on_chat(&owner(), "-play B 100").await;
        t.bot.on_chat(&owner(), "-play C 100").await;

        sleep(Duration::from_secs(60)).await;
        t.bot.on_chat(&owner(), "-skip").await;

        let current = || t.bot.playback().current().map(|i| i.song.title);
        assert_eq!(current().as_deref(), Some("B 100"));

        // A's timer would have fired here
        sleep(Duration::from_secs(50)).await;
        assert_eq!(current().as_deref(), Some("B 100"));

        // B's own timer started at the skip
        sleep(Duration::from_secs(51)).await;
        assert_eq!(current().as_deref(), Some("C 100"));
    }

    #[tokio::test]
    async fn test_regular_user_cannot_skip() {
        let t = test_bot(BotConfig::default());

        t.bot.on_chat(&owner(), "-play A").await;
        t.bot.on_chat(&regular("john"), "-skip").await;

        assert_eq!(t.session.last_said(), "❌ Only VIP/Owner users can skip songs.");
        assert_eq!(t.bot.playback().current().unwrap().song.title, "A");
    }

    #[tokio::test]
    async fn test_likes_count_for_current_song() {
        let t = test_bot(BotConfig::default());
        let john = regular("john");

        t.bot.on_join(&john, Position::default()).await;
        t.bot.on_chat(&john, "-like").await;
        assert_eq!(t.session.last_said(), "❌ No song is currently playing to like.");

        t.bot.on_chat(&owner(), "-play A").await;
        t.bot.on_chat(&owner(), "-play B").await;
        t.bot.on_chat(&john, "-like").await;
        t.bot.on_chat(&john, "-like").await;

        assert_eq!(t.session.last_said(), "❤️ john liked the current song! (2 likes)");
        assert_eq!(t.bot.playback().upcoming()[0].likes, 0);
        assert_eq!(t.bot.users().get("john").unwrap().songs_liked, 2);
    }

    #[tokio::test]
    async fn test_competition_rewards_most_liked_song() {
        let t = test_bot(BotConfig::default());
        let john = regular("john");

        t.bot.on_chat(&owner(), "-startcomp Friday Hits").await;
        assert_eq!(
            t.session.last_said(),
            "🏆 Friday Hits started! Most liked song wins."
        );

        t.bot.on_chat(&owner(), "-startcomp").await;
        assert_eq!(t.session.last_said(), "❌ A competition is already active!");

        t.bot.on_chat(&owner(), "-play A").await;
        t.bot.on_chat(&owner(), "-play B").await;
        t.bot.on_chat(&john, "-like").await;
        t.bot.on_chat(&john, "-like").await;

        t.bot.on_chat(&owner(), "-endcomp").await;

        assert_eq!(
            t.session.last_said(),
            "🏆 Competition ended! Winner: admin with 2 likes! Prize: 100 cubes!"
        );
        assert_eq!(t.ledger.balance("admin", ROOM).unwrap(), 150);

        t.bot.on_chat(&owner(), "-endcomp").await;
        assert_eq!(t.session.last_said(), "❌ No active competition.");
    }

    #[tokio::test]
    async fn test_played_songs_do_not_win() {
        let t = test_bot(BotConfig::default());

        t.bot.on_chat(&owner(), "-startcomp").await;
        t.bot.on_chat(&owner(), "-play A").await;
        t.bot.on_chat(&owner(), "-play B").await;
        t.bot.on_chat(&regular("john"), "-like").await;
        t.bot.on_chat(&owner(), "-skip").await;
        t.bot.on_chat(&owner(), "-endcomp").await;

        assert_eq!(
            t.session.last_said(),
            "🏆 Competition ended! No winner this time."
        );
    }

    #[tokio::test]
    async fn test_competitions_can_be_disabled() {
        let t = test_bot(BotConfig {
            enable_competitions: false,
            ..Default::default()
        });

        t.bot.on_chat(&owner(), "-startcomp").await;
        assert_eq!(
            t.session.last_said(),
            "❌ Competitions are disabled in this room."
        );

        t.bot.on_chat(&regular("john"), "-startcomp").await;
        assert_eq!(
            t.session.last_said(),
            "❌ Only VIP/Owner users can start competitions."
        );
    }

    #[tokio::test]
    async fn test_tips_convert_to_cubes() {
        let t = test_bot(BotConfig::default());
        let john = regular("john");

        t.bot.on_tip(&john, &bot_user(), 99).await;
        assert_eq!(t.ledger.balance("john", ROOM).unwrap(), 55);
        assert_eq!(
            t.session.last_said(),
            "🎁 john received 5 cubes! Thanks for the tip!"
        );

        t.bot.on_tip(&john, &bot_user(), 100).await;
        assert_eq!(t.ledger.balance("john", ROOM).unwrap(), 65);

        t.bot.on_tip(&john, &bot_user(), 9).await;
        assert_eq!(t.ledger.balance("john", ROOM).unwrap(), 65);
        assert_eq!(
            t.session.last_said(),
            "💝 Thanks for the tip john! Tip 10+ gold to get cubes."
        );
    }

    #[tokio::test]
    async fn test_tips_to_others_are_ignored() {
        let t = test_bot(BotConfig::default());

        t.bot.on_tip(&regular("john"), &regular("jane"), 100).await;

        assert!(t.session.said().is_empty());
        assert_eq!(t.ledger.balance("john", ROOM).unwrap(), 50);
    }

    #[tokio::test]
    async fn test_join_welcomes() {
        let t = test_bot(BotConfig::default());

        t.bot.on_join(&regular("john"), Position::default()).await;
        assert_eq!(t.session.last_said(), "Welcome john! 🎵 You have 100 cubes.");

        // Only the first join claims the daily reward
        t.bot.on_join(&regular("john"), Position::default()).await;
        assert_eq!(t.session.last_said(), "Welcome john! 🎵 You have 100 cubes.");

        t.bot.on_join(&owner(), Position::default()).await;
        assert_eq!(
            t.session.last_said(),
            "Welcome admin! 👑 You have UNLIMITED cubes as an owner."
        );
    }

    #[tokio::test]
    async fn test_unknown_command_and_errors() {
        let t = test_bot(BotConfig {
            max_queue_size: 1,
            ..Default::default()
        });

        t.bot.on_chat(&owner(), "-dab").await;
        assert_eq!(
            t.session.last_said(),
            "Unknown command: -dab. Type -help for available commands."
        );

        t.bot.on_chat(&owner(), "-play A").await;
        t.bot.on_chat(&owner(), "-play B").await;
        t.bot.on_chat(&owner(), "-play C").await;

        assert_eq!(t.session.last_said(), "Error: The queue is full (1 songs)");
        assert_eq!(t.bot.playback().len(), 1);

        t.session.clear();
        t.bot.on_chat(&owner(), "just chatting").await;
        assert!(t.session.said().is_empty());
    }

    #[tokio::test]
    async fn test_vip_grant() {
        let t = test_bot(BotConfig::default());
        let john = regular("john");

        t.bot.on_chat(&owner(), "-vip john").await;
        assert_eq!(t.session.last_said(), "❌ User john not found.");

        t.bot.on_join(&john, Position::default()).await;
        t.bot.on_chat(&john, "-vip john").await;
        assert_eq!(t.session.last_said(), "❌ Only room owners can grant VIP status.");

        t.bot.on_chat(&owner(), "-vip @john").await;
        assert_eq!(t.bot.role_of("john"), Role::Vip);

        register(&t.bot, &t.session, &john).await;
        t.bot.on_chat(&john, "-play A").await;

        assert_eq!(t.ledger.balance("john", ROOM).unwrap(), 100);
    }

    #[tokio::test]
    async fn test_invite_all() {
        let t = test_bot(BotConfig::default());
        let john = regular("john");

        t.bot.on_chat(&owner(), "-inv all").await;
        assert_eq!(t.session.last_said(), "❌ No registered users to invite.");

        t.bot.on_join(&john, Position::default()).await;
        register(&t.bot, &t.session, &john).await;

        // Conversations can't be listed, so registered users are named in chat
        t.bot.on_chat(&owner(), "-inv all").await;
        assert_eq!(t.session.last_said(), "📋 Registered users: john");

        *t.session.conversations.lock() = Some(vec![
            Conversation {
                id: "a".to_string(),
            },
            Conversation {
                id: "b".to_string(),
            },
        ]);

        t.session.private.lock().clear();
        t.bot.on_chat(&owner(), "-inv all").await;

        assert_eq!(t.session.last_said(), "✅ Room invites sent to 2 registered users!");

        let private = t.session.private.lock().clone();
        assert_eq!(private.len(), 2);
        assert_eq!(
            private[0].2,
            MessageKind::Invite {
                room_id: ROOM.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_follow_me() {
        let t = test_bot(BotConfig::default());
        let position = Position {
            x: 2.,
            y: 0.,
            z: 3.,
            ..Default::default()
        };

        t.bot.on_chat(&owner(), "-followme").await;
        assert_eq!(t.session.last_said(), "❌ Could not find admin's position.");

        t.session.users.lock().push((owner(), position));
        t.bot.on_chat(&owner(), "-followme").await;

        assert_eq!(t.session.walks.lock()[0], position.behind());
        assert_eq!(t.session.walks.lock()[0].x, 3.);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dance_stops_on_request() {
        let t = test_bot(BotConfig::default());

        t.bot.on_chat(&owner(), "-dance").await;
        assert!(t.bot.is_dancing());

        t.bot.on_chat(&owner(), "-dance").await;
        assert_eq!(
            t.session.last_said(),
            "🕺 I'm already dancing! Use -stopdance to stop me."
        );

        sleep(Duration::from_secs(7)).await;
        t.bot.on_chat(&owner(), "-stopdance").await;

        let emotes = t.session.emotes.lock().clone();
        assert_eq!(emotes, ["dance-tiktok2", "dance-tiktok8", "dance-tiktok10"]);

        sleep(Duration::from_secs(30)).await;
        assert_eq!(t.session.emotes.lock().len(), 3);
        assert!(!t.bot.is_dancing());

        t.bot.on_chat(&owner(), "-stopdance").await;
        assert_eq!(t.session.last_said(), "💤 I'm not dancing right now!");
    }

    #[tokio::test]
    async fn test_leaderboard_reads_the_ledger() {
        let t = test_bot(BotConfig::default());

        t.ledger.credit("jane", 30, ROOM).unwrap();
        t.ledger.debit("john", 20, ROOM).unwrap();

        t.bot.on_chat(&owner(), "-leaderboard").await;

        assert_eq!(
            t.session.last_said(),
            "🏆 Leaderboard (Top Cubes):\n1. jane: 80 cubes\n2. john: 30 cubes"
        );
    }
}
