use cubebeat_core::Role;
use log::{error, info};

use crate::{
    util::{link_code, name_list},
    BotController, BotResult, MessageKind, RoomUser,
};

const LINK_CODE_LENGTH: usize = 8;
/// How many registered users the invite fallback lists by name
const FALLBACK_NAMES: usize = 10;

impl BotController {
    fn is_owner(&self, user: &RoomUser) -> bool {
        self.role_of(&user.username) == Role::Owner
    }

    pub(crate) async fn create_link(&self, user: &RoomUser) -> BotResult<()> {
        if !self.role_of(&user.username).is_privileged() {
            return self
                .say("❌ Only VIP/Owner users can create room links.")
                .await;
        }

        let code = link_code(LINK_CODE_LENGTH);
        self.say(format!("🔗 Room link created: hr.gg/music/{}", code))
            .await
    }

    pub(crate) async fn join_room(&self, code: &str) -> BotResult<()> {
        if code.is_empty() {
            return self.say("Usage: -joinroom <room_code>").await;
        }

        self.say(format!("🌐 Use the web dashboard to join room: {}", code))
            .await
    }

    pub(crate) async fn grant_vip(&self, user: &RoomUser, target: &str) -> BotResult<()> {
        if !self.is_owner(user) {
            return self.say("❌ Only room owners can grant VIP status.").await;
        }

        let target = target.trim_start_matches('@');

        if target.is_empty() {
            return self.say("Usage: -vip <username>").await;
        }

        if self.users.get(target).is_none() {
            return self.say(format!("❌ User {} not found.", target)).await;
        }

        self.roles.grant_vip(target)?;
        info!("{} granted VIP to {}", user.username, target);

        self.say(format!(
            "👑 {} is now VIP! Unlimited cubes and special privileges.",
            target
        ))
        .await
    }

    pub(crate) async fn invite(&self, user: &RoomUser, args: &str) -> BotResult<()> {
        if !self.is_owner(user) {
            return self
                .say("❌ Only room owners can use invite commands.")
                .await;
        }

        if !args.eq_ignore_ascii_case("all") {
            return self
                .say("Usage: -inv all (invites all registered users)")
                .await;
        }

        if self.registrations.is_empty() {
            return self.say("❌ No registered users to invite.").await;
        }

        self.say(format!(
            "📨 Sending room invites to {} registered users...",
            self.registrations.len()
        ))
        .await?;

        let conversations = match self.session.conversations(false).await {
            Ok(conversations) => conversations,
            Err(e) => {
                error!("Error sending room invites: {}", e);

                let names = name_list(&self.registrations.list(), FALLBACK_NAMES);
                return self.say(format!("📋 Registered users: {}", names)).await;
            }
        };

        let mut sent = 0;

        for conversation in conversations {
            let kind = MessageKind::Invite {
                room_id: self.room_id.clone(),
            };

            let result = self
                .session
                .send_private_message(
                    &conversation.id,
                    "🎵 You're invited to join our music room! Come listen and request songs!",
                    kind,
                )
                .await;

            match result {
                Ok(()) => sent += 1,
                Err(e) => error!(
                    "Failed to send invite to conversation {}: {}",
                    conversation.id, e
                ),
            }
        }

        self.say(format!("✅ Room invites sent to {} registered users!", sent))
            .await
    }

    pub(crate) async fn follow(&self, user: &RoomUser) -> BotResult<()> {
        if !self.is_owner(user) {
            return self
                .say("❌ Only room owners can make the bot follow them.")
                .await;
        }

        let position = match self.session.room_users().await {
            Ok(users) => users
                .into_iter()
                .find(|(u, _)| u.username == user.username)
                .map(|(_, position)| position),
            Err(e) => {
                error!("Error in follow command: {}", e);
                return self
                    .say("❌ Failed to follow. Make sure I have movement permissions!")
                    .await;
            }
        };

        let Some(position) = position else {
            return self
                .say(format!("❌ Could not find {}'s position.", user.username))
                .await;
        };

        if let Err(e) = self.session.walk_to(position.behind()).await {
            error!("Error in follow command: {}", e);
            return self
                .say("❌ Failed to follow. Make sure I have movement permissions!")
                .await;
        }

        self.say(format!(
            "🤖 Following {}! I'm right behind you!",
            user.username
        ))
        .await
    }

    pub(crate) async fn dance(&self, user: &RoomUser) -> BotResult<()> {
        if !self.is_owner(user) {
            return self
                .say("❌ Only room owners can make the bot dance.")
                .await;
        }

        if !self
            .dancing
            .start(self.session.clone(), self.config.dance_interval())
        {
            return self
                .say("🕺 I'm already dancing! Use -stopdance to stop me.")
                .await;
        }

        self.say("🕺 Let's dance! Starting my dance moves!").await
    }

    pub(crate) async fn stop_dance(&self, user: &RoomUser) -> BotResult<()> {
        if !self.is_owner(user) {
            return self
                .say("❌ Only room owners can stop the bot's dancing.")
                .await;
        }

        if !self.dancing.stop().await {
            return self.say("💤 I'm not dancing right now!").await;
        }

        self.say("🛑 Dance stopped! Thanks for the fun!").await
    }
}
