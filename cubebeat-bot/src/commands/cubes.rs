use cubebeat_core::TIP_TIERS;

use crate::{BotController, BotResult, RoomUser};

const LEADERBOARD_SIZE: usize = 5;

impl BotController {
    pub(crate) async fn show_cubes(&self, user: &RoomUser) -> BotResult<()> {
        let balance = self.ledger.balance(&user.username, &self.room_id)?;
        let role = self.role_of(&user.username);

        let role_text = if role.is_privileged() {
            format!(" ({} - Unlimited cubes!)", role.label().to_uppercase())
        } else {
            String::new()
        };

        self.say(format!(
            "💎 {} has {} cubes{}",
            user.username, balance, role_text
        ))
        .await
    }

    pub(crate) async fn buy_info(&self, user: &RoomUser) -> BotResult<()> {
        let mut text = format!("💰 {}, tip the bot gold to get cubes!", user.username);

        for (gold, cubes) in TIP_TIERS.iter().rev() {
            let unit = if *cubes == 1 { "cube" } else { "cubes" };
            text += &format!("\n💎 {} gold = {} {}", gold, cubes, unit);
        }

        self.say(text).await
    }

    pub(crate) async fn leaderboard(&self) -> BotResult<()> {
        let top = self.ledger.leaderboard(&self.room_id, LEADERBOARD_SIZE);

        let mut text = "🏆 Leaderboard (Top Cubes):".to_string();

        for (i, (username, balance)) in top.iter().enumerate() {
            text += &format!("\n{}. {}: {} cubes", i + 1, username, balance);
        }

        self.say(text).await
    }
}
