use cubebeat_core::{select_winner, CompetitionError};
use log::info;

use crate::{BotController, BotResult, RoomUser};

impl BotController {
    pub(crate) async fn start_competition(&self, user: &RoomUser, name: &str) -> BotResult<()> {
        if !self.role_of(&user.username).is_privileged() {
            return self
                .say("❌ Only VIP/Owner users can start competitions.")
                .await;
        }

        if !self.config.enable_competitions {
            return self.say("❌ Competitions are disabled in this room.").await;
        }

        let competition = match self.competition.start(Some(name)) {
            Ok(competition) => competition,
            Err(CompetitionError::AlreadyActive(_)) => {
                return self.say("❌ A competition is already active!").await
            }
            Err(e) => return Err(e.into()),
        };

        info!("{} started {}", user.username, competition.name);
        self.say(format!(
            "🏆 {} started! Most liked song wins.",
            competition.name
        ))
        .await
    }

    pub(crate) async fn end_competition(&self, user: &RoomUser) -> BotResult<()> {
        if !self.role_of(&user.username).is_privileged() {
            return self
                .say("❌ Only VIP/Owner users can end competitions.")
                .await;
        }

        let competition = match self.competition.end() {
            Ok(competition) => competition,
            Err(CompetitionError::NotActive) => {
                return self.say("❌ No active competition.").await
            }
            Err(e) => return Err(e.into()),
        };

        let resident = self.playback.resident();

        let Some(winner) = select_winner(&resident) else {
            info!("{} ended without a winner", competition.name);
            return self
                .say("🏆 Competition ended! No winner this time.")
                .await;
        };

        let prize = self.config.competition_prize;
        self.ledger
            .credit(&winner.requested_by, prize, &self.room_id)?;

        info!(
            "{} won {} with {}",
            winner.requested_by, competition.name, winner.song.title
        );

        self.say(format!(
            "🏆 Competition ended! Winner: {} with {} likes! Prize: {} cubes!",
            winner.requested_by, winner.likes, prize
        ))
        .await
    }
}
