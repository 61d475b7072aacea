//! Chat commands, parsed from messages starting with [COMMAND_PREFIX].

mod competition;
mod cubes;
mod music;
mod room;

use cubebeat_core::Platform;

use crate::{BotController, BotResult, RoomUser};

pub const COMMAND_PREFIX: char = '-';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play(String),
    /// Play the first result of a single platform
    PlatformPlay(Platform, String),
    Queue,
    Skip,
    Like,
    Link,
    Search(String),
    Recommend,
    Cubes,
    Buy,
    StartCompetition(String),
    EndCompetition,
    Leaderboard,
    CreateLink,
    JoinRoom(String),
    SyncMusic,
    Vip(String),
    Invite(String),
    FollowMe,
    Dance,
    StopDance,
    Help,
}

/// A message that looked like a command but matched none
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl Command {
    /// Parses a chat message. Returns [None] if the message isn't a command at all.
    pub fn parse(message: &str) -> Option<Result<Self, UnknownCommand>> {
        let message = message.trim();
        let body = message.strip_prefix(COMMAND_PREFIX)?;

        let (name, args) = body
            .split_once(char::is_whitespace)
            .map(|(name, args)| (name, args.trim()))
            .unwrap_or((body, ""));

        let args = args.to_string();

        let command = match name.to_lowercase().as_str() {
            "play" => Self::Play(args),
            "youtube" => Self::PlatformPlay(Platform::YouTube, args),
            "spotify" => Self::PlatformPlay(Platform::Spotify, args),
            "soundcloud" => Self::PlatformPlay(Platform::SoundCloud, args),
            "queue" => Self::Queue,
            "skip" => Self::Skip,
            "like" => Self::Like,
            "link" | "url" => Self::Link,
            "search" => Self::Search(args),
            "recommend" => Self::Recommend,
            "cubes" => Self::Cubes,
            "buy" => Self::Buy,
            "startcomp" => Self::StartCompetition(args),
            "endcomp" => Self::EndCompetition,
            "leaderboard" => Self::Leaderboard,
            "createlink" => Self::CreateLink,
            "joinroom" => Self::JoinRoom(args),
            "syncmusic" => Self::SyncMusic,
            "vip" => Self::Vip(args),
            "inv" => Self::Invite(args),
            "followme" => Self::FollowMe,
            "dance" => Self::Dance,
            "stopdance" => Self::StopDance,
            "help" => Self::Help,
            _ => {
                return Some(Err(UnknownCommand(format!(
                    "{}{}",
                    COMMAND_PREFIX,
                    name.to_lowercase()
                ))))
            }
        };

        Some(Ok(command))
    }

    /// The name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Play(_) => "play",
            Self::PlatformPlay(Platform::YouTube, _) => "youtube",
            Self::PlatformPlay(Platform::Spotify, _) => "spotify",
            Self::PlatformPlay(Platform::SoundCloud, _) => "soundcloud",
            Self::Queue => "queue",
            Self::Skip => "skip",
            Self::Like => "like",
            Self::Link => "link",
            Self::Search(_) => "search",
            Self::Recommend => "recommend",
            Self::Cubes => "cubes",
            Self::Buy => "buy",
            Self::StartCompetition(_) => "startcomp",
            Self::EndCompetition => "endcomp",
            Self::Leaderboard => "leaderboard",
            Self::CreateLink => "createlink",
            Self::JoinRoom(_) => "joinroom",
            Self::SyncMusic => "syncmusic",
            Self::Vip(_) => "vip",
            Self::Invite(_) => "inv",
            Self::FollowMe => "followme",
            Self::Dance => "dance",
            Self::StopDance => "stopdance",
            Self::Help => "help",
        }
    }
}

const HELP_TEXT: &str = "🎵 Music Bot Commands:
-play <song> - Add song to queue
-queue - Show the queue
-skip - Skip current song (VIP/Owner)
-like - Like the current song
-link / -url - Get the current song's URL
-search <song> - Search for songs
-recommend - Get recommendations
-youtube|-spotify|-soundcloud <song> - Play from one platform
-cubes - Check your cube balance
-buy - How to get cubes with gold tips
-startcomp [name] / -endcomp - Run a competition (VIP/Owner)
-leaderboard - Show top users
-createlink - Create a room link (VIP/Owner)
-joinroom <code> - Join another room
-syncmusic - Show the playing song
-vip <user> - Grant VIP (Owner)
-inv all - Invite registered users (Owner)
-followme - Make the bot follow you (Owner)
-dance / -stopdance - Bot dancing (Owner)
Send me '-buyvisa' in PM to register!";

impl BotController {
    pub(crate) async fn execute(&self, user: &RoomUser, command: Command) -> BotResult<()> {
        match command {
            Command::Play(query) => self.play(user, &query).await,
            Command::PlatformPlay(platform, query) => {
                self.play_from(user, platform, &query).await
            }
            Command::Queue => self.show_queue().await,
            Command::Skip => self.skip(user).await,
            Command::Like => self.like(user).await,
            Command::Link => self.song_link().await,
            Command::Search(query) => self.search(&query).await,
            Command::Recommend => self.recommend(user).await,
            Command::Cubes => self.show_cubes(user).await,
            Command::Buy => self.buy_info(user).await,
            Command::StartCompetition(name) => self.start_competition(user, &name).await,
            Command::EndCompetition => self.end_competition(user).await,
            Command::Leaderboard => self.leaderboard().await,
            Command::CreateLink => self.create_link(user).await,
            Command::JoinRoom(code) => self.join_room(&code).await,
            Command::SyncMusic => self.sync_music().await,
            Command::Vip(target) => self.grant_vip(user, &target).await,
            Command::Invite(args) => self.invite(user, &args).await,
            Command::FollowMe => self.follow(user).await,
            Command::Dance => self.dance(user).await,
            Command::StopDance => self.stop_dance(user).await,
            Command::Help => self.say(HELP_TEXT).await,
        }
    }
}
