//! Drives a bot from the terminal, standing in for the hosting platform's connection.

use std::{collections::HashMap, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use colored::Colorize;
use cubebeat_bot::{
    BotController, Conversation, MessageKind, Position, PrivateMessage, RoomSession, RoomUser,
    SessionError,
};
use lazy_static::lazy_static;
use log::{info, warn};
use parking_lot::Mutex;
use regex::Regex;
use tokio::io::{self, AsyncBufReadExt, BufReader};

lazy_static! {
    static ref JOIN: Regex = Regex::new(r"^/join\s+(\S+)$").unwrap();
    static ref LEAVE: Regex = Regex::new(r"^/leave\s+(\S+)$").unwrap();
    static ref TIP: Regex = Regex::new(r"^/tip\s+(\S+)\s+(\d+)$").unwrap();
    static ref PRIVATE: Regex = Regex::new(r"^/pm\s+(\S+)\s+(.+)$").unwrap();
    static ref CHAT: Regex = Regex::new(r"^([^\s:/]+):\s*(.*)$").unwrap();
}

/// A line typed into the console
#[derive(Debug, PartialEq)]
enum ConsoleInput {
    Join(String),
    Leave(String),
    Tip(String, u64),
    Private(String, String),
    Chat(String, String),
}

impl ConsoleInput {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let group = |captures: &regex::Captures, i: usize| captures[i].to_string();

        if let Some(c) = JOIN.captures(line) {
            return Some(Self::Join(group(&c, 1)));
        }

        if let Some(c) = LEAVE.captures(line) {
            return Some(Self::Leave(group(&c, 1)));
        }

        if let Some(c) = TIP.captures(line) {
            return Some(Self::Tip(group(&c, 1), c[2].parse().ok()?));
        }

        if let Some(c) = PRIVATE.captures(line) {
            return Some(Self::Private(group(&c, 1), group(&c, 2)));
        }

        CHAT.captures(line)
            .map(|c| Self::Chat(group(&c, 1), group(&c, 2)))
    }
}

fn user_id(username: &str) -> String {
    format!("console-{}", username.to_lowercase())
}

fn conversation_id(username: &str) -> String {
    format!("pm-{}", username.to_lowercase())
}

/// A room that lives in the terminal. What the bot does is printed to stdout.
#[derive(Default)]
pub struct ConsoleSession {
    users: Mutex<Vec<(RoomUser, Position)>>,
    inbox: Mutex<HashMap<String, Vec<PrivateMessage>>>,
    next_message: Mutex<u64>,
}

impl ConsoleSession {
    fn enter(&self, user: &RoomUser) -> Position {
        let mut users = self.users.lock();

        if let Some((_, position)) = users.iter().find(|(u, _)| u == user) {
            return *position;
        }

        let position = Position {
            x: users.len() as f32,
            ..Default::default()
        };

        users.push((user.clone(), position));
        position
    }

    fn exit(&self, user: &RoomUser) {
        self.users.lock().retain(|(u, _)| u != user);
    }

    fn deliver(&self, user: &RoomUser, content: &str) -> String {
        let id = {
            let mut next = self.next_message.lock();
            *next += 1;
            next.to_string()
        };

        let conversation = conversation_id(&user.username);
        let message = PrivateMessage {
            id,
            user_id: user.id.clone(),
            content: content.to_string(),
        };

        self.inbox
            .lock()
            .entry(conversation.clone())
            .or_default()
            .insert(0, message);

        conversation
    }
}

#[async_trait]
impl RoomSession for ConsoleSession {
    async fn chat(&self, text: &str) -> Result<(), SessionError> {
        println!("{} {}", "[room]".bright_blue().bold(), text);
        Ok(())
    }

    async fn send_private_message(
        &self,
        conversation_id: &str,
        text: &str,
        kind: MessageKind,
    ) -> Result<(), SessionError> {
        let label = match kind {
            MessageKind::Text => format!("[{}]", conversation_id),
            MessageKind::Invite { room_id } => format!("[{} invite to {}]", conversation_id, room_id),
        };

        println!("{} {}", label.bright_magenta().bold(), text);
        Ok(())
    }

    async fn send_emote(&self, emote: &str) -> Result<(), SessionError> {
        println!("{}", format!("* {} *", emote).dimmed());
        Ok(())
    }

    async fn walk_to(&self, position: Position) -> Result<(), SessionError> {
        println!(
            "{}",
            format!("* walks to {}, {}, {} *", position.x, position.y, position.z).dimmed()
        );
        Ok(())
    }

    async fn room_users(&self) -> Result<Vec<(RoomUser, Position)>, SessionError> {
        Ok(self.users.lock().clone())
    }

    async fn conversations(&self, _not_joined: bool) -> Result<Vec<Conversation>, SessionError> {
        let mut ids: Vec<_> = self.inbox.lock().keys().cloned().collect();
        ids.sort();

        Ok(ids.into_iter().map(|id| Conversation { id }).collect())
    }

    async fn messages(
        &self,
        conversation_id: &str,
        since_id: Option<&str>,
    ) -> Result<Vec<PrivateMessage>, SessionError> {
        let inbox = self.inbox.lock();
        let messages = inbox.get(conversation_id).cloned().unwrap_or_default();

        Ok(match since_id {
            Some(since) => messages.into_iter().take_while(|m| m.id != since).collect(),
            None => messages,
        })
    }
}

/// Reads console lines and feeds them to the bot until stdin closes
pub async fn run(
    bot: Arc<BotController>,
    session: Arc<ConsoleSession>,
    bot_user: RoomUser,
) -> anyhow::Result<()> {
    info!("Type `name: message` to chat, or /join, /leave, /tip, /pm");

    let mut lines = BufReader::new(io::stdin()).lines();

    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read from the console")?
    {
        if line.trim().is_empty() {
            continue;
        }

        let Some(input) = ConsoleInput::parse(&line) else {
            warn!("Could not understand {:?}", line);
            continue;
        };

        match input {
            ConsoleInput::Join(name) => {
                let user = RoomUser::new(user_id(&name), name);
                let position = session.enter(&user);

                bot.on_join(&user, position).await;
            }
            ConsoleInput::Leave(name) => {
                let user = RoomUser::new(user_id(&name), name);
                session.exit(&user);

                bot.on_leave(&user).await;
            }
            ConsoleInput::Tip(name, gold) => {
                let user = RoomUser::new(user_id(&name), name);
                bot.on_tip(&user, &bot_user, gold).await;
            }
            ConsoleInput::Private(name, content) => {
                let user = RoomUser::new(user_id(&name), name);
                let conversation = session.deliver(&user, &content);

                bot.on_private_message(&user.id, &conversation).await;
            }
            ConsoleInput::Chat(name, message) => {
                let user = RoomUser::new(user_id(&name), name);
                bot.on_chat(&user, &message).await;
            }
        }
    }

    Ok(())
}
