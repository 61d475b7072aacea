use cubebeat_core::{CompetitionError, LedgerError, PlaybackError, RoleError};
use cubebeat_search::SearchError;
use thiserror::Error;

use crate::SessionError;

#[derive(Debug, Error)]
pub enum BotError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Role(#[from] RoleError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Competition(#[from] CompetitionError),

    #[error("A bot is already running in room {0}")]
    AlreadyRunning(String),

    #[error("No bot is running in room {0}")]
    NotRunning(String),
}

pub type BotResult<T> = Result<T, BotError>;
