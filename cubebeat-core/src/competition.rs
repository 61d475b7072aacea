use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use thiserror::Error;

use crate::QueueItem;

pub const DEFAULT_COMPETITION_NAME: &str = "Music Competition";

/// A contest rewarding the most liked song still in the room at the end
#[derive(Debug, Clone, PartialEq)]
pub struct Competition {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub active: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum CompetitionError {
    #[error("{0} is already active")]
    AlreadyActive(String),
    #[error("No competition is active")]
    NotActive,
}

/// Holds the single competition a room can run at a time
#[derive(Debug, Default)]
pub struct CompetitionSlot {
    active: Mutex<Option<Competition>>,
}

impl CompetitionSlot {
    /// Starts a competition, using the default name when none is given
    pub fn start(&self, name: Option<&str>) -> Result<Competition, CompetitionError> {
        let mut active = self.active.lock();

        if let Some(existing) = active.as_ref() {
            return Err(CompetitionError::AlreadyActive(existing.name.clone()));
        }

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_COMPETITION_NAME);

        let competition = Competition {
            name: name.to_string(),
            started_at: Utc::now(),
            active: true,
        };

        *active = Some(competition.clone());
        Ok(competition)
    }

    /// Clears the active competition, returning it
    pub fn end(&self) -> Result<Competition, CompetitionError> {
        let mut competition = self
            .active
            .lock()
            .take()
            .ok_or(CompetitionError::NotActive)?;

        competition.active = false;
        Ok(competition)
    }

    pub fn active(&self) -> Option<Competition> {
        self.active.lock().clone()
    }
}

/// Picks the item with the strictly highest like count.
/// Ties go to the item seen first, and songs without likes never win.
pub fn select_winner<'a, I>(candidates: I) -> Option<&'a QueueItem>
where
    I: IntoIterator<Item = &'a QueueItem>,
{
    candidates
        .into_iter()
        .fold(None, |best: Option<&QueueItem>, item| match best {
            Some(best) if item.likes <= best.likes => Some(best),
            _ if item.likes == 0 => best,
            _ => Some(item),
        })
}
