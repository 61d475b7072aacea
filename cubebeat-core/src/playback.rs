use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use log::debug;
use parking_lot::Mutex;
use thiserror::Error;

use crate::SongRecord;

/// Increases every time playback advances. A scheduled advance that captured an
/// older generation is stale and must not move the queue.
pub type Generation = u64;

/// A song request waiting in, or playing from, the queue
#[derive(Debug, Clone)]
pub struct QueueItem {
    pub song: SongRecord,
    pub requested_by: String,
    pub likes: u32,
    pub enqueued_at: DateTime<Utc>,
    pub cubes_spent: u64,
}

impl QueueItem {
    pub fn new(song: SongRecord, requested_by: &str, cubes_spent: u64) -> Self {
        Self {
            song,
            requested_by: requested_by.to_string(),
            likes: 0,
            enqueued_at: Utc::now(),
            cubes_spent,
        }
    }
}

/// The outcome of moving playback forward
#[derive(Debug, Clone)]
pub enum Advance {
    /// A new song started playing
    Playing {
        item: QueueItem,
        generation: Generation,
    },
    /// The queue ran dry and nothing is playing
    Empty { generation: Generation },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("The queue is full ({0} songs)")]
    QueueFull(usize),
}

/// The queue and the currently playing song of a room.
///
/// Every mutation happens under one lock, so chat commands and the advance timer
/// can never observe a half-moved queue.
pub struct Playback {
    max_queue_size: usize,
    state: Mutex<PlaybackState>,
}

#[derive(Debug, Default)]
struct PlaybackState {
    queue: VecDeque<QueueItem>,
    current: Option<QueueItem>,
    generation: Generation,
}

impl PlaybackState {
    fn advance(&mut self) -> Advance {
        self.generation += 1;
        let generation = self.generation;

        match self.queue.pop_front() {
            Some(item) => {
                self.current = Some(item.clone());
                Advance::Playing { item, generation }
            }
            None => {
                self.current = None;
                Advance::Empty { generation }
            }
        }
    }
}

impl Playback {
    pub fn new(max_queue_size: usize) -> Self {
        Self {
            max_queue_size,
            state: Default::default(),
        }
    }

    /// Fails if another song would not fit in the queue
    pub fn ensure_capacity(&self) -> Result<(), PlaybackError> {
        let state = self.state.lock();

        if state.queue.len() >= self.max_queue_size {
            return Err(PlaybackError::QueueFull(self.max_queue_size));
        }

        Ok(())
    }

    /// Appends an item to the tail of the queue.
    /// If nothing is playing, playback advances right away and the advance is returned.
    pub fn enqueue(&self, item: QueueItem) -> Result<Option<Advance>, PlaybackError> {
        let mut state = self.state.lock();

        if state.queue.len() >= self.max_queue_size {
            return Err(PlaybackError::QueueFull(self.max_queue_size));
        }

        debug!("Queued {} for {}", item.song.title, item.requested_by);
        state.queue.push_back(item);

        if state.current.is_none() {
            return Ok(Some(state.advance()));
        }

        Ok(None)
    }

    /// Moves the head of the queue into the current slot unconditionally
    pub fn advance(&self) -> Advance {
        self.state.lock().advance()
    }

    /// Advances only if no other advance happened since `generation` was handed out.
    pub fn advance_from(&self, generation: Generation) -> Option<Advance> {
        let mut state = self.state.lock();

        if state.generation != generation {
            debug!(
                "Ignoring stale advance (generation {} is now {})",
                generation, state.generation
            );
            return None;
        }

        Some(state.advance())
    }

    /// Adds a like to the playing song, returning it with its new like count.
    pub fn like_current(&self) -> Option<QueueItem> {
        let mut state = self.state.lock();
        let current = state.current.as_mut()?;
        current.likes += 1;

        Some(current.clone())
    }

    pub fn current(&self) -> Option<QueueItem> {
        self.state.lock().current.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().current.is_some()
    }

    /// The songs waiting to be played, in order
    pub fn upcoming(&self) -> Vec<QueueItem> {
        self.state.lock().queue.iter().cloned().collect()
    }

    /// The playing song followed by everything waiting
    pub fn resident(&self) -> Vec<QueueItem> {
        let state = self.state.lock();

        state
            .current
            .iter()
            .chain(state.queue.iter())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn generation(&self) -> Generation {
        self.state.lock().generation
    }
}
