use std::{sync::Arc, time::Duration};

use log::{debug, error};
use parking_lot::Mutex;
use tokio::{sync::watch, task::JoinHandle, time::sleep};

use crate::RoomSession;

/// The moves the bot cycles through while dancing
pub const DANCE_EMOTES: [&str; 9] = [
    "dance-tiktok2",
    "dance-tiktok8",
    "dance-tiktok10",
    "dance-blackpink",
    "dance-weird",
    "dance-pinguin",
    "dance-anime",
    "dance-russian",
    "dance-shoppingcart",
];

struct Dancer {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Runs the dance loop in the background.
///
/// Stopping signals the loop and waits for it to finish, so no emote is sent after
/// [DanceLoop::stop] returns.
#[derive(Default)]
pub struct DanceLoop {
    dancer: Mutex<Option<Dancer>>,
}

impl DanceLoop {
    pub fn is_dancing(&self) -> bool {
        self.dancer
            .lock()
            .as_ref()
            .is_some_and(|d| !d.handle.is_finished())
    }

    /// Starts dancing, returning false if already dancing
    pub fn start(&self, session: Arc<dyn RoomSession>, interval: Duration) -> bool {
        let mut dancer = self.dancer.lock();

        if dancer.as_ref().is_some_and(|d| !d.handle.is_finished()) {
            return false;
        }

        let (stop, stopped) = watch::channel(false);
        let handle = tokio::spawn(dance(session, interval, stopped));

        *dancer = Some(Dancer { stop, handle });
        true
    }

    /// Stops dancing, returning false if the bot wasn't dancing
    pub async fn stop(&self) -> bool {
        let dancer = self.dancer.lock().take();

        let Some(dancer) = dancer else {
            return false;
        };

        let _ = dancer.stop.send(true);

        if let Err(e) = dancer.handle.await {
            error!("Dance loop ended abnormally: {}", e);
        }

        true
    }
}

impl Drop for DanceLoop {
    fn drop(&mut self) {
        if let Some(dancer) = self.dancer.lock().take() {
            dancer.handle.abort();
        }
    }
}

async fn dance(session: Arc<dyn RoomSession>, interval: Duration, mut stopped: watch::Receiver<bool>) {
    debug!("Dance loop started");

    for emote in DANCE_EMOTES.iter().cycle() {
        if let Err(e) = session.send_emote(emote).await {
            error!("Error in dance loop: {}", e);
        }

        tokio::select! {
            _ = sleep(interval) => {}
            _ = stopped.changed() => break,
        }
    }

    debug!("Dance loop stopped");
}
