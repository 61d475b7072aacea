//! Room state for cubebeat: the cube ledger, the song queue, competitions, roles and configuration.
//!
//! Nothing in here talks to the network. The search adapter and the bot controller build on top of it.

mod competition;
mod config;
mod ledger;
mod playback;
mod roles;
mod song;
mod tips;

pub use competition::*;
pub use config::*;
pub use ledger::*;
pub use playback::*;
pub use roles::*;
pub use song::*;
pub use tips::*;
