//! The room bot: reacts to chat, tips, joins, and private messages, and drives the
//! cube ledger and music search on behalf of the room.

mod commands;
mod controller;
mod dance;
mod error;
mod registry;
mod session;
mod users;
mod util;

#[cfg(test)]
mod mock;

pub use commands::*;
pub use controller::*;
pub use dance::*;
pub use error::*;
pub use registry::*;
pub use session::*;
pub use users::*;
