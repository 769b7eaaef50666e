//! # Bot Arena
//!
//! A Rust crate for running head-to-head matches between two bots hosted behind HTTP endpoints.
//!
//! It provides:
//! - Match execution, turn by turn, with both bots polled concurrently (`MatchRunner`)
//! - Disqualification of bots answering with errors, tolerance of bots that time out
//! - A tie-break by board occupancy when the turn limit is reached
//! - Reuse of HTTP clients across turns and matches (`ConnectionPool`)
//! - Concurrent execution of many matches (`Arena`)
//!
//! The game rules themselves are not part of this crate: they are provided by implementing
//! the [`Simulation`](crate::interface::Simulation) trait. Where views and results go
//! (spectators, database) is provided by implementing [`ResultSink`](crate::interface::ResultSink).
//!
//! # Documentation Overview
//!
//! - For running matches, see the [`arena`] module.
//! - For what happens during a match, see the [`match_runner`] module.
//! - For limits (board size, turn limit, timeouts), see [`MatchSettingsBuilder`](crate::settings::MatchSettingsBuilder);
//!   for behavior flags, see [`Configuration`](crate::configuration::Configuration).
//! - For the protocol spoken with bots, see the [`fetch`] module.
//!
//! # Bot Protocol
//!
//! Every turn, each bot receives an HTTP POST with a JSON body:
//!
//! ```json
//! { "player": "p1", "state": { "rows": 10, "cols": 10, "grid": "....", "p1": { ... }, ... } }
//! ```
//!
//! and must answer with a JSON array of moves, whose schema is defined by the simulation.
//!
//! - An empty array is a valid answer: no moves this turn.
//! - No answer within the request timeout (3 s by default): no moves this turn.
//! - Any non-2xx status or a body that is not a valid move array: the bot is disqualified and
//!   its opponent wins, unless both bots fail during the same turn.
//!
//! A turn lasts at least the minimum turn duration (200 ms by default). After the turn limit
//! (200 by default), the bot holding more cells wins; equal counts are a draw.

pub use anyhow;

pub mod arena;
pub mod configuration;
pub mod connection_pool;
pub mod error;
pub mod fetch;
pub mod interface;
mod logger;
pub mod match_runner;
pub mod outcome;
pub mod participant;
pub mod policy;
pub mod resolution;
pub mod settings;
pub mod sink;
pub mod state;
pub mod view;

pub use logger::init_logger;

/// Commonly used types and traits for quick access.
///
/// Import this prelude to get started easily:
/// ```rust
/// use bot_arena::prelude::*;
/// ```
pub mod prelude {
    pub use crate::arena::Arena;
    pub use crate::configuration::Configuration;
    pub use crate::error::MatchError;
    pub use crate::interface::{ResultSink, Simulation, SimulationFactory};
    pub use crate::outcome::MatchOutcome;
    pub use crate::participant::{Bot, Pairing, ParticipantId};
    pub use crate::settings::MatchSettingsBuilder;
    pub use crate::sink::TracingSink;
    pub use crate::state::{MatchState, SubmittedMoveSet};
    pub use crate::view::MatchView;
}
