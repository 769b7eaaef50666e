//! Numeric limits of a match.
//!
//! The main entry point is [`MatchSettingsBuilder`], which uses a builder pattern to configure:
//!
//! - **Board**: size of the square board (required)
//! - **Turns**: turn limit and the minimum wall-clock duration of a turn
//! - **Network**: per-request timeout for bots, how long an idle client is kept, and after how
//!   many consecutive failures a bot's client is dropped eagerly
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use bot_arena::settings::MatchSettingsBuilder;
//!
//! let settings = MatchSettingsBuilder::new()
//!     .with_board_size(20)
//!     .with_turn_limit(150)
//!     .with_request_timeout(Duration::from_millis(1500))
//!     .build()
//!     .unwrap();
//! assert_eq!(settings.turn_limit(), 150);
//! ```
//!
//! Settings can also be read from environment variables with [`MatchSettingsBuilder::from_env()`]
//! or from a JSON settings file with [`MatchSettingsBuilder::from_settings_file()`].

use std::{env, path::Path, time::Duration};

use serde::Deserialize;

use crate::error::MatchError;

/// Default number of turns before the match is decided by cell count.
pub const DEFAULT_TURN_LIMIT: u32 = 200;
/// Default floor on the duration of a single turn.
pub const DEFAULT_MIN_TURN_DURATION: Duration = Duration::from_millis(200);
/// Default time a bot has to answer a move request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(3000);
/// Default idle time after which a cached bot client is dropped.
pub const DEFAULT_CLIENT_TTL: Duration = Duration::from_secs(5 * 60);
/// Default number of consecutive failed requests before a bot's client is dropped.
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 3;

/// A builder for [`MatchSettings`].
///
/// Every limit has a default except the board size, which must be provided.
#[derive(Debug, Default, Clone)]
pub struct MatchSettingsBuilder {
    board_size: Option<usize>,
    turn_limit: Option<u32>,
    min_turn_duration: Option<Duration>,
    request_timeout: Option<Duration>,
    client_ttl: Option<Duration>,
    max_consecutive_failures: Option<u32>,
}

/// Shape of a JSON settings file. Every key is optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    board_size: Option<usize>,
    turn_limit: Option<u32>,
    min_turn_duration_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
    client_ttl_secs: Option<u64>,
    max_consecutive_failures: Option<u32>,
}

impl MatchSettingsBuilder {
    /// Creates a builder with every limit at its default and no board size.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder configured from environment variables.
    ///
    /// Read environment variables are:
    /// - `ARENA_BOARD_SIZE` (usize): side of the square board
    /// - `ARENA_TURN_LIMIT` (u32): number of turns before a count decides the match
    /// - `ARENA_MIN_TURN_MS` (u64): minimum duration of a turn in milliseconds
    /// - `ARENA_REQUEST_TIMEOUT_MS` (u64): time a bot has to answer, in milliseconds
    /// - `ARENA_CLIENT_TTL_SECS` (u64): idle time before a cached client is dropped, in seconds
    /// - `ARENA_MAX_CONSECUTIVE_FAILURES` (u32): failed requests before eager eviction (0 disables)
    ///
    /// Unset or unparsable variables keep their default.
    #[must_use]
    pub fn from_env() -> Self {
        fn parse<T: std::str::FromStr>(var: &str) -> Option<T> {
            env::var(var).ok()?.trim().parse().ok()
        }

        MatchSettingsBuilder {
            board_size: parse("ARENA_BOARD_SIZE"),
            turn_limit: parse("ARENA_TURN_LIMIT"),
            min_turn_duration: parse("ARENA_MIN_TURN_MS").map(Duration::from_millis),
            request_timeout: parse("ARENA_REQUEST_TIMEOUT_MS").map(Duration::from_millis),
            client_ttl: parse("ARENA_CLIENT_TTL_SECS").map(Duration::from_secs),
            max_consecutive_failures: parse("ARENA_MAX_CONSECUTIVE_FAILURES"),
        }
    }

    /// Creates a builder from a JSON settings file such as
    /// `{ "boardSize": 20, "turnLimit": 200, "requestTimeoutMs": 3000 }`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Configuration`] if the file cannot be read or is not valid JSON.
    pub fn from_settings_file(path: impl AsRef<Path>) -> Result<Self, MatchError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MatchError::configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        if content.trim().is_empty() {
            return Err(MatchError::configuration(format!(
                "{} is empty",
                path.display()
            )));
        }
        let file: SettingsFile = serde_json::from_str(&content).map_err(|e| {
            MatchError::configuration(format!("cannot parse {}: {e}", path.display()))
        })?;

        Ok(MatchSettingsBuilder {
            board_size: file.board_size,
            turn_limit: file.turn_limit,
            min_turn_duration: file.min_turn_duration_ms.map(Duration::from_millis),
            request_timeout: file.request_timeout_ms.map(Duration::from_millis),
            client_ttl: file.client_ttl_secs.map(Duration::from_secs),
            max_consecutive_failures: file.max_consecutive_failures,
        })
    }

    /// Sets the side of the square board.
    #[must_use]
    pub fn with_board_size(self, size: usize) -> Self {
        Self {
            board_size: Some(size),
            ..self
        }
    }

    /// Sets the number of turns after which the match is decided by cell count.
    #[must_use]
    pub fn with_turn_limit(self, turns: u32) -> Self {
        Self {
            turn_limit: Some(turns),
            ..self
        }
    }

    /// Sets the minimum wall-clock duration of a turn.
    ///
    /// This is a floor used to pace playback for spectators, not a bound on slow bots.
    #[must_use]
    pub fn with_min_turn_duration(self, duration: Duration) -> Self {
        Self {
            min_turn_duration: Some(duration),
            ..self
        }
    }

    /// Sets how long a bot has to answer a move request before the turn counts as a timeout.
    #[must_use]
    pub fn with_request_timeout(self, duration: Duration) -> Self {
        Self {
            request_timeout: Some(duration),
            ..self
        }
    }

    /// Sets how long an unused bot client stays cached.
    #[must_use]
    pub fn with_client_ttl(self, duration: Duration) -> Self {
        Self {
            client_ttl: Some(duration),
            ..self
        }
    }

    /// Sets after how many consecutive timeouts or errors a bot's cached client is dropped.
    ///
    /// `0` disables eager eviction; clients then only expire through the TTL.
    #[must_use]
    pub fn with_max_consecutive_failures(self, failures: u32) -> Self {
        Self {
            max_consecutive_failures: Some(failures),
            ..self
        }
    }

    /// Consumes the builder and returns validated [`MatchSettings`].
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Configuration`] when the board size is missing or any limit is
    /// unusable (board smaller than 2, zero turn limit, zero request timeout or TTL).
    pub fn build(self) -> Result<MatchSettings, MatchError> {
        let board_size = self
            .board_size
            .ok_or_else(|| MatchError::configuration("board size is not set"))?;

        let settings = MatchSettings {
            board_size,
            turn_limit: self.turn_limit.unwrap_or(DEFAULT_TURN_LIMIT),
            min_turn_duration: self.min_turn_duration.unwrap_or(DEFAULT_MIN_TURN_DURATION),
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            client_ttl: self.client_ttl.unwrap_or(DEFAULT_CLIENT_TTL),
            max_consecutive_failures: match self
                .max_consecutive_failures
                .unwrap_or(DEFAULT_MAX_CONSECUTIVE_FAILURES)
            {
                0 => None,
                n => Some(n),
            },
        };
        settings.validate()?;
        Ok(settings)
    }
}

/// Obtained using [`MatchSettingsBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSettings {
    pub(crate) board_size: usize,
    pub(crate) turn_limit: u32,
    pub(crate) min_turn_duration: Duration,
    pub(crate) request_timeout: Duration,
    pub(crate) client_ttl: Duration,
    pub(crate) max_consecutive_failures: Option<u32>,
}

impl MatchSettings {
    /// create a MatchSettingsBuilder
    pub fn builder() -> MatchSettingsBuilder {
        MatchSettingsBuilder::new()
    }

    pub fn board_size(&self) -> usize {
        self.board_size
    }

    pub fn turn_limit(&self) -> u32 {
        self.turn_limit
    }

    pub fn min_turn_duration(&self) -> Duration {
        self.min_turn_duration
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn client_ttl(&self) -> Duration {
        self.client_ttl
    }

    pub fn max_consecutive_failures(&self) -> Option<u32> {
        self.max_consecutive_failures
    }

    pub(crate) fn validate(&self) -> Result<(), MatchError> {
        if self.board_size < 2 {
            return Err(MatchError::configuration(format!(
                "board size must be at least 2, got {}",
                self.board_size
            )));
        }
        if self.turn_limit == 0 {
            return Err(MatchError::configuration("turn limit must be at least 1"));
        }
        if self.request_timeout.is_zero() {
            return Err(MatchError::configuration("request timeout must not be zero"));
        }
        if self.client_ttl.is_zero() {
            return Err(MatchError::configuration("client ttl must not be zero"));
        }
        Ok(())
    }
}
