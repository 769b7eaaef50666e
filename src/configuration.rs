//! Config for the arena behaviors
//!
//! This module provides configuration options for controlling how the arena runs matches.
//! Numeric limits (board size, timeouts, turn limit) live in [`MatchSettings`](crate::settings::MatchSettings).
//!
//! Configuration can be created programmatically using [`Configuration::new()`] or by reading
//! environment variables using [`Configuration::from_env()`].
//!
//! # Environment Variables
//!
//! The following environment variables can be used to override configuration values. All
//! values are optional, and case-insensitive. Set the value to `"true"` to enable a flag.
//!
//! - `ARENA_LOG`: Enable logging to a file in the current directory (default: `false`)
//! - `ARENA_NOTIFY_FINAL_STATE`: Send the final state to both bots once the match is over (default: `true`)

/// Configuration for arena behaviors.
#[derive(Debug, Clone, Copy)]
pub struct Configuration {
    pub(crate) log: bool,
    pub(crate) notify_final_state: bool,
}

impl Configuration {
    /// Create a new configuration with default parameters.
    ///
    /// By default:
    /// - Logging to file is disabled.
    /// - Both bots are sent the final state after the match is decided.
    pub fn new() -> Self {
        Self {
            log: false,
            notify_final_state: true,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// The following environment variables are recognized:
    /// - `ARENA_LOG`: if set to `"true"`, enables logging to file (default: `false`)
    /// - `ARENA_NOTIFY_FINAL_STATE`: if set to `"true"`, notifies bots of the final state (default: `true`)
    ///
    /// Any other value (including unset) will result in using the default value for each field.
    pub fn from_env() -> Self {
        fn get_env_flag(var: &str, default: bool) -> bool {
            match std::env::var(var) {
                Ok(val) => val.eq_ignore_ascii_case("true"),
                Err(_) => default,
            }
        }

        Self {
            log: get_env_flag("ARENA_LOG", false),
            notify_final_state: get_env_flag("ARENA_NOTIFY_FINAL_STATE", true),
        }
    }

    /// Enable or disable logging to file.
    pub fn with_log(mut self, value: bool) -> Self {
        self.log = value;
        self
    }

    /// Enable or disable the final-state notification.
    ///
    /// When enabled, both bots receive one extra move request carrying the final state once
    /// the match is decided. Their answers are ignored.
    pub fn with_notify_final_state(mut self, value: bool) -> Self {
        self.notify_final_state = value;
        self
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}
