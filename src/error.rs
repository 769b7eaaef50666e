//! Error taxonomy for matches.
//!
//! Faults caused by a single opponent ([`OpponentFault`]) are contained inside the move fetch
//! and never abort a match. Everything in [`MatchError`] is fatal: the match stops, nothing is
//! persisted, and the caller receives the error instead of a [`MatchOutcome`](crate::outcome::MatchOutcome).

use thiserror::Error;

/// A fatal failure that prevented a match from producing a result.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Missing or invalid match settings. The match never started.
    #[error("invalid match configuration: {0}")]
    Configuration(String),

    /// The external simulation step failed or returned an inconsistent state.
    #[error("simulation step failed: {0:#}")]
    Simulation(anyhow::Error),

    /// The result/broadcast sink failed to publish or persist.
    #[error("result sink failed: {0:#}")]
    Sink(anyhow::Error),
}

impl MatchError {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        MatchError::Configuration(msg.into())
    }
}

/// Why an opponent's response was rejected for a turn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpponentFault {
    /// The bot answered with a non-success HTTP status.
    #[error("bot answered with status {0}")]
    Status(u16),

    /// The body could not be read or is not a valid move list.
    #[error("malformed move list: {0}")]
    Malformed(String),

    /// The request failed before any response was received (refused, reset, DNS...).
    #[error("request failed: {0}")]
    Transport(String),

    /// No HTTP client could be built locally for the bot's endpoint.
    #[error("no http client for this bot: {0}")]
    NoClient(String),
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn fatal_errors_keep_their_context_chain() {
        let inner = anyhow::anyhow!("grid too short").context("advancing turn 3");
        let err = MatchError::Simulation(inner);
        assert_eq!(
            err.to_string(),
            "simulation step failed: advancing turn 3: grid too short"
        );
    }

    #[test]
    fn opponent_faults_are_readable() {
        assert_eq!(
            OpponentFault::Status(500).to_string(),
            "bot answered with status 500"
        );
        assert!(OpponentFault::Malformed("expected value".into())
            .to_string()
            .contains("expected value"));
        assert!(OpponentFault::NoClient("tls backend".into())
            .to_string()
            .starts_with("no http client"));
    }
}
