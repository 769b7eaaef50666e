//! One move request to one bot, classified.
//!
//! Bots are plain HTTP endpoints. Each turn they receive a POST with a JSON [`MoveRequest`]
//! and must answer with a JSON array of moves before the request timeout. Whatever happens on
//! the wire ends up as a [`FetchOutcome`]: nothing here returns an error to the caller.

use std::{borrow::Cow, time::Duration};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use crate::{
    connection_pool::ConnectionPool,
    error::OpponentFault,
    participant::{Participant, ParticipantId},
    state::{MatchState, SubmittedMoveSet},
};

/// Body of the request sent to a bot each turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRequest<'a> {
    /// The side the receiving bot plays.
    pub player: ParticipantId,
    pub state: Cow<'a, MatchState>,
}

/// How a bot's answer for a turn was classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// The bot answered with a valid move list (possibly empty).
    Ok,
    /// The bot did not answer in time. Not a disqualification.
    Timeout,
    /// The bot answered with a failure or garbage, or could not be reached.
    Error(OpponentFault),
}

/// A classified answer together with the moves it contributes to the turn.
///
/// The moves are always empty unless the status is [`FetchStatus::Ok`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome<M> {
    pub status: FetchStatus,
    pub moves: SubmittedMoveSet<M>,
}

impl<M> FetchOutcome<M> {
    pub fn ok(player: ParticipantId, moves: Vec<M>) -> Self {
        FetchOutcome {
            status: FetchStatus::Ok,
            moves: SubmittedMoveSet::new(player, moves),
        }
    }

    pub fn timeout(player: ParticipantId) -> Self {
        FetchOutcome {
            status: FetchStatus::Timeout,
            moves: SubmittedMoveSet::empty(player),
        }
    }

    pub fn error(player: ParticipantId, fault: OpponentFault) -> Self {
        FetchOutcome {
            status: FetchStatus::Error(fault),
            moves: SubmittedMoveSet::empty(player),
        }
    }

    pub fn player(&self) -> ParticipantId {
        self.moves.player
    }

    pub fn is_ok(&self) -> bool {
        self.status == FetchStatus::Ok
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, FetchStatus::Error(_))
    }

    pub fn fault(&self) -> Option<&OpponentFault> {
        match &self.status {
            FetchStatus::Error(fault) => Some(fault),
            _ => None,
        }
    }
}

enum Failure {
    Timeout,
    Fault(OpponentFault),
}

impl From<reqwest::Error> for Failure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Failure::Timeout
        } else {
            Failure::Fault(OpponentFault::Transport(format!("{:#}", anyhow::Error::new(e))))
        }
    }
}

/// Asks `participant` for its moves given `state`.
///
/// The request goes through the pool's client for the participant's endpoint and is bounded
/// by `timeout`, whatever timeout the pool's clients were built with. The classification is
/// reported back to the pool.
#[instrument(skip_all, fields(player = %participant.id, endpoint = %participant.endpoint))]
pub async fn fetch_moves<M: DeserializeOwned>(
    pool: &ConnectionPool,
    participant: &Participant,
    state: &MatchState,
    timeout: Duration,
) -> FetchOutcome<M> {
    let outcome = match request_moves(pool, participant, state, timeout).await {
        Ok(moves) => {
            trace!(moves = moves.len(), "moves received");
            FetchOutcome::ok(participant.id, moves)
        }
        Err(Failure::Timeout) => {
            debug!("bot timed out, no moves this turn");
            FetchOutcome::timeout(participant.id)
        }
        Err(Failure::Fault(fault)) => {
            warn!(%fault, "bot answered with an error");
            FetchOutcome::error(participant.id, fault)
        }
    };
    pool.record(&participant.endpoint, outcome.is_ok());
    outcome
}

async fn request_moves<M: DeserializeOwned>(
    pool: &ConnectionPool,
    participant: &Participant,
    state: &MatchState,
    timeout: Duration,
) -> Result<Vec<M>, Failure> {
    let client = pool
        .acquire(&participant.endpoint)
        .map_err(|e| Failure::Fault(OpponentFault::NoClient(format!("{e:#}"))))?;

    let request = MoveRequest {
        player: participant.id,
        state: Cow::Borrowed(state),
    };
    let response = client
        .post(&participant.endpoint)
        .timeout(timeout)
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(Failure::Fault(OpponentFault::Status(status.as_u16())));
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| Failure::Fault(OpponentFault::Malformed(e.to_string())))
}
