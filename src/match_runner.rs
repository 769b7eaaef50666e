//! Turn loop of a single match.
//!
//! A [`MatchRunner`] goes through four phases:
//!
//! - **Initializing**: the initial board is built and the simulation runs once with no moves
//!   so that both sides spawn.
//! - **Running**: every turn both bots are asked for their moves concurrently, the moves are
//!   simulated, the disqualification rules are applied and the new state is published. A turn
//!   never takes less than the configured minimum duration.
//! - **Finalizing**: a match that reached its turn limit without a winner is decided by cell
//!   count, the final state is published and the outcome persisted.
//! - **Done**.
//!
//! Bot misbehaviour never aborts a match. A failing simulation or sink does, immediately,
//! and nothing is persisted.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use serde::de::IgnoredAny;
use tracing::{debug, info, instrument, trace, warn};

use crate::{
    configuration::Configuration,
    connection_pool::ConnectionPool,
    error::MatchError,
    fetch::{fetch_moves, FetchOutcome},
    interface::{ResultSink, Simulation},
    outcome::MatchOutcome,
    participant::{Pairing, Participant, ParticipantId},
    policy,
    resolution::resolve_by_count,
    settings::MatchSettings,
    state::{MatchState, SubmittedMoveSet},
    view::MatchView,
};

/// Where a match is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Initializing,
    Running,
    Finalizing,
    Done,
}

/// Drives one match between two bots. Built with [`MatchRunner::new`], consumed by
/// [`MatchRunner::run`].
pub struct MatchRunner<S: Simulation> {
    pool: Arc<ConnectionPool>,
    sink: Arc<dyn ResultSink>,
    settings: MatchSettings,
    config: Configuration,
    participants: [Participant; 2],
    simulation: S,
    state: MatchState,
    turns: u32,
    phase: MatchPhase,
}

impl<S: Simulation> MatchRunner<S> {
    /// Prepares a match between `pairing.p1` and `pairing.p2` on a fresh board.
    ///
    /// # Errors
    /// [`MatchError::Configuration`] if `settings` are unusable. The match never starts.
    pub fn new(
        pool: Arc<ConnectionPool>,
        sink: Arc<dyn ResultSink>,
        settings: MatchSettings,
        config: Configuration,
        pairing: Pairing,
        simulation: S,
    ) -> Result<Self, MatchError> {
        settings.validate()?;
        let state = MatchState::initial(settings.board_size, settings.turn_limit);

        Ok(MatchRunner {
            pool,
            sink,
            participants: [
                Participant::new(ParticipantId::P1, pairing.p1),
                Participant::new(ParticipantId::P2, pairing.p2),
            ],
            settings,
            config,
            simulation,
            state,
            turns: 0,
            phase: MatchPhase::Initializing,
        })
    }

    /// Unique identifier of this match (also the state's `gameId`).
    pub fn match_id(&self) -> &str {
        &self.state.game_id
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Plays the match to its end.
    ///
    /// # Errors
    /// [`MatchError::Simulation`] or [`MatchError::Sink`] if a collaborator failed. The match
    /// is abandoned at that point and nothing is persisted.
    #[instrument(skip_all, fields(match_id = %self.state.game_id, p1 = %self.participants[0].name, p2 = %self.participants[1].name))]
    pub async fn run(mut self) -> Result<MatchOutcome, MatchError> {
        self.initialize()?;
        while self.phase == MatchPhase::Running {
            self.play_turn().await?;
        }
        self.finalize().await
    }

    fn initialize(&mut self) -> Result<(), MatchError> {
        let moves = ParticipantId::BOTH.map(SubmittedMoveSet::empty);
        self.state = self
            .advance(moves)
            .context("applying initial spawns")
            .map_err(MatchError::Simulation)?;
        self.state.turns_elapsed = 0;
        if let Some(winner) = self.state.winner {
            info!(%winner, "match decided by the initial spawns");
            self.enter(MatchPhase::Finalizing);
        } else {
            self.enter(MatchPhase::Running);
        }
        Ok(())
    }

    async fn play_turn(&mut self) -> Result<(), MatchError> {
        let turn = self.turns + 1;
        let floor = tokio::time::sleep(self.settings.min_turn_duration);

        let [p1, p2] = &self.participants;
        let (p1_outcome, p2_outcome) = tokio::join!(
            fetch_moves::<S::Move>(&self.pool, p1, &self.state, self.settings.request_timeout),
            fetch_moves::<S::Move>(&self.pool, p2, &self.state, self.settings.request_timeout),
        );
        let outcomes = [p1_outcome, p2_outcome];
        trace!(turn, p1 = ?outcomes[0].status, p2 = ?outcomes[1].status, "moves fetched");

        let verdict = policy::resolve(&outcomes);
        let alert = policy::alert(&outcomes);

        let moves = outcomes.map(|o: FetchOutcome<S::Move>| o.moves);
        let mut next = self
            .advance(moves)
            .with_context(|| format!("advancing turn {turn}"))
            .map_err(MatchError::Simulation)?;
        next.turns_elapsed = self.turns;
        // a decided match stays decided
        next.winner = next.winner.or(self.state.winner);

        if let Some(winner) = verdict.forced_winner {
            info!(turn, %winner, "opponent disqualified");
            next.winner = Some(winner);
        }
        self.state = next;

        if let Some(alert) = &alert {
            warn!(turn, alert = alert.trim_end(), "invalid turn");
        }
        publish(
            self.sink.as_ref(),
            &self.participants,
            &self.state,
            alert.as_deref(),
        )
        .await?;

        floor.await;
        self.turns = turn;
        self.state.turns_elapsed = turn;
        debug!(turn, winner = ?self.state.winner, "turn over");

        if self.state.winner.is_some() || self.turns >= self.settings.turn_limit {
            self.enter(MatchPhase::Finalizing);
        }
        Ok(())
    }

    async fn finalize(mut self) -> Result<MatchOutcome, MatchError> {
        if self.state.winner.is_none() {
            self.state.winner = resolve_by_count(
                &self.state.grid,
                ParticipantId::P1.symbol(),
                ParticipantId::P2.symbol(),
            );
            debug!(
                p1_cells = self.state.count(ParticipantId::P1.symbol()),
                p2_cells = self.state.count(ParticipantId::P2.symbol()),
                winner = ?self.state.winner,
                "turn limit reached, decided by cell count"
            );
        }

        publish(self.sink.as_ref(), &self.participants, &self.state, None).await?;

        let [p1, p2] = self.participants.clone();
        let outcome = MatchOutcome {
            match_id: self.state.game_id.clone(),
            p1,
            p2,
            winner: self.state.winner,
            turns_elapsed: self.turns,
            final_state: self.state.clone(),
        };
        self.sink
            .persist(&outcome)
            .await
            .map_err(MatchError::Sink)?;

        if self.config.notify_final_state {
            notify_final_state(
                &self.pool,
                &self.participants,
                &self.state,
                self.settings.request_timeout,
            )
            .await;
        }

        self.enter(MatchPhase::Done);
        info!(winner = ?outcome.winner, turns = outcome.turns_elapsed, "match over");
        Ok(outcome)
    }

    fn advance(&mut self, moves: [SubmittedMoveSet<S::Move>; 2]) -> anyhow::Result<MatchState> {
        let next = self.simulation.advance(&self.state, moves)?;
        next.check_dimensions()?;
        Ok(next)
    }

    fn enter(&mut self, phase: MatchPhase) {
        trace!(from = ?self.phase, to = ?phase, "phase change");
        self.phase = phase;
    }
}

async fn publish(
    sink: &dyn ResultSink,
    participants: &[Participant; 2],
    state: &MatchState,
    alert: Option<&str>,
) -> Result<(), MatchError> {
    let view = MatchView {
        p1_name: &participants[0].name,
        p2_name: &participants[1].name,
        state,
        alert,
    };
    sink.publish(&state.game_id, &view)
        .await
        .map_err(MatchError::Sink)
}

/// Lets both bots see the final board. Their answers do not matter.
async fn notify_final_state(
    pool: &ConnectionPool,
    participants: &[Participant; 2],
    state: &MatchState,
    timeout: Duration,
) {
    let [p1, p2] = participants;
    let (a, b) = tokio::join!(
        fetch_moves::<IgnoredAny>(pool, p1, state, timeout),
        fetch_moves::<IgnoredAny>(pool, p2, state, timeout),
    );
    trace!(p1 = ?a.status, p2 = ?b.status, "final state sent");
}
