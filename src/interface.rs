//! Module defining traits that need to be implemented to run matches

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::{
    outcome::MatchOutcome,
    state::{MatchState, SubmittedMoveSet},
    view::MatchView,
};

/// The game rules: turns a state and both sides' moves into the next state.
pub trait Simulation {
    /// A single move, as found in the JSON array a bot answers with.
    type Move: DeserializeOwned + Send + 'static;

    /// Computes the state after one turn.
    ///
    /// Called once with two empty move sets before the first turn, to apply initial spawns.
    /// The returned grid must keep `rows * cols` cells. The simulation may set
    /// [`MatchState::winner`] when a side has been wiped out.
    ///
    /// # Error
    /// Any error aborts the match.
    fn advance(
        &mut self,
        state: &MatchState,
        moves: [SubmittedMoveSet<Self::Move>; 2],
    ) -> anyhow::Result<MatchState>;
}

/// What will be given to the arena to allow it to create one simulation per match
pub trait SimulationFactory<S: Simulation> {
    /// Returns a fresh simulation
    fn new_simulation(&self) -> S;
}

/// Where match progress and results go: spectators and storage.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Called after every turn and once more when the match is decided.
    ///
    /// # Error
    /// Any error aborts the match.
    async fn publish(&self, match_id: &str, view: &MatchView<'_>) -> anyhow::Result<()>;

    /// Called exactly once per match that ran to completion.
    ///
    /// # Error
    /// Any error aborts the match; the caller receives no outcome.
    async fn persist(&self, outcome: &MatchOutcome) -> anyhow::Result<()>;
}
