//! Process-level entry point for running matches.
//!
//! This module defines the [`Arena`] type, which owns what every match shares:
//!
//! - the [`ConnectionPool`] of HTTP clients to bots, built once and shared by reference
//! - the [`ResultSink`] receiving per-turn views and final outcomes
//! - the [`MatchSettings`] and [`Configuration`] applied to each match
//!
//! A single match is played with [`Arena::play`]. Many matches can be played concurrently
//! with [`Arena::play_all`]; each one runs in its own task and they only share the pool and
//! the sink.
//!
//! # Example
//!
//! ```no_run
//! # use bot_arena::prelude::*;
//! # struct Rules;
//! # impl Simulation for Rules {
//! #     type Move = serde_json::Value;
//! #     fn advance(&mut self, state: &MatchState, _moves: [SubmittedMoveSet<serde_json::Value>; 2]) -> anyhow::Result<MatchState> {
//! #         Ok(state.clone())
//! #     }
//! # }
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = MatchSettingsBuilder::new().with_board_size(20).build()?;
//! let arena = Arena::new(settings, Configuration::from_env(), Arc::new(TracingSink))?;
//!
//! let pairing = Pairing::new(
//!     Bot::new("red", "http://localhost:5001/moves"),
//!     Bot::new("blue", "http://localhost:5002/moves"),
//! );
//! let outcome = arena.play(pairing, Rules).await?;
//! println!("winner: {:?}", outcome.winning_participant().map(|p| &p.name));
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{info, instrument, trace, warn};

use crate::{
    configuration::Configuration,
    connection_pool::ConnectionPool,
    error::MatchError,
    interface::{ResultSink, Simulation, SimulationFactory},
    logger::init_logger,
    match_runner::MatchRunner,
    outcome::MatchOutcome,
    participant::Pairing,
    settings::MatchSettings,
};

/// Runs matches between bots.
pub struct Arena {
    pool: Arc<ConnectionPool>,
    sink: Arc<dyn ResultSink>,
    settings: MatchSettings,
    config: Configuration,
}

impl Arena {
    /// Create an [`Arena`] with its own [`ConnectionPool`].
    ///
    /// # Errors
    /// Returns an error if file logging is enabled and the log file cannot be set up.
    #[instrument(skip_all)]
    pub fn new(
        settings: MatchSettings,
        config: Configuration,
        sink: Arc<dyn ResultSink>,
    ) -> anyhow::Result<Arena> {
        if config.log {
            init_logger(".")?;
        }
        trace!(?config, ?settings);

        Ok(Arena {
            pool: Arc::new(ConnectionPool::new(&settings)),
            sink,
            settings,
            config,
        })
    }

    /// Use `pool` instead of the arena's own, e.g. to share clients between arenas.
    pub fn with_pool(self, pool: Arc<ConnectionPool>) -> Arena {
        Arena { pool, ..self }
    }

    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    /// Plays one match and returns its outcome.
    ///
    /// # Errors
    /// See [`MatchRunner::run`].
    pub async fn play<S: Simulation>(
        &self,
        pairing: Pairing,
        simulation: S,
    ) -> Result<MatchOutcome, MatchError> {
        info!(%pairing, "match starting");
        self.runner(pairing, simulation)?.run().await
    }

    /// Plays every pairing concurrently, each with a fresh simulation from `factory`.
    ///
    /// Results are returned in the order of `pairings`. A failed match does not affect the
    /// others.
    pub async fn play_all<S, F>(
        &self,
        pairings: Vec<Pairing>,
        factory: &F,
    ) -> Vec<(Pairing, Result<MatchOutcome, MatchError>)>
    where
        S: Simulation + Send + 'static,
        F: SimulationFactory<S>,
    {
        let mut results: Vec<Option<Result<MatchOutcome, MatchError>>> =
            pairings.iter().map(|_| None).collect();
        let mut running = JoinSet::new();

        for (index, pairing) in pairings.iter().enumerate() {
            match self.runner(pairing.clone(), factory.new_simulation()) {
                Ok(runner) => {
                    info!(%pairing, "match starting");
                    running.spawn(async move { (index, runner.run().await) });
                }
                Err(e) => results[index] = Some(Err(e)),
            }
        }

        while let Some(joined) = running.join_next().await {
            match joined {
                Ok((index, result)) => {
                    if let Err(e) = &result {
                        warn!(pairing = %pairings[index], error = %e, "match produced no result");
                    }
                    results[index] = Some(result);
                }
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => warn!(error = %e, "match task cancelled"),
            }
        }

        pairings
            .into_iter()
            .zip(results)
            .filter_map(|(pairing, result)| result.map(|r| (pairing, r)))
            .collect()
    }

    fn runner<S: Simulation>(
        &self,
        pairing: Pairing,
        simulation: S,
    ) -> Result<MatchRunner<S>, MatchError> {
        MatchRunner::new(
            self.pool.clone(),
            self.sink.clone(),
            self.settings.clone(),
            self.config,
            pairing,
            simulation,
        )
    }
}
