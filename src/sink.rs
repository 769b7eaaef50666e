use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::{interface::ResultSink, outcome::MatchOutcome, view::MatchView};

/// A [`ResultSink`] that only logs, for running matches without spectators or storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

#[async_trait]
impl ResultSink for TracingSink {
    async fn publish(&self, match_id: &str, view: &MatchView<'_>) -> anyhow::Result<()> {
        if let Some(alert) = view.alert {
            warn!(match_id, alert, "turn alert");
        }
        debug!(
            match_id,
            turn = view.state.turns_elapsed,
            p1_energy = view.state.p1.energy,
            p2_energy = view.state.p2.energy,
            grid = %view.state.grid,
            "state published"
        );
        Ok(())
    }

    async fn persist(&self, outcome: &MatchOutcome) -> anyhow::Result<()> {
        info!(
            match_id = %outcome.match_id,
            p1 = %outcome.p1.name,
            p2 = %outcome.p2.name,
            winner = outcome.winning_participant().map(|p| p.name.as_str()).unwrap_or("draw"),
            turns = outcome.turns_elapsed,
            "match result"
        );
        Ok(())
    }
}
