use serde::Serialize;

use crate::state::MatchState;

/// What spectators receive after every turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView<'a> {
    pub p1_name: &'a str,
    pub p2_name: &'a str,
    pub state: &'a MatchState,
    /// Why a bot errored this turn, if one did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<&'a str>,
}
