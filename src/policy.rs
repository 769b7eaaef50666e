//! Disqualification rules applied after every turn.
//!
//! A bot that answers a turn with an error (bad status, unreadable move list, unreachable
//! host) is disqualified and its opponent wins on the spot. A timeout is not an error: the bot
//! simply plays no moves that turn. When both bots error in the same turn, neither is
//! disqualified and the match goes on.

use std::fmt::Write;

use crate::{fetch::FetchOutcome, participant::ParticipantId};

/// Result of checking one turn's outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// False as soon as one of the bots errored.
    pub valid: bool,
    /// Set when exactly one bot errored: the other one wins.
    pub forced_winner: Option<ParticipantId>,
}

/// Applies the disqualification rules to a turn. The order of `outcomes` does not matter.
pub fn resolve<M>(outcomes: &[FetchOutcome<M>; 2]) -> Verdict {
    let offenders = outcomes
        .iter()
        .filter(|o| o.is_error())
        .map(FetchOutcome::player)
        .collect::<Vec<_>>();
    match offenders.as_slice() {
        [] => Verdict {
            valid: true,
            forced_winner: None,
        },
        [offender] => Verdict {
            valid: false,
            forced_winner: Some(offender.opponent()),
        },
        _ => Verdict {
            valid: false,
            forced_winner: None,
        },
    }
}

/// Message shown to spectators describing which bots errored and why.
///
/// `None` when no bot errored this turn.
pub fn alert<M>(outcomes: &[FetchOutcome<M>; 2]) -> Option<String> {
    let mut alert = String::new();
    for outcome in outcomes {
        if let Some(fault) = outcome.fault() {
            let _ = writeln!(alert, "{} returned an error:", outcome.player());
            let _ = writeln!(alert, "{fault}");
        }
    }
    (!alert.is_empty()).then_some(alert)
}

#[cfg(test)]
mod policy_tests {
    use super::*;
    use crate::error::OpponentFault;

    use ParticipantId::{P1, P2};

    fn ok(p: ParticipantId) -> FetchOutcome<()> {
        FetchOutcome::ok(p, vec![])
    }

    fn err(p: ParticipantId) -> FetchOutcome<()> {
        FetchOutcome::error(p, OpponentFault::Status(500))
    }

    #[test]
    fn clean_turn_is_valid() {
        let verdict = resolve(&[ok(P1), ok(P2)]);
        assert!(verdict.valid);
        assert_eq!(verdict.forced_winner, None);
        assert_eq!(alert(&[ok(P1), ok(P2)]), None);
    }

    #[test]
    fn timeouts_do_not_disqualify() {
        let outcomes = [
            FetchOutcome::<()>::timeout(P1),
            FetchOutcome::<()>::timeout(P2),
        ];
        assert_eq!(
            resolve(&outcomes),
            Verdict {
                valid: true,
                forced_winner: None
            }
        );
        assert_eq!(alert(&outcomes), None);
    }

    #[test]
    fn single_error_forfeits_in_any_order() {
        assert_eq!(resolve(&[err(P1), ok(P2)]).forced_winner, Some(P2));
        assert_eq!(resolve(&[ok(P2), err(P1)]).forced_winner, Some(P2));
        assert_eq!(
            resolve(&[FetchOutcome::timeout(P1), err(P2)]).forced_winner,
            Some(P1)
        );
        assert!(!resolve(&[ok(P1), err(P2)]).valid);
    }

    #[test]
    fn double_error_has_no_winner() {
        let verdict = resolve(&[err(P1), err(P2)]);
        assert!(!verdict.valid);
        assert_eq!(verdict.forced_winner, None);
    }

    #[test]
    fn alert_names_each_offender() {
        let outcomes = [
            FetchOutcome::<()>::error(P1, OpponentFault::Malformed("expected `[`".into())),
            err(P2),
        ];
        let alert = alert(&outcomes).unwrap();
        assert!(alert.contains("p1 returned an error:\nmalformed move list: expected `[`\n"));
        assert!(alert.contains("p2 returned an error:\nbot answered with status 500\n"));
    }
}
