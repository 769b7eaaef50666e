use crate::{
    participant::{Participant, ParticipantId},
    state::MatchState,
};

/// Final record of a match that ran to completion.
///
/// A match that failed to run never produces one; see [`MatchError`](crate::error::MatchError).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub match_id: String,
    pub p1: Participant,
    pub p2: Participant,
    /// `None` means the match was a draw.
    pub winner: Option<ParticipantId>,
    pub turns_elapsed: u32,
    pub final_state: MatchState,
}

impl MatchOutcome {
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }

    pub fn participant(&self, id: ParticipantId) -> &Participant {
        match id {
            ParticipantId::P1 => &self.p1,
            ParticipantId::P2 => &self.p2,
        }
    }

    /// The winning bot, if any.
    pub fn winning_participant(&self) -> Option<&Participant> {
        self.winner.map(|id| self.participant(id))
    }
}
