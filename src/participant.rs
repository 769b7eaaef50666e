use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Which side of the board a participant plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantId {
    /// First player, cell symbol `'1'`.
    P1,
    /// Second player, cell symbol `'2'`.
    P2,
}

impl ParticipantId {
    /// Both sides, in board order.
    pub const BOTH: [ParticipantId; 2] = [ParticipantId::P1, ParticipantId::P2];

    /// The other side.
    pub fn opponent(self) -> ParticipantId {
        match self {
            ParticipantId::P1 => ParticipantId::P2,
            ParticipantId::P2 => ParticipantId::P1,
        }
    }

    /// Symbol used for this side's cells in [`MatchState::grid`](crate::state::MatchState::grid).
    pub fn symbol(self) -> char {
        match self {
            ParticipantId::P1 => '1',
            ParticipantId::P2 => '2',
        }
    }

    /// Wire name (`"p1"` or `"p2"`).
    pub fn as_str(self) -> &'static str {
        match self {
            ParticipantId::P1 => "p1",
            ParticipantId::P2 => "p2",
        }
    }
}

impl Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered bot: a display name and the URL its moves are requested from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bot {
    pub name: String,
    pub url: String,
}

impl Bot {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Bot {
        Bot {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A bot seated on one side of a match. Immutable for the match's duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub endpoint: String,
}

impl Participant {
    pub fn new(id: ParticipantId, bot: Bot) -> Participant {
        Participant {
            id,
            name: bot.name,
            endpoint: bot.url,
        }
    }
}

/// Two bots scheduled to play each other, `p1` first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pub p1: Bot,
    pub p2: Bot,
}

impl Pairing {
    pub fn new(p1: Bot, p2: Bot) -> Pairing {
        Pairing { p1, p2 }
    }
}

impl Display for Pairing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} VS {}]", self.p1.name, self.p2.name)
    }
}
