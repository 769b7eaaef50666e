//! Board state shared with bots and the simulation step.
//!
//! [`MatchState`] is what every bot receives each turn, so its JSON shape (camelCase keys,
//! flattened string grid) is part of the wire protocol.

use anyhow::ensure;
use serde::{Deserialize, Serialize};

use crate::participant::ParticipantId;

/// Symbol of an empty cell.
pub const EMPTY_CELL: char = '.';

/// Energy both players start a match with.
pub const STARTING_ENERGY: u32 = 1;

/// Per-side status tracked by the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatus {
    pub energy: u32,
    /// Index of the spawn cell in the flattened grid.
    pub spawn: usize,
    #[serde(default)]
    pub spawn_disabled: bool,
}

/// The full state of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchState {
    pub rows: usize,
    pub cols: usize,
    pub p1: PlayerStatus,
    pub p2: PlayerStatus,
    /// Row-major cells, `rows * cols` long.
    pub grid: String,
    pub max_turns: u32,
    pub turns_elapsed: u32,
    #[serde(default)]
    pub winner: Option<ParticipantId>,
    pub game_id: String,
}

impl MatchState {
    /// Fresh square board: empty grid, both players at starting energy on their default spawn.
    pub fn initial(board_size: usize, max_turns: u32) -> MatchState {
        let cells = board_size * board_size;
        MatchState {
            rows: board_size,
            cols: board_size,
            p1: PlayerStatus {
                energy: STARTING_ENERGY,
                spawn: board_size + 1,
                spawn_disabled: false,
            },
            p2: PlayerStatus {
                energy: STARTING_ENERGY,
                spawn: (board_size * (board_size - 1)).saturating_sub(2),
                spawn_disabled: false,
            },
            grid: std::iter::repeat(EMPTY_CELL).take(cells).collect(),
            max_turns,
            turns_elapsed: 0,
            winner: None,
            game_id: uuid::Uuid::new_v4().simple().to_string(),
        }
    }

    pub fn player(&self, id: ParticipantId) -> &PlayerStatus {
        match id {
            ParticipantId::P1 => &self.p1,
            ParticipantId::P2 => &self.p2,
        }
    }

    pub fn player_mut(&mut self, id: ParticipantId) -> &mut PlayerStatus {
        match id {
            ParticipantId::P1 => &mut self.p1,
            ParticipantId::P2 => &mut self.p2,
        }
    }

    /// Number of cells holding `symbol`.
    pub fn count(&self, symbol: char) -> usize {
        self.grid.chars().filter(|&c| c == symbol).count()
    }

    /// Checks the grid still has exactly `rows * cols` cells.
    pub fn check_dimensions(&self) -> anyhow::Result<()> {
        let cells = self.grid.chars().count();
        ensure!(
            cells == self.rows * self.cols,
            "grid has {cells} cells, expected {}x{}",
            self.rows,
            self.cols
        );
        Ok(())
    }
}

/// One participant's moves for a turn. An empty batch means "no action".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedMoveSet<M> {
    pub player: ParticipantId,
    pub moves: Vec<M>,
}

impl<M> SubmittedMoveSet<M> {
    pub fn new(player: ParticipantId, moves: Vec<M>) -> Self {
        SubmittedMoveSet { player, moves }
    }

    pub fn empty(player: ParticipantId) -> Self {
        SubmittedMoveSet {
            player,
            moves: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}
