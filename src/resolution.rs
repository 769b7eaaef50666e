use std::cmp::Ordering;

use crate::participant::ParticipantId;

/// Decides a match that reached its turn limit by counting each side's cells.
///
/// The side holding strictly more cells wins. Equal counts, including an empty board, are a
/// draw (`None`).
pub fn resolve_by_count(grid: &str, p1_symbol: char, p2_symbol: char) -> Option<ParticipantId> {
    let (p1, p2) = grid.chars().fold((0usize, 0usize), |(p1, p2), cell| {
        if cell == p1_symbol {
            (p1 + 1, p2)
        } else if cell == p2_symbol {
            (p1, p2 + 1)
        } else {
            (p1, p2)
        }
    });

    match p1.cmp(&p2) {
        Ordering::Greater => Some(ParticipantId::P1),
        Ordering::Less => Some(ParticipantId::P2),
        Ordering::Equal => None,
    }
}
