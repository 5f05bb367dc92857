//! Adjacency violation scoring.
//!
//! A violation is a pair of neighbouring occupied seats whose occupants
//! share a conflict key. Horizontal neighbours (same row, columns `c` and
//! `c + 1`) are always checked; vertical neighbours (same column, rows `r`
//! and `r + 1`) only when [`Adjacency::vertical`] is set.
//!
//! Every function here is pure: evaluating the same matrix twice gives the
//! same result.

use serde::{Deserialize, Serialize};

use crate::models::{SeatMatrix, SeatPosition};
use crate::roster::ConflictKeys;

/// Which seat pairs count as neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Adjacency {
    /// Also treat front/back seats in the same column as neighbours.
    pub vertical: bool,
}

impl Adjacency {
    /// Horizontal neighbours only.
    pub fn horizontal() -> Self {
        Self { vertical: false }
    }

    /// Sets the vertical toggle.
    pub fn with_vertical(mut self, vertical: bool) -> Self {
        self.vertical = vertical;
        self
    }

    /// In-bounds neighbours of `pos` in `matrix`.
    pub fn neighbors(&self, matrix: &SeatMatrix, pos: SeatPosition) -> Vec<SeatPosition> {
        let mut out = Vec::with_capacity(4);
        if pos.column > 0 {
            out.push(SeatPosition::new(pos.row, pos.column - 1));
        }
        if pos.column + 1 < matrix.columns() {
            out.push(SeatPosition::new(pos.row, pos.column + 1));
        }
        if self.vertical {
            if pos.row > 0 {
                out.push(SeatPosition::new(pos.row - 1, pos.column));
            }
            if pos.row + 1 < matrix.rows() {
                out.push(SeatPosition::new(pos.row + 1, pos.column));
            }
        }
        out
    }

    /// Forward neighbours (right, and below when vertical), so that each
    /// pair is visited once.
    pub(crate) fn forward(
        &self,
        matrix: &SeatMatrix,
        pos: SeatPosition,
    ) -> impl Iterator<Item = SeatPosition> {
        let right = (pos.column + 1 < matrix.columns())
            .then(|| SeatPosition::new(pos.row, pos.column + 1));
        let below = (self.vertical && pos.row + 1 < matrix.rows())
            .then(|| SeatPosition::new(pos.row + 1, pos.column));
        right.into_iter().chain(below)
    }
}

/// Score of one matrix (or the sum over several).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Evaluation {
    /// Neighbouring pairs sharing a conflict key.
    pub violation_count: usize,
    /// Occupied seats.
    pub filled_seats: usize,
}

impl Evaluation {
    /// Adds another evaluation to this one.
    pub fn merge(self, other: Evaluation) -> Self {
        Self {
            violation_count: self.violation_count + other.violation_count,
            filled_seats: self.filled_seats + other.filled_seats,
        }
    }

    /// Whether no violation was found.
    pub fn is_clean(&self) -> bool {
        self.violation_count == 0
    }
}

/// Counts violations and filled seats.
pub fn evaluate(matrix: &SeatMatrix, keys: &ConflictKeys, adjacency: Adjacency) -> Evaluation {
    Evaluation {
        violation_count: violating_pairs(matrix, keys, adjacency).len(),
        filled_seats: matrix.filled_count(),
    }
}

/// All violating pairs, each reported once as `(earlier, later)` in
/// row-major order.
pub fn violating_pairs(
    matrix: &SeatMatrix,
    keys: &ConflictKeys,
    adjacency: Adjacency,
) -> Vec<(SeatPosition, SeatPosition)> {
    let mut pairs = Vec::new();
    for (pos, student) in matrix.occupied() {
        for other in adjacency.forward(matrix, pos) {
            if let Some(neighbor) = matrix.get(other) {
                if keys.same(student, neighbor) {
                    pairs.push((pos, other));
                }
            }
        }
    }
    pairs
}

/// Seats taking part in at least one violation, row-major.
pub fn conflicted_seats(
    matrix: &SeatMatrix,
    keys: &ConflictKeys,
    adjacency: Adjacency,
) -> Vec<SeatPosition> {
    let mut seats: Vec<SeatPosition> = violating_pairs(matrix, keys, adjacency)
        .into_iter()
        .flat_map(|(a, b)| [a, b])
        .collect();
    seats.sort_unstable();
    seats.dedup();
    seats
}

/// Violating pairs that involve the seat at `pos`.
pub fn local_conflicts(
    matrix: &SeatMatrix,
    keys: &ConflictKeys,
    adjacency: Adjacency,
    pos: SeatPosition,
) -> usize {
    let Some(student) = matrix.get(pos) else {
        return 0;
    };
    adjacency
        .neighbors(matrix, pos)
        .into_iter()
        .filter_map(|n| matrix.get(n))
        .filter(|&n| keys.same(student, n))
        .count()
}
