//! Constraint repair by scored seat swaps.
//!
//! # Algorithm
//!
//! [`repair`] runs bounded scan passes. Each pass walks the seats in
//! row-major order; for every violating neighbour pair `(a, b)` it searches
//! for an occupant `x` whose conflict key differs from `a`'s, starting at
//! column 0 of `a`'s row and wrapping around to the earlier rows. `x` and
//! `b` are swapped tentatively and the swap is kept only when the number of
//! violations touching the two seats strictly drops.
//!
//! [`random_swap_repair`] is a cheaper perturbation: random pairs of
//! occupied seats are swapped and kept when the local violation count does
//! not grow, which lets the search walk across plateaus.
//!
//! # Non-regression
//!
//! For any swap, the change in violations touching the two swapped seats
//! equals the change in the matrix total (a pair between the two seats is
//! unaffected by swapping them). Neither routine accepts a swap whose local
//! count grows, so the total never increases.
//!
//! # Reference
//! Minton et al. (1992), "Minimizing conflicts: a heuristic repair method
//! for constraint satisfaction and scheduling problems"

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::evaluator::{evaluate, local_conflicts, Adjacency};
use crate::models::{HallStage, SeatMatrix, SeatPosition};
use crate::roster::ConflictKeys;

/// Default number of scan passes for [`repair`].
pub const DEFAULT_MAX_PASSES: usize = 50;

/// Summary of one [`repair`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepairOutcome {
    /// Scan passes executed.
    pub passes: usize,
    /// Swaps committed.
    pub swaps: usize,
    /// Violations before the first pass.
    pub violations_before: usize,
    /// Violations after the last pass.
    pub violations_after: usize,
}

impl RepairOutcome {
    /// Violations removed.
    pub fn improvement(&self) -> usize {
        self.violations_before - self.violations_after
    }
}

/// Removes adjacency violations with bounded scan passes.
///
/// Stops after a clean pass, after a pass that commits no swap, or after
/// `max_passes`. Marks the matrix [`HallStage::Repaired`] with the number
/// of committed swaps.
///
/// # Example
///
/// ```
/// use u_seating::evaluator::{evaluate, Adjacency};
/// use u_seating::models::{BenchMode, SeatMatrix};
/// use u_seating::optimizer::repair;
/// use u_seating::roster::ConflictKeys;
///
/// let keys = ConflictKeys::from_labels(&["A", "A", "B", "B"]);
/// let mut m = SeatMatrix::with_shape(1, 6, BenchMode::Three);
/// m.repack(BenchMode::Three, &[0, 1, 2, 3]);
///
/// let outcome = repair(&mut m, &keys, 50, Adjacency::default());
/// assert_eq!(outcome.violations_before, 2);
/// assert_eq!(outcome.violations_after, 0);
/// assert!(evaluate(&m, &keys, Adjacency::default()).is_clean());
/// ```
pub fn repair(
    matrix: &mut SeatMatrix,
    keys: &ConflictKeys,
    max_passes: usize,
    adjacency: Adjacency,
) -> RepairOutcome {
    let violations_before = evaluate(matrix, keys, adjacency).violation_count;
    let mut outcome = RepairOutcome {
        violations_before,
        violations_after: violations_before,
        ..Default::default()
    };

    let positions: Vec<SeatPosition> = (0..matrix.rows())
        .flat_map(|r| (0..matrix.columns()).map(move |c| SeatPosition::new(r, c)))
        .collect();

    while outcome.passes < max_passes && outcome.violations_after > 0 {
        outcome.passes += 1;
        let mut committed = 0;

        for &pa in &positions {
            let forward: Vec<SeatPosition> = adjacency.forward(matrix, pa).collect();
            for pb in forward {
                let (Some(a), Some(b)) = (matrix.get(pa), matrix.get(pb)) else {
                    continue;
                };
                if keys.same(a, b) && try_replace(matrix, keys, adjacency, &positions, pa, pb) {
                    committed += 1;
                }
            }
        }

        outcome.swaps += committed;
        outcome.violations_after = evaluate(matrix, keys, adjacency).violation_count;
        tracing::trace!(
            pass = outcome.passes,
            swaps = committed,
            violations = outcome.violations_after,
            "repair pass"
        );
        if committed == 0 {
            break;
        }
    }

    matrix.mark(HallStage::Repaired(outcome.swaps));
    outcome
}

/// Searches for a seat to swap with `pb` so that the violation between
/// `pa` and `pb` disappears without a net loss. Returns whether a swap was
/// committed.
fn try_replace(
    matrix: &mut SeatMatrix,
    keys: &ConflictKeys,
    adjacency: Adjacency,
    positions: &[SeatPosition],
    pa: SeatPosition,
    pb: SeatPosition,
) -> bool {
    let Some(a) = matrix.get(pa) else {
        return false;
    };
    let start = pa.row * matrix.columns();
    let (tail, head) = positions.split_at(start);

    for &px in head.iter().chain(tail) {
        if px == pa || px == pb {
            continue;
        }
        let Some(x) = matrix.get(px) else {
            continue;
        };
        if keys.same(a, x) {
            continue;
        }

        let before = local_conflicts(matrix, keys, adjacency, px)
            + local_conflicts(matrix, keys, adjacency, pb);
        matrix.swap(px, pb);
        let after = local_conflicts(matrix, keys, adjacency, px)
            + local_conflicts(matrix, keys, adjacency, pb);

        if after < before {
            return true;
        }
        matrix.swap(px, pb);
    }
    false
}

/// Random swap trials between occupied seats.
///
/// A swap is kept when the violations touching the two seats do not grow.
/// Stops early once the matrix is clean. Returns the number of swaps kept.
pub fn random_swap_repair<R: Rng + ?Sized>(
    matrix: &mut SeatMatrix,
    keys: &ConflictKeys,
    trials: usize,
    adjacency: Adjacency,
    rng: &mut R,
) -> usize {
    let occupied: Vec<SeatPosition> = matrix.occupied().map(|(p, _)| p).collect();
    let mut violations = evaluate(matrix, keys, adjacency).violation_count;
    if occupied.len() < 2 {
        return 0;
    }

    let mut kept = 0;
    for _ in 0..trials {
        if violations == 0 {
            break;
        }
        let pi = occupied[rng.random_range(0..occupied.len())];
        let pj = occupied[rng.random_range(0..occupied.len())];
        if pi == pj {
            continue;
        }
        let (Some(i), Some(j)) = (matrix.get(pi), matrix.get(pj)) else {
            continue;
        };
        if keys.same(i, j) {
            continue;
        }

        let before = local_conflicts(matrix, keys, adjacency, pi)
            + local_conflicts(matrix, keys, adjacency, pj);
        matrix.swap(pi, pj);
        let after = local_conflicts(matrix, keys, adjacency, pi)
            + local_conflicts(matrix, keys, adjacency, pj);

        if after <= before {
            violations -= before - after;
            kept += 1;
        } else {
            matrix.swap(pi, pj);
        }
    }

    tracing::trace!(kept = kept, violations = violations, "random swap repair");
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BenchMode;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn packed(rows: usize, columns: usize, labels: &[&str]) -> (SeatMatrix, ConflictKeys) {
        let mut m = SeatMatrix::with_shape(rows, columns, BenchMode::Three);
        let students: Vec<usize> = (0..labels.len()).collect();
        m.repack(BenchMode::Three, &students);
        (m, ConflictKeys::from_labels(labels))
    }

    #[test]
    fn test_repair_clears_solvable_row() {
        let (mut m, keys) = packed(1, 6, &["A", "A", "A", "B", "B", "B"]);
        let outcome = repair(&mut m, &keys, DEFAULT_MAX_PASSES, Adjacency::default());
        assert_eq!(outcome.violations_before, 4);
        assert_eq!(outcome.violations_after, 0);
        assert!(outcome.swaps > 0);
        assert_eq!(m.stage(), HallStage::Repaired(outcome.swaps));

        let mut seated = m.occupants();
        seated.sort_unstable();
        assert_eq!(seated, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_repair_on_clean_matrix_does_nothing() {
        let (mut m, keys) = packed(1, 6, &["A", "B", "A", "B", "A", "B"]);
        let before = m.occupants();
        let outcome = repair(&mut m, &keys, DEFAULT_MAX_PASSES, Adjacency::default());
        assert_eq!(outcome.passes, 0);
        assert_eq!(outcome.swaps, 0);
        assert_eq!(m.occupants(), before);
    }

    #[test]
    fn test_repair_unsolvable_keeps_everyone() {
        let (mut m, keys) = packed(1, 3, &["S", "S", "S"]);
        let outcome = repair(&mut m, &keys, DEFAULT_MAX_PASSES, Adjacency::default());
        assert_eq!(outcome.violations_after, 2);
        assert_eq!(outcome.improvement(), 0);
        assert_eq!(m.filled_count(), 3);
    }

    #[test]
    fn test_repair_respects_pass_bound() {
        let labels = ["A", "A", "A", "A", "A", "A", "B", "B", "B", "B", "B", "B"];
        let (mut m, keys) = packed(2, 6, &labels);
        let outcome = repair(&mut m, &keys, 1, Adjacency::default());
        assert_eq!(outcome.passes, 1);
        assert!(outcome.violations_after <= outcome.violations_before);
    }

    #[test]
    fn test_repair_with_vertical_adjacency() {
        let (mut m, keys) = packed(2, 3, &["A", "B", "A", "A", "B", "A"]);
        let adj = Adjacency::horizontal().with_vertical(true);
        let outcome = repair(&mut m, &keys, DEFAULT_MAX_PASSES, adj);
        assert_eq!(outcome.violations_before, 3);
        assert!(outcome.violations_after < 3);
        assert_eq!(evaluate(&m, &keys, adj).violation_count, outcome.violations_after);
    }

    #[test]
    fn test_random_swap_never_regresses() {
        let labels = ["A", "A", "A", "A", "B", "B", "C", "C", "A", "B", "C", "A"];
        let (mut m, keys) = packed(2, 6, &labels);
        let before = evaluate(&m, &keys, Adjacency::default()).violation_count;

        let mut rng = SmallRng::seed_from_u64(42);
        random_swap_repair(&mut m, &keys, 500, Adjacency::default(), &mut rng);

        let after = evaluate(&m, &keys, Adjacency::default()).violation_count;
        assert!(after <= before);
        assert_eq!(m.filled_count(), 12);
    }

    #[test]
    fn test_random_swap_single_student() {
        let (mut m, keys) = packed(1, 3, &["A"]);
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(random_swap_repair(&mut m, &keys, 10, Adjacency::default(), &mut rng), 0);
    }
}
