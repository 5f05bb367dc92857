//! Capacity planning and cross-hall rebalancing.
//!
//! # Mode Selection
//!
//! With `B = Σ rows × floor(columns / 3)` benches and `n` students:
//!
//! 1. `2B ≥ n` → two per bench everywhere
//! 2. `3B ≥ n` → three per bench
//! 3. otherwise the run fails with [`SeatingError::Capacity`]
//!
//! # Rebalancing
//!
//! After allocation under three-per-bench, halls that ended up lightly
//! filled are repacked to two per bench, first one at a time
//! ([`downgrade_partial_halls`]) and then in pairs ([`rebalance_pairs`]).
//! Repacking keeps the row-major occupant sequence.

use serde::{Deserialize, Serialize};

use crate::error::SeatingError;
use crate::models::{BenchMode, Hall, SeatMatrix, StudentIdx};

/// Capacity of one hall under the planned mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallCapacity {
    /// Hall name.
    pub name: String,
    /// Full benches.
    pub benches: usize,
    /// Seats under the planned mode.
    pub capacity: usize,
}

/// Result of capacity planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityPlan {
    /// Global bench mode.
    pub mode: BenchMode,
    /// Students to seat.
    pub students: usize,
    /// Benches across all halls.
    pub total_benches: usize,
    /// Per-hall figures, in input order.
    pub halls: Vec<HallCapacity>,
}

impl CapacityPlan {
    /// Seats available under the planned mode.
    pub fn total_capacity(&self) -> usize {
        self.total_benches * self.mode.seats_per_bench()
    }

    /// Seats left empty once everyone is seated.
    pub fn spare_seats(&self) -> usize {
        self.total_capacity().saturating_sub(self.students)
    }
}

/// Chooses the global bench mode for `students` over `halls`.
///
/// # Errors
/// [`SeatingError::Capacity`] when even three per bench cannot hold
/// everyone. No seat has been touched at that point.
///
/// # Example
///
/// ```
/// use u_seating::capacity::plan_capacity;
/// use u_seating::models::{BenchMode, Hall};
///
/// let halls = vec![Hall::new("H1", 4, 9), Hall::new("H2", 4, 9)];
/// let plan = plan_capacity(&halls, 60).unwrap();
/// assert_eq!(plan.mode, BenchMode::Three);
/// assert_eq!(plan.total_benches, 24);
/// ```
pub fn plan_capacity(halls: &[Hall], students: usize) -> Result<CapacityPlan, SeatingError> {
    let total_benches: usize = halls.iter().map(Hall::bench_count).sum();

    let mode = if BenchMode::Two.seats_per_bench() * total_benches >= students {
        BenchMode::Two
    } else if BenchMode::Three.seats_per_bench() * total_benches >= students {
        BenchMode::Three
    } else {
        return Err(SeatingError::Capacity {
            students,
            capacity: BenchMode::Three.seats_per_bench() * total_benches,
        });
    };

    Ok(CapacityPlan {
        mode,
        students,
        total_benches,
        halls: halls
            .iter()
            .map(|h| HallCapacity {
                name: h.name.clone(),
                benches: h.bench_count(),
                capacity: h.capacity(mode),
            })
            .collect(),
    })
}

/// Repacks every three-per-bench hall whose occupants fit two per bench.
///
/// Returns the number of halls downgraded.
pub fn downgrade_partial_halls(matrices: &mut [SeatMatrix]) -> usize {
    let mut downgraded = 0;
    for (h, matrix) in matrices.iter_mut().enumerate() {
        if matrix.mode() == BenchMode::Three
            && matrix.filled_count() <= matrix.capacity_for(BenchMode::Two)
        {
            let occupants = matrix.occupants();
            matrix.repack(BenchMode::Two, &occupants);
            downgraded += 1;
            tracing::debug!(
                hall = h,
                filled = occupants.len(),
                "downgraded hall to two per bench"
            );
        }
    }
    downgraded
}

/// Merges pairs of halls that fit two per bench together.
///
/// Pairs `(i, j)` with `i < j` are visited in order. A pair qualifies when
/// at least one of the two is still three per bench and their combined
/// occupancy fits both halls' two-per-bench capacity. Occupants of `i`
/// then `j` are concatenated and repacked with hall `i` filled first.
///
/// Returns the number of pairs merged.
pub fn rebalance_pairs(matrices: &mut [SeatMatrix]) -> usize {
    let mut merged = 0;
    for i in 0..matrices.len() {
        for j in (i + 1)..matrices.len() {
            if !qualifies(&matrices[i], &matrices[j]) {
                continue;
            }

            let (left, right) = matrices.split_at_mut(j);
            let (a, b) = (&mut left[i], &mut right[0]);

            let mut pool: Vec<StudentIdx> = a.occupants();
            pool.extend(b.occupants());
            let split = a.capacity_for(BenchMode::Two).min(pool.len());

            a.repack(BenchMode::Two, &pool[..split]);
            b.repack(BenchMode::Two, &pool[split..]);
            merged += 1;
            tracing::debug!(
                first = i,
                second = j,
                students = pool.len(),
                "rebalanced hall pair"
            );
        }
    }
    merged
}

fn qualifies(a: &SeatMatrix, b: &SeatMatrix) -> bool {
    (a.mode() == BenchMode::Three || b.mode() == BenchMode::Three)
        && a.filled_count() + b.filled_count()
            <= a.capacity_for(BenchMode::Two) + b.capacity_for(BenchMode::Two)
}
