//! Striped group rotation over bench slots.
//!
//! # Algorithm
//!
//! Rows are filled in row-major order. For the logical seat index `i`
//! within a row (`i = m·b + s` for bench `b`, slot `s`, mode `m`), row
//! parity `p` and hall index `h`, the preferred group is
//!
//! ```text
//! order[(i + p + h) mod k]
//! ```
//!
//! Exhausted groups are skipped in rotation order. Alternating parity
//! between rows staggers the stripes vertically, and the hall offset keeps
//! consecutive halls from starting on the same group.
//!
//! # Complexity
//! O(S · k) for S slots and k groups.

use crate::models::{
    BenchMode, Hall, HallStage, SeatMatrix, SeatPosition, StudentIdx, SLOTS_PER_BENCH,
};
use crate::roster::ConflictKeys;

use super::AllocationContext;

/// Fills halls from group queues with the striping rule.
///
/// # Example
///
/// ```
/// use u_seating::allocator::{AllocationContext, SeatAllocator};
/// use u_seating::models::{BenchMode, Hall};
/// use u_seating::roster::ConflictKeys;
///
/// let keys = ConflictKeys::from_labels(&["A", "A", "B", "B"]);
/// let ctx = AllocationContext::new(vec![vec![0, 1], vec![2, 3]]);
/// let allocator = SeatAllocator::new(&keys);
///
/// let (matrix, ctx) = allocator.allocate(&Hall::new("H1", 1, 6), 0, BenchMode::Two, ctx);
/// assert_eq!(matrix.occupants(), vec![0, 2, 1, 3]);
/// assert!(ctx.is_exhausted());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SeatAllocator<'a> {
    conflict: &'a ConflictKeys,
    neighbor_guard: bool,
}

impl<'a> SeatAllocator<'a> {
    /// Creates an allocator without the neighbor guard.
    pub fn new(conflict: &'a ConflictKeys) -> Self {
        Self {
            conflict,
            neighbor_guard: false,
        }
    }

    /// Enables or disables the neighbor guard.
    ///
    /// When enabled, a candidate sharing a conflict key with the occupant of
    /// the preceding slot on the same bench is passed over (its pointer is
    /// left in place) and the next group in rotation is tried. If every
    /// remaining group conflicts, the first conflicting candidate is seated.
    pub fn with_neighbor_guard(mut self, enabled: bool) -> Self {
        self.neighbor_guard = enabled;
        self
    }

    /// Whether the neighbor guard is on.
    pub fn neighbor_guard(&self) -> bool {
        self.neighbor_guard
    }

    /// Allocates one hall, consuming students from `ctx`.
    ///
    /// Returns the populated matrix and the advanced context. Slots stay
    /// empty once every group is exhausted.
    pub fn allocate(
        &self,
        hall: &Hall,
        hall_index: usize,
        mode: BenchMode,
        mut ctx: AllocationContext,
    ) -> (SeatMatrix, AllocationContext) {
        let mut matrix = SeatMatrix::new(hall, mode);
        let k = ctx.group_count();
        let per_bench = mode.seats_per_bench();

        'rows: for r in 0..hall.rows {
            let parity = r % 2;
            for b in 0..hall.benches_per_row() {
                for s in 0..per_bench {
                    if ctx.is_exhausted() {
                        break 'rows;
                    }
                    let i = b * per_bench + s;
                    let start = (i + parity + hall_index) % k;
                    let pos = SeatPosition::new(r, b * SLOTS_PER_BENCH + s);
                    let previous = if s > 0 {
                        matrix.at(r, pos.column - 1)
                    } else {
                        None
                    };

                    if let Some(g) = self.choose_group(&ctx, start, previous) {
                        matrix.set(pos, ctx.take(g));
                    }
                }
            }
        }

        matrix.mark(HallStage::Allocated);
        tracing::debug!(
            hall = %hall.name,
            mode = %mode,
            filled = matrix.filled_count(),
            remaining = ctx.total_remaining(),
            "allocated hall"
        );
        (matrix, ctx)
    }

    /// Allocates every hall in order, threading the context through.
    pub fn allocate_all(
        &self,
        halls: &[Hall],
        mode: BenchMode,
        ctx: AllocationContext,
    ) -> (Vec<SeatMatrix>, AllocationContext) {
        halls.iter().enumerate().fold(
            (Vec::with_capacity(halls.len()), ctx),
            |(mut matrices, ctx), (h, hall)| {
                let (matrix, ctx) = self.allocate(hall, h, mode, ctx);
                matrices.push(matrix);
                (matrices, ctx)
            },
        )
    }

    fn choose_group(
        &self,
        ctx: &AllocationContext,
        start: usize,
        previous: Option<StudentIdx>,
    ) -> Option<usize> {
        let k = ctx.group_count();
        let mut fallback = None;

        for offset in 0..k {
            let g = (start + offset) % k;
            let Some(candidate) = ctx.peek(g) else {
                continue;
            };
            match previous {
                Some(prev) if self.neighbor_guard && self.conflict.same(prev, candidate) => {
                    fallback.get_or_insert(g);
                }
                _ => return Some(g),
            }
        }

        fallback
    }
}
