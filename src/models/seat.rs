//! Seat positions and the per-hall seat matrix.
//!
//! The matrix is an index-addressed arena: `rows × columns` slots, each
//! holding at most one [`StudentIdx`]. Repair and rebalancing move students
//! with explicit slot swaps and repacks; nothing else aliases the slots.

use serde::{Deserialize, Serialize};

use super::{BenchMode, Hall, StudentIdx, SLOTS_PER_BENCH};

/// A (row, column) slot inside one hall. Both are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeatPosition {
    /// Row index.
    pub row: usize,
    /// Logical column index.
    pub column: usize,
}

impl SeatPosition {
    /// Creates a position.
    #[inline]
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// 1-based bench number within the row.
    #[inline]
    pub fn bench(&self) -> usize {
        self.column / SLOTS_PER_BENCH + 1
    }

    /// 1-based seat number within the bench.
    #[inline]
    pub fn seat_in_bench(&self) -> usize {
        self.column % SLOTS_PER_BENCH + 1
    }

    /// Attendance-style label, `R{row}-C{col}` (1-based).
    pub fn label(&self) -> String {
        format!("R{}-C{}", self.row + 1, self.column + 1)
    }
}

/// Lifecycle of one hall's matrix within an allocation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HallStage {
    /// Freshly created, no seat populated.
    #[default]
    Empty,
    /// Filled by the allocator (and possibly repacked).
    Allocated,
    /// Occupants shuffled within their groups.
    Randomized,
    /// Repair finished after the given number of swaps.
    Repaired(usize),
    /// Scored by the evaluator.
    Evaluated,
    /// Read-only, ready to serialize.
    Final,
}

/// Seat matrix for one hall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatMatrix {
    rows: usize,
    columns: usize,
    mode: BenchMode,
    slots: Vec<Option<StudentIdx>>,
    stage: HallStage,
}

impl SeatMatrix {
    /// Creates an empty matrix shaped like `hall`.
    pub fn new(hall: &Hall, mode: BenchMode) -> Self {
        Self::with_shape(hall.rows, hall.columns, mode)
    }

    /// Creates an empty matrix with explicit dimensions.
    pub fn with_shape(rows: usize, columns: usize, mode: BenchMode) -> Self {
        Self {
            rows,
            columns,
            mode,
            slots: vec![None; rows * columns],
            stage: HallStage::Empty,
        }
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of logical columns.
    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Current bench mode.
    #[inline]
    pub fn mode(&self) -> BenchMode {
        self.mode
    }

    /// Current lifecycle stage.
    #[inline]
    pub fn stage(&self) -> HallStage {
        self.stage
    }

    /// Moves the matrix to `stage`.
    pub fn mark(&mut self, stage: HallStage) {
        self.stage = stage;
    }

    /// Capacity under the current mode.
    pub fn capacity(&self) -> usize {
        self.capacity_for(self.mode)
    }

    /// Capacity this hall would have under `mode`.
    pub fn capacity_for(&self, mode: BenchMode) -> usize {
        self.rows * (self.columns / SLOTS_PER_BENCH) * mode.seats_per_bench()
    }

    #[inline]
    fn index(&self, pos: SeatPosition) -> usize {
        debug_assert!(pos.row < self.rows && pos.column < self.columns);
        pos.row * self.columns + pos.column
    }

    /// Occupant of `pos`.
    #[inline]
    pub fn get(&self, pos: SeatPosition) -> Option<StudentIdx> {
        self.slots[self.index(pos)]
    }

    /// Occupant at (row, column); `None` when out of bounds or empty.
    #[inline]
    pub fn at(&self, row: usize, column: usize) -> Option<StudentIdx> {
        if row < self.rows && column < self.columns {
            self.slots[row * self.columns + column]
        } else {
            None
        }
    }

    /// Places `student` at `pos`, returning the previous occupant.
    pub fn set(&mut self, pos: SeatPosition, student: Option<StudentIdx>) -> Option<StudentIdx> {
        let idx = self.index(pos);
        std::mem::replace(&mut self.slots[idx], student)
    }

    /// Swaps the occupants of two slots.
    pub fn swap(&mut self, a: SeatPosition, b: SeatPosition) {
        let (ia, ib) = (self.index(a), self.index(b));
        self.slots.swap(ia, ib);
    }

    /// Whether `pos` is a seat under the current mode (not an aisle slot and
    /// not beyond the last full bench).
    pub fn is_usable(&self, pos: SeatPosition) -> bool {
        pos.row < self.rows
            && pos.column < (self.columns / SLOTS_PER_BENCH) * SLOTS_PER_BENCH
            && self.mode.uses_slot(pos.column % SLOTS_PER_BENCH)
    }

    /// Usable positions in row-major order.
    pub fn usable_positions(&self) -> impl Iterator<Item = SeatPosition> + '_ {
        (0..self.rows)
            .flat_map(move |r| (0..self.columns).map(move |c| SeatPosition::new(r, c)))
            .filter(move |p| self.is_usable(*p))
    }

    /// Occupied positions with their occupants, row-major.
    pub fn occupied(&self) -> impl Iterator<Item = (SeatPosition, StudentIdx)> + '_ {
        self.slots.iter().enumerate().filter_map(move |(i, s)| {
            s.map(|student| (SeatPosition::new(i / self.columns, i % self.columns), student))
        })
    }

    /// Occupants in row-major order.
    pub fn occupants(&self) -> Vec<StudentIdx> {
        self.slots.iter().flatten().copied().collect()
    }

    /// Number of occupied slots.
    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Benches holding at least one student.
    pub fn benches_used(&self) -> usize {
        let benches_per_row = self.columns / SLOTS_PER_BENCH;
        let mut used = 0;
        for r in 0..self.rows {
            for b in 0..benches_per_row {
                let base = b * SLOTS_PER_BENCH;
                if (base..base + SLOTS_PER_BENCH).any(|c| self.at(r, c).is_some()) {
                    used += 1;
                }
            }
        }
        used
    }

    /// Empties every slot and switches to `mode`, then seats `students` in
    /// row-major order over the usable positions.
    ///
    /// Returns the number of students seated; callers pass at most
    /// [`capacity`](Self::capacity) students for the new mode.
    pub fn repack(&mut self, mode: BenchMode, students: &[StudentIdx]) -> usize {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.mode = mode;
        let positions: Vec<SeatPosition> = self.usable_positions().collect();
        debug_assert!(students.len() <= positions.len());
        let mut placed = 0;
        for (&pos, &student) in positions.iter().zip(students) {
            let idx = self.index(pos);
            self.slots[idx] = Some(student);
            placed += 1;
        }
        placed
    }

    /// Rows of optional occupants, for rendering and debugging.
    pub fn to_rows(&self) -> Vec<Vec<Option<StudentIdx>>> {
        self.slots.chunks(self.columns.max(1)).map(|c| c.to_vec()).collect()
    }
}
