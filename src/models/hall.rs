//! Hall model and bench modes.
//!
//! A hall is a grid of `rows × columns` logical seat slots. Columns are
//! grouped in runs of three per physical bench; trailing columns that do not
//! form a full bench are never used.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical seat slots per physical bench.
pub const SLOTS_PER_BENCH: usize = 3;

/// Seats actually used per bench.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum BenchMode {
    /// Two students per bench; the third slot of every bench is an aisle.
    Two,
    /// Three students per bench.
    Three,
}

impl BenchMode {
    /// Students seated per bench.
    #[inline]
    pub fn seats_per_bench(self) -> usize {
        match self {
            BenchMode::Two => 2,
            BenchMode::Three => 3,
        }
    }

    /// Whether slot `s` (0-based within a bench) is usable in this mode.
    #[inline]
    pub fn uses_slot(self, slot_in_bench: usize) -> bool {
        slot_in_bench < self.seats_per_bench()
    }
}

impl From<BenchMode> for u8 {
    fn from(mode: BenchMode) -> Self {
        mode.seats_per_bench() as u8
    }
}

impl TryFrom<u8> for BenchMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(BenchMode::Two),
            3 => Ok(BenchMode::Three),
            other => Err(format!("unsupported seats per bench: {other}")),
        }
    }
}

impl fmt::Display for BenchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-per-bench", self.seats_per_bench())
    }
}

/// An exam hall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hall {
    /// Hall name, unique within a run.
    pub name: String,
    /// Number of bench rows.
    pub rows: usize,
    /// Number of logical seat columns.
    pub columns: usize,
}

impl Hall {
    /// Creates a hall.
    pub fn new(name: impl Into<String>, rows: usize, columns: usize) -> Self {
        Self {
            name: name.into(),
            rows,
            columns,
        }
    }

    /// Full benches per row: `floor(columns / 3)`.
    #[inline]
    pub fn benches_per_row(&self) -> usize {
        self.columns / SLOTS_PER_BENCH
    }

    /// Total benches in the hall.
    #[inline]
    pub fn bench_count(&self) -> usize {
        self.rows * self.benches_per_row()
    }

    /// Seating capacity under the given mode.
    #[inline]
    pub fn capacity(&self, mode: BenchMode) -> usize {
        self.bench_count() * mode.seats_per_bench()
    }

    /// Total logical slots (`rows × columns`), usable or not.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.rows * self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hall_geometry() {
        let h = Hall::new("H1", 4, 9);
        assert_eq!(h.benches_per_row(), 3);
        assert_eq!(h.bench_count(), 12);
        assert_eq!(h.capacity(BenchMode::Two), 24);
        assert_eq!(h.capacity(BenchMode::Three), 36);
        assert_eq!(h.slot_count(), 36);
    }

    #[test]
    fn test_partial_bench_columns_ignored() {
        let h = Hall::new("H2", 2, 8);
        assert_eq!(h.benches_per_row(), 2);
        assert_eq!(h.capacity(BenchMode::Three), 12);
    }

    #[test]
    fn test_mode_slots() {
        assert!(BenchMode::Two.uses_slot(1));
        assert!(!BenchMode::Two.uses_slot(2));
        assert!(BenchMode::Three.uses_slot(2));
    }

    #[test]
    fn test_mode_serde_as_number() {
        assert_eq!(serde_json::to_string(&BenchMode::Three).unwrap(), "3");
        let m: BenchMode = serde_json::from_str("2").unwrap();
        assert_eq!(m, BenchMode::Two);
        assert!(serde_json::from_str::<BenchMode>("4").is_err());
    }
}
