//! Allocation (solution) model.
//!
//! An allocation is the final, serializable seating of every student across
//! all halls, together with a run-level report. It is what the persistence
//! and rendering layers consume.

use serde::{Deserialize, Serialize};

use super::BenchMode;

/// Complete seating for one exam run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Per-hall seating, in input hall order.
    pub halls: Vec<HallAllocation>,
    /// Run-level report.
    pub report: AllocationReport,
}

/// Seating for one hall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HallAllocation {
    /// Hall name.
    pub name: String,
    /// Number of rows.
    pub rows: usize,
    /// Number of logical columns.
    pub columns: usize,
    /// Bench mode this hall ended up in.
    pub mode: BenchMode,
    /// Seated students per row, in column order. Empty rows are kept.
    pub seats_by_row: Vec<Vec<SeatRecord>>,
}

/// One occupied seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatRecord {
    /// Roll number.
    pub roll: String,
    /// Student name.
    pub name: String,
    /// Branch, if known.
    pub branch: Option<String>,
    /// Primary subject, if known.
    pub subject: Option<String>,
    /// Cohort label, if known.
    pub cohort: Option<String>,
    /// Batch, if known.
    pub batch: Option<String>,
    /// Partition group the student was allocated from.
    pub group: String,
    /// 1-based row.
    pub row: usize,
    /// 1-based logical column.
    pub column: usize,
    /// 1-based bench number within the row.
    pub bench: usize,
    /// 1-based seat number within the bench.
    pub seat: usize,
    /// Whether this seat takes part in an adjacency violation.
    pub conflict: bool,
}

/// Run-level summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationReport {
    /// Globally planned bench mode.
    pub mode: BenchMode,
    /// Students seated (equals the validated roster size).
    pub total_students: usize,
    /// Residual adjacency violations across all halls.
    pub violation_count: usize,
    /// Attempts run before the best one was kept.
    pub attempts: usize,
    /// Per-hall figures.
    pub halls: Vec<HallReport>,
}

/// Per-hall figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallReport {
    /// Hall name.
    pub name: String,
    /// Final bench mode.
    pub mode: BenchMode,
    /// Seats filled.
    pub filled_seats: usize,
    /// Capacity under the final mode.
    pub capacity: usize,
    /// Residual violations.
    pub violation_count: usize,
}

impl Allocation {
    /// Total seated students.
    pub fn seated_count(&self) -> usize {
        self.halls.iter().map(|h| h.seated_count()).sum()
    }

    /// Finds a hall by name.
    pub fn hall(&self, name: &str) -> Option<&HallAllocation> {
        self.halls.iter().find(|h| h.name == name)
    }

    /// Finds the seat of a student by roll number.
    pub fn seat_of(&self, roll: &str) -> Option<(&HallAllocation, &SeatRecord)> {
        self.halls
            .iter()
            .find_map(|h| h.seats().find(|s| s.roll == roll).map(|s| (h, s)))
    }

    /// Whether no adjacency violation remains.
    pub fn is_clean(&self) -> bool {
        self.report.violation_count == 0
    }

    /// Serializes to pretty JSON for the external store.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parses an allocation previously written by [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl HallAllocation {
    /// All seated students, row-major.
    pub fn seats(&self) -> impl Iterator<Item = &SeatRecord> {
        self.seats_by_row.iter().flatten()
    }

    /// Number of seated students.
    pub fn seated_count(&self) -> usize {
        self.seats_by_row.iter().map(Vec::len).sum()
    }
}
