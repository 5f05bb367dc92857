//! Seating domain models.
//!
//! Provides the data types for describing a seating problem (students,
//! rosters, halls) and its solution (seat matrices and the serializable
//! allocation).
//!
//! # Domain Mappings
//!
//! | u-seating | Exam office | Generic assignment |
//! |-----------|-------------|--------------------|
//! | Student | Candidate | Item |
//! | Hall | Exam room | Container |
//! | SeatMatrix | Seating grid | Slot arena |
//! | Allocation | Published seating plan | Solution |

mod allocation;
mod hall;
mod seat;
mod student;

pub use allocation::{Allocation, AllocationReport, HallAllocation, HallReport, SeatRecord};
pub use hall::{BenchMode, Hall, SLOTS_PER_BENCH};
pub use seat::{HallStage, SeatMatrix, SeatPosition};
pub use student::{Roster, Student, StudentIdx, StudentRecord};
