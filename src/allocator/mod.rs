//! Seat allocation.
//!
//! Fills each hall's seat matrix from the partition groups. Group pointer
//! state lives in an explicit [`AllocationContext`] that is passed from hall
//! to hall, so every student is placed exactly once across the run.

mod context;
mod striping;

pub use context::AllocationContext;
pub use striping::SeatAllocator;
