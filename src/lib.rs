//! Exam seat allocation.
//!
//! Assigns exam candidates to bench seats across halls so that students
//! sharing a conflict key (branch, subject or cohort) are not seated next
//! to each other, and derives the seating lists, attendance sheets and
//! summaries published to invigilators.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Student`, `Roster`, `Hall`, `SeatMatrix`,
//!   `Allocation`
//! - **`validation`**: Input integrity checks (roll numbers, hall names)
//! - **`roster`**: Partitioning into groups, pluggable key extractors
//! - **`capacity`**: Two/three per bench planning and hall rebalancing
//! - **`allocator`**: Striped group rotation with threaded group pointers
//! - **`randomizer`**: Within-group shuffling
//! - **`optimizer`**: Scored swap repair of adjacency violations
//! - **`evaluator`**: Violation counting and conflict flags
//! - **`engine`**: End-to-end pipeline with best-of-N attempts
//! - **`report`**: Door summaries, attendance sheets, master plan
//! - **`config`**: Serde-backed engine configuration
//!
//! # Architecture
//!
//! Single-threaded and synchronous. Students live in one arena per run and
//! are referenced by index; each hall owns an index-addressed seat matrix.
//! Randomness is injected through `rand::Rng`. Logging goes through
//! `tracing`; the crate never installs a subscriber.
//!
//! # References
//!
//! - Minton et al. (1992), "Minimizing conflicts: a heuristic repair method
//!   for constraint satisfaction and scheduling problems"
//! - Knuth (1997), "The Art of Computer Programming", Vol. 2

pub mod allocator;
pub mod capacity;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod models;
pub mod optimizer;
pub mod randomizer;
pub mod report;
pub mod roster;
pub mod validation;

pub use config::EngineConfig;
pub use engine::{SeatingEngine, SeatingRequest};
pub use error::SeatingError;
