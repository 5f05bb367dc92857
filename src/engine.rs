//! Seating engine: the end-to-end pipeline.
//!
//! # Pipeline
//!
//! 1. Validate halls and rosters, build the student arena
//! 2. Partition students and intern conflict keys
//! 3. Plan capacity (fails fast before any seat is touched)
//! 4. Best-of-N attempts, each running
//!    allocate → rebalance → randomize → repair → evaluate
//! 5. Convert the best attempt into an [`Allocation`]
//!
//! Attempts are scored by total violation count; the first attempt at or
//! below the configured target stops the search.

use std::collections::HashSet;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::allocator::{AllocationContext, SeatAllocator};
use crate::capacity::{downgrade_partial_halls, plan_capacity, rebalance_pairs, CapacityPlan};
use crate::config::{ConfigError, EngineConfig};
use crate::error::SeatingError;
use crate::evaluator::{conflicted_seats, evaluate, Evaluation};
use crate::models::{
    Allocation, AllocationReport, BenchMode, Hall, HallAllocation, HallReport, HallStage, Roster,
    SeatMatrix, SeatPosition, SeatRecord, Student,
};
use crate::optimizer::{random_swap_repair, repair};
use crate::randomizer::randomize_within_groups;
use crate::roster::{collect_students, KeyExtractor, RosterIndex};
use crate::validation::validate_halls;

/// Input of one seating run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeatingRequest {
    /// Halls in fill order.
    pub halls: Vec<Hall>,
    /// Student rosters, one per uploaded cohort file.
    pub rosters: Vec<Roster>,
}

impl SeatingRequest {
    /// Creates a request.
    pub fn new(halls: Vec<Hall>, rosters: Vec<Roster>) -> Self {
        Self { halls, rosters }
    }

    /// Adds a hall.
    pub fn with_hall(mut self, hall: Hall) -> Self {
        self.halls.push(hall);
        self
    }

    /// Adds a roster.
    pub fn with_roster(mut self, roster: Roster) -> Self {
        self.rosters.push(roster);
        self
    }

    /// Parses a request from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Records across all rosters.
    pub fn record_count(&self) -> usize {
        self.rosters.iter().map(Roster::len).sum()
    }
}

/// Seat allocation engine.
///
/// # Example
///
/// ```
/// use u_seating::engine::{SeatingEngine, SeatingRequest};
/// use u_seating::config::EngineConfig;
/// use u_seating::models::{BenchMode, Hall, Roster, StudentRecord};
///
/// let cohort = |label: &str, prefix: u32| {
///     (1..=6).fold(Roster::new(label), |r, i| {
///         r.with_record(StudentRecord::new(format!("{prefix}{i:02}")))
///     })
/// };
/// let (y2, y3) = (cohort("Y2", 2), cohort("Y3", 3));
/// let request = SeatingRequest::new(vec![Hall::new("H1", 2, 9)], vec![y2, y3]);
///
/// let engine = SeatingEngine::with_config(EngineConfig::new().with_seed(42));
/// let allocation = engine.run(&request).unwrap();
///
/// assert_eq!(allocation.seated_count(), 12);
/// assert_eq!(allocation.report.mode, BenchMode::Two);
/// assert!(allocation.is_clean());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SeatingEngine {
    config: EngineConfig,
    grouping: Option<Arc<dyn KeyExtractor>>,
    conflict: Option<Arc<dyn KeyExtractor>>,
}

/// One scored allocation attempt.
struct Attempt {
    matrices: Vec<SeatMatrix>,
    evaluation: Evaluation,
}

impl SeatingEngine {
    /// Creates an engine with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the given configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Overrides the configured grouping with a custom extractor.
    pub fn with_grouping_extractor(mut self, extractor: Arc<dyn KeyExtractor>) -> Self {
        self.grouping = Some(extractor);
        self
    }

    /// Overrides the configured conflict key with a custom extractor.
    pub fn with_conflict_extractor(mut self, extractor: Arc<dyn KeyExtractor>) -> Self {
        self.conflict = Some(extractor);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validates the request and plans capacity without allocating.
    ///
    /// # Errors
    /// Same validation and capacity errors as [`run`](Self::run).
    pub fn plan(&self, request: &SeatingRequest) -> Result<CapacityPlan, SeatingError> {
        self.check_config()?;
        validate_halls(&request.halls).map_err(SeatingError::InvalidHalls)?;
        let students = collect_students(&request.rosters)?;
        plan_capacity(&request.halls, students.len())
    }

    /// Runs the engine, seeding the RNG from the configuration (or the OS).
    ///
    /// # Errors
    /// - [`SeatingError::InvalidConfig`] for out-of-range settings
    /// - [`SeatingError::InvalidHalls`] for duplicate hall names
    /// - [`SeatingError::MalformedRoster`] for missing or duplicate roll numbers
    /// - [`SeatingError::Capacity`] when three per bench cannot hold everyone
    pub fn run(&self, request: &SeatingRequest) -> Result<Allocation, SeatingError> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.run_with_rng(request, &mut rng)
    }

    /// Runs the engine with a caller-provided RNG.
    ///
    /// # Errors
    /// See [`run`](Self::run).
    #[instrument(
        level = "debug",
        skip_all,
        fields(halls = request.halls.len(), rosters = request.rosters.len())
    )]
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        request: &SeatingRequest,
        rng: &mut R,
    ) -> Result<Allocation, SeatingError> {
        self.check_config()?;
        validate_halls(&request.halls).map_err(SeatingError::InvalidHalls)?;
        let students = collect_students(&request.rosters)?;
        let plan = plan_capacity(&request.halls, students.len())?;
        tracing::debug!(
            students = students.len(),
            benches = plan.total_benches,
            mode = %plan.mode,
            "capacity planned"
        );

        let grouping = self
            .grouping
            .clone()
            .unwrap_or_else(|| self.config.grouping.resolve(&request.rosters));
        let conflict = match (&self.conflict, self.config.conflict) {
            (Some(custom), _) => Arc::clone(custom),
            (None, Some(strategy)) => strategy.resolve(&request.rosters),
            (None, None) => Arc::clone(&grouping),
        };
        let index = RosterIndex::build(&students, grouping.as_ref(), conflict.as_ref());
        tracing::debug!(
            grouping = grouping.name(),
            conflict = conflict.name(),
            groups = index.groups.len(),
            "students partitioned"
        );

        let pristine = AllocationContext::from_index(&index);
        let allocator = SeatAllocator::new(&index.conflict)
            .with_neighbor_guard(self.config.neighbor_guard_enabled());

        let mut best = self.attempt(request, &plan, &allocator, &index, pristine.clone(), rng);
        let mut attempts = 1;
        tracing::debug!(
            attempt = 1,
            violations = best.evaluation.violation_count,
            "attempt scored"
        );

        while attempts < self.config.max_attempts
            && best.evaluation.violation_count > self.config.target_violations
        {
            attempts += 1;
            let candidate =
                self.attempt(request, &plan, &allocator, &index, pristine.clone(), rng);
            tracing::debug!(
                attempt = attempts,
                violations = candidate.evaluation.violation_count,
                "attempt scored"
            );
            if candidate.evaluation.violation_count < best.evaluation.violation_count {
                best = candidate;
            }
        }

        if best.evaluation.violation_count > 0 {
            tracing::warn!(
                violations = best.evaluation.violation_count,
                attempts = attempts,
                "residual adjacency violations"
            );
        }
        tracing::info!(
            students = students.len(),
            halls = request.halls.len(),
            mode = %plan.mode,
            violations = best.evaluation.violation_count,
            attempts = attempts,
            "seating complete"
        );

        Ok(self.build_allocation(request, &plan, &students, &index, best, attempts))
    }

    fn check_config(&self) -> Result<(), SeatingError> {
        self.config.validate().map_err(|e| match e {
            ConfigError::Validation(msg) => SeatingError::InvalidConfig(msg),
            other => SeatingError::InvalidConfig(other.to_string()),
        })
    }

    fn attempt<R: Rng + ?Sized>(
        &self,
        request: &SeatingRequest,
        plan: &CapacityPlan,
        allocator: &SeatAllocator<'_>,
        index: &RosterIndex,
        ctx: AllocationContext,
        rng: &mut R,
    ) -> Attempt {
        let (mut matrices, ctx) = allocator.allocate_all(&request.halls, plan.mode, ctx);
        debug_assert!(ctx.is_exhausted());

        if self.config.rebalance_halls && plan.mode == BenchMode::Three {
            let downgraded = downgrade_partial_halls(&mut matrices);
            let merged = rebalance_pairs(&mut matrices);
            tracing::debug!(downgraded = downgraded, merged = merged, "halls rebalanced");
        }

        let adjacency = self.config.adjacency();
        let mut evaluation = Evaluation::default();
        for matrix in &mut matrices {
            randomize_within_groups(matrix, index.group_map(), rng);
            repair(matrix, &index.conflict, self.config.max_repair_passes, adjacency);
            if self.config.random_swap_trials > 0 {
                random_swap_repair(
                    matrix,
                    &index.conflict,
                    self.config.random_swap_trials,
                    adjacency,
                    rng,
                );
            }
            evaluation = evaluation.merge(evaluate(matrix, &index.conflict, adjacency));
            matrix.mark(HallStage::Evaluated);
        }

        Attempt {
            matrices,
            evaluation,
        }
    }

    fn build_allocation(
        &self,
        request: &SeatingRequest,
        plan: &CapacityPlan,
        students: &[Student],
        index: &RosterIndex,
        best: Attempt,
        attempts: usize,
    ) -> Allocation {
        let adjacency = self.config.adjacency();
        let mut halls = Vec::with_capacity(best.matrices.len());
        let mut reports = Vec::with_capacity(best.matrices.len());

        for (hall, mut matrix) in request.halls.iter().zip(best.matrices) {
            matrix.mark(HallStage::Final);
            let conflicted: HashSet<SeatPosition> =
                conflicted_seats(&matrix, &index.conflict, adjacency).into_iter().collect();

            let mut seats_by_row = vec![Vec::new(); matrix.rows()];
            for (pos, idx) in matrix.occupied() {
                let student = &students[idx];
                seats_by_row[pos.row].push(SeatRecord {
                    roll: student.roll.clone(),
                    name: student.name.clone(),
                    branch: student.branch.clone(),
                    subject: student.primary_subject().map(str::to_string),
                    cohort: student.cohort.clone(),
                    batch: student.batch.clone(),
                    group: index.group_key(idx).to_string(),
                    row: pos.row + 1,
                    column: pos.column + 1,
                    bench: pos.bench(),
                    seat: pos.seat_in_bench(),
                    conflict: conflicted.contains(&pos),
                });
            }

            reports.push(HallReport {
                name: hall.name.clone(),
                mode: matrix.mode(),
                filled_seats: matrix.filled_count(),
                capacity: matrix.capacity(),
                violation_count: evaluate(&matrix, &index.conflict, adjacency).violation_count,
            });
            halls.push(HallAllocation {
                name: hall.name.clone(),
                rows: matrix.rows(),
                columns: matrix.columns(),
                mode: matrix.mode(),
                seats_by_row,
            });
        }

        Allocation {
            halls,
            report: AllocationReport {
                mode: plan.mode,
                total_students: students.len(),
                violation_count: best.evaluation.violation_count,
                attempts,
                halls: reports,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StudentRecord;
    use crate::roster::{Branch, KeyStrategy};
    use rand::rngs::SmallRng;

    fn roster(label: &str, prefix: &str, n: usize) -> Roster {
        (1..=n).fold(Roster::new(label), |r, i| {
            r.with_record(StudentRecord::new(format!("{prefix}{i:03}")).with_branch("CSE"))
        })
    }

    #[test]
    fn test_two_cohorts_clean() {
        let request = SeatingRequest::new(
            vec![Hall::new("H1", 4, 9), Hall::new("H2", 4, 9)],
            vec![roster("Y2", "2", 30), roster("Y3", "3", 30)],
        );
        let engine = SeatingEngine::with_config(EngineConfig::new().with_seed(1));
        let allocation = engine.run(&request).unwrap();

        assert_eq!(allocation.report.mode, BenchMode::Three);
        assert_eq!(allocation.seated_count(), 60);
        assert_eq!(allocation.report.violation_count, 0);
        assert_eq!(allocation.report.attempts, 1);
        assert_eq!(allocation.halls[1].mode, BenchMode::Two);
    }

    #[test]
    fn test_rebalance_disabled_keeps_three_per_bench() {
        let request = SeatingRequest::new(
            vec![Hall::new("H1", 4, 9), Hall::new("H2", 4, 9)],
            vec![roster("Y2", "2", 30), roster("Y3", "3", 30)],
        );
        let config = EngineConfig::new().with_seed(1).with_rebalance(false);
        let allocation = SeatingEngine::with_config(config).run(&request).unwrap();

        assert_eq!(allocation.seated_count(), 60);
        assert!(allocation.halls.iter().all(|h| h.mode == BenchMode::Three));
        assert_eq!(allocation.report.halls[1].filled_seats, 24);
        assert_eq!(allocation.report.halls[1].capacity, 36);
    }

    #[test]
    fn test_vertical_toggle_counts_column_neighbours() {
        // One cohort filling a 2x3 hall: 4 horizontal and 3 vertical pairs.
        let request =
            SeatingRequest::new(vec![Hall::new("H1", 2, 3)], vec![roster("Y1", "1", 6)]);
        let flat = EngineConfig::new().with_seed(2).with_max_attempts(1);
        let stacked = flat.clone().with_vertical(true);

        let flat = SeatingEngine::with_config(flat).run(&request).unwrap();
        let stacked = SeatingEngine::with_config(stacked).run(&request).unwrap();

        assert_eq!(flat.report.violation_count, 4);
        assert_eq!(stacked.report.violation_count, 7);
        assert_eq!(stacked.report.halls[0].violation_count, 7);
        assert!(stacked.halls[0].seats().all(|s| s.conflict));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let request =
            SeatingRequest::new(vec![Hall::new("H1", 1, 3)], vec![roster("Y1", "1", 2)]);
        let engine = SeatingEngine::with_config(EngineConfig::new().with_max_attempts(0));
        assert!(matches!(
            engine.run(&request),
            Err(SeatingError::InvalidConfig(_))
        ));
        assert_eq!(
            engine.plan(&request).unwrap_err().to_string(),
            "invalid configuration: max_attempts must be at least 1"
        );
    }

    #[test]
    fn test_capacity_error_before_allocation() {
        let request =
            SeatingRequest::new(vec![Hall::new("H1", 1, 3)], vec![roster("Y1", "1", 4)]);
        let err = SeatingEngine::new().run(&request).unwrap_err();
        assert_eq!(
            err,
            SeatingError::Capacity {
                students: 4,
                capacity: 3
            }
        );
    }

    #[test]
    fn test_invalid_halls_rejected() {
        let request = SeatingRequest::new(
            vec![Hall::new("H1", 1, 3), Hall::new("H1", 1, 3)],
            vec![roster("Y1", "1", 2)],
        );
        assert!(matches!(
            SeatingEngine::new().run(&request),
            Err(SeatingError::InvalidHalls(_))
        ));
    }

    #[test]
    fn test_unsolvable_runs_all_attempts() {
        let request =
            SeatingRequest::new(vec![Hall::new("H1", 1, 3)], vec![roster("Y1", "1", 3)]);
        let engine = SeatingEngine::with_config(EngineConfig::new().with_max_attempts(4));
        let allocation = engine
            .run_with_rng(&request, &mut SmallRng::seed_from_u64(5))
            .unwrap();
        assert_eq!(allocation.report.attempts, 4);
        assert_eq!(allocation.report.violation_count, 2);
        assert_eq!(allocation.seated_count(), 3);
        assert!(allocation.halls[0].seats().all(|s| s.conflict));
    }

    #[test]
    fn test_custom_conflict_extractor() {
        // Grouped by cohort but everyone shares a branch: every neighbour conflicts.
        let request = SeatingRequest::new(
            vec![Hall::new("H1", 1, 6)],
            vec![roster("Y2", "2", 2), roster("Y3", "3", 2)],
        );
        let config = EngineConfig::new().with_seed(3).with_max_attempts(1);
        let engine =
            SeatingEngine::with_config(config).with_conflict_extractor(Arc::new(Branch));
        let allocation = engine.run(&request).unwrap();
        assert_eq!(allocation.report.violation_count, 2);
        assert_eq!(allocation.report.halls[0].violation_count, 2);
    }

    #[test]
    fn test_seat_records_are_one_based() {
        let request =
            SeatingRequest::new(vec![Hall::new("H1", 1, 3)], vec![roster("Y1", "1", 1)]);
        let engine = SeatingEngine::with_config(EngineConfig::new().with_seed(0));
        let allocation = engine.run(&request).unwrap();
        let seat = allocation.halls[0].seats().next().unwrap();
        assert_eq!((seat.row, seat.column, seat.bench, seat.seat), (1, 1, 1, 1));
        assert_eq!(seat.cohort.as_deref(), Some("Y1"));
        assert_eq!(seat.group, "Y1");
        assert!(!seat.conflict);
    }

    #[test]
    fn test_plan_only() {
        let request =
            SeatingRequest::new(vec![Hall::new("H1", 10, 9)], vec![roster("Y1", "1", 50)]);
        let config = EngineConfig::new().with_grouping(KeyStrategy::Branch);
        let engine = SeatingEngine::with_config(config);
        let plan = engine.plan(&request).unwrap();
        assert_eq!(plan.mode, BenchMode::Two);
        assert_eq!(plan.spare_seats(), 10);
        assert_eq!(request.record_count(), 50);
    }
}
