//! Engine configuration.
//!
//! [`EngineConfig`] is plain serde data: every field has a default, so a
//! JSON document only needs the keys it overrides.
//!
//! ```
//! use u_seating::config::EngineConfig;
//! use u_seating::roster::KeyStrategy;
//!
//! let config = EngineConfig::from_json_str(r#"{ "grouping": "subject", "seed": 7 }"#).unwrap();
//! assert_eq!(config.grouping, KeyStrategy::Subject);
//! assert_eq!(config.max_attempts, 10);
//! assert!(config.neighbor_guard_enabled());
//! ```

use serde::{Deserialize, Serialize};

use crate::evaluator::Adjacency;
use crate::optimizer::DEFAULT_MAX_PASSES;
use crate::roster::KeyStrategy;

/// Tuning knobs for a seating run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Partition key used to build the allocation groups.
    pub grouping: KeyStrategy,
    /// Conflict key checked between neighbours; defaults to `grouping`.
    pub conflict: Option<KeyStrategy>,
    /// Allocation attempts; the best one is kept.
    pub max_attempts: usize,
    /// Stop early once an attempt has at most this many violations.
    pub target_violations: usize,
    /// Scan passes per hall during repair.
    pub max_repair_passes: usize,
    /// Random swap trials per hall after scan repair (0 disables).
    pub random_swap_trials: usize,
    /// Count front/back neighbours as adjacent.
    pub check_vertical: bool,
    /// Allocator neighbor guard; defaults to on for subject grouping.
    pub neighbor_guard: Option<bool>,
    /// Repack lightly filled halls to two per bench after allocation.
    pub rebalance_halls: bool,
    /// RNG seed for reproducible runs; OS entropy when absent.
    pub seed: Option<u64>,
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self {
            grouping: KeyStrategy::default(),
            conflict: None,
            max_attempts: 10,
            target_violations: 0,
            max_repair_passes: DEFAULT_MAX_PASSES,
            random_swap_trials: 2000,
            check_vertical: false,
            neighbor_guard: None,
            rebalance_halls: true,
            seed: None,
        }
    }

    /// Sets the grouping key.
    pub fn with_grouping(mut self, grouping: KeyStrategy) -> Self {
        self.grouping = grouping;
        self
    }

    /// Sets the conflict key.
    pub fn with_conflict(mut self, conflict: KeyStrategy) -> Self {
        self.conflict = Some(conflict);
        self
    }

    /// Sets the number of attempts.
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the early-stop violation target.
    pub fn with_target_violations(mut self, target: usize) -> Self {
        self.target_violations = target;
        self
    }

    /// Sets the repair pass bound.
    pub fn with_max_repair_passes(mut self, passes: usize) -> Self {
        self.max_repair_passes = passes;
        self
    }

    /// Sets the random swap trial bound.
    pub fn with_random_swap_trials(mut self, trials: usize) -> Self {
        self.random_swap_trials = trials;
        self
    }

    /// Enables or disables vertical adjacency checks.
    pub fn with_vertical(mut self, enabled: bool) -> Self {
        self.check_vertical = enabled;
        self
    }

    /// Forces the neighbor guard on or off.
    pub fn with_neighbor_guard(mut self, enabled: bool) -> Self {
        self.neighbor_guard = Some(enabled);
        self
    }

    /// Enables or disables hall rebalancing.
    pub fn with_rebalance(mut self, enabled: bool) -> Self {
        self.rebalance_halls = enabled;
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Effective conflict key.
    pub fn conflict_strategy(&self) -> KeyStrategy {
        self.conflict.unwrap_or(self.grouping)
    }

    /// Effective neighbor guard setting.
    pub fn neighbor_guard_enabled(&self) -> bool {
        self.neighbor_guard.unwrap_or(self.grouping == KeyStrategy::Subject)
    }

    /// Adjacency used by repair and evaluation.
    pub fn adjacency(&self) -> Adjacency {
        Adjacency::horizontal().with_vertical(self.check_vertical)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    /// [`ConfigError::Validation`] when `max_attempts` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    /// [`ConfigError::Parse`] for malformed JSON or unknown values, and
    /// [`ConfigError::Validation`] for out-of-range settings.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    /// [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Serializes to pretty JSON.
    ///
    /// # Errors
    /// [`ConfigError::Parse`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading a configuration file.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Out-of-range value.
    #[error("configuration validation failed: {0}")]
    Validation(String),
}
