//! Engine error types.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that abort a seating run.
///
/// Residual adjacency violations are not errors; they are reported in
/// [`crate::models::AllocationReport`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeatingError {
    /// No seats-per-bench mode can hold every student.
    #[error("insufficient bench capacity: {students} students, at most {capacity} seats")]
    Capacity {
        /// Students to seat.
        students: usize,
        /// Seats available at three per bench.
        capacity: usize,
    },

    /// Student records were rejected (missing or duplicate roll numbers).
    #[error("malformed roster: {}", join_messages(.0))]
    MalformedRoster(Vec<ValidationError>),

    /// The hall list was rejected.
    #[error("invalid halls: {}", join_messages(.0))]
    InvalidHalls(Vec<ValidationError>),

    /// The engine configuration holds an out-of-range value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_capacity_message() {
        let e = SeatingError::Capacity {
            students: 80,
            capacity: 72,
        };
        assert_eq!(
            e.to_string(),
            "insufficient bench capacity: 80 students, at most 72 seats"
        );
    }

    #[test]
    fn test_roster_message_joins_all_errors() {
        let e = SeatingError::MalformedRoster(vec![
            ValidationError::new(ValidationErrorKind::MissingRollNumber, "record 3"),
            ValidationError::new(ValidationErrorKind::DuplicateRollNumber, "roll 7"),
        ]);
        assert_eq!(e.to_string(), "malformed roster: record 3; roll 7");
    }

    #[test]
    fn test_config_message() {
        let e = SeatingError::InvalidConfig("max_attempts must be at least 1".into());
        assert_eq!(
            e.to_string(),
            "invalid configuration: max_attempts must be at least 1"
        );
    }
}
