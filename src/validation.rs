//! Input validation for seating problems.
//!
//! Checks structural integrity of rosters and halls before allocation.
//! Detects:
//! - Records without a roll number
//! - Duplicate roll numbers (across all rosters)
//! - Duplicate hall names
//!
//! Missing optional fields (name, branch, cohort, batch, subject) are not
//! errors; they are counted and reported with `tracing::warn!`, and such
//! students fall into the `"Unknown"` partition group downstream.

use std::collections::{HashMap, HashSet};

use crate::models::{Hall, Roster, StudentRecord};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A student record has no roll number.
    MissingRollNumber,
    /// Two student records share a roll number.
    DuplicateRollNumber,
    /// Two halls share a name.
    DuplicateHallName,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates student rosters.
///
/// Checks:
/// 1. Every record has a non-blank roll number
/// 2. No roll number appears twice, within or across rosters
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_rosters(rosters: &[Roster]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut seen: HashMap<&str, &str> = HashMap::new();
    let mut missing_optional: HashMap<&'static str, usize> = HashMap::new();

    for roster in rosters {
        for (i, record) in roster.records.iter().enumerate() {
            let Some(roll) = record.roll() else {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MissingRollNumber,
                    format!("Roster '{}' record {} has no roll number", roster.label, i + 1),
                ));
                continue;
            };

            if let Some(first) = seen.insert(roll, roster.label.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateRollNumber,
                    format!(
                        "Duplicate roll number '{roll}' (rosters '{first}' and '{}')",
                        roster.label
                    ),
                ));
            }

            for field in missing_fields(record) {
                *missing_optional.entry(field).or_insert(0) += 1;
            }
        }
    }

    let mut fields: Vec<_> = missing_optional.into_iter().collect();
    fields.sort();
    for (field, count) in fields {
        tracing::warn!(
            field = field,
            count = count,
            "student records missing optional field"
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Optional fields left blank in a record.
///
/// A missing cohort is reported even though the roster label fills it in.
fn missing_fields(record: &StudentRecord) -> Vec<&'static str> {
    let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
    [
        ("name", blank(&record.name)),
        ("branch", blank(&record.branch)),
        ("cohort", blank(&record.cohort)),
        ("batch", blank(&record.batch)),
        ("subject", record.subjects.iter().all(|s| s.trim().is_empty())),
    ]
    .into_iter()
    .filter_map(|(field, missing)| missing.then_some(field))
    .collect()
}

/// Validates the hall list.
///
/// Duplicate names are errors. Halls without a single full bench are
/// accepted but reported, since they contribute no capacity.
pub fn validate_halls(halls: &[Hall]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    for hall in halls {
        if !names.insert(hall.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateHallName,
                format!("Duplicate hall name: {}", hall.name),
            ));
        }
        if hall.bench_count() == 0 {
            tracing::warn!(
                hall = %hall.name,
                rows = hall.rows,
                columns = hall.columns,
                "hall has no full bench"
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rosters() -> Vec<Roster> {
        vec![
            Roster::new("Y2")
                .with_record(StudentRecord::new("201").with_branch("CSE"))
                .with_record(StudentRecord::new("202").with_branch("ECE")),
            Roster::new("Y3").with_record(StudentRecord::new("301").with_branch("ME")),
        ]
    }

    #[test]
    fn test_valid_rosters() {
        assert!(validate_rosters(&sample_rosters()).is_ok());
    }

    #[test]
    fn test_missing_roll_number() {
        let mut rosters = sample_rosters();
        rosters[1]
            .records
            .push(StudentRecord::default().with_name("No Roll"));

        let errors = validate_rosters(&rosters).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::MissingRollNumber);
        assert!(errors[0].message.contains("Y3"));
    }

    #[test]
    fn test_duplicate_roll_across_rosters() {
        let mut rosters = sample_rosters();
        rosters[1].records.push(StudentRecord::new("201"));

        let errors = validate_rosters(&rosters).unwrap_err();
        assert!(errors.iter().any(
            |e| e.kind == ValidationErrorKind::DuplicateRollNumber && e.message.contains("201")
        ));
    }

    #[test]
    fn test_missing_optional_fields_are_not_errors() {
        let rosters = vec![Roster::new("Y1").with_record(StudentRecord::new("1"))];
        assert!(validate_rosters(&rosters).is_ok());
    }

    #[test]
    fn test_missing_fields_include_cohort() {
        let bare = StudentRecord::new("1");
        assert_eq!(
            missing_fields(&bare),
            vec!["name", "branch", "cohort", "batch", "subject"]
        );

        let full = StudentRecord::new("2")
            .with_name("Asha")
            .with_branch("CSE")
            .with_cohort("Y2")
            .with_batch("B1")
            .with_subject("CS201");
        assert!(missing_fields(&full).is_empty());
        assert_eq!(missing_fields(&full.with_subject(" ")), Vec::<&str>::new());
    }

    #[test]
    fn test_multiple_errors() {
        let rosters = vec![Roster::new("Y1")
            .with_record(StudentRecord::default())
            .with_record(StudentRecord::new(" "))
            .with_record(StudentRecord::new("5"))
            .with_record(StudentRecord::new("5"))];

        let errors = validate_rosters(&rosters).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_duplicate_hall_name() {
        let halls = vec![Hall::new("H1", 2, 6), Hall::new("H1", 3, 9)];
        let errors = validate_halls(&halls).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::DuplicateHallName);
    }

    #[test]
    fn test_benchless_hall_is_accepted() {
        let halls = vec![Hall::new("Tiny", 3, 2)];
        assert!(validate_halls(&halls).is_ok());
    }
}
