//! Student (exam candidate) model.
//!
//! A student is identified by a unique roll number and carries the
//! attributes used for partitioning and conflict checks: branch, cohort,
//! batch and subject/elective codes.
//!
//! Raw input arrives as [`StudentRecord`]s grouped into [`Roster`]s (one per
//! uploaded cohort file). Validation turns records into [`Student`]s.

use serde::{Deserialize, Serialize};

/// Index of a student in the run's student arena.
pub type StudentIdx = usize;

/// An exam candidate.
///
/// Immutable once loaded. All downstream structures refer to students by
/// [`StudentIdx`] rather than holding copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Unique roll number.
    pub roll: String,
    /// Display name (may be empty).
    pub name: String,
    /// Branch or department.
    pub branch: Option<String>,
    /// Cohort label ("year").
    pub cohort: Option<String>,
    /// Batch label.
    pub batch: Option<String>,
    /// Subject or elective codes, primary first.
    pub subjects: Vec<String>,
    /// Position of the source roster in the run's roster list.
    #[serde(default)]
    pub roster: usize,
}

/// A raw student record as produced by the ingestion layer.
///
/// Every field is optional; [`crate::validation::validate_rosters`] decides
/// which omissions are tolerated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentRecord {
    /// Roll number (required for seating).
    pub roll_number: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Branch or department.
    pub branch: Option<String>,
    /// Cohort label.
    pub cohort: Option<String>,
    /// Batch label.
    pub batch: Option<String>,
    /// Subject or elective codes.
    pub subjects: Vec<String>,
}

/// A labelled list of student records, typically one cohort file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    /// Roster label; becomes the cohort of records that carry none.
    pub label: String,
    /// Records in file order.
    pub records: Vec<StudentRecord>,
}

impl Student {
    /// Creates a student with the given roll number.
    pub fn new(roll: impl Into<String>) -> Self {
        Self {
            roll: roll.into(),
            name: String::new(),
            branch: None,
            cohort: None,
            batch: None,
            subjects: Vec::new(),
            roster: 0,
        }
    }

    /// Sets the source roster position.
    pub fn with_roster(mut self, roster: usize) -> Self {
        self.roster = roster;
        self
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the branch.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Sets the cohort label.
    pub fn with_cohort(mut self, cohort: impl Into<String>) -> Self {
        self.cohort = Some(cohort.into());
        self
    }

    /// Sets the batch label.
    pub fn with_batch(mut self, batch: impl Into<String>) -> Self {
        self.batch = Some(batch.into());
        self
    }

    /// Adds a subject or elective code.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subjects.push(subject.into());
        self
    }

    /// Primary subject code, if any.
    pub fn primary_subject(&self) -> Option<&str> {
        self.subjects.first().map(|s| s.as_str())
    }
}

impl StudentRecord {
    /// Creates a record with the given roll number.
    pub fn new(roll_number: impl Into<String>) -> Self {
        Self {
            roll_number: Some(roll_number.into()),
            ..Default::default()
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the branch.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Sets the cohort label.
    pub fn with_cohort(mut self, cohort: impl Into<String>) -> Self {
        self.cohort = Some(cohort.into());
        self
    }

    /// Sets the batch label.
    pub fn with_batch(mut self, batch: impl Into<String>) -> Self {
        self.batch = Some(batch.into());
        self
    }

    /// Adds a subject code.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subjects.push(subject.into());
        self
    }

    /// Trimmed roll number, `None` when absent or blank.
    pub fn roll(&self) -> Option<&str> {
        non_blank(self.roll_number.as_deref())
    }

    /// Converts into a [`Student`], using `default_cohort` when the record
    /// carries no cohort.
    ///
    /// Returns `None` when the roll number is missing.
    pub fn to_student(&self, default_cohort: Option<&str>) -> Option<Student> {
        let roll = self.roll()?;
        Some(Student {
            roll: roll.to_string(),
            name: non_blank(self.name.as_deref()).unwrap_or_default().to_string(),
            branch: non_blank(self.branch.as_deref()).map(str::to_string),
            cohort: non_blank(self.cohort.as_deref())
                .or(default_cohort)
                .map(str::to_string),
            batch: non_blank(self.batch.as_deref()).map(str::to_string),
            subjects: self
                .subjects
                .iter()
                .filter_map(|s| non_blank(Some(s)))
                .map(str::to_string)
                .collect(),
            roster: 0,
        })
    }
}

impl Roster {
    /// Creates an empty roster.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            records: Vec::new(),
        }
    }

    /// Adds a record.
    pub fn with_record(mut self, record: StudentRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the roster has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
