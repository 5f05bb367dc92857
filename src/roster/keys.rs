//! Built-in partition and conflict key extractors.
//!
//! # Categories
//!
//! - **Department**: [`Branch`]
//! - **Paper**: [`Subject`] (primary subject/elective code)
//! - **Cohort**: [`Cohort`], [`CohortPair`] (synthetic "A"/"B" labels)
//! - **Section**: [`Batch`]
//!
//! A missing key is reported as `None`; partitioning maps it to
//! [`UNKNOWN_GROUP`](super::UNKNOWN_GROUP).

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::Arc;

use super::KeyExtractor;
use crate::models::{Roster, Student};

/// Groups by branch/department.
#[derive(Debug, Clone, Copy)]
pub struct Branch;

impl KeyExtractor for Branch {
    fn name(&self) -> &'static str {
        "branch"
    }

    fn key<'a>(&self, student: &'a Student) -> Option<Cow<'a, str>> {
        student.branch.as_deref().map(Cow::Borrowed)
    }
}

/// Groups by primary subject or elective code.
#[derive(Debug, Clone, Copy)]
pub struct Subject;

impl KeyExtractor for Subject {
    fn name(&self) -> &'static str {
        "subject"
    }

    fn key<'a>(&self, student: &'a Student) -> Option<Cow<'a, str>> {
        student.primary_subject().map(Cow::Borrowed)
    }
}

/// Groups by cohort ("year") label.
#[derive(Debug, Clone, Copy)]
pub struct Cohort;

impl KeyExtractor for Cohort {
    fn name(&self) -> &'static str {
        "cohort"
    }

    fn key<'a>(&self, student: &'a Student) -> Option<Cow<'a, str>> {
        student.cohort.as_deref().map(Cow::Borrowed)
    }
}

/// Groups by batch.
#[derive(Debug, Clone, Copy)]
pub struct Batch;

impl KeyExtractor for Batch {
    fn name(&self) -> &'static str {
        "batch"
    }

    fn key<'a>(&self, student: &'a Student) -> Option<Cow<'a, str>> {
        student.batch.as_deref().map(Cow::Borrowed)
    }
}

/// Merges exactly two rosters under the synthetic labels `"A"` and `"B"`.
///
/// The label follows the roster a student was loaded from, not the
/// student's own cohort field, so records carrying their own year column
/// still split cleanly. Students of any other roster have no key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohortPair {
    first: String,
    second: String,
}

impl CohortPair {
    /// Label given to the first cohort.
    pub const FIRST_LABEL: &'static str = "A";
    /// Label given to the second cohort.
    pub const SECOND_LABEL: &'static str = "B";

    /// Creates the pairing for the labels of rosters 0 and 1.
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Roster label behind a synthetic one.
    pub fn original(&self, synthetic: &str) -> Option<&str> {
        match synthetic {
            Self::FIRST_LABEL => Some(&self.first),
            Self::SECOND_LABEL => Some(&self.second),
            _ => None,
        }
    }
}

impl KeyExtractor for CohortPair {
    fn name(&self) -> &'static str {
        "cohort-pair"
    }

    fn key<'a>(&self, student: &'a Student) -> Option<Cow<'a, str>> {
        match student.roster {
            0 => Some(Cow::Borrowed(Self::FIRST_LABEL)),
            1 => Some(Cow::Borrowed(Self::SECOND_LABEL)),
            _ => None,
        }
    }
}

/// Serializable choice of a built-in extractor, used by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategy {
    /// [`Branch`].
    Branch,
    /// [`Subject`].
    Subject,
    /// [`Cohort`]; becomes [`CohortPair`] when exactly two rosters are merged.
    #[default]
    Cohort,
    /// [`Batch`].
    Batch,
}

impl KeyStrategy {
    /// Instantiates the extractor.
    pub fn extractor(self) -> Arc<dyn KeyExtractor> {
        match self {
            KeyStrategy::Branch => Arc::new(Branch),
            KeyStrategy::Subject => Arc::new(Subject),
            KeyStrategy::Cohort => Arc::new(Cohort),
            KeyStrategy::Batch => Arc::new(Batch),
        }
    }

    /// Instantiates the extractor for a concrete set of rosters.
    ///
    /// Cohort grouping over exactly two rosters uses [`CohortPair`] so the
    /// two cohorts alternate as `"A"`/`"B"`.
    pub fn resolve(self, rosters: &[Roster]) -> Arc<dyn KeyExtractor> {
        match (self, rosters) {
            (KeyStrategy::Cohort, [first, second]) => {
                Arc::new(CohortPair::new(first.label.as_str(), second.label.as_str()))
            }
            _ => self.extractor(),
        }
    }
}
