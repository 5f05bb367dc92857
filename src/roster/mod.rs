//! Roster partitioning and student lookup maps.
//!
//! Splits the student arena into named groups with a pluggable
//! [`KeyExtractor`] and builds the reverse maps used downstream:
//! student → group and student → conflict key.
//!
//! # Group Order
//!
//! The allocator rotates over groups in a fixed order: size descending,
//! ties broken by key. Students without a key share the
//! [`UNKNOWN_GROUP`] bucket.

pub mod keys;

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;

use crate::error::SeatingError;
use crate::models::{Roster, Student, StudentIdx};
use crate::validation::validate_rosters;

pub use keys::{Batch, Branch, Cohort, CohortPair, KeyStrategy, Subject};

/// Group key assigned to students whose extractor yields nothing.
pub const UNKNOWN_GROUP: &str = "Unknown";

/// Extracts a partition or conflict key from a student.
///
/// Implementations must be deterministic: the same student always yields
/// the same key.
pub trait KeyExtractor: Send + Sync + Debug {
    /// Short identifier (e.g., "branch").
    fn name(&self) -> &'static str;

    /// Key for `student`, `None` when the attribute is missing.
    fn key<'a>(&self, student: &'a Student) -> Option<Cow<'a, str>>;

    /// Key with missing values mapped to [`UNKNOWN_GROUP`].
    fn key_or_unknown<'a>(&self, student: &'a Student) -> Cow<'a, str> {
        self.key(student).unwrap_or(Cow::Borrowed(UNKNOWN_GROUP))
    }
}

/// Splits students into groups keyed by `extractor`.
///
/// Members keep arena order. The map is ordered by key, so the result is
/// deterministic.
pub fn partition(
    students: &[Student],
    extractor: &dyn KeyExtractor,
) -> BTreeMap<String, Vec<StudentIdx>> {
    let mut groups: BTreeMap<String, Vec<StudentIdx>> = BTreeMap::new();
    for (idx, student) in students.iter().enumerate() {
        groups
            .entry(extractor.key_or_unknown(student).into_owned())
            .or_default()
            .push(idx);
    }
    groups
}

/// A named bucket of students sharing a partition key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Partition key.
    pub key: String,
    /// Members in arena order.
    pub members: Vec<StudentIdx>,
}

impl Group {
    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Interned conflict keys, one per student.
///
/// Two students conflict when their key ids are equal. Missing keys intern
/// to [`UNKNOWN_GROUP`] and therefore conflict with each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictKeys {
    ids: Vec<usize>,
    labels: Vec<String>,
}

impl ConflictKeys {
    /// Interns the conflict key of every student.
    pub fn build(students: &[Student], extractor: &dyn KeyExtractor) -> Self {
        let mut interned: HashMap<String, usize> = HashMap::new();
        let mut labels = Vec::new();
        let ids = students
            .iter()
            .map(|s| {
                let key = extractor.key_or_unknown(s);
                if let Some(&id) = interned.get(key.as_ref()) {
                    return id;
                }
                let id = labels.len();
                labels.push(key.to_string());
                interned.insert(key.into_owned(), id);
                id
            })
            .collect();
        Self { ids, labels }
    }

    /// Builds keys directly from labels, one per student.
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut interned: HashMap<&str, usize> = HashMap::new();
        let mut distinct = Vec::new();
        let ids = labels
            .iter()
            .map(|l| {
                let l = l.as_ref();
                *interned.entry(l).or_insert_with(|| {
                    distinct.push(l.to_string());
                    distinct.len() - 1
                })
            })
            .collect();
        Self {
            ids,
            labels: distinct,
        }
    }

    /// Interned key id of a student.
    #[inline]
    pub fn id(&self, student: StudentIdx) -> usize {
        self.ids[student]
    }

    /// Whether two students share a conflict key.
    #[inline]
    pub fn same(&self, a: StudentIdx, b: StudentIdx) -> bool {
        self.ids[a] == self.ids[b]
    }

    /// Key label of a student.
    pub fn label(&self, student: StudentIdx) -> &str {
        &self.labels[self.ids[student]]
    }

    /// Number of students covered.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no student is covered.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of distinct keys.
    pub fn distinct(&self) -> usize {
        self.labels.len()
    }
}

/// Partition groups plus reverse lookups for one run.
#[derive(Debug, Clone)]
pub struct RosterIndex {
    /// Groups in allocation order (size descending, then key).
    pub groups: Vec<Group>,
    group_of: Vec<usize>,
    /// Conflict keys.
    pub conflict: ConflictKeys,
}

impl RosterIndex {
    /// Partitions `students` with `grouping` and interns `conflict` keys.
    pub fn build(
        students: &[Student],
        grouping: &dyn KeyExtractor,
        conflict: &dyn KeyExtractor,
    ) -> Self {
        let mut groups: Vec<Group> = partition(students, grouping)
            .into_iter()
            .map(|(key, members)| Group { key, members })
            .collect();
        // BTreeMap already yields keys ascending; stable sort keeps that for ties.
        groups.sort_by(|a, b| b.len().cmp(&a.len()));

        let mut group_of = vec![0; students.len()];
        for (g, group) in groups.iter().enumerate() {
            for &s in &group.members {
                group_of[s] = g;
            }
        }

        Self {
            groups,
            group_of,
            conflict: ConflictKeys::build(students, conflict),
        }
    }

    /// Group index of a student.
    #[inline]
    pub fn group_of(&self, student: StudentIdx) -> usize {
        self.group_of[student]
    }

    /// Reverse map student → group index, indexed by [`StudentIdx`].
    pub fn group_map(&self) -> &[usize] {
        &self.group_of
    }

    /// Group key of a student.
    pub fn group_key(&self, student: StudentIdx) -> &str {
        &self.groups[self.group_of[student]].key
    }

    /// Number of indexed students.
    pub fn student_count(&self) -> usize {
        self.group_of.len()
    }
}

/// Validates rosters and converts them into the student arena.
///
/// Each roster's label becomes the cohort of its records that carry none,
/// and every student remembers the position of its roster.
///
/// # Errors
/// [`SeatingError::MalformedRoster`] listing every missing or duplicate
/// roll number.
pub fn collect_students(rosters: &[Roster]) -> Result<Vec<Student>, SeatingError> {
    validate_rosters(rosters).map_err(SeatingError::MalformedRoster)?;
    Ok(rosters
        .iter()
        .enumerate()
        .flat_map(|(i, r)| {
            r.records.iter().filter_map(move |rec| {
                rec.to_student(Some(r.label.as_str()))
                    .map(|s| s.with_roster(i))
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StudentRecord;

    fn students() -> Vec<Student> {
        vec![
            Student::new("1").with_branch("CSE"),
            Student::new("2").with_branch("ECE"),
            Student::new("3").with_branch("CSE"),
            Student::new("4"),
            Student::new("5").with_branch("ME"),
            Student::new("6").with_branch("ECE"),
            Student::new("7").with_branch("CSE"),
        ]
    }

    #[test]
    fn test_partition_with_unknown() {
        let groups = partition(&students(), &Branch);
        assert_eq!(groups["CSE"], vec![0, 2, 6]);
        assert_eq!(groups["ECE"], vec![1, 5]);
        assert_eq!(groups[UNKNOWN_GROUP], vec![3]);
        assert_eq!(groups.values().map(Vec::len).sum::<usize>(), 7);
    }

    #[test]
    fn test_group_order_size_then_key() {
        let index = RosterIndex::build(&students(), &Branch, &Branch);
        let keys: Vec<&str> = index.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["CSE", "ECE", "ME", "Unknown"]);
        assert_eq!(index.group_of(5), 1);
        assert_eq!(index.group_key(3), "Unknown");
        assert_eq!(index.student_count(), 7);
    }

    #[test]
    fn test_conflict_keys_interned() {
        let keys = ConflictKeys::build(&students(), &Branch);
        assert!(keys.same(0, 2));
        assert!(!keys.same(0, 1));
        assert_eq!(keys.label(4), "ME");
        assert_eq!(keys.distinct(), 4);
        assert_eq!(keys.len(), 7);
    }

    #[test]
    fn test_conflict_keys_from_labels() {
        let keys = ConflictKeys::from_labels(&["A", "B", "A"]);
        assert!(keys.same(0, 2));
        assert_eq!(keys.id(1), 1);
        assert_eq!(keys.distinct(), 2);
    }

    #[test]
    fn test_collect_students_defaults_cohort() {
        let rosters = vec![
            Roster::new("Y2").with_record(StudentRecord::new("201")),
            Roster::new("Y3")
                .with_record(StudentRecord::new("301"))
                .with_record(StudentRecord::new("302").with_cohort("Y4")),
        ];
        let students = collect_students(&rosters).unwrap();
        let cohorts: Vec<_> = students.iter().map(|s| s.cohort.as_deref()).collect();
        assert_eq!(cohorts, vec![Some("Y2"), Some("Y3"), Some("Y4")]);
        let positions: Vec<_> = students.iter().map(|s| s.roster).collect();
        assert_eq!(positions, vec![0, 1, 1]);
    }

    #[test]
    fn test_cohort_pair_groups_by_source_roster() {
        // File labels differ from the year column carried by the records.
        let rosters = vec![
            (1..=4).fold(Roster::new("S3"), |r, i| {
                r.with_record(StudentRecord::new(format!("3{i}")).with_cohort("2"))
            }),
            (1..=3).fold(Roster::new("S5"), |r, i| {
                r.with_record(StudentRecord::new(format!("5{i}")).with_cohort("3"))
            }),
        ];
        let students = collect_students(&rosters).unwrap();
        let pair = KeyStrategy::Cohort.resolve(&rosters);
        let index = RosterIndex::build(&students, pair.as_ref(), pair.as_ref());

        let keys: Vec<&str> = index.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert_eq!(index.groups[0].members, vec![0, 1, 2, 3]);
        assert!(!index.conflict.same(0, 4));
    }

    #[test]
    fn test_cohort_pair_with_shared_labels() {
        let rosters = vec![
            Roster::new("Y2").with_record(StudentRecord::new("1")),
            Roster::new("Y2").with_record(StudentRecord::new("2")),
        ];
        let students = collect_students(&rosters).unwrap();
        let pair = KeyStrategy::Cohort.resolve(&rosters);
        let index = RosterIndex::build(&students, pair.as_ref(), pair.as_ref());
        assert_eq!(index.group_key(0), "A");
        assert_eq!(index.group_key(1), "B");
    }

    #[test]
    fn test_collect_students_rejects_duplicates() {
        let rosters = vec![Roster::new("Y2")
            .with_record(StudentRecord::new("1"))
            .with_record(StudentRecord::new("1"))];
        assert!(matches!(
            collect_students(&rosters),
            Err(SeatingError::MalformedRoster(errors)) if errors.len() == 1
        ));
    }
}
