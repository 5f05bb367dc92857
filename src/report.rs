//! Render-ready reports derived from an [`Allocation`].
//!
//! - [`HallSummary`]: the door display, one row per branch/group section
//!   with its roll range
//! - [`AttendanceSheet`]: one row per seated student, sorted by group then
//!   roll number
//! - [`MasterPlan`]: every hall with its sections and full roll lists
//!
//! Roll numbers are ordered with [`natural_cmp`], so `"CS9"` sorts before
//! `"CS10"`. Rendering (HTML/PDF) is left to callers.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Allocation, HallAllocation, SeatPosition, SeatRecord};

/// Branch label used when a student has none.
pub const GENERAL_BRANCH: &str = "Gen";

/// Compares strings with embedded numbers by numeric value.
///
/// Digit runs compare as numbers, everything else compares as text. Equal
/// results fall back to plain string order so the ordering is total.
///
/// ```
/// use std::cmp::Ordering;
/// use u_seating::report::natural_cmp;
///
/// assert_eq!(natural_cmp("21CS9", "21CS10"), Ordering::Less);
/// assert_eq!(natural_cmp("B2", "A10"), Ordering::Greater);
/// ```
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut xs, mut ys) = (chunks(a), chunks(b));
    loop {
        match (xs.next(), ys.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (is_number(x), is_number(y)) {
                    (true, true) => cmp_numeric(x, y),
                    _ => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// Splits into maximal runs of digits and non-digits.
fn chunks(s: &str) -> impl Iterator<Item = &str> {
    let mut rest = s;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let digit = first.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != digit)
            .unwrap_or(rest.len());
        let (chunk, tail) = rest.split_at(end);
        rest = tail;
        Some(chunk)
    })
}

fn is_number(chunk: &str) -> bool {
    chunk.starts_with(|c: char| c.is_ascii_digit())
}

fn cmp_numeric(x: &str, y: &str) -> Ordering {
    let (x, y) = (x.trim_start_matches('0'), y.trim_start_matches('0'));
    x.len().cmp(&y.len()).then_with(|| x.cmp(y))
}

fn section_label(seat: &SeatRecord) -> String {
    format!(
        "{} - {}",
        seat.branch.as_deref().unwrap_or(GENERAL_BRANCH),
        seat.group
    )
}

fn sorted_rolls<'a>(seats: impl Iterator<Item = &'a SeatRecord>) -> Vec<String> {
    let mut rolls: Vec<String> = seats.map(|s| s.roll.clone()).collect();
    rolls.sort_by(|a, b| natural_cmp(a, b));
    rolls
}

/// One section of a hall summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Group (subject, cohort, ...) of the section.
    pub group: String,
    /// Branch, if known.
    pub branch: Option<String>,
    /// Primary subject of the first student in the section, if known.
    pub subject: Option<String>,
    /// Lowest roll number.
    pub first_roll: String,
    /// Highest roll number.
    pub last_roll: String,
    /// Students in the section.
    pub count: usize,
}

/// Door summary of one hall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallSummary {
    /// Hall name.
    pub hall: String,
    /// Sections ordered by "branch - group" label.
    pub rows: Vec<SummaryRow>,
}

impl HallSummary {
    /// Builds the summary of one hall.
    pub fn build(hall: &HallAllocation) -> Self {
        let mut sections: BTreeMap<String, Vec<&SeatRecord>> = BTreeMap::new();
        for seat in hall.seats() {
            sections.entry(section_label(seat)).or_default().push(seat);
        }

        let rows = sections
            .into_values()
            .filter_map(|seats| {
                let head = *seats.first()?;
                let rolls = sorted_rolls(seats.iter().copied());
                Some(SummaryRow {
                    group: head.group.clone(),
                    branch: head.branch.clone(),
                    subject: head.subject.clone(),
                    first_roll: rolls.first()?.clone(),
                    last_roll: rolls.last()?.clone(),
                    count: rolls.len(),
                })
            })
            .collect();

        Self {
            hall: hall.name.clone(),
            rows,
        }
    }

    /// Students covered by the summary.
    pub fn total(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }
}

/// One attendance line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRow {
    /// 1-based serial number.
    pub serial: usize,
    /// Roll number.
    pub roll: String,
    /// Student name.
    pub name: String,
    /// Branch, if known.
    pub branch: Option<String>,
    /// Primary subject, if known.
    pub subject: Option<String>,
    /// Seat label, `R{row}-C{column}`.
    pub seat: String,
}

/// Attendance sheet of one hall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSheet {
    /// Hall name.
    pub hall: String,
    /// Lines sorted by group, then roll number.
    pub rows: Vec<AttendanceRow>,
}

impl AttendanceSheet {
    /// Builds the sheet of one hall.
    pub fn build(hall: &HallAllocation) -> Self {
        let mut seats: Vec<&SeatRecord> = hall.seats().collect();
        seats.sort_by(|a, b| a.group.cmp(&b.group).then_with(|| natural_cmp(&a.roll, &b.roll)));

        let rows = seats
            .into_iter()
            .enumerate()
            .map(|(i, s)| AttendanceRow {
                serial: i + 1,
                roll: s.roll.clone(),
                name: s.name.clone(),
                branch: s.branch.clone(),
                subject: s.subject.clone(),
                seat: SeatPosition::new(s.row - 1, s.column - 1).label(),
            })
            .collect();

        Self {
            hall: hall.name.clone(),
            rows,
        }
    }
}

/// One "branch - group" section of the master plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterSection {
    /// Section label, `"{branch} - {group}"`.
    pub label: String,
    /// Roll numbers in natural order.
    pub rolls: Vec<String>,
}

/// Master plan entry for one hall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterHall {
    /// Hall name.
    pub hall: String,
    /// Sections ordered by label.
    pub sections: Vec<MasterSection>,
}

/// Every hall with the roll numbers seated in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterPlan {
    /// Halls ordered by name.
    pub halls: Vec<MasterHall>,
}

impl MasterPlan {
    /// Builds the master plan of an allocation. Empty halls are omitted.
    pub fn build(allocation: &Allocation) -> Self {
        let mut halls: Vec<MasterHall> = allocation
            .halls
            .iter()
            .filter(|h| h.seated_count() > 0)
            .map(|h| {
                let mut sections: BTreeMap<String, Vec<&SeatRecord>> = BTreeMap::new();
                for seat in h.seats() {
                    sections.entry(section_label(seat)).or_default().push(seat);
                }
                MasterHall {
                    hall: h.name.clone(),
                    sections: sections
                        .into_iter()
                        .map(|(label, seats)| MasterSection {
                            label,
                            rolls: sorted_rolls(seats.into_iter()),
                        })
                        .collect(),
                }
            })
            .collect();
        halls.sort_by(|a, b| a.hall.cmp(&b.hall));
        Self { halls }
    }
}

impl Allocation {
    /// Door summaries, in hall order.
    pub fn hall_summaries(&self) -> Vec<HallSummary> {
        self.halls.iter().map(HallSummary::build).collect()
    }

    /// Attendance sheets, in hall order.
    pub fn attendance_sheets(&self) -> Vec<AttendanceSheet> {
        self.halls.iter().map(AttendanceSheet::build).collect()
    }

    /// Master plan.
    pub fn master_plan(&self) -> MasterPlan {
        MasterPlan::build(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AllocationReport, BenchMode};

    fn seat(
        roll: &str,
        branch: Option<&str>,
        group: &str,
        row: usize,
        column: usize,
    ) -> SeatRecord {
        SeatRecord {
            roll: roll.into(),
            name: format!("Student {roll}"),
            branch: branch.map(String::from),
            subject: Some(group.into()),
            cohort: None,
            batch: None,
            group: group.into(),
            row,
            column,
            bench: (column - 1) / 3 + 1,
            seat: (column - 1) % 3 + 1,
            conflict: false,
        }
    }

    fn hall(name: &str, seats: Vec<SeatRecord>) -> HallAllocation {
        HallAllocation {
            name: name.into(),
            rows: 1,
            columns: 9,
            mode: BenchMode::Three,
            seats_by_row: vec![seats],
        }
    }

    fn allocation() -> Allocation {
        Allocation {
            halls: vec![
                hall(
                    "H2",
                    vec![
                        seat("CS10", Some("CSE"), "MA201", 1, 1),
                        seat("EC3", Some("ECE"), "PH101", 1, 2),
                        seat("CS9", Some("CSE"), "MA201", 1, 3),
                        seat("X1", None, "PH101", 1, 4),
                    ],
                ),
                hall("H1", vec![seat("CS1", Some("CSE"), "MA201", 1, 1)]),
                hall("H3", vec![]),
            ],
            report: AllocationReport {
                mode: BenchMode::Three,
                total_students: 5,
                violation_count: 0,
                attempts: 1,
                halls: vec![],
            },
        }
    }

    #[test]
    fn test_natural_cmp() {
        assert_eq!(natural_cmp("CS9", "CS10"), Ordering::Less);
        assert_eq!(natural_cmp("CS010", "CS9"), Ordering::Greater);
        assert_eq!(natural_cmp("21EC1", "21CS1"), Ordering::Greater);
        assert_eq!(natural_cmp("7", "7"), Ordering::Equal);
        assert_eq!(natural_cmp("07", "7"), Ordering::Less);
        assert_eq!(natural_cmp("A", "A1"), Ordering::Less);
        assert_eq!(natural_cmp("", "1"), Ordering::Less);
    }

    #[test]
    fn test_hall_summary() {
        let a = allocation();
        let summary = HallSummary::build(&a.halls[0]);
        assert_eq!(summary.total(), 4);
        let labels: Vec<(&str, &str)> = summary
            .rows
            .iter()
            .map(|r| (r.first_roll.as_str(), r.last_roll.as_str()))
            .collect();
        // "CSE - MA201" < "ECE - PH101" < "Gen - PH101"
        assert_eq!(labels, vec![("CS9", "CS10"), ("EC3", "EC3"), ("X1", "X1")]);
        assert_eq!(summary.rows[0].count, 2);
        assert_eq!(summary.rows[2].branch, None);
    }

    #[test]
    fn test_attendance_order_and_labels() {
        let sheet = AttendanceSheet::build(&allocation().halls[0]);
        let rolls: Vec<&str> = sheet.rows.iter().map(|r| r.roll.as_str()).collect();
        assert_eq!(rolls, vec!["CS9", "CS10", "EC3", "X1"]);
        assert_eq!(sheet.rows[0].serial, 1);
        assert_eq!(sheet.rows[0].seat, "R1-C3");
        assert_eq!(sheet.rows[3].seat, "R1-C4");
    }

    #[test]
    fn test_master_plan() {
        let plan = allocation().master_plan();
        let halls: Vec<&str> = plan.halls.iter().map(|h| h.hall.as_str()).collect();
        assert_eq!(halls, vec!["H1", "H2"]);
        let h2 = &plan.halls[1];
        assert_eq!(h2.sections[0].label, "CSE - MA201");
        assert_eq!(h2.sections[0].rolls, vec!["CS9", "CS10"]);
        assert_eq!(h2.sections[2].label, "Gen - PH101");
    }

    #[test]
    fn test_allocation_shortcuts() {
        let a = allocation();
        assert_eq!(a.hall_summaries().len(), 3);
        assert!(a.attendance_sheets()[2].rows.is_empty());
    }
}
