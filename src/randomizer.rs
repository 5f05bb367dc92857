//! Within-group shuffling of allocated seats.
//!
//! Students are permuted only among the seats their own group already
//! occupies, so the group stripe pattern (and therefore every group-level
//! adjacency) is preserved while individual placement becomes random.
//!
//! # Reference
//! Knuth (1997), "The Art of Computer Programming", Vol. 2, §3.4.2
//! (Fisher–Yates shuffle)

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{HallStage, SeatMatrix, SeatPosition, StudentIdx};

/// Shuffles occupants within each group's seats.
///
/// `group_of` maps every [`StudentIdx`] to its group index (see
/// [`crate::roster::RosterIndex::group_map`]). Groups are processed in
/// index order so a seeded `rng` gives reproducible results.
pub fn randomize_within_groups<R: Rng + ?Sized>(
    matrix: &mut SeatMatrix,
    group_of: &[usize],
    rng: &mut R,
) {
    let mut by_group: BTreeMap<usize, (Vec<SeatPosition>, Vec<StudentIdx>)> = BTreeMap::new();
    for (pos, student) in matrix.occupied() {
        let entry = by_group.entry(group_of[student]).or_default();
        entry.0.push(pos);
        entry.1.push(student);
    }

    for (positions, mut members) in by_group.into_values() {
        members.shuffle(rng);
        for (pos, student) in positions.into_iter().zip(members) {
            matrix.set(pos, Some(student));
        }
    }

    matrix.mark(HallStage::Randomized);
}
