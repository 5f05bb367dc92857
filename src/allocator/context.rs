//! Group consumption state threaded through the hall fold.

use crate::models::StudentIdx;
use crate::roster::RosterIndex;

/// Groups in rotation order plus a consumption pointer per group.
///
/// Pointers only move forward and never pass the group length, so each
/// student is handed out at most once per context. Attempts clone a
/// pristine context instead of resetting one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationContext {
    groups: Vec<Vec<StudentIdx>>,
    pointers: Vec<usize>,
}

impl AllocationContext {
    /// Creates a context over explicit member lists.
    pub fn new(groups: Vec<Vec<StudentIdx>>) -> Self {
        let pointers = vec![0; groups.len()];
        Self { groups, pointers }
    }

    /// Creates a context over the index's groups, in allocation order.
    pub fn from_index(index: &RosterIndex) -> Self {
        Self::new(index.groups.iter().map(|g| g.members.clone()).collect())
    }

    /// Number of groups in the rotation.
    #[inline]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Next unallocated member of group `g`.
    #[inline]
    pub fn peek(&self, g: usize) -> Option<StudentIdx> {
        self.groups[g].get(self.pointers[g]).copied()
    }

    /// Hands out the next member of group `g` and advances its pointer.
    pub fn take(&mut self, g: usize) -> Option<StudentIdx> {
        let next = self.peek(g)?;
        self.pointers[g] += 1;
        Some(next)
    }

    /// Members of group `g` not yet allocated.
    #[inline]
    pub fn remaining(&self, g: usize) -> usize {
        self.groups[g].len() - self.pointers[g]
    }

    /// Members not yet allocated, across all groups.
    pub fn total_remaining(&self) -> usize {
        (0..self.groups.len()).map(|g| self.remaining(g)).sum()
    }

    /// Whether every group is exhausted.
    pub fn is_exhausted(&self) -> bool {
        self.total_remaining() == 0
    }

    /// Current pointer of group `g`.
    #[inline]
    pub fn pointer(&self, g: usize) -> usize {
        self.pointers[g]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_advances_pointer() {
        let mut ctx = AllocationContext::new(vec![vec![4, 5], vec![9]]);
        assert_eq!(ctx.total_remaining(), 3);
        assert_eq!(ctx.peek(0), Some(4));
        assert_eq!(ctx.take(0), Some(4));
        assert_eq!(ctx.pointer(0), 1);
        assert_eq!(ctx.take(1), Some(9));
        assert_eq!(ctx.take(1), None);
        assert_eq!(ctx.pointer(1), 1);
        assert_eq!(ctx.remaining(0), 1);
        assert!(!ctx.is_exhausted());
        ctx.take(0);
        assert!(ctx.is_exhausted());
    }

    #[test]
    fn test_clone_is_independent() {
        let pristine = AllocationContext::new(vec![vec![0, 1]]);
        let mut attempt = pristine.clone();
        attempt.take(0);
        assert_eq!(pristine.pointer(0), 0);
        assert_eq!(attempt.pointer(0), 1);
    }
}
