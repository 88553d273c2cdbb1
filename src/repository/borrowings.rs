//! Per-member borrowing sequences

use im::{HashMap, Vector};

use crate::{
    error::{AppError, AppResult},
    models::{book::BookId, borrowing::Borrowing, identity::CallerIdentity},
};

#[derive(Debug, Clone, Default)]
pub struct BorrowingsTable {
    by_member: HashMap<CallerIdentity, Vector<Borrowing>>,
}

impl BorrowingsTable {
    /// A member's records in insertion order
    pub fn for_member<'a>(&'a self, member: &CallerIdentity) -> impl Iterator<Item = &'a Borrowing> + 'a {
        self.by_member.get(member).into_iter().flatten()
    }

    /// Position of the most recent outstanding record for this book
    pub fn outstanding_position(&self, member: &CallerIdentity, book_id: BookId) -> Option<usize> {
        self.by_member
            .get(member)?
            .iter()
            .rposition(|b| b.book_id == book_id && b.is_outstanding())
    }

    /// Outstanding records across all members for one book
    pub fn outstanding_for_book(&self, book_id: BookId) -> usize {
        self.by_member
            .values()
            .flatten()
            .filter(|b| b.book_id == book_id && b.is_outstanding())
            .count()
    }

    pub fn outstanding_total(&self) -> usize {
        self.by_member
            .values()
            .flatten()
            .filter(|b| b.is_outstanding())
            .count()
    }

    pub(super) fn push(&mut self, member: CallerIdentity, borrowing: Borrowing) {
        self.by_member
            .entry(member)
            .or_insert_with(Vector::new)
            .push_back(borrowing);
    }

    pub(super) fn get_mut(&mut self, member: &CallerIdentity, position: usize) -> AppResult<&mut Borrowing> {
        self.by_member
            .get_mut(member)
            .and_then(|records| records.get_mut(position))
            .ok_or_else(|| AppError::Internal(format!("No borrowing record {} for {}", position, member)))
    }
}
