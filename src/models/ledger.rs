//! Ledger summary

use serde::Serialize;
use utoipa::ToSchema;

use super::{book::BookId, identity::CallerIdentity};

/// Public counters of the ledger as of one committed revision
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LedgerSummary {
    pub admin: CallerIdentity,
    /// Last book id handed out, 0 before the first book
    pub book_id_counter: BookId,
    pub books: usize,
    pub members: usize,
    pub outstanding_borrowings: usize,
    pub last_event_id: u64,
    pub revision: u64,
}
