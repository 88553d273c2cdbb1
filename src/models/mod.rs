//! Data models for the lending ledger

pub mod book;
pub mod borrowing;
pub mod event;
pub mod identity;
pub mod ledger;
pub mod member;

// Re-export commonly used types
pub use book::{Book, BookDetails, BookId, BookUpdate, NewBook};
pub use borrowing::{Borrowing, BorrowingDetails, BorrowingState};
pub use event::{EventQuery, EventRecord, LedgerEvent};
pub use identity::{Caller, CallerIdentity};
pub use ledger::LedgerSummary;
pub use member::Member;
