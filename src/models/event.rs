//! Ledger event model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{book::BookId, identity::CallerIdentity};

/// Committed state transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type")]
pub enum LedgerEvent {
    UserRegistered {
        user: CallerIdentity,
    },
    BookAdded {
        id: BookId,
        title: String,
        author: String,
        copies: u32,
    },
    BookUpdated {
        id: BookId,
        title: String,
        author: String,
        copies: u32,
    },
    BookBorrowed {
        user: CallerIdentity,
        book_id: BookId,
        borrow_date: DateTime<Utc>,
    },
    BookReturned {
        user: CallerIdentity,
        book_id: BookId,
        return_date: DateTime<Utc>,
    },
}

impl LedgerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::UserRegistered { .. } => "UserRegistered",
            LedgerEvent::BookAdded { .. } => "BookAdded",
            LedgerEvent::BookUpdated { .. } => "BookUpdated",
            LedgerEvent::BookBorrowed { .. } => "BookBorrowed",
            LedgerEvent::BookReturned { .. } => "BookReturned",
        }
    }
}

/// Event log entry; ids start at 1 and follow commit order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventRecord {
    pub id: u64,
    pub recorded_at: DateTime<Utc>,
    pub event: LedgerEvent,
}

/// Event feed query parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventQuery {
    /// Return events with an id strictly greater than this one
    pub after: Option<u64>,
    /// Maximum number of events to return
    pub limit: Option<usize>,
}
