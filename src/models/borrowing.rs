//! Borrowing record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::book::BookId;

/// Lifecycle of a single borrowing record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BorrowingState {
    Outstanding,
    Returned,
}

/// One borrow of one book by one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Borrowing {
    pub book_id: BookId,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub returned: bool,
}

impl Borrowing {
    pub fn open(book_id: BookId, borrow_date: DateTime<Utc>) -> Self {
        Self {
            book_id,
            borrow_date,
            return_date: None,
            returned: false,
        }
    }

    pub fn is_outstanding(&self) -> bool {
        !self.returned
    }

    pub fn state(&self) -> BorrowingState {
        if self.returned {
            BorrowingState::Returned
        } else {
            BorrowingState::Outstanding
        }
    }

    /// Close the record; a returned record is terminal
    pub fn close(&mut self, return_date: DateTime<Utc>) {
        self.returned = true;
        self.return_date = Some(return_date);
    }
}

/// Borrowing joined with the catalog entry it refers to
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BorrowingDetails {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub returned: bool,
    pub state: BorrowingState,
}
