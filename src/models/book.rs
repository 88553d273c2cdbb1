//! Book (catalog entry) model and related types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Sequential book identifier, starting at 1 and never reused
pub type BookId = u64;

/// Catalog entry with its copy counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub total_copies: u32,
    /// Always within `0..=total_copies`
    pub available_copies: u32,
    pub exists: bool,
}

impl Book {
    /// Number of copies currently lent out
    pub fn on_loan(&self) -> u32 {
        self.total_copies - self.available_copies
    }

    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    pub fn details(&self) -> BookDetails {
        BookDetails {
            title: self.title.clone(),
            author: self.author.clone(),
            total_copies: self.total_copies,
            available_copies: self.available_copies,
        }
    }
}

/// Book fields returned by a details lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookDetails {
    pub title: String,
    pub author: String,
    pub total_copies: u32,
    pub available_copies: u32,
}

/// Add book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: String,
    /// Total number of copies (must be positive)
    #[validate(range(min = 1, message = "Copies must be a positive number"))]
    pub copies: i64,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>, copies: i64) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            copies,
        }
    }

    /// Validated copy count
    pub fn total_copies(&self) -> AppResult<u32> {
        self.validate()?;
        copies_from(self.copies)
    }
}

/// Update book request; every field is replaced
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookUpdate {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: String,
    #[validate(range(min = 1, message = "Copies must be a positive number"))]
    pub copies: i64,
}

impl BookUpdate {
    pub fn new(title: impl Into<String>, author: impl Into<String>, copies: i64) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            copies,
        }
    }

    pub fn total_copies(&self) -> AppResult<u32> {
        self.validate()?;
        copies_from(self.copies)
    }
}

fn copies_from(copies: i64) -> AppResult<u32> {
    u32::try_from(copies)
        .ok()
        .filter(|c| *c > 0)
        .ok_or_else(|| AppError::InvalidArgument(format!("Invalid number of copies: {}", copies)))
}
