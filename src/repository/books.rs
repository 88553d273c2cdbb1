//! Books table

use im::OrdMap;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookId},
};

#[derive(Debug, Clone, Default)]
pub struct BooksTable {
    rows: OrdMap<BookId, Book>,
    last_id: BookId,
}

impl BooksTable {
    /// Get a book, failing with `NotFound` for an id never created
    pub fn get_existing(&self, id: BookId) -> AppResult<&Book> {
        self.rows
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// All books in ascending id order
    pub fn all(&self) -> Vec<Book> {
        self.rows.values().cloned().collect()
    }

    /// Last id handed out, 0 before the first book
    pub fn last_id(&self) -> BookId {
        self.last_id
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(super) fn insert(&mut self, title: String, author: String, copies: u32) -> Book {
        self.last_id += 1;
        let book = Book {
            id: self.last_id,
            title,
            author,
            total_copies: copies,
            available_copies: copies,
            exists: true,
        };
        self.rows.insert(book.id, book.clone());
        book
    }

    pub(super) fn get_mut(&mut self, id: BookId) -> AppResult<&mut Book> {
        self.rows
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    #[cfg(test)]
    pub(super) fn shares_rows_with(&self, other: &Self) -> bool {
        self.rows.ptr_eq(&other.rows)
    }
}
