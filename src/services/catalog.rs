//! Catalog management service

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookDetails, BookId, BookUpdate, NewBook},
        event::LedgerEvent,
        identity::CallerIdentity,
    },
    repository::Repository,
    services::{
        identity::IdentityService,
        policy::{self, Operation},
    },
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    identity: IdentityService,
}

impl CatalogService {
    pub fn new(repository: Repository, identity: IdentityService) -> Self {
        Self {
            repository,
            identity,
        }
    }

    /// Add a new book with all copies available (admin only)
    pub async fn add_book(&self, caller: &CallerIdentity, book: &NewBook) -> AppResult<Book> {
        let mut tx = self.repository.begin().await?;
        let status = self.identity.caller_in(tx.state(), caller);
        policy::check(Some(&status), Operation::AddBook, None).into_result(Operation::AddBook)?;

        let copies = book.total_copies()?;
        let created = tx.insert_book(book.title.clone(), book.author.clone(), copies);
        let record = tx.append_event(LedgerEvent::BookAdded {
            id: created.id,
            title: created.title.clone(),
            author: created.author.clone(),
            copies,
        });
        tx.commit()?;

        tracing::info!(book_id = created.id, copies, event_id = record.id, "Book added");
        Ok(created)
    }

    /// Replace a book's title, author and copy count (admin only).
    ///
    /// Copies currently on loan stay on loan: the available count becomes
    /// `copies - on_loan`, and shrinking below `on_loan` is rejected.
    pub async fn update_book(&self, caller: &CallerIdentity, id: BookId, update: &BookUpdate) -> AppResult<Book> {
        let mut tx = self.repository.begin().await?;
        let status = self.identity.caller_in(tx.state(), caller);
        policy::check(Some(&status), Operation::UpdateBook, None)
            .into_result(Operation::UpdateBook)?;

        let on_loan = tx.state().books().get_existing(id)?.on_loan();
        let copies = update.total_copies()?;
        if copies < on_loan {
            tracing::debug!(book_id = id, copies, on_loan, "Update rejected: fewer copies than on loan");
            return Err(AppError::InvalidArgument(format!(
                "Cannot reduce book {} to {} copies while {} are on loan",
                id, copies, on_loan
            )));
        }

        let book = tx.book_mut(id)?;
        book.title = update.title.clone();
        book.author = update.author.clone();
        book.total_copies = copies;
        book.available_copies = copies - on_loan;
        let updated = book.clone();

        let record = tx.append_event(LedgerEvent::BookUpdated {
            id,
            title: updated.title.clone(),
            author: updated.author.clone(),
            copies,
        });
        tx.commit()?;

        tracing::info!(book_id = id, copies, on_loan, event_id = record.id, "Book updated");
        Ok(updated)
    }

    /// All books in ascending id order
    pub fn list_books(&self) -> AppResult<Vec<Book>> {
        policy::check(None, Operation::GetAllBooks, None).into_result(Operation::GetAllBooks)?;
        let books = self.repository.snapshot()?.books().all();
        tracing::debug!(count = books.len(), "Listed books");
        Ok(books)
    }

    pub fn get_book(&self, id: BookId) -> AppResult<Book> {
        self.repository.snapshot()?.books().get_existing(id).cloned()
    }

    pub fn book_details(&self, id: BookId) -> AppResult<BookDetails> {
        policy::check(None, Operation::GetBookDetails, None)
            .into_result(Operation::GetBookDetails)?;
        tracing::debug!(book_id = id, "Fetching book details");
        Ok(self.get_book(id)?.details())
    }

    pub fn is_book_available(&self, id: BookId) -> AppResult<bool> {
        policy::check(None, Operation::IsBookAvailable, None)
            .into_result(Operation::IsBookAvailable)?;
        Ok(self.get_book(id)?.is_available())
    }
}
