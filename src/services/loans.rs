//! Borrowing ledger service
//!
//! Each (member, book) pair moves NoRecord -> Outstanding -> Returned. A
//! returned record is terminal; borrowing the same book again appends a new
//! record. Both transitions change a book counter and a borrowing record in
//! one transaction, together with the event documenting them.

use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookId,
        borrowing::{Borrowing, BorrowingDetails},
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
pub struct LoansService {
    repository: Repository,
    identity: IdentityService,
}

impl LoansService {
    pub fn new(repository: Repository, identity: IdentityService) -> Self {
        Self {
            repository,
            identity,
        }
    }

    /// Borrow one copy of a book
    pub async fn borrow_book(&self, caller: &CallerIdentity, book_id: BookId) -> AppResult<Borrowing> {
        let mut tx = self.repository.begin().await?;
        let status = self.identity.caller_in(tx.state(), caller);
        policy::check(Some(&status), Operation::BorrowBook, None)
            .into_result(Operation::BorrowBook)?;

        let book = tx.state().books().get_existing(book_id)?;
        if !book.is_available() {
            tracing::debug!(book_id, user = %caller, "Borrow rejected: no copies left");
            return Err(AppError::Unavailable(format!(
                "No copies of book {} are available",
                book_id
            )));
        }
        if tx.state().borrowings().outstanding_position(caller, book_id).is_some() {
            tracing::debug!(book_id, user = %caller, "Borrow rejected: already checked out");
            return Err(AppError::AlreadyBorrowed(format!(
                "{} already has book {} checked out",
                caller, book_id
            )));
        }

        let now = tx.now();
        tx.book_mut(book_id)?.available_copies -= 1;
        let borrowing = Borrowing::open(book_id, now);
        tx.push_borrowing(caller.clone(), borrowing.clone());
        let record = tx.append_event(LedgerEvent::BookBorrowed {
            user: caller.clone(),
            book_id,
            borrow_date: now,
        });
        tx.commit()?;

        tracing::info!(book_id, user = %caller, event_id = record.id, "Book borrowed");
        Ok(borrowing)
    }

    /// Return the caller's outstanding copy of a book
    pub async fn return_book(&self, caller: &CallerIdentity, book_id: BookId) -> AppResult<Borrowing> {
        let mut tx = self.repository.begin().await?;
        let status = self.identity.caller_in(tx.state(), caller);
        policy::check(Some(&status), Operation::ReturnBook, None)
            .into_result(Operation::ReturnBook)?;

        let position = tx
            .state()
            .borrowings()
            .outstanding_position(caller, book_id)
            .ok_or_else(|| {
                tracing::debug!(book_id, user = %caller, "Return rejected: nothing outstanding");
                AppError::NotBorrowed(format!("{} has no outstanding copy of book {}", caller, book_id))
            })?;

        let book = tx.state().books().get_existing(book_id)?;
        if book.available_copies >= book.total_copies {
            return Err(AppError::Internal(format!(
                "Book {} has an outstanding borrowing but no copy on loan",
                book_id
            )));
        }

        let now = tx.now();
        tx.book_mut(book_id)?.available_copies += 1;
        let borrowing = tx.borrowing_mut(caller, position)?;
        borrowing.close(now);
        let closed = borrowing.clone();
        let record = tx.append_event(LedgerEvent::BookReturned {
            user: caller.clone(),
            book_id,
            return_date: now,
        });
        tx.commit()?;

        tracing::info!(book_id, user = %caller, event_id = record.id, "Book returned");
        Ok(closed)
    }

    /// The caller's borrowing history in insertion order
    pub fn user_borrowings(&self, caller: &CallerIdentity) -> AppResult<Vec<Borrowing>> {
        let state = self.repository.snapshot()?;
        let status = self.identity.caller_in(&state, caller);
        policy::check(Some(&status), Operation::GetUserBorrowings, Some(caller))
            .into_result(Operation::GetUserBorrowings)?;

        let history: Vec<Borrowing> = state.borrowings().for_member(caller).cloned().collect();
        tracing::debug!(user = %caller, count = history.len(), "Listed borrowings");
        Ok(history)
    }

    /// The caller's borrowing history joined with catalog details
    pub fn user_borrowing_details(&self, caller: &CallerIdentity) -> AppResult<Vec<BorrowingDetails>> {
        let state = self.repository.snapshot()?;
        let status = self.identity.caller_in(&state, caller);
        policy::check(Some(&status), Operation::GetUserBorrowings, Some(caller))
            .into_result(Operation::GetUserBorrowings)?;

        tracing::debug!(user = %caller, "Listing borrowing details");
        let details: AppResult<Vec<BorrowingDetails>> = state
            .borrowings()
            .for_member(caller)
            .map(|b| {
                let book = state.books().get_existing(b.book_id)?;
                Ok(BorrowingDetails {
                    book_id: b.book_id,
                    title: book.title.clone(),
                    author: book.author.clone(),
                    borrow_date: b.borrow_date,
                    return_date: b.return_date,
                    returned: b.returned,
                    state: b.state(),
                })
            })
            .collect();
        details
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{book::NewBook, borrowing::BorrowingState},
        services::catalog::CatalogService,
    };

    fn id(raw: &str) -> CallerIdentity {
        CallerIdentity::new(raw).unwrap()
    }

    struct Fixture {
        identity: IdentityService,
        catalog: CatalogService,
        loans: LoansService,
    }

    async fn fixture(copies: i64) -> Fixture {
        let repository = Repository::new(16);
        let identity = IdentityService::new(repository.clone(), id("0xadmin"));
        let catalog = CatalogService::new(repository.clone(), identity.clone());
        let loans = LoansService::new(repository, identity.clone());
        catalog
            .add_book(&id("0xadmin"), &NewBook::new("Dune", "Herbert", copies))
            .await
            .unwrap();
        identity.register(&id("0xalice")).await.unwrap();
        Fixture {
            identity,
            catalog,
            loans,
        }
    }

    #[tokio::test]
    async fn test_borrow_then_return_restores_copies() {
        let f = fixture(2).await;
        let alice = id("0xalice");

        let borrowing = f.loans.borrow_book(&alice, 1).await.unwrap();
        assert_eq!(borrowing.state(), BorrowingState::Outstanding);
        assert_eq!(f.catalog.get_book(1).unwrap().available_copies, 1);

        let closed = f.loans.return_book(&alice, 1).await.unwrap();
        assert!(closed.returned);
        assert!(closed.return_date.is_some());
        assert_eq!(f.catalog.get_book(1).unwrap().available_copies, 2);
    }

    #[tokio::test]
    async fn test_double_borrow_rejected() {
        let f = fixture(3).await;
        let alice = id("0xalice");
        f.loans.borrow_book(&alice, 1).await.unwrap();
        assert!(matches!(
            f.loans.borrow_book(&alice, 1).await,
            Err(AppError::AlreadyBorrowed(_))
        ));
        assert_eq!(f.catalog.get_book(1).unwrap().available_copies, 2);
    }

    #[tokio::test]
    async fn test_reborrow_appends_new_record() {
        let f = fixture(1).await;
        let alice = id("0xalice");
        f.loans.borrow_book(&alice, 1).await.unwrap();
        f.loans.return_book(&alice, 1).await.unwrap();
        f.loans.borrow_book(&alice, 1).await.unwrap();

        let history = f.loans.user_borrowings(&alice).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].returned);
        assert!(!history[1].returned);
    }

    #[tokio::test]
    async fn test_return_without_borrow() {
        let f = fixture(1).await;
        assert!(matches!(
            f.loans.return_book(&id("0xalice"), 1).await,
            Err(AppError::NotBorrowed(_))
        ));
        assert!(matches!(
            f.loans.return_book(&id("0xalice"), 42).await,
            Err(AppError::NotBorrowed(_))
        ));
    }

    #[tokio::test]
    async fn test_unregistered_caller_cannot_borrow() {
        let f = fixture(1).await;
        let bob = id("0xbob");
        assert!(matches!(
            f.loans.borrow_book(&bob, 1).await,
            Err(AppError::PermissionDenied(_))
        ));
        assert!(matches!(
            f.loans.user_borrowings(&bob),
            Err(AppError::PermissionDenied(_))
        ));
        assert_eq!(f.catalog.get_book(1).unwrap().available_copies, 1);
    }

    #[tokio::test]
    async fn test_borrow_checks_existence_then_availability() {
        let f = fixture(1).await;
        let alice = id("0xalice");
        f.identity.register(&id("0xbob")).await.unwrap();

        assert!(matches!(
            f.loans.borrow_book(&alice, 9).await,
            Err(AppError::NotFound(_))
        ));
        f.loans.borrow_book(&id("0xbob"), 1).await.unwrap();
        assert!(matches!(
            f.loans.borrow_book(&alice, 1).await,
            Err(AppError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_shrinking_below_loans_rejected() {
        let f = fixture(3).await;
        let admin = id("0xadmin");
        f.identity.register(&id("0xbob")).await.unwrap();
        f.loans.borrow_book(&id("0xalice"), 1).await.unwrap();
        f.loans.borrow_book(&id("0xbob"), 1).await.unwrap();

        let result = f
            .catalog
            .update_book(&admin, 1, &crate::models::BookUpdate::new("Dune", "Herbert", 1))
            .await;
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
        assert_eq!(f.catalog.get_book(1).unwrap().total_copies, 3);

        let updated = f
            .catalog
            .update_book(&admin, 1, &crate::models::BookUpdate::new("Dune", "Herbert", 2))
            .await
            .unwrap();
        assert_eq!(updated.available_copies, 0);
        assert_eq!(updated.on_loan(), 2);
    }

    #[tokio::test]
    async fn test_borrowing_details_join_catalog() {
        let f = fixture(1).await;
        let alice = id("0xalice");
        f.loans.borrow_book(&alice, 1).await.unwrap();

        let details = f.loans.user_borrowing_details(&alice).unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].title, "Dune");
        assert_eq!(details[0].state, BorrowingState::Outstanding);
        assert_eq!(f.loans.repository.snapshot().unwrap().borrowings().outstanding_total(), 1);
    }
}
