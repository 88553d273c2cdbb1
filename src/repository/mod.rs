//! Repository layer: the in-memory execution substrate
//!
//! Committed state is an immutable [`LedgerState`] snapshot behind an `Arc`.
//! Readers clone the current `Arc` and never wait on a writer. Writers go
//! through a [`Transaction`], which holds the commit gate, mutates a private
//! working copy and publishes it in a single pointer swap on commit. A
//! transaction dropped without committing leaves no trace.
//!
//! Tables are persistent collections, so the working copy shares structure
//! with the snapshot it came from and a commit only copies the nodes it
//! touches.

pub mod books;
pub mod borrowings;
pub mod events;
pub mod members;

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, Mutex, OwnedMutexGuard};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookId},
        borrowing::Borrowing,
        event::{EventRecord, LedgerEvent},
        identity::CallerIdentity,
    },
};

/// One consistent version of every ledger table
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    revision: u64,
    books: books::BooksTable,
    members: members::MembersTable,
    borrowings: borrowings::BorrowingsTable,
    events: events::EventsTable,
}

impl LedgerState {
    /// Number of commits that produced this state
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn books(&self) -> &books::BooksTable {
        &self.books
    }

    pub fn members(&self) -> &members::MembersTable {
        &self.members
    }

    pub fn borrowings(&self) -> &borrowings::BorrowingsTable {
        &self.borrowings
    }

    pub fn events(&self) -> &events::EventsTable {
        &self.events
    }
}

/// Main repository struct holding the committed ledger state
#[derive(Clone)]
pub struct Repository {
    current: Arc<RwLock<Arc<LedgerState>>>,
    commit_gate: Arc<Mutex<()>>,
    events: broadcast::Sender<EventRecord>,
}

impl Repository {
    /// Create an empty ledger
    pub fn new(event_channel_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_channel_capacity.max(1));
        Self {
            current: Arc::new(RwLock::new(Arc::new(LedgerState::default()))),
            commit_gate: Arc::new(Mutex::new(())),
            events,
        }
    }

    /// Latest committed state
    pub fn snapshot(&self) -> AppResult<Arc<LedgerState>> {
        self.current
            .read()
            .map(|state| Arc::clone(&state))
            .map_err(|_| AppError::Internal("Ledger state lock poisoned".to_string()))
    }

    /// Start a write transaction; waits for any in-flight writer to finish
    pub async fn begin(&self) -> AppResult<Transaction> {
        let gate = Arc::clone(&self.commit_gate).lock_owned().await;
        let base = self.snapshot()?;
        Ok(Transaction {
            _gate: gate,
            base_revision: base.revision,
            working: (*base).clone(),
            pending: Vec::new(),
            now: Utc::now(),
            repository: self.clone(),
        })
    }

    /// Subscribe to events as they are committed
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.events.subscribe()
    }
}

/// Serialized unit of work over a private copy of the ledger
pub struct Transaction {
    _gate: OwnedMutexGuard<()>,
    base_revision: u64,
    working: LedgerState,
    pending: Vec<EventRecord>,
    now: DateTime<Utc>,
    repository: Repository,
}

impl Transaction {
    /// State as seen by this transaction, including its own writes
    pub fn state(&self) -> &LedgerState {
        &self.working
    }

    /// Timestamp shared by every write of this transaction
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn insert_book(&mut self, title: String, author: String, copies: u32) -> Book {
        self.working.books.insert(title, author, copies)
    }

    pub fn book_mut(&mut self, id: BookId) -> AppResult<&mut Book> {
        self.working.books.get_mut(id)
    }

    pub fn insert_member(&mut self, identity: CallerIdentity) -> AppResult<()> {
        if self.working.members.insert(identity.clone()) {
            Ok(())
        } else {
            Err(AppError::AlreadyRegistered(format!("{} is already registered", identity)))
        }
    }

    pub fn push_borrowing(&mut self, member: CallerIdentity, borrowing: Borrowing) {
        self.working.borrowings.push(member, borrowing);
    }

    pub fn borrowing_mut(&mut self, member: &CallerIdentity, position: usize) -> AppResult<&mut Borrowing> {
        self.working.borrowings.get_mut(member, position)
    }

    /// Record the event documenting this transaction's mutation
    pub fn append_event(&mut self, event: LedgerEvent) -> EventRecord {
        let record = self.working.events.append(event, self.now);
        self.pending.push(record.clone());
        record
    }

    /// Publish the working copy as the new committed state
    pub fn commit(self) -> AppResult<u64> {
        let Transaction {
            _gate,
            base_revision,
            mut working,
            pending,
            repository,
            ..
        } = self;

        let revision = {
            let mut current = repository
                .current
                .write()
                .map_err(|_| AppError::Internal("Ledger state lock poisoned".to_string()))?;

            if current.revision != base_revision {
                return Err(AppError::Conflict(format!(
                    "Ledger moved from revision {} to {} during the transaction",
                    base_revision, current.revision
                )));
            }

            working.revision = base_revision + 1;
            let revision = working.revision;
            *current = Arc::new(working);
            revision
        };

        for record in pending {
            // No subscribers is not an error; the log itself is the source of truth
            let _ = repository.events.send(record);
        }

        Ok(revision)
    }
}
