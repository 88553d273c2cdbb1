//! Event log service

use tokio::sync::broadcast;

use crate::{
    error::AppResult,
    models::event::{EventQuery, EventRecord},
    repository::Repository,
    services::policy::{self, Operation},
};

#[derive(Clone)]
pub struct EventsService {
    repository: Repository,
    max_page: usize,
}

impl EventsService {
    pub fn new(repository: Repository, max_page: usize) -> Self {
        Self {
            repository,
            max_page: max_page.max(1),
        }
    }

    /// Committed events after `query.after`, oldest first
    pub fn list(&self, query: &EventQuery) -> AppResult<Vec<EventRecord>> {
        policy::check(None, Operation::ReadEvents, None).into_result(Operation::ReadEvents)?;
        let after = query.after.unwrap_or(0);
        let limit = query.limit.unwrap_or(self.max_page).min(self.max_page);
        let state = self.repository.snapshot()?;
        tracing::debug!(after, limit, last_id = state.events().last_id(), "Reading event page");
        Ok(state.events().since(after, limit))
    }

    /// Receive events as they commit; a slow receiver may lag and miss some,
    /// in which case it can catch up with [`EventsService::list`]
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.repository.subscribe()
    }
}
