//! Ledger core services

pub mod catalog;
pub mod events;
pub mod identity;
pub mod loans;
pub mod policy;

use crate::{
    config::LedgerConfig,
    error::{AppError, AppResult},
    models::{identity::CallerIdentity, ledger::LedgerSummary},
    repository::Repository,
    services::policy::Operation,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    repository: Repository,
    pub identity: identity::IdentityService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub events: events::EventsService,
}

impl Services {
    /// Create all services over the given repository.
    ///
    /// Fails if no administrator identity is configured.
    pub fn new(repository: Repository, config: &LedgerConfig) -> AppResult<Self> {
        let admin = CallerIdentity::new(config.admin.clone()).ok_or_else(|| {
            AppError::Internal("ledger.admin must name the administrator identity".to_string())
        })?;

        let identity = identity::IdentityService::new(repository.clone(), admin);
        Ok(Self {
            catalog: catalog::CatalogService::new(repository.clone(), identity.clone()),
            loans: loans::LoansService::new(repository.clone(), identity.clone()),
            events: events::EventsService::new(repository.clone(), config.max_event_page),
            identity,
            repository,
        })
    }

    /// Counters taken from a single committed revision
    pub fn summary(&self) -> AppResult<LedgerSummary> {
        policy::check(None, Operation::LedgerSummary, None)
            .into_result(Operation::LedgerSummary)?;
        let state = self.repository.snapshot()?;
        Ok(LedgerSummary {
            admin: self.identity.admin().clone(),
            book_id_counter: state.books().last_id(),
            books: state.books().len(),
            members: state.members().len(),
            outstanding_borrowings: state.borrowings().outstanding_total(),
            last_event_id: state.events().last_id(),
            revision: state.revision(),
        })
    }
}
