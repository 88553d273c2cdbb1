//! Identity gate: caller resolution, registration and administrator checks

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{
        event::{EventRecord, LedgerEvent},
        identity::{Caller, CallerIdentity},
        member::Member,
    },
    repository::{LedgerState, Repository},
    services::policy::{self, Operation},
};

#[derive(Clone)]
pub struct IdentityService {
    repository: Repository,
    admin: Arc<CallerIdentity>,
}

impl IdentityService {
    pub fn new(repository: Repository, admin: CallerIdentity) -> Self {
        Self {
            repository,
            admin: Arc::new(admin),
        }
    }

    /// Identity of the request's origin, if the connectivity layer supplied one
    pub fn resolve_caller(&self, presented: Option<&str>) -> AppResult<CallerIdentity> {
        presented
            .and_then(CallerIdentity::new)
            .ok_or_else(|| AppError::Unauthenticated("No caller identity supplied".to_string()))
    }

    /// Fixed administrator identity
    pub fn admin(&self) -> &CallerIdentity {
        &self.admin
    }

    pub fn is_admin(&self, identity: &CallerIdentity) -> bool {
        *identity == *self.admin
    }

    /// Resolve a caller against a given ledger state
    pub fn caller_in(&self, state: &LedgerState, identity: &CallerIdentity) -> Caller {
        Caller {
            identity: identity.clone(),
            registered: state.members().contains(identity),
            admin: self.is_admin(identity),
        }
    }

    /// Resolve a caller against the latest committed state
    pub fn caller(&self, identity: &CallerIdentity) -> AppResult<Caller> {
        let state = self.repository.snapshot()?;
        let caller = self.caller_in(&state, identity);
        policy::check(Some(&caller), Operation::CallerStatus, Some(identity))
            .into_result(Operation::CallerStatus)?;
        Ok(caller)
    }

    /// Register the caller as a member; a second registration is rejected
    pub async fn register(&self, identity: &CallerIdentity) -> AppResult<EventRecord> {
        let mut tx = self.repository.begin().await?;
        let caller = self.caller_in(tx.state(), identity);
        policy::check(Some(&caller), Operation::RegisterUser, Some(identity))
            .into_result(Operation::RegisterUser)?;

        tx.insert_member(identity.clone()).inspect_err(|_| {
            tracing::debug!(user = %identity, "Registration rejected: already a member");
        })?;
        let record = tx.append_event(LedgerEvent::UserRegistered {
            user: identity.clone(),
        });
        tx.commit()?;

        tracing::info!(user = %identity, event_id = record.id, "Member registered");
        Ok(record)
    }

    /// All members in registration order
    pub fn all_members(&self) -> AppResult<Vec<Member>> {
        policy::check(None, Operation::GetAllUsers, None).into_result(Operation::GetAllUsers)?;
        let members = self.repository.snapshot()?.members().all();
        tracing::debug!(count = members.len(), "Listed members");
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> CallerIdentity {
        CallerIdentity::new(raw).unwrap()
    }

    fn service() -> IdentityService {
        IdentityService::new(Repository::new(8), id("0xadmin"))
    }

    #[test]
    fn test_resolve_caller() {
        let gate = service();
        assert_eq!(gate.resolve_caller(Some("0xalice")), Ok(id("0xalice")));
        assert!(matches!(gate.resolve_caller(None), Err(AppError::Unauthenticated(_))));
        assert!(matches!(gate.resolve_caller(Some(" ")), Err(AppError::Unauthenticated(_))));
    }

    #[test]
    fn test_is_admin_compares_by_value() {
        let gate = service();
        assert!(gate.is_admin(&id("0xadmin")));
        assert!(!gate.is_admin(&id("0xalice")));
    }

    #[tokio::test]
    async fn test_register_once() {
        let gate = service();
        let record = gate.register(&id("0xalice")).await.unwrap();
        assert_eq!(record.event, LedgerEvent::UserRegistered { user: id("0xalice") });
        assert!(gate.caller(&id("0xalice")).unwrap().registered);

        assert!(matches!(
            gate.register(&id("0xalice")).await,
            Err(AppError::AlreadyRegistered(_))
        ));
        // The rejected attempt left no second event behind
        assert_eq!(gate.repository.snapshot().unwrap().events().len(), 1);
    }

    #[tokio::test]
    async fn test_members_keep_registration_order() {
        let gate = service();
        for name in ["0xc", "0xa", "0xb"] {
            gate.register(&id(name)).await.unwrap();
        }
        let members: Vec<String> = gate
            .all_members()
            .unwrap()
            .into_iter()
            .map(|m| m.address.to_string())
            .collect();
        assert_eq!(members, vec!["0xc", "0xa", "0xb"]);
    }

    #[tokio::test]
    async fn test_caller_status() {
        let gate = service();
        gate.register(&id("0xadmin")).await.unwrap();
        let status = gate.caller(&id("0xadmin")).unwrap();
        assert!(status.registered);
        assert!(status.admin);

        let stranger = gate.caller(&id("0xbob")).unwrap();
        assert!(!stranger.registered);
        assert!(!stranger.admin);
    }
}
