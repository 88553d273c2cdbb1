//! Caller identity supplied by the connectivity layer

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Opaque, already-authenticated caller token.
///
/// The ledger only compares identities for equality; it never inspects or
/// normalizes their content beyond rejecting blank tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct CallerIdentity(String);

impl CallerIdentity {
    /// Wrap a raw token, returning `None` for a blank one
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }
}

impl std::fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A caller resolved against the member registry and the administrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Caller {
    pub identity: CallerIdentity,
    pub registered: bool,
    pub admin: bool,
}
