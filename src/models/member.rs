//! Member model

use serde::Serialize;
use utoipa::ToSchema;

use super::identity::CallerIdentity;

/// Registered member; members are never unregistered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Member {
    pub address: CallerIdentity,
    pub registered: bool,
}
