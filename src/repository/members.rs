//! Member registry

use im::{HashSet, Vector};

use crate::models::{identity::CallerIdentity, member::Member};

/// Registered identities in registration order
#[derive(Debug, Clone, Default)]
pub struct MembersTable {
    lookup: HashSet<CallerIdentity>,
    order: Vector<CallerIdentity>,
}

impl MembersTable {
    pub fn contains(&self, identity: &CallerIdentity) -> bool {
        self.lookup.contains(identity)
    }

    pub fn all(&self) -> Vec<Member> {
        self.order
            .iter()
            .map(|address| Member {
                address: address.clone(),
                registered: true,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns false if the identity was already present
    pub(super) fn insert(&mut self, identity: CallerIdentity) -> bool {
        if self.lookup.insert(identity.clone()).is_some() {
            return false;
        }
        self.order.push_back(identity);
        true
    }

    #[cfg(test)]
    pub(super) fn shares_registry_with(&self, other: &Self) -> bool {
        self.order.ptr_eq(&other.order)
    }
}
