//! Append-only event log table

use chrono::{DateTime, Utc};
use im::Vector;

use crate::models::event::{EventRecord, LedgerEvent};

#[derive(Debug, Clone, Default)]
pub struct EventsTable {
    records: Vector<EventRecord>,
}

impl EventsTable {
    /// Events with an id strictly greater than `after`, oldest first
    pub fn since(&self, after: u64, limit: usize) -> Vec<EventRecord> {
        // ids are dense and start at 1, so id n lives at index n - 1
        let start = usize::try_from(after).unwrap_or(usize::MAX).min(self.records.len());
        let end = start.saturating_add(limit).min(self.records.len());
        (start..end)
            .filter_map(|index| self.records.get(index).cloned())
            .collect()
    }

    pub fn last_id(&self) -> u64 {
        self.records.last().map(|r| r.id).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(super) fn append(&mut self, event: LedgerEvent, recorded_at: DateTime<Utc>) -> EventRecord {
        let record = EventRecord {
            id: self.last_id() + 1,
            recorded_at,
            event,
        };
        self.records.push_back(record.clone());
        record
    }

    #[cfg(test)]
    pub(super) fn shares_history_with(&self, other: &Self) -> bool {
        self.records.ptr_eq(&other.records)
    }
}
