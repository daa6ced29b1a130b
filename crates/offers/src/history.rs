//! Append-only audit trail of offer status changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use antiwaste_core::UserId;

use crate::status::OfferStatus;

/// One entry of the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: OfferStatus,
    /// Actor; `None` for seller submissions.
    pub changed_by: Option<UserId>,
    pub changed_at: DateTime<Utc>,
    pub reason: Option<String>,
}

/// Ordered status history. Only the offer aggregate can append to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusHistory(Vec<StatusChange>);

impl StatusHistory {
    pub(crate) fn push(&mut self, change: StatusChange) {
        self.0.push(change);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&StatusChange> {
        self.0.last()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, StatusChange> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[StatusChange] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a StatusHistory {
    type Item = &'a StatusChange;
    type IntoIter = core::slice::Iter<'a, StatusChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
