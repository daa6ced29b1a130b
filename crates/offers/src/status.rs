use serde::{Deserialize, Serialize};

use antiwaste_core::{DomainError, DomainResult};

/// Offer moderation lifecycle.
///
/// ```text
/// DRAFT ──submit──▶ PENDING_VALIDATION ──validate──▶ PUBLISHED ──cancel──▶ CANCELED
///   ▲                  │        ▲                       │
///   │               reject    submit                  edit
///   │                  ▼        │                       │
///   │               REJECTED ───┘                       │
///   └───────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferStatus {
    Draft,
    PendingValidation,
    Published,
    Rejected,
    Canceled,
}

/// Operations that may move an offer between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OfferTransition {
    Submit,
    Validate,
    Reject,
    Cancel,
    Edit,
}

impl OfferTransition {
    pub const ALL: [OfferTransition; 5] = [
        OfferTransition::Submit,
        OfferTransition::Validate,
        OfferTransition::Reject,
        OfferTransition::Cancel,
        OfferTransition::Edit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OfferTransition::Submit => "submit for validation",
            OfferTransition::Validate => "validate",
            OfferTransition::Reject => "reject",
            OfferTransition::Cancel => "cancel",
            OfferTransition::Edit => "update details",
        }
    }
}

impl OfferStatus {
    pub const ALL: [OfferStatus; 5] = [
        OfferStatus::Draft,
        OfferStatus::PendingValidation,
        OfferStatus::Published,
        OfferStatus::Rejected,
        OfferStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Draft => "DRAFT",
            OfferStatus::PendingValidation => "PENDING_VALIDATION",
            OfferStatus::Published => "PUBLISHED",
            OfferStatus::Rejected => "REJECTED",
            OfferStatus::Canceled => "CANCELED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OfferStatus::Canceled)
    }

    /// The complete transition table. Every status change goes through here.
    pub fn transition(self, op: OfferTransition) -> DomainResult<OfferStatus> {
        use OfferStatus::*;
        use OfferTransition::*;

        match (self, op) {
            (Draft | Rejected, Submit) => Ok(PendingValidation),
            (PendingValidation, Validate) => Ok(Published),
            (PendingValidation, Reject) => Ok(Rejected),
            (Published, Cancel) => Ok(Canceled),
            (Draft, Edit) => Ok(Draft),
            (Rejected, Edit) => Ok(Rejected),
            (Published, Edit) => Ok(Draft),
            (from, op) => Err(DomainError::invalid_transition(from, op.as_str())),
        }
    }
}

impl core::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for OfferStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(OfferStatus::Draft),
            "PENDING_VALIDATION" => Ok(OfferStatus::PendingValidation),
            "PUBLISHED" => Ok(OfferStatus::Published),
            "REJECTED" => Ok(OfferStatus::Rejected),
            "CANCELED" => Ok(OfferStatus::Canceled),
            other => Err(DomainError::validation(format!("unknown offer status '{other}'"))),
        }
    }
}
