use std::fmt::Display;

use chrono::Duration;
use cpg_common::MinorUnits;
use serde::{Deserialize, Serialize};

use crate::db_types::{MerchantId, PaymentIntent};

//--------------------------------------   NewIntentRequest  ---------------------------------------------------------
/// The validated input to the intent factory. The HTTP layer is responsible for parsing the wire form (decimal-string
/// amounts, default TTL) into this type; by the time it reaches the engine, the amount is already an exact integer.
#[derive(Debug, Clone)]
pub struct NewIntentRequest {
    pub merchant_id: MerchantId,
    pub amount: MinorUnits,
    pub description: Option<String>,
    /// Raw JSON carried through verbatim. No reconciliation semantics.
    pub metadata: Option<String>,
    pub ttl: Duration,
}

impl NewIntentRequest {
    pub fn new(merchant_id: MerchantId, amount: MinorUnits, ttl: Duration) -> Self {
        Self { merchant_id, amount, description: None, metadata: None, ttl }
    }

    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_metadata(mut self, metadata: String) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

//--------------------------------------   Reconciliation    ---------------------------------------------------------
/// The outcome of a reconciliation attempt.
///
/// This is a decision output, not an error: an event that does not update any intent is a perfectly normal result
/// and is reported to the event source as such. Only infrastructure failures surface as `Err` from
/// [`crate::PaymentFlowApi::reconcile`].
#[derive(Debug, Clone)]
pub enum Reconciliation {
    /// Exactly one intent transitioned `Pending` → `Paid`. Carries the post-transition record.
    Updated(PaymentIntent),
    /// No state was changed, for the given reason.
    Unmatched(RejectionReason),
}

impl Reconciliation {
    pub fn is_updated(&self) -> bool {
        matches!(self, Reconciliation::Updated(_))
    }
}

/// Why a transfer event did not update any intent. Serialized snake_case on the wire (`"already_paid"` etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// Direct mode: the referenced intent does not exist.
    NotFound,
    /// The intent has already been paid, possibly by a concurrent delivery of this very event.
    AlreadyPaid,
    /// The intent's expiry has passed, whether or not a sweep has marked it `Expired` yet.
    Expired,
    /// Direct mode: the event's destination is not the intent's receiving address.
    AddressMismatch,
    /// The transferred amount is less than the expected amount.
    AmountTooSmall,
    /// Discovery mode: no pending intent matches the event's address and amount.
    NoMatch,
    /// Discovery mode: several pending intents match and the engine refuses to guess which one was meant.
    MultipleMatches,
}

impl Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            RejectionReason::NotFound => "not_found",
            RejectionReason::AlreadyPaid => "already_paid",
            RejectionReason::Expired => "expired",
            RejectionReason::AddressMismatch => "address_mismatch",
            RejectionReason::AmountTooSmall => "amount_too_small",
            RejectionReason::NoMatch => "no_match",
            RejectionReason::MultipleMatches => "multiple_matches",
        };
        write!(f, "{reason}")
    }
}
