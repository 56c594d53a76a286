use crate::db_types::PaymentIntent;

/// The confirmation signal emitted after a reconciliation attempt durably commits the `Pending` → `Paid` transition.
///
/// The intent it carries is the post-transition record, so `status` is `Paid` and `blockchain_tx_hash` is set.
/// Emission happens *after* the commit and outside the atomicity boundary: a subscriber failing to handle the event
/// never rolls back or rechecks the transition.
#[derive(Debug, Clone)]
pub struct PaymentConfirmedEvent {
    pub intent: PaymentIntent,
}

impl PaymentConfirmedEvent {
    pub fn new(intent: PaymentIntent) -> Self {
        Self { intent }
    }
}
