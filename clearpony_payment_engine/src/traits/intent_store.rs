use cpg_common::MinorUnits;
use thiserror::Error;

use crate::db_types::{Address, IntentId, MerchantId, NewPaymentIntent, PaymentIntent};

/// Persistence abstraction over payment-intent records.
///
/// The store exclusively owns intent storage and exposes the only mutation paths. The crucial member is
/// [`IntentStore::mark_intent_paid`]: a single atomic conditional write that makes concurrent duplicate deliveries
/// safe. Everything else is plain reads and inserts.
#[allow(async_fn_in_trait)]
pub trait IntentStore {
    /// Persists a new intent in the `Pending` state and returns the stored record.
    async fn create_intent(&self, intent: NewPaymentIntent) -> Result<PaymentIntent, PaymentGatewayError>;

    /// Fetches an intent by its id.
    async fn fetch_intent_by_id(&self, id: &IntentId) -> Result<Option<PaymentIntent>, PaymentGatewayError>;

    /// Returns all `Pending`, unexpired intents whose receiving address matches `address` (case-insensitively) and
    /// whose amount equals `amount` exactly. Order is irrelevant; the engine treats more than one result as
    /// ambiguous regardless of order.
    async fn fetch_pending_intents_for(
        &self,
        address: &Address,
        amount: MinorUnits,
    ) -> Result<Vec<PaymentIntent>, PaymentGatewayError>;

    /// The atomic `Pending` → `Paid` transition.
    ///
    /// Implementations MUST express this as a single conditional write guarded by the stored status being `Pending`
    /// and the expiry lying in the future *at commit time* — never as a read-then-write pair. Exactly one concurrent
    /// caller observes the updated record; every other caller gets `None` (not an error), which reconciliation
    /// reports as `already_paid`.
    async fn mark_intent_paid(
        &self,
        id: &IntentId,
        tx_hash: &str,
    ) -> Result<Option<PaymentIntent>, PaymentGatewayError>;

    /// Marks every overdue `Pending` intent as `Expired` and returns the affected records. Uses the same
    /// status-guarded conditional write as [`IntentStore::mark_intent_paid`], so a sweep can never clobber a
    /// concurrent payment.
    async fn expire_intents(&self) -> Result<Vec<PaymentIntent>, PaymentGatewayError>;
}

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("The requested merchant {0} does not exist")]
    MerchantNotFound(MerchantId),
    #[error("Cannot insert intent, since it already exists with id {0}")]
    IntentAlreadyExists(IntentId),
    #[error("Cannot register merchant: the id or API key collides with an existing merchant")]
    MerchantAlreadyExists,
    #[error("{0} is not a valid payment amount. Amounts are positive integers in minor units")]
    InvalidAmount(String),
}

impl From<sqlx::Error> for PaymentGatewayError {
    fn from(e: sqlx::Error) -> Self {
        PaymentGatewayError::DatabaseError(e.to_string())
    }
}
