use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    cpe_api::payment_objects::{NewIntentRequest, Reconciliation, RejectionReason},
    db_types::{IntentId, NewPaymentIntent, PaymentIntent, TransferEvent},
    events::{EventProducers, PaymentConfirmedEvent},
    helpers,
    traits::{IntentStore, MerchantDirectory, PaymentGatewayError},
};

/// `PaymentFlowApi` is the primary API for the payment gateway: it creates payment intents in response to merchant
/// requests, and reconciles incoming blockchain transfer events against them.
///
/// The API owns no state of its own. It is a decision layer over values obtained from the backing store plus the
/// event under consideration; the store's conditional-write primitive is what makes concurrent duplicate deliveries
/// safe.
#[derive(Clone)]
pub struct PaymentFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for PaymentFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentFlowApi")
    }
}

impl<B> PaymentFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> PaymentFlowApi<B>
where B: IntentStore + MerchantDirectory
{
    /// Creates a new payment intent for a merchant.
    ///
    /// The merchant is resolved through the directory, and its receiving address is snapshotted onto the intent, so
    /// that later edits to the merchant record never affect in-flight intents. The expiry is fixed here
    /// (`now + ttl`) and never mutated afterwards.
    ///
    /// There are no side effects beyond the single store write.
    pub async fn create_intent(&self, request: NewIntentRequest) -> Result<PaymentIntent, PaymentGatewayError> {
        let merchant = self
            .db
            .fetch_merchant_by_id(&request.merchant_id)
            .await?
            .ok_or_else(|| PaymentGatewayError::MerchantNotFound(request.merchant_id.clone()))?;
        if !request.amount.is_positive() {
            return Err(PaymentGatewayError::InvalidAmount(request.amount.to_string()));
        }
        let id = helpers::new_intent_id();
        let expires_at = Utc::now() + request.ttl;
        let qr_payload = helpers::qr_payload(&merchant.receiving_address, request.amount, &id);
        let intent = NewPaymentIntent {
            id,
            merchant_id: request.merchant_id,
            amount: request.amount,
            merchant_address: merchant.receiving_address,
            description: request.description,
            metadata: request.metadata,
            qr_payload,
            expires_at,
        };
        let intent = self.db.create_intent(intent).await?;
        debug!(
            "🔄️🧾️ Intent [{}] created for merchant {}: {} to {}, expires {}",
            intent.id, intent.merchant_id, intent.amount, intent.merchant_address, intent.expires_at
        );
        Ok(intent)
    }

    /// Fetches a single intent by id.
    pub async fn fetch_intent(&self, id: &IntentId) -> Result<Option<PaymentIntent>, PaymentGatewayError> {
        self.db.fetch_intent_by_id(id).await
    }

    /// Reconciles an observed transfer event against the stored intents.
    ///
    /// Runs in *direct mode* when the event references an intent id, and in *discovery mode* (matching on address
    /// and amount among pending, unexpired intents) otherwise. Either way, at most one intent transitions
    /// `Pending` → `Paid`, and a successful transition emits a confirmation event after the commit.
    ///
    /// A decision not to update anything is a normal outcome, reported through [`Reconciliation::Unmatched`];
    /// only infrastructure failures produce an `Err`.
    pub async fn reconcile(&self, event: TransferEvent) -> Result<Reconciliation, PaymentGatewayError> {
        let txid = event.tx_hash.clone();
        let result = match &event.payment_intent_id {
            Some(id) => self.reconcile_direct(id, &event).await?,
            None => self.reconcile_by_discovery(&event).await?,
        };
        match &result {
            Reconciliation::Updated(intent) => {
                debug!("🔄️⛓️ Transfer [{txid}] marked intent [{}] as paid", intent.id);
                self.call_payment_confirmed_hook(intent).await;
            },
            Reconciliation::Unmatched(reason) => {
                debug!("🔄️⛓️ Transfer [{txid}] did not update any intent: {reason}");
            },
        }
        Ok(result)
    }

    /// Direct mode: the event names the intent it pays for. The checks run in a fixed order so that replays and
    /// near-misses always produce the same reason code.
    async fn reconcile_direct(
        &self,
        id: &IntentId,
        event: &TransferEvent,
    ) -> Result<Reconciliation, PaymentGatewayError> {
        use crate::db_types::IntentStatus::Paid;
        let intent = match self.db.fetch_intent_by_id(id).await? {
            Some(intent) => intent,
            None => return Ok(Reconciliation::Unmatched(RejectionReason::NotFound)),
        };
        if intent.status == Paid {
            // Replay safety: a re-delivered event for a paid intent is a no-op, not an error.
            return Ok(Reconciliation::Unmatched(RejectionReason::AlreadyPaid));
        }
        if intent.is_expired_at(Utc::now()) {
            // The status may still read Pending if no sweep has run yet. Expiry wins regardless.
            return Ok(Reconciliation::Unmatched(RejectionReason::Expired));
        }
        if !intent.merchant_address.matches(&event.to) {
            return Ok(Reconciliation::Unmatched(RejectionReason::AddressMismatch));
        }
        if event.amount < intent.amount {
            // Exact integer comparison. Overpayment is accepted as valid payment.
            return Ok(Reconciliation::Unmatched(RejectionReason::AmountTooSmall));
        }
        self.attempt_transition(&intent.id, event).await
    }

    /// Discovery mode: no intent reference, so match on destination address and exact amount among pending,
    /// unexpired intents. More than one candidate is a deliberately conservative refusal: on address and amount
    /// alone the engine has no way to tell which intent the payer meant, and guessing would pay the wrong one.
    async fn reconcile_by_discovery(&self, event: &TransferEvent) -> Result<Reconciliation, PaymentGatewayError> {
        let candidates = self.db.fetch_pending_intents_for(&event.to, event.amount).await?;
        match candidates.as_slice() {
            [] => Ok(Reconciliation::Unmatched(RejectionReason::NoMatch)),
            [candidate] => self.attempt_transition(&candidate.id, event).await,
            _ => {
                info!(
                    "🔄️⛓️ Transfer [{}] matches {} pending intents on {} for {}. Refusing to guess; flagging for \
                     out-of-band resolution.",
                    event.tx_hash,
                    candidates.len(),
                    event.to,
                    event.amount
                );
                Ok(Reconciliation::Unmatched(RejectionReason::MultipleMatches))
            },
        }
    }

    /// The atomic transition. The store re-validates the `Pending` + unexpired precondition at commit time, so the
    /// reads above only ever served to narrow the decision; losing the race here is indistinguishable from having
    /// observed the intent already paid.
    async fn attempt_transition(
        &self,
        id: &IntentId,
        event: &TransferEvent,
    ) -> Result<Reconciliation, PaymentGatewayError> {
        match self.db.mark_intent_paid(id, &event.tx_hash).await? {
            Some(intent) => Ok(Reconciliation::Updated(intent)),
            None => Ok(Reconciliation::Unmatched(RejectionReason::AlreadyPaid)),
        }
    }

    /// Marks every overdue pending intent as expired. Called by an external timer; uses the same guarded transition
    /// primitive as payment, so a sweep can never race a payment into an inconsistent state.
    pub async fn expire_intents(&self) -> Result<Vec<PaymentIntent>, PaymentGatewayError> {
        let expired = self.db.expire_intents().await?;
        if !expired.is_empty() {
            debug!("🔄️🕰️ {} intents marked as expired", expired.len());
        }
        Ok(expired)
    }

    async fn call_payment_confirmed_hook(&self, intent: &PaymentIntent) {
        for emitter in &self.producers.payment_confirmed_producer {
            trace!("🔄️⛓️ Notifying payment confirmed hook subscribers");
            let event = PaymentConfirmedEvent::new(intent.clone());
            emitter.publish_event(event).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
