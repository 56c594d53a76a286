//! Best-effort merchant callback dispatch.
//!
//! The notifier consumes `PaymentConfirmedEvent`s from the engine's hook channel and POSTs a confirmation to the
//! merchant's callback URL. It makes exactly one attempt per confirmation: the payment state is already durably
//! committed by the time an event reaches this module, so a delivery failure is logged and dropped, never retried
//! and never surfaced back into reconciliation.
use clearpony_payment_engine::{events::PaymentConfirmedEvent, MerchantDirectory};
use log::*;
use reqwest::Client;

use crate::{data_objects::PaymentConfirmation, errors::ServerError};

#[derive(Clone)]
pub struct Notifier {
    client: Client,
}

impl Notifier {
    pub fn new(timeout: std::time::Duration) -> Result<Self, ServerError> {
        let client =
            Client::builder().timeout(timeout).build().map_err(|e| ServerError::InitializeError(e.to_string()))?;
        Ok(Self { client })
    }

    /// POSTs the confirmation to `url`. One attempt; the outcome is only logged.
    pub async fn dispatch(&self, url: &str, confirmation: &PaymentConfirmation) {
        match self.client.post(url).json(confirmation).send().await {
            Ok(response) if response.status().is_success() => {
                info!(
                    "📣️ Confirmation for intent {} dispatched to {url} ({})",
                    confirmation.payment_intent_id,
                    response.status()
                );
            },
            Ok(response) => {
                warn!(
                    "📣️ Callback endpoint {url} did not accept the confirmation for intent {}: {}",
                    confirmation.payment_intent_id,
                    response.status()
                );
            },
            Err(e) => {
                warn!("📣️ Callback to {url} failed for intent {}: {e}", confirmation.payment_intent_id);
            },
        }
    }
}

/// The hook body: resolve the merchant behind the paid intent and fire its callback, if it configured one.
pub async fn handle_confirmation<B: MerchantDirectory>(notifier: Notifier, db: B, event: PaymentConfirmedEvent) {
    let intent = event.intent;
    let merchant = match db.fetch_merchant_by_id(&intent.merchant_id).await {
        Ok(Some(merchant)) => merchant,
        Ok(None) => {
            warn!("📣️ Intent {} is paid, but merchant {} no longer exists", intent.id, intent.merchant_id);
            return;
        },
        Err(e) => {
            error!("📣️ Could not resolve merchant {} for confirmation dispatch. {e}", intent.merchant_id);
            return;
        },
    };
    match merchant.callback_url.as_deref() {
        Some(url) => notifier.dispatch(url, &PaymentConfirmation::from(&intent)).await,
        None => trace!("📣️ Merchant {} has no callback URL configured", merchant.id),
    }
}
