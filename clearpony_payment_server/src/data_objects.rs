use chrono::{DateTime, Utc};
use cpg_common::MinorUnits;
use clearpony_payment_engine::{
    db_types::{Address, IntentId, IntentStatus, Merchant, MerchantId, PaymentIntent, TransferEvent},
    Reconciliation,
    RejectionReason,
};
use serde::{Deserialize, Serialize};

//--------------------------------------  Merchant payloads  ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMerchantBody {
    pub name: String,
    pub receiving_address: Address,
    #[serde(default)]
    pub callback_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantResult {
    pub id: MerchantId,
    pub name: String,
    pub receiving_address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    /// Present only in the registration response. The key cannot be retrieved afterwards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MerchantResult {
    /// The registration response: the one and only time the API key is shown.
    pub fn with_key(merchant: Merchant) -> Self {
        let api_key = Some(merchant.api_key.reveal().clone());
        Self { api_key, ..Self::redacted(merchant) }
    }

    pub fn redacted(merchant: Merchant) -> Self {
        Self {
            id: merchant.id,
            name: merchant.name,
            receiving_address: merchant.receiving_address,
            callback_url: merchant.callback_url,
            api_key: None,
            created_at: merchant.created_at,
        }
    }
}

//--------------------------------------   Intent payloads   ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIntentBody {
    pub merchant_id: MerchantId,
    /// Decimal string of minor units. Anything else (floats, signs, bare JSON numbers) is rejected at
    /// deserialization.
    pub amount: MinorUnits,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub expires_in_seconds: Option<i64>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResult {
    pub id: IntentId,
    pub merchant_id: MerchantId,
    pub amount: MinorUnits,
    pub merchant_address: Address,
    pub status: IntentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockchain_tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub qr_payload: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<PaymentIntent> for IntentResult {
    fn from(intent: PaymentIntent) -> Self {
        // Metadata was persisted as the JSON the merchant supplied, so this parse only fails on hand-edited rows.
        let metadata = intent.metadata.as_deref().and_then(|s| serde_json::from_str(s).ok());
        Self {
            id: intent.id,
            merchant_id: intent.merchant_id,
            amount: intent.amount,
            merchant_address: intent.merchant_address,
            status: intent.status,
            blockchain_tx_hash: intent.blockchain_tx_hash,
            description: intent.description,
            metadata,
            qr_payload: intent.qr_payload,
            expires_at: intent.expires_at,
            created_at: intent.created_at,
        }
    }
}

//--------------------------------------  Webhook payloads   ---------------------------------------------------------
/// The transfer notification delivered by the chain watcher. Malformed payloads are the only way this endpoint
/// answers with a client error; every reconciliation decision is a 200.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferNotification {
    pub tx_hash: String,
    pub from: Address,
    pub to: Address,
    pub amount: MinorUnits,
    #[serde(default)]
    pub payment_intent_id: Option<IntentId>,
}

impl From<TransferNotification> for TransferEvent {
    fn from(notification: TransferNotification) -> Self {
        Self {
            tx_hash: notification.tx_hash,
            from: notification.from,
            to: notification.to,
            amount: notification.amount,
            payment_intent_id: notification.payment_intent_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationResponse {
    pub updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectionReason>,
}

impl From<Reconciliation> for ReconciliationResponse {
    fn from(result: Reconciliation) -> Self {
        match result {
            Reconciliation::Updated(_) => Self { updated: true, reason: None },
            Reconciliation::Unmatched(reason) => Self { updated: false, reason: Some(reason) },
        }
    }
}

//--------------------------------------   Confirmations     ---------------------------------------------------------
/// The body POSTed to a merchant's callback URL after one of its intents is paid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    pub payment_intent_id: IntentId,
    pub status: IntentStatus,
    pub tx_hash: String,
}

impl From<&PaymentIntent> for PaymentConfirmation {
    fn from(intent: &PaymentIntent) -> Self {
        Self {
            payment_intent_id: intent.id.clone(),
            status: intent.status,
            tx_hash: intent.blockchain_tx_hash.clone().unwrap_or_default(),
        }
    }
}
