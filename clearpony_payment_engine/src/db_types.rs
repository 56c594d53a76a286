use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use cpg_common::{MinorUnits, Secret};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------      IntentId       ---------------------------------------------------------
/// The opaque identifier assigned to a payment intent at creation. Immutable for the lifetime of the record.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct IntentId(pub String);

impl FromStr for IntentId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for IntentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for IntentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl IntentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------     MerchantId      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct MerchantId(pub String);

impl From<String> for MerchantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for MerchantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl MerchantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------      Address        ---------------------------------------------------------
/// A lightweight wrapper around a string representing a receiving address on the CLPNY chain.
///
/// Addresses are stored exactly as supplied, but compared case-insensitively everywhere ([`Address::matches`]),
/// since checksummed and lowercased renderings of the same address must reconcile against each other.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive address equality. This is the only comparison reconciliation is allowed to use.
    pub fn matches(&self, other: &Address) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<S: Into<String>> From<S> for Address {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

//--------------------------------------    IntentStatus     ---------------------------------------------------------
/// The lifecycle state of a payment intent.
///
/// `Pending` is the initial state. `Paid` and `Expired` are both terminal: no transition ever leaves them, and an
/// intent never re-enters `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentStatus {
    /// The intent has been created and no qualifying transfer has been observed.
    Pending,
    /// A transfer satisfied the intent. The blockchain tx hash is recorded.
    Paid,
    /// The intent passed its expiry without being paid.
    Expired,
}

impl Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntentStatus::Pending => write!(f, "Pending"),
            IntentStatus::Paid => write!(f, "Paid"),
            IntentStatus::Expired => write!(f, "Expired"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid intent status: {0}")]
pub struct ConversionError(String);

impl FromStr for IntentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            "Expired" => Ok(Self::Expired),
            s => Err(ConversionError(format!("Invalid intent status: {s}"))),
        }
    }
}

impl From<String> for IntentStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid intent status: {value}. But this conversion cannot fail. Defaulting to Pending");
            IntentStatus::Pending
        })
    }
}

//--------------------------------------    PaymentIntent    ---------------------------------------------------------
/// A merchant's declared expectation of an incoming payment of a fixed amount to a fixed address, with an expiry.
#[derive(Debug, Clone, FromRow)]
pub struct PaymentIntent {
    pub id: IntentId,
    pub merchant_id: MerchantId,
    /// The expected amount, in minor units. Exact integer, compared exactly.
    pub amount: MinorUnits,
    /// The receiving address snapshotted from the merchant at creation time. Later merchant edits do not affect it.
    pub merchant_address: Address,
    pub status: IntentStatus,
    /// Set if and only if `status == Paid`, and set exactly once, by the atomic transition.
    pub blockchain_tx_hash: Option<String>,
    pub description: Option<String>,
    /// Opaque pass-through JSON supplied by the merchant. No reconciliation semantics.
    pub metadata: Option<String>,
    /// Deterministic scannable encoding of `CLPNY|address|amount|id`, fixed at creation.
    pub qr_payload: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentIntent {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

//--------------------------------------  NewPaymentIntent   ---------------------------------------------------------
/// The fully-resolved record handed to the store by the intent factory. All derived fields (id, expiry, snapshot
/// address, QR payload) have already been computed; the store only persists it.
#[derive(Debug, Clone)]
pub struct NewPaymentIntent {
    pub id: IntentId,
    pub merchant_id: MerchantId,
    pub amount: MinorUnits,
    pub merchant_address: Address,
    pub description: Option<String>,
    pub metadata: Option<String>,
    pub qr_payload: String,
    pub expires_at: DateTime<Utc>,
}

//--------------------------------------    TransferEvent    ---------------------------------------------------------
/// A single observed blockchain transfer, as delivered by the chain-watcher webhook.
///
/// This is an ephemeral input value consumed once per reconciliation attempt, never persisted by the engine. The same
/// `tx_hash` may arrive any number of times (retries, re-deliveries) and must reconcile idempotently.
#[derive(Debug, Clone)]
pub struct TransferEvent {
    pub tx_hash: String,
    pub from: Address,
    pub to: Address,
    pub amount: MinorUnits,
    /// When present, reconciliation runs in direct mode against this intent. Otherwise discovery mode matches on
    /// address and amount.
    pub payment_intent_id: Option<IntentId>,
}

//--------------------------------------      Merchant       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow)]
pub struct Merchant {
    pub id: MerchantId,
    pub name: String,
    /// The merchant's receiving address. Snapshotted onto each intent at creation.
    pub receiving_address: Address,
    /// Where payment confirmations are POSTed to, if the merchant configured one.
    pub callback_url: Option<String>,
    #[sqlx(try_from = "String")]
    pub api_key: Secret<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------     NewMerchant     ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewMerchant {
    pub id: MerchantId,
    pub name: String,
    pub receiving_address: Address,
    pub callback_url: Option<String>,
    pub api_key: String,
}
