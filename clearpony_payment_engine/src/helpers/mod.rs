//! Small helpers for identifier generation and the canonical QR payload encoding.
use cpg_common::{MinorUnits, CLPNY_CURRENCY_CODE};

use crate::db_types::{Address, IntentId, MerchantId};

/// Generates a fresh payment-intent id: `pi_` followed by 128 random bits in hex.
pub fn new_intent_id() -> IntentId {
    IntentId(format!("pi_{:032x}", rand::random::<u128>()))
}

/// Generates a fresh merchant id: `mch_` followed by 64 random bits in hex.
pub fn new_merchant_id() -> MerchantId {
    MerchantId(format!("mch_{:016x}", rand::random::<u64>()))
}

/// Generates a merchant API key. 128 bits of entropy; shown to the merchant exactly once, at registration.
pub fn new_api_key() -> String {
    format!("cpk_{:032x}", rand::random::<u128>())
}

/// Builds the canonical, versionable QR payload for an intent: `CLPNY|<address>|<amount>|<id>`.
///
/// The encoding is deterministic and fixed at intent creation; wallets scan it to pre-fill a transfer.
pub fn qr_payload(address: &Address, amount: MinorUnits, id: &IntentId) -> String {
    format!("{CLPNY_CURRENCY_CODE}|{address}|{amount}|{id}")
}
