use cpg_common::MinorUnits;
use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Address, IntentId, NewPaymentIntent, PaymentIntent},
    traits::PaymentGatewayError,
};

pub async fn insert_intent(
    intent: NewPaymentIntent,
    conn: &mut SqliteConnection,
) -> Result<PaymentIntent, PaymentGatewayError> {
    let id = intent.id.clone();
    let intent = sqlx::query_as(
        r#"
            INSERT INTO payment_intents
                (id, merchant_id, amount, merchant_address, description, metadata, qr_payload, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *;
        "#,
    )
    .bind(intent.id)
    .bind(intent.merchant_id)
    .bind(intent.amount)
    .bind(intent.merchant_address)
    .bind(intent.description)
    .bind(intent.metadata)
    .bind(intent.qr_payload)
    .bind(intent.expires_at)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => PaymentGatewayError::IntentAlreadyExists(id),
        _ => PaymentGatewayError::from(e),
    })?;
    Ok(intent)
}

pub async fn fetch_intent_by_id(
    id: &IntentId,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentIntent>, PaymentGatewayError> {
    let intent =
        sqlx::query_as("SELECT * FROM payment_intents WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await?;
    Ok(intent)
}

/// Fetches the discovery-mode candidates: pending, unexpired intents matching the address (case-insensitively) and
/// the exact amount. The expiry filter runs against the database clock, the same clock the transition guard uses.
pub async fn fetch_pending_by_address_and_amount(
    address: &Address,
    amount: MinorUnits,
    conn: &mut SqliteConnection,
) -> Result<Vec<PaymentIntent>, PaymentGatewayError> {
    let intents = sqlx::query_as(
        r#"
            SELECT * FROM payment_intents
            WHERE merchant_address = $1 COLLATE NOCASE
              AND amount = $2
              AND status = 'Pending'
              AND unixepoch(expires_at) > unixepoch(CURRENT_TIMESTAMP);
        "#,
    )
    .bind(address.as_str())
    .bind(amount)
    .fetch_all(conn)
    .await?;
    Ok(intents)
}

/// The atomic `Pending` → `Paid` transition: one conditional UPDATE, guarded by the status being `Pending` and the
/// expiry lying in the future at commit time. Returns `None` when the guard fails (another writer already consumed
/// the intent, or it expired); the caller decides what that means.
pub async fn mark_paid(
    id: &IntentId,
    tx_hash: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentIntent>, PaymentGatewayError> {
    let intent = sqlx::query_as(
        r#"
            UPDATE payment_intents
            SET status = 'Paid', blockchain_tx_hash = $2, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
              AND status = 'Pending'
              AND unixepoch(expires_at) > unixepoch(CURRENT_TIMESTAMP)
            RETURNING *;
        "#,
    )
    .bind(id.as_str())
    .bind(tx_hash)
    .fetch_optional(conn)
    .await?;
    trace!("🗃️ mark_paid for [{id}]: {}", if intent.is_some() { "transitioned" } else { "guard failed" });
    Ok(intent)
}

/// Expires every overdue pending intent in one guarded UPDATE. The status guard means a concurrently-paid intent is
/// simply skipped; `Paid` is terminal and stays untouched.
pub async fn expire_overdue(conn: &mut SqliteConnection) -> Result<Vec<PaymentIntent>, PaymentGatewayError> {
    let expired = sqlx::query_as(
        r#"
            UPDATE payment_intents
            SET status = 'Expired', updated_at = CURRENT_TIMESTAMP
            WHERE status = 'Pending'
              AND unixepoch(expires_at) <= unixepoch(CURRENT_TIMESTAMP)
            RETURNING *;
        "#,
    )
    .fetch_all(conn)
    .await?;
    Ok(expired)
}
