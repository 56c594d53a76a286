use sqlx::SqliteConnection;

use crate::{
    db_types::{Merchant, MerchantId, NewMerchant},
    traits::PaymentGatewayError,
};

pub async fn insert_merchant(
    merchant: NewMerchant,
    conn: &mut SqliteConnection,
) -> Result<Merchant, PaymentGatewayError> {
    let merchant = sqlx::query_as(
        r#"
            INSERT INTO merchants (id, name, receiving_address, callback_url, api_key)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(merchant.id)
    .bind(merchant.name)
    .bind(merchant.receiving_address)
    .bind(merchant.callback_url)
    .bind(merchant.api_key)
    .fetch_one(conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(err) if err.is_unique_violation() => PaymentGatewayError::MerchantAlreadyExists,
        _ => PaymentGatewayError::from(e),
    })?;
    Ok(merchant)
}

pub async fn fetch_merchant_by_id(
    id: &MerchantId,
    conn: &mut SqliteConnection,
) -> Result<Option<Merchant>, PaymentGatewayError> {
    let merchant =
        sqlx::query_as("SELECT * FROM merchants WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await?;
    Ok(merchant)
}

pub async fn fetch_merchant_by_api_key(
    api_key: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Merchant>, PaymentGatewayError> {
    let merchant =
        sqlx::query_as("SELECT * FROM merchants WHERE api_key = $1").bind(api_key).fetch_optional(conn).await?;
    Ok(merchant)
}
