//! API-key authentication for the merchant-facing endpoints.
//!
//! Merchants authenticate with the `X-API-Key` header issued at registration. The webhook endpoint is deliberately
//! unauthenticated: it carries decisions, not secrets, and the reconciliation rules make replayed or fabricated
//! notifications harmless.
use actix_web::HttpRequest;
use clearpony_payment_engine::{db_types::Merchant, MerchantApi, MerchantDirectory};
use log::debug;

use crate::errors::ServerError;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Resolves the request's `X-API-Key` header to a merchant record.
pub async fn authenticated_merchant<B: MerchantDirectory>(
    req: &HttpRequest,
    api: &MerchantApi<B>,
) -> Result<Merchant, ServerError> {
    let api_key = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ServerError::MissingApiKey)?;
    let merchant = api
        .authenticate(api_key)
        .await
        .map_err(|e| {
            debug!("💻️ Could not authenticate API key. {e}");
            ServerError::BackendError(e.to_string())
        })?
        .ok_or(ServerError::InvalidApiKey)?;
    Ok(merchant)
}
