//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two MUST go into a separate
//! module. Keep this module neat and tidy 🙏
//!
//! Handlers are generic over the storage traits, so the endpoint tests can drive them against mocks. Since
//! actix-web cannot register generic handlers from attribute macros, the concrete routes are assembled in
//! [`crate::server`] with explicit `web::resource` calls.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use chrono::Duration;
use clearpony_payment_engine::{
    db_types::MerchantId,
    IntentStore,
    MerchantApi,
    MerchantDirectory,
    NewIntentRequest,
    PaymentFlowApi,
};
use log::*;

use crate::{
    auth::authenticated_merchant,
    config::ServerOptions,
    data_objects::{
        IntentResult,
        MerchantResult,
        NewIntentBody,
        NewMerchantBody,
        ReconciliationResponse,
        TransferNotification,
    },
    errors::ServerError,
};

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------  Merchants ----------------------------------------------------
/// Registers a new merchant. The response is the only place the generated API key ever appears.
pub async fn create_merchant<B: MerchantDirectory>(
    api: web::Data<MerchantApi<B>>,
    body: web::Json<NewMerchantBody>,
) -> Result<HttpResponse, ServerError> {
    let NewMerchantBody { name, receiving_address, callback_url } = body.into_inner();
    if name.trim().is_empty() {
        return Err(ServerError::InvalidRequestBody("name must not be empty".to_string()));
    }
    if receiving_address.as_str().trim().is_empty() {
        return Err(ServerError::InvalidRequestBody("receivingAddress must not be empty".to_string()));
    }
    debug!("💻️ Registering new merchant '{name}'");
    let merchant = api.register_merchant(name, receiving_address, callback_url).await?;
    Ok(HttpResponse::Created().json(MerchantResult::with_key(merchant)))
}

pub async fn merchant_by_id<B: MerchantDirectory>(
    path: web::Path<String>,
    api: web::Data<MerchantApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = MerchantId::from(path.into_inner());
    debug!("💻️ GET merchant {id}");
    match api.fetch_merchant(&id).await? {
        Some(merchant) => Ok(HttpResponse::Ok().json(MerchantResult::redacted(merchant))),
        None => Err(ServerError::NoRecordFound(format!("merchant {id}"))),
    }
}

//----------------------------------------------   Intents  ----------------------------------------------------
/// Creates a payment intent for the authenticated merchant.
///
/// The `merchantId` in the body must belong to the supplied API key; amounts are decimal strings of minor units
/// and anything else has already been rejected during deserialization.
pub async fn create_intent<B: IntentStore + MerchantDirectory>(
    req: HttpRequest,
    payments: web::Data<PaymentFlowApi<B>>,
    merchants: web::Data<MerchantApi<B>>,
    options: web::Data<ServerOptions>,
    body: web::Json<NewIntentBody>,
) -> Result<HttpResponse, ServerError> {
    let merchant = authenticated_merchant(&req, merchants.as_ref()).await?;
    let body = body.into_inner();
    if body.merchant_id != merchant.id {
        debug!("💻️ Merchant {} tried to create an intent for {}", merchant.id, body.merchant_id);
        return Err(ServerError::InsufficientPermissions(
            "The API key does not belong to the requested merchant".to_string(),
        ));
    }
    let ttl = match body.expires_in_seconds {
        Some(secs) if secs <= 0 => {
            return Err(ServerError::InvalidRequestBody("expiresInSeconds must be positive".to_string()))
        },
        Some(secs) => Duration::seconds(secs),
        None => options.default_intent_ttl,
    };
    let mut request = NewIntentRequest::new(body.merchant_id, body.amount, ttl);
    if let Some(description) = body.description {
        request = request.with_description(description);
    }
    if let Some(metadata) = body.metadata {
        request = request.with_metadata(metadata.to_string());
    }
    let intent = payments.create_intent(request).await?;
    debug!("💻️ Created intent {} for merchant {}", intent.id, merchant.id);
    Ok(HttpResponse::Created().json(IntentResult::from(intent)))
}

pub async fn intent_by_id<B: IntentStore + MerchantDirectory>(
    req: HttpRequest,
    path: web::Path<String>,
    payments: web::Data<PaymentFlowApi<B>>,
    merchants: web::Data<MerchantApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let merchant = authenticated_merchant(&req, merchants.as_ref()).await?;
    let id = path.into_inner().into();
    debug!("💻️ GET intent {id} for merchant {}", merchant.id);
    // An intent belonging to another merchant is indistinguishable from a missing one.
    match payments.fetch_intent(&id).await? {
        Some(intent) if intent.merchant_id == merchant.id => Ok(HttpResponse::Ok().json(IntentResult::from(intent))),
        _ => Err(ServerError::NoRecordFound(format!("payment intent {id}"))),
    }
}

//----------------------------------------------   Webhook  ----------------------------------------------------
/// The blockchain transfer webhook.
///
/// Every reconciliation decision — including "nothing was updated" — is a 200 with `{updated, reason?}` in the
/// body, so the event source never mistakes a rejected transfer for a delivery failure and retries it into a
/// storm. Only malformed payloads and infrastructure failures are HTTP errors.
pub async fn blockchain_webhook<B: IntentStore + MerchantDirectory>(
    api: web::Data<PaymentFlowApi<B>>,
    body: web::Json<TransferNotification>,
) -> Result<HttpResponse, ServerError> {
    let notification = body.into_inner();
    debug!("💻️ Received transfer notification [{}] to {}", notification.tx_hash, notification.to);
    let result = api.reconcile(notification.into()).await.map_err(|e| {
        error!("💻️ Reconciliation hit an infrastructure failure. {e}");
        ServerError::BackendError(e.to_string())
    })?;
    Ok(HttpResponse::Ok().json(ReconciliationResponse::from(result)))
}
