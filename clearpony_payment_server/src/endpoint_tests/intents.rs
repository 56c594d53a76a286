use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{Duration, Utc};
use clearpony_payment_engine::{
    db_types::{IntentStatus, PaymentIntent},
    events::EventProducers,
    MerchantApi,
    PaymentFlowApi,
};
use serde_json::{json, Value};

use super::{
    helpers::{get_request, pending_intent, post_request, test_merchant},
    mocks::MockGateway,
};
use crate::{
    config::ServerOptions,
    routes::{create_intent, intent_by_id},
};

fn configure(gateway: MockGateway, directory: MockGateway) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let payments = PaymentFlowApi::new(gateway, EventProducers::default());
        let merchants = MerchantApi::new(directory);
        let options = ServerOptions { default_intent_ttl: Duration::seconds(300) };
        cfg.app_data(web::Data::new(payments))
            .app_data(web::Data::new(merchants))
            .app_data(web::Data::new(options))
            .service(web::resource("/payment-intents").route(web::post().to(create_intent::<MockGateway>)))
            .service(web::resource("/payment-intents/{id}").route(web::get().to(intent_by_id::<MockGateway>)));
    }
}

fn new_intent_body(merchant_id: &str, amount: Value) -> Value {
    json!({ "merchantId": merchant_id, "amount": amount, "description": "order #42" })
}

#[actix_web::test]
async fn creating_an_intent_requires_an_api_key() {
    let _ = env_logger::try_init();
    let (status, body) =
        post_request(None, "/payment-intents", new_intent_body("mch_1", json!("1000")), configure(MockGateway::new(), MockGateway::new()))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("Missing X-API-Key header"));
}

#[actix_web::test]
async fn an_unknown_api_key_is_rejected() {
    let _ = env_logger::try_init();
    let mut directory = MockGateway::new();
    directory.expect_fetch_merchant_by_api_key().returning(|_| Ok(None));
    let (status, _) = post_request(
        Some("cpk_bogus"),
        "/payment-intents",
        new_intent_body("mch_1", json!("1000")),
        configure(MockGateway::new(), directory),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn a_merchant_creates_an_intent_for_itself() {
    let _ = env_logger::try_init();
    let merchant = test_merchant("mch_1", "0xabc");

    let mut directory = MockGateway::new();
    let by_key = merchant.clone();
    directory.expect_fetch_merchant_by_api_key().returning(move |_| Ok(Some(by_key.clone())));

    let mut gateway = MockGateway::new();
    let by_id = merchant.clone();
    gateway.expect_fetch_merchant_by_id().returning(move |_| Ok(Some(by_id.clone())));
    gateway.expect_create_intent().returning(|intent| {
        Ok(PaymentIntent {
            id: intent.id,
            merchant_id: intent.merchant_id,
            amount: intent.amount,
            merchant_address: intent.merchant_address,
            status: IntentStatus::Pending,
            blockchain_tx_hash: None,
            description: intent.description,
            metadata: intent.metadata,
            qr_payload: intent.qr_payload,
            expires_at: intent.expires_at,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    });

    let (status, body) = post_request(
        Some("cpk_test_key"),
        "/payment-intents",
        new_intent_body("mch_1", json!("1000")),
        configure(gateway, directory),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], json!("PENDING"));
    // The amount survives as a decimal string, never a float.
    assert_eq!(body["amount"], json!("1000"));
    assert_eq!(body["merchantAddress"], json!("0xabc"));
    let qr = body["qrPayload"].as_str().unwrap();
    assert!(qr.starts_with("CLPNY|0xabc|1000|pi_"), "Unexpected QR payload: {qr}");
}

#[actix_web::test]
async fn a_merchant_cannot_create_intents_for_another_merchant() {
    let _ = env_logger::try_init();
    let merchant = test_merchant("mch_1", "0xabc");
    let mut directory = MockGateway::new();
    directory.expect_fetch_merchant_by_api_key().returning(move |_| Ok(Some(merchant.clone())));

    let (status, _) = post_request(
        Some("cpk_test_key"),
        "/payment-intents",
        new_intent_body("mch_2", json!("1000")),
        configure(MockGateway::new(), directory),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn numeric_amounts_are_malformed() {
    let _ = env_logger::try_init();
    let (status, _) = post_request(
        Some("cpk_test_key"),
        "/payment-intents",
        new_intent_body("mch_1", json!(1000)),
        configure(MockGateway::new(), MockGateway::new()),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn fetching_an_owned_intent_succeeds() {
    let _ = env_logger::try_init();
    let merchant = test_merchant("mch_1", "0xabc");
    let intent = pending_intent("pi_1", &merchant, 1000);

    let mut directory = MockGateway::new();
    let by_key = merchant.clone();
    directory.expect_fetch_merchant_by_api_key().returning(move |_| Ok(Some(by_key.clone())));
    let mut gateway = MockGateway::new();
    gateway.expect_fetch_intent_by_id().returning(move |_| Ok(Some(intent.clone())));

    let (status, body) =
        get_request(Some("cpk_test_key"), "/payment-intents/pi_1", configure(gateway, directory)).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], json!("pi_1"));
    assert_eq!(body["amount"], json!("1000"));
}

#[actix_web::test]
async fn another_merchants_intent_is_indistinguishable_from_a_missing_one() {
    let _ = env_logger::try_init();
    let caller = test_merchant("mch_1", "0xabc");
    let owner = test_merchant("mch_2", "0xdef");
    let intent = pending_intent("pi_1", &owner, 1000);

    let mut directory = MockGateway::new();
    directory.expect_fetch_merchant_by_api_key().returning(move |_| Ok(Some(caller.clone())));
    let mut gateway = MockGateway::new();
    gateway.expect_fetch_intent_by_id().returning(move |_| Ok(Some(intent.clone())));

    let (status, _) =
        get_request(Some("cpk_test_key"), "/payment-intents/pi_1", configure(gateway, directory)).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
}
