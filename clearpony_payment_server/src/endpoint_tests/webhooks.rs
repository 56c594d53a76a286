use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{Duration, Utc};
use clearpony_payment_engine::{events::EventProducers, PaymentFlowApi};
use serde_json::{json, Value};

use super::{
    helpers::{paid_intent, pending_intent, post_request, test_merchant},
    mocks::MockGateway,
};
use crate::routes::blockchain_webhook;

fn configure(gateway: MockGateway) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let api = PaymentFlowApi::new(gateway, EventProducers::default());
        cfg.app_data(web::Data::new(api))
            .service(web::resource("/webhooks/blockchain").route(web::post().to(blockchain_webhook::<MockGateway>)));
    }
}

fn direct_event(intent_id: &str, amount: &str) -> Value {
    json!({
        "txHash": "0x1",
        "from": "0xf00d",
        "to": "0xabc",
        "amount": amount,
        "paymentIntentId": intent_id,
    })
}

#[actix_web::test]
async fn webhook_pays_the_referenced_intent() {
    let _ = env_logger::try_init();
    let merchant = test_merchant("mch_1", "0xabc");
    let pending = pending_intent("pi_1", &merchant, 1000);
    let paid = paid_intent("pi_1", &merchant, 1000, "0x1");

    let mut gateway = MockGateway::new();
    gateway.expect_fetch_intent_by_id().returning(move |_| Ok(Some(pending.clone())));
    gateway.expect_mark_intent_paid().returning(move |_, _| Ok(Some(paid.clone())));

    let (status, body) =
        post_request(None, "/webhooks/blockchain", direct_event("pi_1", "1000"), configure(gateway)).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], json!(true));
    assert!(body.get("reason").is_none());
}

#[actix_web::test]
async fn webhook_replay_is_a_success_class_no_op() {
    let _ = env_logger::try_init();
    let merchant = test_merchant("mch_1", "0xabc");
    let paid = paid_intent("pi_1", &merchant, 1000, "0x1");

    // No mark_intent_paid expectation: a replay must never reach the transition.
    let mut gateway = MockGateway::new();
    gateway.expect_fetch_intent_by_id().returning(move |_| Ok(Some(paid.clone())));

    let (status, body) =
        post_request(None, "/webhooks/blockchain", direct_event("pi_1", "1000"), configure(gateway)).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], json!(false));
    assert_eq!(body["reason"], json!("already_paid"));
}

#[actix_web::test]
async fn webhook_reports_underpayment() {
    let _ = env_logger::try_init();
    let merchant = test_merchant("mch_1", "0xabc");
    let pending = pending_intent("pi_1", &merchant, 1000);

    let mut gateway = MockGateway::new();
    gateway.expect_fetch_intent_by_id().returning(move |_| Ok(Some(pending.clone())));

    let (status, body) =
        post_request(None, "/webhooks/blockchain", direct_event("pi_1", "999"), configure(gateway)).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], json!(false));
    assert_eq!(body["reason"], json!("amount_too_small"));
}

#[actix_web::test]
async fn webhook_reports_expiry_before_any_sweep_has_run() {
    let _ = env_logger::try_init();
    let merchant = test_merchant("mch_1", "0xabc");
    let mut overdue = pending_intent("pi_1", &merchant, 1000);
    overdue.expires_at = Utc::now() - Duration::seconds(60);

    let mut gateway = MockGateway::new();
    gateway.expect_fetch_intent_by_id().returning(move |_| Ok(Some(overdue.clone())));

    let (status, body) =
        post_request(None, "/webhooks/blockchain", direct_event("pi_1", "1000"), configure(gateway)).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reason"], json!("expired"));
}

#[actix_web::test]
async fn webhook_refuses_ambiguous_discovery_matches() {
    let _ = env_logger::try_init();
    let merchant = test_merchant("mch_1", "0xabc");
    let first = pending_intent("pi_1", &merchant, 1000);
    let second = pending_intent("pi_2", &merchant, 1000);

    // No mark_intent_paid expectation: ambiguity must leave both intents untouched.
    let mut gateway = MockGateway::new();
    gateway.expect_fetch_pending_intents_for().returning(move |_, _| Ok(vec![first.clone(), second.clone()]));

    let event = json!({ "txHash": "0x1", "from": "0xf00d", "to": "0xabc", "amount": "1000" });
    let (status, body) = post_request(None, "/webhooks/blockchain", event, configure(gateway)).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], json!(false));
    assert_eq!(body["reason"], json!("multiple_matches"));
}

#[actix_web::test]
async fn webhook_rejects_structurally_malformed_payloads() {
    let _ = env_logger::try_init();
    // A bare JSON number for the amount risks float precision loss and is refused outright.
    let event = json!({ "txHash": "0x1", "from": "0xf00d", "to": "0xabc", "amount": 1000 });
    let (status, _) = post_request(None, "/webhooks/blockchain", event, configure(MockGateway::new())).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
