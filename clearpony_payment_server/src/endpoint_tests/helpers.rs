use actix_web::{http::StatusCode, test, web::ServiceConfig, App};
use chrono::{Duration, Utc};
use cpg_common::{MinorUnits, Secret};
use clearpony_payment_engine::db_types::{Address, IntentId, IntentStatus, Merchant, MerchantId, PaymentIntent};
use serde_json::Value;

use crate::auth::API_KEY_HEADER;

pub async fn post_request<F>(
    api_key: Option<&str>,
    path: &str,
    body: Value,
    configure: F,
) -> anyhow::Result<(StatusCode, Value)>
where
    F: FnOnce(&mut ServiceConfig),
{
    let app = test::init_service(App::new().configure(configure)).await;
    let mut req = test::TestRequest::post().uri(path).set_json(&body);
    if let Some(key) = api_key {
        req = req.insert_header((API_KEY_HEADER, key));
    }
    let response = test::call_service(&app, req.to_request()).await;
    let status = response.status();
    let bytes = test::read_body(response).await;
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Ok((status, json))
}

pub async fn get_request<F>(api_key: Option<&str>, path: &str, configure: F) -> anyhow::Result<(StatusCode, Value)>
where F: FnOnce(&mut ServiceConfig) {
    let app = test::init_service(App::new().configure(configure)).await;
    let mut req = test::TestRequest::get().uri(path);
    if let Some(key) = api_key {
        req = req.insert_header((API_KEY_HEADER, key));
    }
    let response = test::call_service(&app, req.to_request()).await;
    let status = response.status();
    let bytes = test::read_body(response).await;
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Ok((status, json))
}

pub fn test_merchant(id: &str, address: &str) -> Merchant {
    Merchant {
        id: MerchantId::from(id.to_string()),
        name: "Shop A".to_string(),
        receiving_address: Address::from(address),
        callback_url: None,
        api_key: Secret::new("cpk_test_key".to_string()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn pending_intent(id: &str, merchant: &Merchant, amount: i64) -> PaymentIntent {
    let amount = MinorUnits::from(amount);
    PaymentIntent {
        id: IntentId::from(id.to_string()),
        merchant_id: merchant.id.clone(),
        amount,
        merchant_address: merchant.receiving_address.clone(),
        status: IntentStatus::Pending,
        blockchain_tx_hash: None,
        description: None,
        metadata: None,
        qr_payload: format!("CLPNY|{}|{amount}|{id}", merchant.receiving_address),
        expires_at: Utc::now() + Duration::seconds(300),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn paid_intent(id: &str, merchant: &Merchant, amount: i64, tx_hash: &str) -> PaymentIntent {
    let mut intent = pending_intent(id, merchant, amount);
    intent.status = IntentStatus::Paid;
    intent.blockchain_tx_hash = Some(tx_hash.to_string());
    intent
}
