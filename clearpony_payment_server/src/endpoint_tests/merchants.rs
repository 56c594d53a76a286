use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use cpg_common::Secret;
use clearpony_payment_engine::{db_types::Merchant, MerchantApi};
use serde_json::{json, Value};

use super::{
    helpers::{get_request, post_request, test_merchant},
    mocks::MockGateway,
};
use crate::routes::{create_merchant, merchant_by_id};

fn configure(directory: MockGateway) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let merchants = MerchantApi::new(directory);
        cfg.app_data(web::Data::new(merchants))
            .service(web::resource("/merchants").route(web::post().to(create_merchant::<MockGateway>)))
            .service(web::resource("/merchants/{id}").route(web::get().to(merchant_by_id::<MockGateway>)));
    }
}

#[actix_web::test]
async fn registration_returns_the_api_key_exactly_once() {
    let _ = env_logger::try_init();
    let mut directory = MockGateway::new();
    directory.expect_create_merchant().returning(|new| {
        Ok(Merchant {
            id: new.id,
            name: new.name,
            receiving_address: new.receiving_address,
            callback_url: new.callback_url,
            api_key: Secret::new(new.api_key),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    });

    let body: Value = json!({ "name": "Shop A", "receivingAddress": "0xabc", "callbackUrl": null });
    let (status, body) = post_request(None, "/merchants", body, configure(directory)).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], json!("Shop A"));
    assert_eq!(body["receivingAddress"], json!("0xabc"));
    assert!(body["id"].as_str().unwrap().starts_with("mch_"));
    assert!(body["apiKey"].as_str().unwrap().starts_with("cpk_"));
}

#[actix_web::test]
async fn merchant_lookup_redacts_the_api_key() {
    let _ = env_logger::try_init();
    let merchant = test_merchant("mch_1", "0xabc");
    let mut directory = MockGateway::new();
    directory.expect_fetch_merchant_by_id().returning(move |_| Ok(Some(merchant.clone())));

    let (status, body) = get_request(None, "/merchants/mch_1", configure(directory)).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], json!("mch_1"));
    assert!(body.get("apiKey").is_none(), "The API key must never be shown after registration");
}

#[actix_web::test]
async fn unknown_merchants_are_not_found() {
    let _ = env_logger::try_init();
    let mut directory = MockGateway::new();
    directory.expect_fetch_merchant_by_id().returning(|_| Ok(None));

    let (status, _) = get_request(None, "/merchants/mch_missing", configure(directory)).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn registration_requires_a_name_and_address() {
    let _ = env_logger::try_init();
    let body = json!({ "name": "", "receivingAddress": "0xabc" });
    let (status, _) = post_request(None, "/merchants", body, configure(MockGateway::new())).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body = json!({ "name": "Shop A", "receivingAddress": "  " });
    let (status, _) = post_request(None, "/merchants", body, configure(MockGateway::new())).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
