pub mod prepare_env;

use chrono::Duration;
use cpg_common::MinorUnits;
use clearpony_payment_engine::{
    db_types::{Address, Merchant, PaymentIntent},
    events::EventProducers,
    MerchantApi,
    NewIntentRequest,
    PaymentFlowApi,
    SqliteDatabase,
};

pub async fn register_test_merchant(db: &SqliteDatabase, address: &str) -> Merchant {
    let api = MerchantApi::new(db.clone());
    api.register_merchant("Test merchant".to_string(), Address::from(address), None)
        .await
        .expect("Error registering merchant")
}

pub fn payment_api(db: &SqliteDatabase) -> PaymentFlowApi<SqliteDatabase> {
    PaymentFlowApi::new(db.clone(), EventProducers::default())
}

pub async fn create_test_intent(
    db: &SqliteDatabase,
    merchant: &Merchant,
    amount: i64,
    ttl_seconds: i64,
) -> PaymentIntent {
    let api = payment_api(db);
    let request =
        NewIntentRequest::new(merchant.id.clone(), MinorUnits::from(amount), Duration::seconds(ttl_seconds));
    api.create_intent(request).await.expect("Error creating intent")
}
