use cpg_common::MinorUnits;
use clearpony_payment_engine::{
    db_types::{Address, IntentId, Merchant, MerchantId, NewMerchant, NewPaymentIntent, PaymentIntent},
    traits::{IntentStore, MerchantDirectory, PaymentGatewayError},
};
use mockall::mock;

mock! {
    pub Gateway {}
    impl IntentStore for Gateway {
        async fn create_intent(&self, intent: NewPaymentIntent) -> Result<PaymentIntent, PaymentGatewayError>;
        async fn fetch_intent_by_id(&self, id: &IntentId) -> Result<Option<PaymentIntent>, PaymentGatewayError>;
        async fn fetch_pending_intents_for(&self, address: &Address, amount: MinorUnits) -> Result<Vec<PaymentIntent>, PaymentGatewayError>;
        async fn mark_intent_paid(&self, id: &IntentId, tx_hash: &str) -> Result<Option<PaymentIntent>, PaymentGatewayError>;
        async fn expire_intents(&self) -> Result<Vec<PaymentIntent>, PaymentGatewayError>;
    }
    impl MerchantDirectory for Gateway {
        async fn create_merchant(&self, merchant: NewMerchant) -> Result<Merchant, PaymentGatewayError>;
        async fn fetch_merchant_by_id(&self, id: &MerchantId) -> Result<Option<Merchant>, PaymentGatewayError>;
        async fn fetch_merchant_by_api_key(&self, api_key: &str) -> Result<Option<Merchant>, PaymentGatewayError>;
    }
}
