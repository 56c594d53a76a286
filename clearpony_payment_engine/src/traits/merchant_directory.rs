use crate::{
    db_types::{Merchant, MerchantId, NewMerchant},
    traits::PaymentGatewayError,
};

/// Resolves merchant identifiers to their receiving address and callback URL, and owns merchant registration.
///
/// The reconciliation core only ever *reads* from the directory; merchants are never mutated by payment flows.
#[allow(async_fn_in_trait)]
pub trait MerchantDirectory {
    /// Persists a new merchant record. The caller supplies the generated id and API key.
    async fn create_merchant(&self, merchant: NewMerchant) -> Result<Merchant, PaymentGatewayError>;

    /// Fetches a merchant by its id.
    async fn fetch_merchant_by_id(&self, id: &MerchantId) -> Result<Option<Merchant>, PaymentGatewayError>;

    /// Fetches the merchant owning the given API key, if any. Used by the HTTP layer to authenticate requests.
    async fn fetch_merchant_by_api_key(&self, api_key: &str) -> Result<Option<Merchant>, PaymentGatewayError>;
}
