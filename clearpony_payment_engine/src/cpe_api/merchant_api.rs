use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Address, Merchant, MerchantId, NewMerchant},
    helpers,
    traits::{MerchantDirectory, PaymentGatewayError},
};

/// API for merchant registration and lookup.
///
/// Merchants are the owners of payment intents; the reconciliation flow only ever reads from this directory, so
/// the API surface is intentionally small: register, fetch, and authenticate by API key.
pub struct MerchantApi<B> {
    db: B,
}

impl<B> Debug for MerchantApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MerchantApi")
    }
}

impl<B> MerchantApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> MerchantApi<B>
where B: MerchantDirectory
{
    /// Registers a new merchant, generating its id and API key. The key is returned exactly once, inside the new
    /// record; afterwards it can only be used, not retrieved.
    pub async fn register_merchant(
        &self,
        name: String,
        receiving_address: Address,
        callback_url: Option<String>,
    ) -> Result<Merchant, PaymentGatewayError> {
        let merchant = NewMerchant {
            id: helpers::new_merchant_id(),
            name,
            receiving_address,
            callback_url,
            api_key: helpers::new_api_key(),
        };
        let merchant = self.db.create_merchant(merchant).await?;
        debug!("🧑️‍💼️ Merchant {} registered with receiving address {}", merchant.id, merchant.receiving_address);
        Ok(merchant)
    }

    pub async fn fetch_merchant(&self, id: &MerchantId) -> Result<Option<Merchant>, PaymentGatewayError> {
        self.db.fetch_merchant_by_id(id).await
    }

    /// Resolves an API key to its merchant. `None` means the key is unknown; the HTTP layer turns that into an
    /// authentication failure.
    pub async fn authenticate(&self, api_key: &str) -> Result<Option<Merchant>, PaymentGatewayError> {
        self.db.fetch_merchant_by_api_key(api_key).await
    }
}
