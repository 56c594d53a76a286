//! `SqliteDatabase` is a concrete implementation of a Clearpony payment gateway backend.
//!
//! Unsurprisingly, it uses SQLite, and implements the traits defined in the [`crate::traits`] module. The guarded
//! UPDATE in [`db::intents::mark_paid`] is what realises the store contract's atomic-transition requirement: SQLite
//! serialises writers, so exactly one concurrent caller observes the `Pending` precondition.
use std::fmt::Debug;

use cpg_common::MinorUnits;
use sqlx::{migrate::Migrator, SqlitePool};

use super::db::{self, intents, merchants};
use crate::{
    db_types::{Address, IntentId, Merchant, MerchantId, NewMerchant, NewPaymentIntent, PaymentIntent},
    traits::{IntentStore, MerchantDirectory, PaymentGatewayError},
};

static MIGRATOR: Migrator = sqlx::migrate!("./src/sqlite/migrations");

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = db::new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Call once at startup, before serving requests.
    pub async fn run_migrations(&self) -> Result<(), PaymentGatewayError> {
        MIGRATOR.run(&self.pool).await.map_err(|e| PaymentGatewayError::DatabaseError(e.to_string()))
    }
}

impl IntentStore for SqliteDatabase {
    async fn create_intent(&self, intent: NewPaymentIntent) -> Result<PaymentIntent, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        intents::insert_intent(intent, &mut conn).await
    }

    async fn fetch_intent_by_id(&self, id: &IntentId) -> Result<Option<PaymentIntent>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        intents::fetch_intent_by_id(id, &mut conn).await
    }

    async fn fetch_pending_intents_for(
        &self,
        address: &Address,
        amount: MinorUnits,
    ) -> Result<Vec<PaymentIntent>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        intents::fetch_pending_by_address_and_amount(address, amount, &mut conn).await
    }

    async fn mark_intent_paid(
        &self,
        id: &IntentId,
        tx_hash: &str,
    ) -> Result<Option<PaymentIntent>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        intents::mark_paid(id, tx_hash, &mut conn).await
    }

    async fn expire_intents(&self) -> Result<Vec<PaymentIntent>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        intents::expire_overdue(&mut conn).await
    }
}

impl MerchantDirectory for SqliteDatabase {
    async fn create_merchant(&self, merchant: NewMerchant) -> Result<Merchant, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        merchants::insert_merchant(merchant, &mut conn).await
    }

    async fn fetch_merchant_by_id(&self, id: &MerchantId) -> Result<Option<Merchant>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        merchants::fetch_merchant_by_id(id, &mut conn).await
    }

    async fn fetch_merchant_by_api_key(&self, api_key: &str) -> Result<Option<Merchant>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        merchants::fetch_merchant_by_api_key(api_key, &mut conn).await
    }
}
