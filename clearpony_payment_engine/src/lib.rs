//! Clearpony Payment Engine
//!
//! The Clearpony payment engine lets merchants register an expectation of an incoming CLPNY payment (a *payment
//! intent*) and reconciles observed blockchain transfers against those expectations, transitioning each intent to
//! `Paid` exactly once no matter how often, or in what order, transfer notifications arrive. This library contains
//! the core logic and is transport-agnostic; the HTTP server lives in a separate crate.
//!
//! The library is divided into three main sections:
//! 1. Storage contracts and backends ([`traits`], `sqlite`). SQLite is the supported backend. You should never need
//!    to touch the database directly; use the public APIs instead. The exception is the data types, which are
//!    defined in [`db_types`] and are public.
//! 2. The engine public API ([`PaymentFlowApi`], [`MerchantApi`]): intent creation, reconciliation of transfer
//!    events, the expiry primitive, and merchant registration/lookup.
//! 3. Events ([`events`]): after a transfer pays an intent, a `PaymentConfirmedEvent` is published. A small actor
//!    framework lets the embedding application hook into these confirmations (e.g. to notify the merchant) without
//!    ever touching the reconciliation consistency boundary.
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod traits;

mod cpe_api;
#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use cpe_api::{
    merchant_api::MerchantApi,
    payment_flow_api::PaymentFlowApi,
    payment_objects::{NewIntentRequest, Reconciliation, RejectionReason},
};
pub use traits::{IntentStore, MerchantDirectory, PaymentGatewayError};
