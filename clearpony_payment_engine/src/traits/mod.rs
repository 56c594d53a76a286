//! The persistence contracts consumed by the payment engine.
//!
//! Backends implement [`IntentStore`] and [`MerchantDirectory`] to act as storage for the Clearpony payment gateway.
//! The engine never talks to a database directly; everything goes through these traits, so the decision logic in
//! [`crate::PaymentFlowApi`] can be exercised against any implementation.
mod intent_store;
mod merchant_directory;

pub use intent_store::{IntentStore, PaymentGatewayError};
pub use merchant_directory::MerchantDirectory;
