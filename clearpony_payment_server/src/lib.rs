//! # Clearpony payment server
//! This crate hosts the HTTP layer of the Clearpony payment gateway. It is responsible for:
//! * Accepting merchant registrations and payment-intent requests (authenticated by API key).
//! * Listening for incoming blockchain-transfer webhooks and handing them to the reconciliation engine.
//! * Dispatching best-effort payment confirmations to merchant callback URLs.
//! * Running the periodic intent-expiry sweep.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: health check, returns 200 OK.
//! * `/merchants`, `/merchants/{id}`: merchant registration and lookup.
//! * `/payment-intents`, `/payment-intents/{id}`: intent creation and retrieval (requires `X-API-Key`).
//! * `/webhooks/blockchain`: the transfer-event webhook. A reconciliation decision, including "nothing was
//!   updated", is always a 200; only malformed payloads are client errors.
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod expiry_worker;
pub mod notifier;
pub mod routes;
pub mod server;
