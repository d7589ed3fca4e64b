//! Storepulse server library.
//!
//! Multi-tenant Shopify analytics backend. Tenants connect a store with an
//! Admin API access token; the server pulls products, customers, and orders
//! into `PostgreSQL` (bulk sync plus `orders/create` webhooks) and serves
//! summary metrics, a daily revenue series, and a top-customers leaderboard
//! over JWT-authenticated, tenant-scoped endpoints.
//!
//! # Architecture
//!
//! - [`config`] - environment-driven configuration
//! - [`state`] - shared application state (explicit dependencies, no globals)
//! - [`db`] - storage contract with `PostgreSQL` and in-memory backends
//! - [`shopify`] - Admin REST API client behind the [`shopify::ShopifyApi`] trait
//! - [`sync`] - bulk sync engine and webhook ingestion
//! - [`metrics`] - summary, revenue series, and top-customer aggregation
//! - [`auth`] / [`middleware`] - JWT issuance and the verified-principal extractor
//! - [`routes`] - HTTP surface
//!
//! The crate is a library so the integration test suite can assemble the
//! full router against test doubles; the binary in `main.rs` wires the real
//! `PostgreSQL` and Shopify implementations.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod shopify;
pub mod state;
pub mod sync;
