//! Storepulse Core - Shared types library.
//!
//! This crate provides common types used across all Storepulse components:
//! - `server` - Multi-tenant analytics backend (sync, webhooks, metrics)
//! - `integration-tests` - End-to-end API tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, money parsing,
//!   and sync bookkeeping enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
