//! Core types for Storepulse.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod sync;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::parse_money;
pub use sync::{SyncEntity, SyncStatus};
