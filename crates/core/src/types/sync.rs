//! Sync bookkeeping enums.

use serde::{Deserialize, Serialize};

/// The kind of entity a sync run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncEntity {
    Products,
    Customers,
    Orders,
}

impl SyncEntity {
    /// Canonical uppercase name, as recorded in the sync log.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "PRODUCTS",
            Self::Customers => "CUSTOMERS",
            Self::Orders => "ORDERS",
        }
    }

    /// Parse from the stored representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PRODUCTS" => Some(Self::Products),
            "CUSTOMERS" => Some(Self::Customers),
            "ORDERS" => Some(Self::Orders),
            _ => None,
        }
    }

    /// Lowercase plural noun for human-readable messages.
    #[must_use]
    pub const fn noun(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Customers => "customers",
            Self::Orders => "orders",
        }
    }
}

impl std::fmt::Display for SyncEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a sync run, as recorded in the sync log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    Success,
    Failed,
}

impl SyncStatus {
    /// Canonical uppercase name, as recorded in the sync log.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }

    /// Parse from the stored representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SUCCESS" => Some(Self::Success),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
