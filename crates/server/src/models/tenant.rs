//! Tenant and user domain types.

use chrono::{DateTime, Utc};

use storepulse_core::{Email, TenantId, UserId};

/// A tenant of the analytics dashboard.
///
/// The tenant is the isolation boundary: it owns users and connected stores,
/// and every read or write in the system is scoped to exactly one tenant.
#[derive(Debug, Clone)]
pub struct Tenant {
    /// Unique tenant ID.
    pub id: TenantId,
    /// Display name of the organization.
    pub name: String,
    /// When the tenant was created.
    pub created_at: DateTime<Utc>,
}

/// A dashboard user, belonging to exactly one tenant.
///
/// Implements `Debug` manually to redact the password hash.
#[derive(Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Tenant this user belongs to.
    pub tenant_id: TenantId,
    /// Display name.
    pub name: String,
    /// User's email address (globally unique).
    pub email: Email,
    /// Argon2 password hash.
    pub password_hash: String,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("tenant_id", &self.tenant_id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}
