//! Tenant repository for tenant lookups and payment settings.

use sea_orm::{DatabaseConnection, DbErr, EntityTrait};
use uuid::Uuid;

use crate::entities::tenants;

/// Key in `payment_settings` holding the platform fee in basis points.
const APPLICATION_FEE_BPS_KEY: &str = "application_fee_bps";

/// Repository for tenant lookups.
#[derive(Debug, Clone)]
pub struct TenantRepository {
    db: DatabaseConnection,
}

impl TenantRepository {
    /// Creates a new tenant repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a tenant by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, tenant_id: Uuid) -> Result<Option<tenants::Model>, DbErr> {
        tenants::Entity::find_by_id(tenant_id).one(&self.db).await
    }

    /// Returns the tenant's configured application fee in basis points.
    ///
    /// Missing tenant or missing setting both mean "no fee".
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn application_fee_bps(&self, tenant_id: Uuid) -> Result<u32, DbErr> {
        let tenant = self.find(tenant_id).await?;

        Ok(tenant
            .and_then(|t| {
                t.payment_settings
                    .get(APPLICATION_FEE_BPS_KEY)
                    .and_then(serde_json::Value::as_u64)
            })
            .and_then(|bps| u32::try_from(bps).ok())
            .unwrap_or(0))
    }
}
