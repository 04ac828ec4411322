//! Row-Level Security (RLS) context management.
//!
//! This module provides utilities for setting `PostgreSQL` RLS context
//! per request to enforce tenant data isolation.
//!
//! # Usage
//!
//! ```ignore
//! use botica_db::rls::RlsConnection;
//!
//! // In your handler or middleware:
//! let rls_conn = RlsConnection::new(&db, tenant_id).await?;
//!
//! // Use rls_conn.transaction() for all queries
//! let payments = Payment::find().all(rls_conn.transaction()).await?;
//!
//! // Commit when done
//! rls_conn.commit().await?;
//! ```

use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};
use uuid::Uuid;

/// A database connection wrapper that sets RLS context for tenant isolation.
///
/// This struct wraps a database transaction and ensures that the `PostgreSQL`
/// session variable `app.current_tenant_id` is set before any queries are
/// executed, enabling row-level security policies.
pub struct RlsConnection {
    txn: DatabaseTransaction,
}

impl RlsConnection {
    /// Creates a new RLS-enabled connection with the given tenant context.
    ///
    /// This begins a transaction and sets the `app.current_tenant_id`
    /// session variable using `SET LOCAL`, which scopes the setting to the
    /// current transaction only.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the RLS
    /// context cannot be set.
    pub async fn new(db: &DatabaseConnection, tenant_id: Uuid) -> Result<Self, DbErr> {
        let txn = db.begin().await?;

        // SET LOCAL scopes the setting to this transaction; the UUID comes
        // from a parsed Uuid, so interpolation is injection-safe.
        let sql = format!("SET LOCAL app.current_tenant_id = '{tenant_id}'");
        txn.execute_unprepared(&sql).await?;

        Ok(Self { txn })
    }

    /// Returns a reference to the underlying transaction for executing queries.
    ///
    /// All queries executed through this transaction will be subject to
    /// the RLS policies based on the tenant context set during creation.
    #[must_use]
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commits the transaction, persisting all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    /// Rolls back the transaction, discarding all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }
}

/// Extension trait for `DatabaseConnection` to easily create RLS-enabled connections.
#[async_trait::async_trait]
pub trait RlsExt {
    /// Creates an RLS-enabled connection with the given tenant context.
    ///
    /// # Errors
    ///
    /// Returns an error if the RLS connection cannot be created.
    async fn with_rls(&self, tenant_id: Uuid) -> Result<RlsConnection, DbErr>;
}

#[async_trait::async_trait]
impl RlsExt for DatabaseConnection {
    async fn with_rls(&self, tenant_id: Uuid) -> Result<RlsConnection, DbErr> {
        RlsConnection::new(self, tenant_id).await
    }
}

/// Sets the RLS context on an existing transaction.
///
/// Use this when you already have a transaction and need to set the RLS
/// context.
///
/// # Errors
///
/// Returns an error if the RLS context cannot be set.
pub async fn set_rls_context(txn: &DatabaseTransaction, tenant_id: Uuid) -> Result<(), DbErr> {
    let sql = format!("SET LOCAL app.current_tenant_id = '{tenant_id}'");
    txn.execute_unprepared(&sql).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Note: These tests require a real PostgreSQL database with RLS enabled.
    // They should be run as integration tests.

    #[test]
    fn test_rls_sql_format() {
        let tenant_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let sql = format!("SET LOCAL app.current_tenant_id = '{tenant_id}'");
        assert_eq!(
            sql,
            "SET LOCAL app.current_tenant_id = '550e8400-e29b-41d4-a716-446655440000'"
        );
    }
}
