//! Row-level security policies for tenant isolation.
//!
//! Every tenant-scoped table gets a policy comparing `tenant_id` against
//! the `app.current_tenant_id` session variable set by
//! `rls::RlsConnection`. FORCE makes the policies apply to the table owner
//! as well, so application connections cannot bypass them.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(ENABLE_RLS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DISABLE_RLS_SQL).await?;
        Ok(())
    }
}

const ENABLE_RLS_SQL: &str = r"
ALTER TABLE customers ENABLE ROW LEVEL SECURITY;
ALTER TABLE customers FORCE ROW LEVEL SECURITY;
CREATE POLICY tenant_isolation_customers ON customers
    USING (tenant_id = current_setting('app.current_tenant_id', true)::uuid);

ALTER TABLE orders ENABLE ROW LEVEL SECURITY;
ALTER TABLE orders FORCE ROW LEVEL SECURITY;
CREATE POLICY tenant_isolation_orders ON orders
    USING (tenant_id = current_setting('app.current_tenant_id', true)::uuid);

ALTER TABLE credit_accounts ENABLE ROW LEVEL SECURITY;
ALTER TABLE credit_accounts FORCE ROW LEVEL SECURITY;
CREATE POLICY tenant_isolation_credit_accounts ON credit_accounts
    USING (tenant_id = current_setting('app.current_tenant_id', true)::uuid);

ALTER TABLE credit_transactions ENABLE ROW LEVEL SECURITY;
ALTER TABLE credit_transactions FORCE ROW LEVEL SECURITY;
CREATE POLICY tenant_isolation_credit_transactions ON credit_transactions
    USING (tenant_id = current_setting('app.current_tenant_id', true)::uuid);

ALTER TABLE payments ENABLE ROW LEVEL SECURITY;
ALTER TABLE payments FORCE ROW LEVEL SECURITY;
CREATE POLICY tenant_isolation_payments ON payments
    USING (tenant_id = current_setting('app.current_tenant_id', true)::uuid);
";

const DISABLE_RLS_SQL: &str = r"
DROP POLICY IF EXISTS tenant_isolation_payments ON payments;
ALTER TABLE payments DISABLE ROW LEVEL SECURITY;

DROP POLICY IF EXISTS tenant_isolation_credit_transactions ON credit_transactions;
ALTER TABLE credit_transactions DISABLE ROW LEVEL SECURITY;

DROP POLICY IF EXISTS tenant_isolation_credit_accounts ON credit_accounts;
ALTER TABLE credit_accounts DISABLE ROW LEVEL SECURITY;

DROP POLICY IF EXISTS tenant_isolation_orders ON orders;
ALTER TABLE orders DISABLE ROW LEVEL SECURITY;

DROP POLICY IF EXISTS tenant_isolation_customers ON customers;
ALTER TABLE customers DISABLE ROW LEVEL SECURITY;
";
