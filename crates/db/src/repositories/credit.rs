//! Credit repository for credit account and transaction operations.
//!
//! The balance invariant is enforced inside a single database transaction:
//! the account row is locked with `SELECT ... FOR UPDATE`, the limit check
//! runs against the locked balance, and the transaction insert plus the
//! balance update commit together. Two concurrent charges against the same
//! account therefore serialize on the row lock and can never both read the
//! same balance.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use botica_core::credit::{CreditError, CreditService, TransactionStatus};
use botica_shared::types::PageRequest;

use crate::entities::{
    credit_accounts, credit_transactions, customers,
    sea_orm_active_enums::CreditTransactionStatus,
};

/// Error types for credit operations.
#[derive(Debug, thiserror::Error)]
pub enum CreditRepoError {
    /// No credit account exists for the customer within the tenant.
    #[error("No credit account for customer {0}")]
    AccountNotFoundForCustomer(Uuid),

    /// Credit account not found within the tenant.
    #[error("Credit account not found: {0}")]
    AccountNotFound(Uuid),

    /// Credit transaction not found within the tenant.
    #[error("Credit transaction not found: {0}")]
    TransactionNotFound(Uuid),

    /// Referenced customer does not exist within the tenant.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// A credit account already exists for this customer.
    #[error("Credit account already exists for customer {0}")]
    DuplicateAccount(Uuid),

    /// Business rule violation from the credit service.
    #[error(transparent)]
    Credit(#[from] CreditError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl CreditRepoError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFoundForCustomer(_) | Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            Self::DuplicateAccount(_) => "DUPLICATE_ACCOUNT",
            Self::Credit(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::AccountNotFoundForCustomer(_)
            | Self::AccountNotFound(_)
            | Self::TransactionNotFound(_) => 404,
            Self::CustomerNotFound(_) => 422,
            Self::DuplicateAccount(_) => 409,
            Self::Credit(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

/// Input for applying a charge to a credit account.
#[derive(Debug, Clone)]
pub struct ApplyChargeInput {
    /// Charge amount added to the balance.
    pub amount: Decimal,
    /// Informational fee recorded on the transaction.
    pub fee: Decimal,
    /// Date the charge is due.
    pub due_date: NaiveDate,
    /// Optional order the charge belongs to.
    pub order_id: Option<Uuid>,
}

/// Result of a successfully applied charge.
#[derive(Debug, Clone)]
pub struct AppliedCharge {
    /// The persisted credit transaction.
    pub transaction: credit_transactions::Model,
    /// The account with its updated balance.
    pub account: credit_accounts::Model,
}

/// Credit repository for account and transaction operations.
#[derive(Debug, Clone)]
pub struct CreditRepository {
    db: DatabaseConnection,
}

impl CreditRepository {
    /// Creates a new credit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a credit account for a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The limit is negative
    /// - The customer does not exist within the tenant
    /// - An account already exists for the (tenant, customer) pair
    /// - The database operation fails
    pub async fn create_account(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
        limit: Decimal,
    ) -> Result<credit_accounts::Model, CreditRepoError> {
        CreditService::validate_limit(limit)?;

        let customer = customers::Entity::find_by_id(customer_id)
            .filter(customers::Column::TenantId.eq(tenant_id))
            .one(&self.db)
            .await?;
        if customer.is_none() {
            return Err(CreditRepoError::CustomerNotFound(customer_id));
        }

        let now = Utc::now().into();
        let account = credit_accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            customer_id: Set(customer_id),
            credit_limit: Set(limit),
            balance: Set(Decimal::ZERO),
            status: Set(botica_core::credit::AccountStatus::Active.into()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // The unique constraint on (tenant_id, customer_id) is the source
        // of truth for duplicates; a pre-check would still race.
        match account.insert(&self.db).await {
            Ok(model) => {
                info!(
                    tenant_id = %tenant_id,
                    customer_id = %customer_id,
                    account_id = %model.id,
                    "Credit account created"
                );
                Ok(model)
            }
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    Err(CreditRepoError::DuplicateAccount(customer_id))
                }
                _ => Err(e.into()),
            },
        }
    }

    /// Applies a charge to the customer's credit account.
    ///
    /// The account row is locked for the duration of the database
    /// transaction; the limit check and the balance update are therefore
    /// read-consistent. On a limit violation nothing persists.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No credit account exists for the customer within the tenant
    /// - The account rejects charges or the charge exceeds the limit
    /// - The database operation fails
    pub async fn apply_transaction(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
        input: ApplyChargeInput,
    ) -> Result<AppliedCharge, CreditRepoError> {
        let txn = self.db.begin().await?;

        // Lock the account row so concurrent charges serialize here.
        let account = credit_accounts::Entity::find()
            .filter(credit_accounts::Column::TenantId.eq(tenant_id))
            .filter(credit_accounts::Column::CustomerId.eq(customer_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(CreditRepoError::AccountNotFoundForCustomer(customer_id))?;

        // Dropping `txn` on the error path rolls everything back.
        let decision = CreditService::check_charge(
            account.id,
            account.status.clone().into(),
            account.balance,
            account.credit_limit,
            input.amount,
            input.fee,
        )
        .inspect_err(|e| {
            if let CreditError::LimitExceeded { balance, limit, requested } = e {
                warn!(
                    tenant_id = %tenant_id,
                    account_id = %account.id,
                    %balance,
                    %limit,
                    %requested,
                    "Charge rejected: credit limit exceeded"
                );
            }
        })?;

        let now = Utc::now().into();
        let transaction = credit_transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            credit_account_id: Set(account.id),
            order_id: Set(input.order_id),
            amount: Set(input.amount),
            fee: Set(input.fee),
            due_date: Set(input.due_date),
            paid_date: Set(None),
            status: Set(CreditTransactionStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut active: credit_accounts::ActiveModel = account.into();
        active.balance = Set(decision.new_balance);
        active.updated_at = Set(now);
        let account = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            tenant_id = %tenant_id,
            account_id = %account.id,
            transaction_id = %transaction.id,
            new_balance = %account.balance,
            "Credit charge applied"
        );

        Ok(AppliedCharge {
            transaction,
            account,
        })
    }

    /// Overrides an account balance (manual correction).
    ///
    /// # Errors
    ///
    /// Returns an error if the balance is negative, the (account, tenant)
    /// pair does not resolve, or the database operation fails.
    pub async fn update_balance(
        &self,
        tenant_id: Uuid,
        credit_account_id: Uuid,
        new_balance: Decimal,
    ) -> Result<credit_accounts::Model, CreditRepoError> {
        CreditService::validate_balance_override(new_balance)?;

        // Scoping by tenant prevents cross-tenant balance tampering.
        let account = credit_accounts::Entity::find_by_id(credit_account_id)
            .filter(credit_accounts::Column::TenantId.eq(tenant_id))
            .one(&self.db)
            .await?
            .ok_or(CreditRepoError::AccountNotFound(credit_account_id))?;

        let previous = account.balance;
        let mut active: credit_accounts::ActiveModel = account.into();
        active.balance = Set(new_balance);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&self.db).await?;

        info!(
            tenant_id = %tenant_id,
            account_id = %credit_account_id,
            %previous,
            new_balance = %updated.balance,
            "Credit balance overridden"
        );

        Ok(updated)
    }

    /// Marks a pending or overdue credit transaction as paid.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction does not resolve within the
    /// tenant, the status transition is not allowed, or the database
    /// operation fails.
    pub async fn mark_transaction_paid(
        &self,
        tenant_id: Uuid,
        transaction_id: Uuid,
        paid_date: NaiveDate,
    ) -> Result<credit_transactions::Model, CreditRepoError> {
        let transaction = credit_transactions::Entity::find_by_id(transaction_id)
            .filter(credit_transactions::Column::TenantId.eq(tenant_id))
            .one(&self.db)
            .await?
            .ok_or(CreditRepoError::TransactionNotFound(transaction_id))?;

        CreditService::validate_transition(
            transaction.status.clone().into(),
            TransactionStatus::Paid,
        )?;

        let mut active: credit_transactions::ActiveModel = transaction.into();
        active.status = Set(CreditTransactionStatus::Paid);
        active.paid_date = Set(Some(paid_date));
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Flips pending transactions past their due date to overdue.
    ///
    /// Returns the number of transactions swept.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn sweep_overdue(
        &self,
        tenant_id: Uuid,
        today: NaiveDate,
    ) -> Result<u64, CreditRepoError> {
        let result = credit_transactions::Entity::update_many()
            .col_expr(
                credit_transactions::Column::Status,
                CreditTransactionStatus::Overdue.as_enum(),
            )
            .filter(credit_transactions::Column::TenantId.eq(tenant_id))
            .filter(credit_transactions::Column::Status.eq(CreditTransactionStatus::Pending))
            .filter(credit_transactions::Column::DueDate.lt(today))
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            info!(
                tenant_id = %tenant_id,
                swept = result.rows_affected,
                "Overdue sweep completed"
            );
        }

        Ok(result.rows_affected)
    }

    /// Gets a credit account by id within the tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not resolve or the database
    /// query fails.
    pub async fn get_account(
        &self,
        tenant_id: Uuid,
        credit_account_id: Uuid,
    ) -> Result<credit_accounts::Model, CreditRepoError> {
        credit_accounts::Entity::find_by_id(credit_account_id)
            .filter(credit_accounts::Column::TenantId.eq(tenant_id))
            .one(&self.db)
            .await?
            .ok_or(CreditRepoError::AccountNotFound(credit_account_id))
    }

    /// Lists credit accounts for a tenant, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(
        &self,
        tenant_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Vec<credit_accounts::Model>, u64), CreditRepoError> {
        let query = credit_accounts::Entity::find()
            .filter(credit_accounts::Column::TenantId.eq(tenant_id))
            .order_by_desc(credit_accounts::Column::CreatedAt);

        let total = query.clone().count(&self.db).await?;
        let accounts = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((accounts, total))
    }

    /// Lists transactions for a credit account, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not resolve or the database
    /// query fails.
    pub async fn list_transactions(
        &self,
        tenant_id: Uuid,
        credit_account_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Vec<credit_transactions::Model>, u64), CreditRepoError> {
        // Resolve the account first so an unknown id is a 404, not an
        // empty list.
        self.get_account(tenant_id, credit_account_id).await?;

        let query = credit_transactions::Entity::find()
            .filter(credit_transactions::Column::TenantId.eq(tenant_id))
            .filter(credit_transactions::Column::CreditAccountId.eq(credit_account_id))
            .order_by_desc(credit_transactions::Column::CreatedAt);

        let total = query.clone().count(&self.db).await?;
        let transactions = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((transactions, total))
    }
}
