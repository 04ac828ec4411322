//! Payment repository for payment record operations.
//!
//! Status transitions are persisted as guarded single-statement updates:
//! the `WHERE` clause pins the status the transition starts from, so a
//! concurrent transition (say, a webhook landing while a confirmation call
//! is in flight) makes the update a no-op instead of a lost update. The
//! caller then re-reads the row and reports the state that actually won.

use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;
use uuid::Uuid;

use botica_shared::types::PageRequest;

use crate::entities::{
    payments,
    sea_orm_active_enums::{PaymentMethod, PaymentStatus},
};

/// Error types for payment record operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentRepoError {
    /// Payment not found within the tenant.
    #[error("Payment not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl PaymentRepoError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "PAYMENT_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }
}

/// Input for inserting a new pending payment.
#[derive(Debug, Clone)]
pub struct NewPayment {
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Paying customer, when known.
    pub customer_id: Option<Uuid>,
    /// Order being paid, when known.
    pub order_id: Option<Uuid>,
    /// Payment amount in major units.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// How the payment is made.
    pub method: PaymentMethod,
    /// Gateway intent id for card payments.
    pub payment_intent_id: Option<String>,
    /// Opaque metadata carried on the record.
    pub metadata: serde_json::Value,
}

/// Payment repository for payment CRUD and guarded status transitions.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a new pending payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn insert_pending(
        &self,
        input: NewPayment,
    ) -> Result<payments::Model, PaymentRepoError> {
        let now = chrono::Utc::now().into();
        let payment = payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(input.tenant_id),
            customer_id: Set(input.customer_id),
            order_id: Set(input.order_id),
            amount: Set(input.amount),
            currency: Set(input.currency),
            status: Set(PaymentStatus::Pending),
            method: Set(input.method),
            payment_intent_id: Set(input.payment_intent_id),
            charge_id: Set(None),
            refund_id: Set(None),
            refund_amount: Set(None),
            failure_reason: Set(None),
            metadata: Set(input.metadata),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(
            tenant_id = %payment.tenant_id,
            payment_id = %payment.id,
            amount = %payment.amount,
            "Payment created"
        );

        Ok(payment)
    }

    /// Gets a payment by id within the tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment does not resolve or the database
    /// query fails.
    pub async fn get(
        &self,
        tenant_id: Uuid,
        payment_id: Uuid,
    ) -> Result<payments::Model, PaymentRepoError> {
        payments::Entity::find_by_id(payment_id)
            .filter(payments::Column::TenantId.eq(tenant_id))
            .one(&self.db)
            .await?
            .ok_or(PaymentRepoError::NotFound(payment_id))
    }

    /// Looks up a payment by the (id, tenant, intent) triple.
    ///
    /// A mismatch on any leg is a plain not-found, deliberately not
    /// distinguishing which leg failed.
    ///
    /// # Errors
    ///
    /// Returns an error if the triple does not resolve or the database
    /// query fails.
    pub async fn find_confirmable(
        &self,
        tenant_id: Uuid,
        payment_id: Uuid,
        payment_intent_id: &str,
    ) -> Result<payments::Model, PaymentRepoError> {
        payments::Entity::find_by_id(payment_id)
            .filter(payments::Column::TenantId.eq(tenant_id))
            .filter(payments::Column::PaymentIntentId.eq(payment_intent_id))
            .one(&self.db)
            .await?
            .ok_or(PaymentRepoError::NotFound(payment_id))
    }

    /// Finds a payment by gateway intent id within the tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_intent(
        &self,
        tenant_id: Uuid,
        payment_intent_id: &str,
    ) -> Result<Option<payments::Model>, PaymentRepoError> {
        Ok(payments::Entity::find()
            .filter(payments::Column::TenantId.eq(tenant_id))
            .filter(payments::Column::PaymentIntentId.eq(payment_intent_id))
            .one(&self.db)
            .await?)
    }

    /// Completes a pending payment, capturing the gateway charge id.
    ///
    /// Returns `None` when the payment was no longer pending (another
    /// transition won the race); the caller should re-read and report the
    /// winning state.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn complete_from_pending(
        &self,
        tenant_id: Uuid,
        payment_id: Uuid,
        charge_id: Option<&str>,
    ) -> Result<Option<payments::Model>, PaymentRepoError> {
        let result = payments::Entity::update_many()
            .col_expr(payments::Column::Status, PaymentStatus::Completed.as_enum())
            .col_expr(payments::Column::ChargeId, Expr::value(charge_id))
            .filter(payments::Column::Id.eq(payment_id))
            .filter(payments::Column::TenantId.eq(tenant_id))
            .filter(payments::Column::Status.eq(PaymentStatus::Pending))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        info!(
            tenant_id = %tenant_id,
            payment_id = %payment_id,
            charge_id = charge_id.unwrap_or(""),
            "Payment completed"
        );

        Ok(Some(self.get(tenant_id, payment_id).await?))
    }

    /// Fails a pending payment, capturing the failure reason.
    ///
    /// Returns `None` when the payment was no longer pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn fail_from_pending(
        &self,
        tenant_id: Uuid,
        payment_id: Uuid,
        failure_reason: &str,
    ) -> Result<Option<payments::Model>, PaymentRepoError> {
        let result = payments::Entity::update_many()
            .col_expr(payments::Column::Status, PaymentStatus::Failed.as_enum())
            .col_expr(
                payments::Column::FailureReason,
                Expr::value(failure_reason),
            )
            .filter(payments::Column::Id.eq(payment_id))
            .filter(payments::Column::TenantId.eq(tenant_id))
            .filter(payments::Column::Status.eq(PaymentStatus::Pending))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        info!(
            tenant_id = %tenant_id,
            payment_id = %payment_id,
            failure_reason,
            "Payment failed"
        );

        Ok(Some(self.get(tenant_id, payment_id).await?))
    }

    /// Transitions a completed payment to refunded.
    ///
    /// Returns `None` when the payment was not completed at update time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn mark_refunded(
        &self,
        tenant_id: Uuid,
        payment_id: Uuid,
        refund_id: &str,
        refund_amount: Decimal,
        metadata: serde_json::Value,
    ) -> Result<Option<payments::Model>, PaymentRepoError> {
        let result = payments::Entity::update_many()
            .col_expr(payments::Column::Status, PaymentStatus::Refunded.as_enum())
            .col_expr(payments::Column::RefundId, Expr::value(refund_id))
            .col_expr(payments::Column::RefundAmount, Expr::value(refund_amount))
            .col_expr(payments::Column::Metadata, Expr::value(metadata))
            .filter(payments::Column::Id.eq(payment_id))
            .filter(payments::Column::TenantId.eq(tenant_id))
            .filter(payments::Column::Status.eq(PaymentStatus::Completed))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        info!(
            tenant_id = %tenant_id,
            payment_id = %payment_id,
            refund_id = %refund_id,
            amount = %refund_amount,
            "Payment refunded"
        );

        Ok(Some(self.get(tenant_id, payment_id).await?))
    }

    /// Lists payments for a tenant, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Vec<payments::Model>, u64), PaymentRepoError> {
        let query = payments::Entity::find()
            .filter(payments::Column::TenantId.eq(tenant_id))
            .order_by_desc(payments::Column::CreatedAt);

        let total = query.clone().count(&self.db).await?;
        let payments = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((payments, total))
    }
}
