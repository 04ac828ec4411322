//! Credit ledger routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::error_response};
use botica_db::CreditRepository;
use botica_db::entities::{credit_accounts, credit_transactions};
use botica_db::repositories::credit::{ApplyChargeInput, CreditRepoError};
use botica_shared::types::{PageRequest, PageResponse};

/// Creates the credit ledger routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tenants/{tenant_id}/credit-accounts",
            post(create_account).get(list_accounts),
        )
        .route(
            "/tenants/{tenant_id}/credit-accounts/{account_id}",
            get(get_account),
        )
        .route(
            "/tenants/{tenant_id}/credit-accounts/{account_id}/balance",
            patch(update_balance),
        )
        .route(
            "/tenants/{tenant_id}/credit-accounts/{account_id}/transactions",
            post(apply_transaction).get(list_transactions),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a credit account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// The customer the account belongs to.
    pub customer_id: Uuid,
    /// Credit limit.
    pub limit: Decimal,
}

/// Request body for a manual balance override.
#[derive(Debug, Deserialize)]
pub struct UpdateBalanceRequest {
    /// New balance (amount owed).
    pub balance: Decimal,
}

/// Request body for applying a charge.
#[derive(Debug, Deserialize)]
pub struct ApplyTransactionRequest {
    /// Charge amount.
    pub amount: Decimal,
    /// Informational fee.
    #[serde(default)]
    pub fee: Decimal,
    /// Date the charge is due (YYYY-MM-DD).
    pub due_date: NaiveDate,
    /// Optional order the charge belongs to.
    pub order_id: Option<Uuid>,
}

/// Response for a credit account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Customer ID.
    pub customer_id: Uuid,
    /// Credit limit.
    pub limit: String,
    /// Current balance (amount owed).
    pub balance: String,
    /// Credit remaining under the limit.
    pub available: String,
    /// Account status.
    pub status: String,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<credit_accounts::Model> for AccountResponse {
    fn from(model: credit_accounts::Model) -> Self {
        Self {
            id: model.id,
            customer_id: model.customer_id,
            limit: model.credit_limit.to_string(),
            balance: model.balance.to_string(),
            available: (model.credit_limit - model.balance).to_string(),
            status: format!("{}", botica_core::credit::AccountStatus::from(model.status)),
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

/// Response for a credit transaction.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Account ID.
    pub account_id: Uuid,
    /// Order ID, if linked.
    pub order_id: Option<Uuid>,
    /// Charge amount.
    pub amount: String,
    /// Informational fee.
    pub fee: String,
    /// Due date.
    pub due_date: String,
    /// Paid date, if settled.
    pub paid_date: Option<String>,
    /// Transaction status.
    pub status: String,
    /// Created at timestamp.
    pub created_at: String,
}

impl From<credit_transactions::Model> for TransactionResponse {
    fn from(model: credit_transactions::Model) -> Self {
        Self {
            id: model.id,
            account_id: model.credit_account_id,
            order_id: model.order_id,
            amount: model.amount.to_string(),
            fee: model.fee.to_string(),
            due_date: model.due_date.to_string(),
            paid_date: model.paid_date.map(|d| d.to_string()),
            status: format!(
                "{}",
                botica_core::credit::TransactionStatus::from(model.status)
            ),
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

fn map_error(e: &CreditRepoError) -> Response {
    error_response(e.http_status_code(), e.error_code(), e.to_string())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/tenants/{tenant_id}/credit-accounts` - Create a credit account.
async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tenant_id): Path<Uuid>,
    Json(request): Json<CreateAccountRequest>,
) -> Response {
    if let Err(response) = auth.ensure_tenant(tenant_id) {
        return response;
    }

    let repo = CreditRepository::new(state.db.clone());
    match repo
        .create_account(tenant_id, request.customer_id, request.limit)
        .await
    {
        Ok(account) => (
            StatusCode::CREATED,
            Json(AccountResponse::from(account)),
        )
            .into_response(),
        Err(e) => map_error(&e),
    }
}

/// GET `/tenants/{tenant_id}/credit-accounts` - List credit accounts.
async fn list_accounts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tenant_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> Response {
    if let Err(response) = auth.ensure_tenant(tenant_id) {
        return response;
    }

    let repo = CreditRepository::new(state.db.clone());
    match repo.list_accounts(tenant_id, &page).await {
        Ok((accounts, total)) => {
            let data: Vec<AccountResponse> =
                accounts.into_iter().map(AccountResponse::from).collect();
            Json(PageResponse::new(data, &page, total)).into_response()
        }
        Err(e) => map_error(&e),
    }
}

/// GET `/tenants/{tenant_id}/credit-accounts/{account_id}` - Get one account.
async fn get_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((tenant_id, account_id)): Path<(Uuid, Uuid)>,
) -> Response {
    if let Err(response) = auth.ensure_tenant(tenant_id) {
        return response;
    }

    let repo = CreditRepository::new(state.db.clone());
    match repo.get_account(tenant_id, account_id).await {
        Ok(account) => Json(AccountResponse::from(account)).into_response(),
        Err(e) => map_error(&e),
    }
}

/// PATCH `/tenants/{tenant_id}/credit-accounts/{account_id}/balance` -
/// Manual balance override.
async fn update_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((tenant_id, account_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateBalanceRequest>,
) -> Response {
    if let Err(response) = auth.ensure_tenant(tenant_id) {
        return response;
    }

    let repo = CreditRepository::new(state.db.clone());
    match repo
        .update_balance(tenant_id, account_id, request.balance)
        .await
    {
        Ok(account) => Json(AccountResponse::from(account)).into_response(),
        Err(e) => map_error(&e),
    }
}

/// POST `/tenants/{tenant_id}/credit-accounts/{account_id}/transactions` -
/// Apply a charge to the account.
async fn apply_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((tenant_id, account_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<ApplyTransactionRequest>,
) -> Response {
    if let Err(response) = auth.ensure_tenant(tenant_id) {
        return response;
    }

    let repo = CreditRepository::new(state.db.clone());

    // Resolve the account to its customer; the repository re-locks the
    // account row inside the atomic unit of work.
    let account = match repo.get_account(tenant_id, account_id).await {
        Ok(account) => account,
        Err(e) => return map_error(&e),
    };

    let input = ApplyChargeInput {
        amount: request.amount,
        fee: request.fee,
        due_date: request.due_date,
        order_id: request.order_id,
    };

    match repo
        .apply_transaction(tenant_id, account.customer_id, input)
        .await
    {
        Ok(applied) => {
            #[derive(Serialize)]
            struct AppliedResponse {
                transaction: TransactionResponse,
                account: AccountResponse,
            }

            (
                StatusCode::CREATED,
                Json(AppliedResponse {
                    transaction: TransactionResponse::from(applied.transaction),
                    account: AccountResponse::from(applied.account),
                }),
            )
                .into_response()
        }
        Err(e) => map_error(&e),
    }
}

/// GET `/tenants/{tenant_id}/credit-accounts/{account_id}/transactions` -
/// List transactions for an account.
async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((tenant_id, account_id)): Path<(Uuid, Uuid)>,
    Query(page): Query<PageRequest>,
) -> Response {
    if let Err(response) = auth.ensure_tenant(tenant_id) {
        return response;
    }

    let repo = CreditRepository::new(state.db.clone());
    match repo.list_transactions(tenant_id, account_id, &page).await {
        Ok((transactions, total)) => {
            let data: Vec<TransactionResponse> = transactions
                .into_iter()
                .map(TransactionResponse::from)
                .collect();
            Json(PageResponse::new(data, &page, total)).into_response()
        }
        Err(e) => map_error(&e),
    }
}
