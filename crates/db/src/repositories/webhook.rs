//! Webhook event repository: the dedup ledger for gateway notifications.
//!
//! The unique constraint on `event_id` is the dedup mechanism; a claim is
//! an insert, and a duplicate-key violation means the event was seen
//! before. Rows are recorded with `processed = false` before dispatch so a
//! crash mid-processing leaves a visible "seen but not processed" marker,
//! and `processed` flips to true only after dispatch succeeds.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::webhook_events;

/// Outcome of claiming an event id for processing.
#[derive(Debug, Clone)]
pub enum WebhookClaim {
    /// First sight of this event id; dispatch it.
    Fresh(webhook_events::Model),
    /// Seen before but never successfully processed; dispatch again
    /// (at-least-once delivery of the dispatch logic).
    Retry(webhook_events::Model),
    /// Already processed; the caller must skip dispatch.
    AlreadyProcessed(webhook_events::Model),
}

/// Repository for the webhook event dedup ledger.
#[derive(Debug, Clone)]
pub struct WebhookEventRepository {
    db: DatabaseConnection,
}

impl WebhookEventRepository {
    /// Creates a new webhook event repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Claims an event id for processing.
    ///
    /// Inserts a `processed = false` row on first sight. On a duplicate
    /// the existing row decides: `processed = true` short-circuits,
    /// anything else is a retry of an earlier failed dispatch.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn claim(
        &self,
        event_id: &str,
        event_type: &str,
    ) -> Result<WebhookClaim, DbErr> {
        let now = Utc::now().into();
        let row = webhook_events::ActiveModel {
            id: Set(Uuid::new_v4()),
            event_id: Set(event_id.to_string()),
            event_type: Set(event_type.to_string()),
            processed: Set(false),
            error: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        match row.insert(&self.db).await {
            Ok(model) => Ok(WebhookClaim::Fresh(model)),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    let existing = self
                        .find(event_id)
                        .await?
                        .ok_or_else(|| DbErr::RecordNotFound(event_id.to_string()))?;

                    if existing.processed {
                        info!(event_id, "Duplicate webhook event, already processed");
                        Ok(WebhookClaim::AlreadyProcessed(existing))
                    } else {
                        info!(event_id, "Webhook event redelivered, retrying dispatch");
                        Ok(WebhookClaim::Retry(existing))
                    }
                }
                _ => Err(e),
            },
        }
    }

    /// Finds an event by its gateway event id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(&self, event_id: &str) -> Result<Option<webhook_events::Model>, DbErr> {
        webhook_events::Entity::find()
            .filter(webhook_events::Column::EventId.eq(event_id))
            .one(&self.db)
            .await
    }

    /// Marks an event as processed after its dispatch committed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn mark_processed(&self, event_id: &str) -> Result<(), DbErr> {
        webhook_events::Entity::update_many()
            .col_expr(webhook_events::Column::Processed, Expr::value(true))
            .col_expr(
                webhook_events::Column::Error,
                Expr::value(Option::<String>::None),
            )
            .filter(webhook_events::Column::EventId.eq(event_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Records a dispatch failure, leaving `processed = false` so the
    /// gateway's redelivery retries the event.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn record_failure(&self, event_id: &str, error: &str) -> Result<(), DbErr> {
        webhook_events::Entity::update_many()
            .col_expr(webhook_events::Column::Error, Expr::value(error))
            .filter(webhook_events::Column::EventId.eq(event_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
