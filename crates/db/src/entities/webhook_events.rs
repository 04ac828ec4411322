//! `SeaORM` Entity for webhook_events table.
//!
//! Pure dedup ledger for inbound gateway notifications. Rows are created
//! on first sight of an event id and never deleted; `processed` flips to
//! true only after the corresponding payment mutation commits.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "webhook_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub event_id: String,
    pub event_type: String,
    pub processed: bool,
    /// Last dispatch failure, kept for inspection and recovery.
    pub error: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
