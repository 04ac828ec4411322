//! `SeaORM` entity definitions.

pub mod credit_accounts;
pub mod credit_transactions;
pub mod customers;
pub mod orders;
pub mod payments;
pub mod sea_orm_active_enums;
pub mod tenants;
pub mod webhook_events;
