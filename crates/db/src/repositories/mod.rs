//! Repository abstractions for data access.
//!
//! Repositories own every atomic unit of work: any write that affects a
//! shared invariant (account balance, payment status, webhook dedup) goes
//! through a single database transaction here, never read-then-write as
//! two separate round trips.

pub mod credit;
pub mod payment;
pub mod tenant;
pub mod webhook;

pub use credit::CreditRepository;
pub use payment::PaymentRepository;
pub use tenant::TenantRepository;
pub use webhook::WebhookEventRepository;
