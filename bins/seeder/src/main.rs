//! Database seeder for Botica development and testing.
//!
//! Seeds a demo tenant with customers, credit accounts, and an open
//! order. Idempotent per run only in the sense that it creates a fresh
//! tenant each time; point it at a scratch database.

use chrono::Utc;
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use botica_db::connect;
use botica_db::entities::{
    credit_accounts, customers, orders, sea_orm_active_enums::CreditAccountStatus, tenants,
};

const CUSTOMER_COUNT: usize = 8;

#[tokio::main]
async fn main() -> Result<(), sea_orm::DbErr> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("BOTICA__DATABASE__URL"))
        .expect("DATABASE_URL or BOTICA__DATABASE__URL must be set");

    let db = connect(&database_url).await?;

    let now = Utc::now().into();
    let tenant_id = Uuid::new_v4();

    tenants::ActiveModel {
        id: Set(tenant_id),
        name: Set("Demo Pharmacy".to_string()),
        slug: Set(format!("demo-pharmacy-{}", &tenant_id.to_string()[..8])),
        currency: Set("USD".to_string()),
        payment_settings: Set(serde_json::json!({ "application_fee_bps": 250 })),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&db)
    .await?;

    println!("Seeded tenant {tenant_id}");

    for i in 0..CUSTOMER_COUNT {
        let customer_id = Uuid::new_v4();
        let name: String = Name().fake();

        customers::ActiveModel {
            id: Set(customer_id),
            tenant_id: Set(tenant_id),
            name: Set(name.clone()),
            email: Set(Some(SafeEmail().fake())),
            phone: Set(Some(PhoneNumber().fake())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await?;

        // Every second customer gets a credit account.
        if i % 2 == 0 {
            credit_accounts::ActiveModel {
                id: Set(Uuid::new_v4()),
                tenant_id: Set(tenant_id),
                customer_id: Set(customer_id),
                credit_limit: Set(Decimal::new(50_000, 2)), // $500.00
                balance: Set(Decimal::ZERO),
                status: Set(CreditAccountStatus::Active),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&db)
            .await?;
        }

        println!("  customer {name} ({customer_id})");
    }

    orders::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        customer_id: Set(None),
        total: Set(Decimal::new(12_345, 2)),
        status: Set("open".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&db)
    .await?;

    println!("Done.");
    Ok(())
}
