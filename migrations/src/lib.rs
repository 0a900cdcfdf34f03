pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;
mod m20240101_000002_create_menu_items_table;
mod m20240101_000003_create_payments_table;
mod m20240101_000004_create_meal_claims_table;
mod m20240101_000005_create_meal_issues_table;
mod m20240101_000006_create_inventory_table;
mod m20240101_000007_create_purchase_requests_table;
mod m20240101_000008_create_feedback_table;
mod m20240314_000009_add_unit_price_to_purchase_requests;
mod m20240408_000010_add_user_account_columns;
mod m20240520_000011_create_admin_actions_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_menu_items_table::Migration),
            Box::new(m20240101_000003_create_payments_table::Migration),
            Box::new(m20240101_000004_create_meal_claims_table::Migration),
            Box::new(m20240101_000005_create_meal_issues_table::Migration),
            Box::new(m20240101_000006_create_inventory_table::Migration),
            Box::new(m20240101_000007_create_purchase_requests_table::Migration),
            Box::new(m20240101_000008_create_feedback_table::Migration),
            Box::new(m20240314_000009_add_unit_price_to_purchase_requests::Migration),
            Box::new(m20240408_000010_add_user_account_columns::Migration),
            Box::new(m20240520_000011_create_admin_actions_table::Migration),
        ]
    }
}
