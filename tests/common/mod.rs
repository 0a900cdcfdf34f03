#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDateTime;
use migrations::Migrator;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement,
};
use sea_orm_migration::MigratorTrait;

use canteen_api::entities::menu_items::MealType;
use canteen_api::entities::users::Role;
use canteen_api::entities::{inventory, menu_items, users};

static DB_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Connects to a fresh private in-memory SQLite database without applying
/// migrations. Shared cache plus a single pooled connection keeps the
/// database alive for the duration of the test.
pub async fn connect_empty() -> DatabaseConnection {
    let seq = DB_SEQ.fetch_add(1, Ordering::Relaxed);
    let url = format!("sqlite:file:canteen_test_{seq}?mode=memory&cache=shared");
    let mut opt = ConnectOptions::new(url);
    opt.max_connections(1).min_connections(1);
    Database::connect(opt).await.expect("connect to sqlite")
}

/// Fresh database with the full migration set applied.
pub async fn setup_db() -> DatabaseConnection {
    let db = connect_empty().await;
    Migrator::up(&db, None).await.expect("apply migrations");
    db
}

/// Executes one raw SQL statement, for seeding rows the typed layer would
/// refuse to produce.
pub async fn exec_sql(db: &DatabaseConnection, sql: &str) {
    db.execute(Statement::from_string(db.get_database_backend(), sql))
        .await
        .expect("raw statement");
}

pub async fn seed_user(db: &DatabaseConnection, email: &str, role: Role) -> users::Model {
    users::ActiveModel {
        name: Set(email.split('@').next().unwrap_or(email).to_string()),
        email: Set(email.to_string()),
        password_hash: Set("$test$credential".to_string()),
        role: Set(role),
        allergies: Set(String::new()),
        preferences: Set(String::new()),
        is_active: Set(true),
        created_at: Set(Some(datetime(2024, 6, 1, 8, 0, 0))),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed user")
}

pub async fn seed_menu_item(
    db: &DatabaseConnection,
    title: &str,
    meal_type: MealType,
    price: Decimal,
    available_qty: i32,
) -> menu_items::Model {
    menu_items::ActiveModel {
        date: Set(date(2024, 6, 10)),
        meal_type: Set(meal_type),
        title: Set(title.to_string()),
        price: Set(price),
        available_qty: Set(available_qty),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed menu item")
}

pub async fn seed_inventory_item(
    db: &DatabaseConnection,
    product_name: &str,
    qty: Decimal,
) -> inventory::Model {
    inventory::ActiveModel {
        product_name: Set(product_name.to_string()),
        qty: Set(qty),
        unit: Set("kg".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed inventory item")
}

pub fn date(y: i32, m: u32, d: u32) -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, s).expect("valid datetime")
}
