//! First-run demo data.
//!
//! Inserts demo accounts, a demo menu and demo stock when the corresponding
//! tables are empty. Count-guarded, so repeated startups insert nothing.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::Set;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use tracing::info;

use crate::entities::menu_items::MealType;
use crate::entities::users::Role;
use crate::entities::{inventory, menu_items, users};
use crate::errors::ServiceError;
use crate::quantize::{self, MONEY_SCALE, QUANTITY_SCALE};

/// Placeholder credential for demo accounts. Real credential hashing lives
/// in the auth layer, outside this crate.
const DEMO_PASSWORD_HASH: &str = "$demo$not-a-real-credential";

pub async fn ensure_seed_data(db: &DatabaseConnection) -> Result<(), ServiceError> {
    seed_users(db).await?;
    seed_menu(db).await?;
    seed_inventory(db).await?;
    Ok(())
}

async fn seed_users(db: &DatabaseConnection) -> Result<(), ServiceError> {
    if users::Entity::find().count(db).await? > 0 {
        return Ok(());
    }

    let now = Utc::now().naive_utc();
    let demo = [
        ("Admin Demo", "admin@canteen.local", Role::Admin),
        ("Cook Demo", "cook@canteen.local", Role::Cook),
        ("Student Demo", "student@canteen.local", Role::Student),
    ];

    users::Entity::insert_many(demo.map(|(name, email, role)| users::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(DEMO_PASSWORD_HASH.to_string()),
        role: Set(role),
        allergies: Set(String::new()),
        preferences: Set(String::new()),
        is_active: Set(true),
        created_at: Set(Some(now)),
        ..Default::default()
    }))
    .exec(db)
    .await?;

    info!("Seeded demo user accounts");
    Ok(())
}

async fn seed_menu(db: &DatabaseConnection) -> Result<(), ServiceError> {
    if menu_items::Entity::find().count(db).await? > 0 {
        return Ok(());
    }

    let today = Utc::now().date_naive();
    let menu = [
        (MealType::Breakfast, "Oatmeal porridge with apple", 120, 100),
        (MealType::Breakfast, "Omelette and tea", 140, 100),
        (MealType::Lunch, "Chicken soup with cutlet and garnish", 230, 150),
        (MealType::Lunch, "Pasta with salad", 210, 120),
    ];

    menu_items::Entity::insert_many(menu.map(|(meal_type, title, price, qty)| {
        menu_items::ActiveModel {
            date: Set(today),
            meal_type: Set(meal_type),
            title: Set(title.to_string()),
            price: Set(quantize::quantize(Decimal::from(price as i64), MONEY_SCALE)),
            available_qty: Set(qty),
            ..Default::default()
        }
    }))
    .exec(db)
    .await?;

    info!("Seeded demo menu for {}", today);
    Ok(())
}

async fn seed_inventory(db: &DatabaseConnection) -> Result<(), ServiceError> {
    if inventory::Entity::find().count(db).await? > 0 {
        return Ok(());
    }

    let stock = [
        ("Chicken", 50, "kg"),
        ("Oat groats", 30, "kg"),
        ("Eggs", 300, "pcs"),
        ("Pasta", 40, "kg"),
        ("Vegetables", 80, "kg"),
    ];

    inventory::Entity::insert_many(stock.map(|(product_name, qty, unit)| {
        inventory::ActiveModel {
            product_name: Set(product_name.to_string()),
            qty: Set(quantize::quantize(Decimal::from(qty as i64), QUANTITY_SCALE)),
            unit: Set(unit.to_string()),
            ..Default::default()
        }
    }))
    .exec(db)
    .await?;

    info!("Seeded demo inventory");
    Ok(())
}
