mod common;

use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use canteen_api::entities::purchase_requests::{self, RequestStatus};
use canteen_api::entities::users::Role;
use canteen_api::entities::{inventory, menu_items, users};
use canteen_api::normalizer::{self, LEGACY_ZERO_PRICE_MARKER};

#[tokio::test]
async fn repairs_dirty_rows_and_is_idempotent() {
    let db = common::setup_db().await;
    let cook = common::seed_user(&db, "cook@canteen.local", Role::Cook).await;

    // Rows the typed layer would never produce: out-of-domain flag, blank
    // timestamp, out-of-range quantities, wrong-scale price, and an approved
    // request from before unit prices were collected.
    common::exec_sql(
        &db,
        "INSERT INTO users (name, email, password_hash, role, is_active, created_at) \
         VALUES ('Legacy User', 'legacy@canteen.local', 'x', 'student', 5, '')",
    )
    .await;
    common::exec_sql(
        &db,
        "INSERT INTO inventory (product_name, qty, unit) VALUES ('Flour', -4, 'kg')",
    )
    .await;
    common::exec_sql(
        &db,
        "INSERT INTO inventory (product_name, qty, unit) VALUES ('Sugar', 20000, 'kg')",
    )
    .await;
    common::exec_sql(
        &db,
        "INSERT INTO menu_items (date, meal_type, title, price, available_qty) \
         VALUES ('2024-06-10', 'lunch', 'Soup of the day', 12.3456, 10)",
    )
    .await;
    common::exec_sql(
        &db,
        &format!(
            "INSERT INTO purchase_requests (cook_id, product_name, qty, unit_price, reason, status, created_at) \
             VALUES ({}, 'Flour', 5, 0, 'need flour', 'approved', NULL)",
            cook.id
        ),
    )
    .await;
    common::exec_sql(
        &db,
        &format!(
            "INSERT INTO purchase_requests (cook_id, product_name, qty, unit_price, reason, status, created_at) \
             VALUES ({}, 'Sugar', 50000, -3, 'too much sugar', 'pending', '2024-06-01 10:00:00')",
            cook.id
        ),
    )
    .await;

    let report = normalizer::run(&db).await.expect("first pass");

    assert_eq!(report.timestamps_backfilled, 2);
    assert_eq!(report.flags_clamped, 1);
    assert_eq!(report.values_clamped, 4);
    assert_eq!(report.decimals_requantized, 1);
    assert_eq!(report.legacy_requests_reconciled, 1);

    let legacy_user = users::Entity::find()
        .filter(users::Column::Email.eq("legacy@canteen.local"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert!(legacy_user.is_active);
    assert!(legacy_user.created_at.is_some());

    let flour = inventory::Entity::find()
        .filter(inventory::Column::ProductName.eq("Flour"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(flour.qty, dec!(0));
    let sugar = inventory::Entity::find()
        .filter(inventory::Column::ProductName.eq("Sugar"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sugar.qty, dec!(10000));

    let soup = menu_items::Entity::find()
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(soup.price, dec!(12.35));

    let reconciled = purchase_requests::Entity::find()
        .filter(purchase_requests::Column::ProductName.eq("Flour"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reconciled.status, RequestStatus::Rejected);
    assert!(reconciled.reason.starts_with("need flour"));
    assert!(reconciled.reason.contains(LEGACY_ZERO_PRICE_MARKER));
    assert!(reconciled.created_at.is_some());

    let discarded = purchase_requests::Entity::find()
        .filter(purchase_requests::Column::ProductName.eq("Sugar"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(discarded.qty, dec!(0));
    assert_eq!(discarded.unit_price, dec!(0));
    assert_eq!(discarded.status, RequestStatus::Pending);

    // Second pass over repaired data mutates nothing and leaves the
    // reconciled row byte-identical.
    let report = normalizer::run(&db).await.expect("second pass");
    assert!(report.is_clean(), "second pass must be a no-op: {report:?}");

    let after_second = purchase_requests::Entity::find_by_id(reconciled.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after_second, reconciled);
}

#[tokio::test]
async fn clean_database_reports_zero_mutations() {
    let db = common::setup_db().await;
    common::seed_user(&db, "student@canteen.local", Role::Student).await;

    let report = normalizer::run(&db).await.expect("normalization");
    assert!(report.is_clean());
}

#[tokio::test]
async fn reconciliation_marker_is_appended_at_most_once() {
    let db = common::setup_db().await;
    let cook = common::seed_user(&db, "cook@canteen.local", Role::Cook).await;

    common::exec_sql(
        &db,
        &format!(
            "INSERT INTO purchase_requests (cook_id, product_name, qty, unit_price, reason, status, created_at) \
             VALUES ({}, 'Salt', 2, 0, 'restock {}', 'approved', '2024-06-01 10:00:00')",
            cook.id, LEGACY_ZERO_PRICE_MARKER
        ),
    )
    .await;

    let report = normalizer::run(&db).await.expect("normalization");
    assert_eq!(report.legacy_requests_reconciled, 1);

    let request = purchase_requests::Entity::find()
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(request.status, RequestStatus::Rejected);
    assert_eq!(
        request.reason.matches(LEGACY_ZERO_PRICE_MARKER).count(),
        1,
        "marker must not be duplicated"
    );
}
