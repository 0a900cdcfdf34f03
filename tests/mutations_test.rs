mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use canteen_api::config::Limits;
use canteen_api::entities::menu_items::MealType;
use canteen_api::entities::purchase_requests::{self, RequestStatus};
use canteen_api::entities::users::{self, Role};
use canteen_api::entities::{admin_actions, inventory, meal_issues, menu_items};
use canteen_api::services::meals::{IssueMeal, MealService};
use canteen_api::services::payments::PaymentService;
use canteen_api::services::procurement::{
    ProcurementService, ReviewDecision, SubmitPurchaseRequest,
};
use canteen_api::services::users::UserAdminService;
use canteen_api::services::Actor;
use canteen_api::{MutationOutcome, ServiceError};

fn test_limits() -> Limits {
    Limits {
        max_payment_amount: dec!(100000),
        max_purchase_qty: dec!(10000),
        max_unit_price: dec!(100000),
    }
}

fn actor(user: &users::Model) -> Actor {
    Actor {
        id: user.id,
        role: user.role,
    }
}

async fn audit_count(db: &sea_orm::DatabaseConnection) -> u64 {
    admin_actions::Entity::find().count(db).await.unwrap()
}

#[tokio::test]
async fn claim_decrements_availability_and_rejects_duplicates() {
    let db = Arc::new(common::setup_db().await);
    let student = common::seed_user(&db, "s1@canteen.local", Role::Student).await;
    let item =
        common::seed_menu_item(&db, "Omelette", MealType::Breakfast, dec!(140.00), 2).await;
    let service = MealService::new(db.clone());

    service
        .claim_meal(&actor(&student), item.id)
        .await
        .expect("first claim");

    let after = menu_items::Entity::find_by_id(item.id)
        .one(&*db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.available_qty, 1);

    let err = service.claim_meal(&actor(&student), item.id).await;
    assert_matches!(err, Err(ServiceError::InvalidOperation(_)));

    // The rejected duplicate must not touch availability.
    let after = menu_items::Entity::find_by_id(item.id)
        .one(&*db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.available_qty, 1);
}

#[tokio::test]
async fn sold_out_dish_cannot_be_claimed() {
    let db = Arc::new(common::setup_db().await);
    let student = common::seed_user(&db, "s1@canteen.local", Role::Student).await;
    let item = common::seed_menu_item(&db, "Soup", MealType::Lunch, dec!(230.00), 0).await;
    let service = MealService::new(db.clone());

    let err = service.claim_meal(&actor(&student), item.id).await;
    assert_matches!(err, Err(ServiceError::InsufficientStock(_)));
}

#[tokio::test]
async fn issue_with_empty_inventory_is_rejected_and_leaves_inventory_at_zero() {
    let db = Arc::new(common::setup_db().await);
    let cook = common::seed_user(&db, "cook@canteen.local", Role::Cook).await;
    let item = common::seed_menu_item(&db, "Soup", MealType::Lunch, dec!(230.00), 100).await;
    let stock = common::seed_inventory_item(&db, "Chicken", dec!(0)).await;
    let service = MealService::new(db.clone());

    let err = service
        .issue_meal(
            &actor(&cook),
            IssueMeal {
                menu_item_id: item.id,
                inventory_id: stock.id,
                issued_qty: 1,
                issue_note: String::new(),
            },
        )
        .await;
    assert_matches!(err, Err(ServiceError::InsufficientStock(_)));

    let after = inventory::Entity::find_by_id(stock.id)
        .one(&*db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.qty, dec!(0));
    assert_eq!(meal_issues::Entity::find().count(&*db).await.unwrap(), 0);
}

#[tokio::test]
async fn issue_draws_down_inventory_and_menu_availability() {
    let db = Arc::new(common::setup_db().await);
    let cook = common::seed_user(&db, "cook@canteen.local", Role::Cook).await;
    let item = common::seed_menu_item(&db, "Soup", MealType::Lunch, dec!(230.00), 100).await;
    let stock = common::seed_inventory_item(&db, "Chicken", dec!(10.000)).await;
    let service = MealService::new(db.clone());

    service
        .issue_meal(
            &actor(&cook),
            IssueMeal {
                menu_item_id: item.id,
                inventory_id: stock.id,
                issued_qty: 3,
                issue_note: "lunch service".to_string(),
            },
        )
        .await
        .expect("issue");

    // 3 portions draw 0.2 units each.
    let after_stock = inventory::Entity::find_by_id(stock.id)
        .one(&*db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after_stock.qty, dec!(9.400));

    let after_item = menu_items::Entity::find_by_id(item.id)
        .one(&*db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after_item.available_qty, 97);
}

#[tokio::test]
async fn payment_amount_is_validated_and_round_trips_exactly() {
    let db = Arc::new(common::setup_db().await);
    let student = common::seed_user(&db, "s1@canteen.local", Role::Student).await;
    let service = PaymentService::new(db.clone(), test_limits());

    let payment = service
        .record_payment(&actor(&student), "one_time", " 71,50 ")
        .await
        .expect("payment");
    assert_eq!(payment.amount, dec!(71.50));
    assert_eq!(payment.amount_display(), "71.50");

    // Unknown payment type falls back to one_time.
    let fallback = service
        .record_payment(&actor(&student), "whatever", "10")
        .await
        .expect("payment");
    assert_eq!(
        fallback.payment_type,
        canteen_api::entities::payments::PaymentType::OneTime
    );

    assert_matches!(
        service.record_payment(&actor(&student), "one_time", "1e9").await,
        Err(ServiceError::ValidationError(_))
    );
    assert_matches!(
        service.record_payment(&actor(&student), "one_time", "0").await,
        Err(ServiceError::ValidationError(_))
    );
}

#[tokio::test]
async fn purchase_request_values_persist_at_canonical_scale() {
    let db = Arc::new(common::setup_db().await);
    let cook = common::seed_user(&db, "cook@canteen.local", Role::Cook).await;
    let service = ProcurementService::new(db.clone(), test_limits());

    let request = service
        .submit_request(
            &actor(&cook),
            SubmitPurchaseRequest {
                product_name: "Flour".to_string(),
                qty: "12.345".to_string(),
                unit_price: "71.50".to_string(),
                reason: "running low".to_string(),
            },
        )
        .await
        .expect("submit");

    assert_eq!(request.qty_display(), "12.345");
    assert_eq!(request.unit_price_display(), "71.50");

    let stored = purchase_requests::Entity::find_by_id(request.id)
        .one(&*db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.qty_display(), "12.345");
    assert_eq!(stored.unit_price_display(), "71.50");
    assert_eq!(stored.status, RequestStatus::Pending);

    assert_matches!(
        service
            .submit_request(
                &actor(&cook),
                SubmitPurchaseRequest {
                    product_name: "Flour".to_string(),
                    qty: "0".to_string(),
                    unit_price: "5".to_string(),
                    reason: "zero qty".to_string(),
                },
            )
            .await,
        Err(ServiceError::ValidationError(_))
    );
}

#[tokio::test]
async fn review_transitions_once_and_audits_only_real_changes() {
    let db = Arc::new(common::setup_db().await);
    let cook = common::seed_user(&db, "cook@canteen.local", Role::Cook).await;
    let admin = common::seed_user(&db, "admin@canteen.local", Role::Admin).await;
    let procurement = ProcurementService::new(db.clone(), test_limits());

    let request = procurement
        .submit_request(
            &actor(&cook),
            SubmitPurchaseRequest {
                product_name: "Flour".to_string(),
                qty: "5".to_string(),
                unit_price: "30".to_string(),
                reason: "restock".to_string(),
            },
        )
        .await
        .expect("submit");

    let outcome = procurement
        .review_request(&actor(&admin), request.id, ReviewDecision::Approve)
        .await
        .expect("review");
    assert_eq!(outcome, MutationOutcome::Changed);
    assert_eq!(audit_count(&db).await, 1);

    let stored = purchase_requests::Entity::find_by_id(request.id)
        .one(&*db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, RequestStatus::Approved);
    assert_eq!(stored.reviewed_by, Some(admin.id));

    // Re-issuing the same decision changes nothing and writes no audit row.
    let outcome = procurement
        .review_request(&actor(&admin), request.id, ReviewDecision::Approve)
        .await
        .expect("re-review");
    assert_eq!(outcome, MutationOutcome::Unchanged);
    assert_eq!(audit_count(&db).await, 1);

    // A different decision on a reviewed request is an error, not a flip.
    assert_matches!(
        procurement
            .review_request(&actor(&admin), request.id, ReviewDecision::Reject)
            .await,
        Err(ServiceError::InvalidOperation(_))
    );
}

#[tokio::test]
async fn approval_requires_positive_price_and_qty() {
    let db = Arc::new(common::setup_db().await);
    let cook = common::seed_user(&db, "cook@canteen.local", Role::Cook).await;
    let admin = common::seed_user(&db, "admin@canteen.local", Role::Admin).await;
    let procurement = ProcurementService::new(db.clone(), test_limits());

    // Legacy row with a zero unit price, seeded below the validation layer.
    common::exec_sql(
        &db,
        &format!(
            "INSERT INTO purchase_requests (cook_id, product_name, qty, unit_price, reason, status, created_at) \
             VALUES ({}, 'Salt', 2, 0, 'legacy', 'pending', '2024-06-01 10:00:00')",
            cook.id
        ),
    )
    .await;
    let legacy = purchase_requests::Entity::find()
        .filter(purchase_requests::Column::ProductName.eq("Salt"))
        .one(&*db)
        .await
        .unwrap()
        .unwrap();

    assert_matches!(
        procurement
            .review_request(&actor(&admin), legacy.id, ReviewDecision::Approve)
            .await,
        Err(ServiceError::InvalidOperation(_))
    );

    let stored = purchase_requests::Entity::find_by_id(legacy.id)
        .one(&*db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, RequestStatus::Pending);
    assert_eq!(audit_count(&db).await, 0);

    // Rejecting it is still allowed.
    let outcome = procurement
        .review_request(&actor(&admin), legacy.id, ReviewDecision::Reject)
        .await
        .expect("reject");
    assert_eq!(outcome, MutationOutcome::Changed);
}

#[tokio::test]
async fn role_and_block_mutations_report_unchanged_without_audit_rows() {
    let db = Arc::new(common::setup_db().await);
    let admin = common::seed_user(&db, "admin@canteen.local", Role::Admin).await;
    let student = common::seed_user(&db, "s1@canteen.local", Role::Student).await;
    let service = UserAdminService::new(db.clone());

    let outcome = service
        .change_role(&actor(&admin), student.id, Role::Cook)
        .await
        .expect("role change");
    assert_eq!(outcome, MutationOutcome::Changed);
    assert_eq!(audit_count(&db).await, 1);

    // Setting the role the user already has is a no-op without an audit row.
    let outcome = service
        .change_role(&actor(&admin), student.id, Role::Cook)
        .await
        .expect("no-op role change");
    assert_eq!(outcome, MutationOutcome::Unchanged);
    assert_eq!(audit_count(&db).await, 1);

    let outcome = service
        .set_active(&actor(&admin), student.id, true)
        .await
        .expect("no-op block state");
    assert_eq!(outcome, MutationOutcome::Unchanged);
    assert_eq!(audit_count(&db).await, 1);

    let outcome = service
        .set_active(&actor(&admin), student.id, false)
        .await
        .expect("block");
    assert_eq!(outcome, MutationOutcome::Changed);
    assert_eq!(audit_count(&db).await, 2);

    let blocked = users::Entity::find_by_id(student.id)
        .one(&*db)
        .await
        .unwrap()
        .unwrap();
    assert!(!blocked.is_active);
}

#[tokio::test]
async fn admins_cannot_demote_or_block_themselves() {
    let db = Arc::new(common::setup_db().await);
    let admin = common::seed_user(&db, "admin@canteen.local", Role::Admin).await;
    let service = UserAdminService::new(db.clone());

    assert_matches!(
        service
            .change_role(&actor(&admin), admin.id, Role::Student)
            .await,
        Err(ServiceError::Forbidden(_))
    );
    assert_matches!(
        service.set_active(&actor(&admin), admin.id, false).await,
        Err(ServiceError::Forbidden(_))
    );
    assert_eq!(audit_count(&db).await, 0);
}
