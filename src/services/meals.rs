use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tracing::{info, instrument};

use crate::entities::users::Role;
use crate::entities::{feedback, inventory, meal_claims, meal_issues, menu_items};
use crate::errors::ServiceError;
use crate::quantize::{self, QUANTITY_SCALE};
use crate::services::Actor;

/// Inventory units consumed per issued portion.
const PORTION_INVENTORY_UNITS: Decimal = Decimal::from_parts(2, 0, 0, false, 1);

/// A cook's meal issue: portions handed out against a dish, drawing down one
/// inventory position.
#[derive(Debug, Clone)]
pub struct IssueMeal {
    pub menu_item_id: i64,
    pub inventory_id: i64,
    pub issued_qty: i32,
    pub issue_note: String,
}

/// Menu, claim, issue and feedback operations.
#[derive(Clone)]
pub struct MealService {
    db: Arc<DatabaseConnection>,
}

impl MealService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn list_menu(&self) -> Result<Vec<menu_items::Model>, ServiceError> {
        Ok(menu_items::Entity::find()
            .order_by_desc(menu_items::Column::Date)
            .order_by_asc(menu_items::Column::MealType)
            .order_by_desc(menu_items::Column::Id)
            .all(&*self.db)
            .await?)
    }

    /// Marks a meal as received by the acting student.
    ///
    /// At most one claim per (user, dish) ever; availability is decremented
    /// by a guarded update so it can never go negative, even under racing
    /// claims.
    #[instrument(skip(self))]
    pub async fn claim_meal(
        &self,
        student: &Actor,
        menu_item_id: i64,
    ) -> Result<meal_claims::Model, ServiceError> {
        student.require_role(Role::Student)?;

        let txn = self.db.begin().await?;

        let item = menu_items::Entity::find_by_id(menu_item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("menu item {menu_item_id}")))?;

        if item.available_qty <= 0 {
            return Err(ServiceError::InsufficientStock(format!(
                "'{}' is sold out",
                item.title
            )));
        }

        let duplicate = meal_claims::Entity::find()
            .filter(meal_claims::Column::UserId.eq(student.id))
            .filter(meal_claims::Column::MenuItemId.eq(menu_item_id))
            .one(&txn)
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::InvalidOperation(
                "this meal has already been claimed".to_string(),
            ));
        }

        let claim = meal_claims::ActiveModel {
            user_id: Set(student.id),
            menu_item_id: Set(menu_item_id),
            claimed_at: Set(Some(Utc::now().naive_utc())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let decremented = menu_items::Entity::update_many()
            .col_expr(
                menu_items::Column::AvailableQty,
                Expr::col(menu_items::Column::AvailableQty).sub(1),
            )
            .filter(menu_items::Column::Id.eq(menu_item_id))
            .filter(menu_items::Column::AvailableQty.gte(1))
            .exec(&txn)
            .await?;
        if decremented.rows_affected == 0 {
            return Err(ServiceError::InsufficientStock(format!(
                "'{}' is sold out",
                item.title
            )));
        }

        txn.commit().await?;
        info!(claim_id = claim.id, "meal claimed");
        Ok(claim)
    }

    /// Records a cook's issue of prepared portions and draws down inventory.
    #[instrument(skip(self))]
    pub async fn issue_meal(
        &self,
        cook: &Actor,
        input: IssueMeal,
    ) -> Result<meal_issues::Model, ServiceError> {
        cook.require_role(Role::Cook)?;

        if input.issued_qty <= 0 {
            return Err(ServiceError::validation(
                "issued_qty",
                "the number of issued portions must be positive",
            ));
        }

        let required_units = quantize::quantize(
            PORTION_INVENTORY_UNITS * Decimal::from(input.issued_qty),
            QUANTITY_SCALE,
        );

        let txn = self.db.begin().await?;

        let item = menu_items::Entity::find_by_id(input.menu_item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("menu item {}", input.menu_item_id)))?;
        let stock = inventory::Entity::find_by_id(input.inventory_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("inventory item {}", input.inventory_id))
            })?;

        if stock.qty < required_units {
            return Err(ServiceError::InsufficientStock(format!(
                "not enough '{}' in stock for {} portions",
                stock.product_name, input.issued_qty
            )));
        }
        if item.available_qty < input.issued_qty {
            return Err(ServiceError::InsufficientStock(format!(
                "only {} portions of '{}' remain on the menu",
                item.available_qty, item.title
            )));
        }

        let issue = meal_issues::ActiveModel {
            cook_id: Set(cook.id),
            menu_item_id: Set(input.menu_item_id),
            issued_qty: Set(input.issued_qty),
            issue_note: Set(input.issue_note.trim().to_string()),
            issued_at: Set(Some(Utc::now().naive_utc())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let stock_drawn = inventory::Entity::update_many()
            .col_expr(
                inventory::Column::Qty,
                Expr::col(inventory::Column::Qty).sub(required_units),
            )
            .filter(inventory::Column::Id.eq(input.inventory_id))
            .filter(inventory::Column::Qty.gte(required_units))
            .exec(&txn)
            .await?;
        if stock_drawn.rows_affected == 0 {
            return Err(ServiceError::InsufficientStock(format!(
                "not enough '{}' in stock for {} portions",
                stock.product_name, input.issued_qty
            )));
        }

        let menu_drawn = menu_items::Entity::update_many()
            .col_expr(
                menu_items::Column::AvailableQty,
                Expr::col(menu_items::Column::AvailableQty).sub(input.issued_qty),
            )
            .filter(menu_items::Column::Id.eq(input.menu_item_id))
            .filter(menu_items::Column::AvailableQty.gte(input.issued_qty))
            .exec(&txn)
            .await?;
        if menu_drawn.rows_affected == 0 {
            return Err(ServiceError::InsufficientStock(format!(
                "only {} portions of '{}' remain on the menu",
                item.available_qty, item.title
            )));
        }

        txn.commit().await?;
        info!(issue_id = issue.id, "meal issue recorded");
        Ok(issue)
    }

    /// Saves dish feedback. The rating is parsed leniently and clamped into
    /// [1, 5]; the comment is required.
    #[instrument(skip(self))]
    pub async fn leave_feedback(
        &self,
        student: &Actor,
        menu_item_id: i64,
        rating_raw: &str,
        comment: &str,
    ) -> Result<feedback::Model, ServiceError> {
        student.require_role(Role::Student)?;

        let comment = comment.trim();
        if comment.is_empty() {
            return Err(ServiceError::validation("comment", "a comment is required"));
        }

        menu_items::Entity::find_by_id(menu_item_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("menu item {menu_item_id}")))?;

        let rating = rating_raw.trim().parse::<i32>().unwrap_or(5).clamp(1, 5);

        let feedback = feedback::ActiveModel {
            user_id: Set(student.id),
            menu_item_id: Set(menu_item_id),
            rating: Set(rating),
            comment: Set(comment.to_string()),
            created_at: Set(Some(Utc::now().naive_utc())),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        Ok(feedback)
    }
}
