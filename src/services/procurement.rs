use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use serde_json::json;
use tracing::{info, instrument};

use crate::config::Limits;
use crate::entities::purchase_requests::{self, RequestStatus};
use crate::entities::users::Role;
use crate::errors::ServiceError;
use crate::quantize;
use crate::services::audit::{self, AuditAction, AuditTarget};
use crate::services::{Actor, MutationOutcome};

/// A cook's purchase request as submitted, before validation.
#[derive(Debug, Clone)]
pub struct SubmitPurchaseRequest {
    pub product_name: String,
    pub qty: String,
    pub unit_price: String,
    pub reason: String,
}

/// An admin's decision on a pending purchase request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    fn target_status(self) -> RequestStatus {
        match self {
            ReviewDecision::Approve => RequestStatus::Approved,
            ReviewDecision::Reject => RequestStatus::Rejected,
        }
    }
}

/// Purchase request submission and review.
#[derive(Clone)]
pub struct ProcurementService {
    db: Arc<DatabaseConnection>,
    limits: Limits,
}

impl ProcurementService {
    pub fn new(db: Arc<DatabaseConnection>, limits: Limits) -> Self {
        Self { db, limits }
    }

    pub async fn list_requests(
        &self,
    ) -> Result<Vec<purchase_requests::Model>, ServiceError> {
        Ok(purchase_requests::Entity::find()
            .order_by_desc(purchase_requests::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    /// Validates and stores a new pending purchase request.
    #[instrument(skip(self))]
    pub async fn submit_request(
        &self,
        cook: &Actor,
        input: SubmitPurchaseRequest,
    ) -> Result<purchase_requests::Model, ServiceError> {
        cook.require_role(Role::Cook)?;

        let product_name = input.product_name.trim();
        if product_name.is_empty() {
            return Err(ServiceError::validation(
                "product_name",
                "a product name is required",
            ));
        }
        let reason = input.reason.trim();
        if reason.is_empty() {
            return Err(ServiceError::validation("reason", "a reason is required"));
        }

        let qty = quantize::parse_quantity(&input.qty, self.limits.max_purchase_qty, "qty")?;
        let unit_price =
            quantize::parse_money(&input.unit_price, self.limits.max_unit_price, "unit_price")?;

        let request = purchase_requests::ActiveModel {
            cook_id: Set(cook.id),
            product_name: Set(product_name.to_string()),
            qty: Set(qty),
            unit_price: Set(unit_price),
            reason: Set(reason.to_string()),
            status: Set(RequestStatus::Pending),
            created_at: Set(Some(Utc::now().naive_utc())),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(request_id = request.id, "purchase request submitted");
        Ok(request)
    }

    /// Applies an admin decision to a pending request, exactly once.
    ///
    /// Approval requires a positive quantity and unit price; the guarded
    /// UPDATE re-enforces both bounds and the pending precondition at the
    /// storage level. Re-issuing the decision a request already carries
    /// reports `Unchanged` and writes no audit record.
    #[instrument(skip(self))]
    pub async fn review_request(
        &self,
        admin: &Actor,
        request_id: i64,
        decision: ReviewDecision,
    ) -> Result<MutationOutcome, ServiceError> {
        admin.require_role(Role::Admin)?;

        let txn = self.db.begin().await?;

        let request = purchase_requests::Entity::find_by_id(request_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("purchase request {request_id}")))?;

        let target = decision.target_status();
        if request.status == target {
            return Ok(MutationOutcome::Unchanged);
        }
        if request.status != RequestStatus::Pending {
            return Err(ServiceError::InvalidOperation(
                "this purchase request has already been reviewed".to_string(),
            ));
        }
        if decision == ReviewDecision::Approve
            && (request.qty <= Decimal::ZERO || request.unit_price <= Decimal::ZERO)
        {
            return Err(ServiceError::InvalidOperation(
                "cannot approve a request without a positive quantity and unit price".to_string(),
            ));
        }

        let mut update = purchase_requests::Entity::update_many()
            .col_expr(purchase_requests::Column::Status, Expr::value(target))
            .col_expr(purchase_requests::Column::ReviewedBy, Expr::value(admin.id))
            .filter(purchase_requests::Column::Id.eq(request_id))
            .filter(purchase_requests::Column::Status.eq(RequestStatus::Pending));
        if decision == ReviewDecision::Approve {
            update = update
                .filter(purchase_requests::Column::Qty.gt(Decimal::ZERO))
                .filter(purchase_requests::Column::UnitPrice.gt(Decimal::ZERO));
        }

        let transitioned = update.exec(&txn).await?;
        if transitioned.rows_affected == 0 {
            return Err(ServiceError::InvalidOperation(
                "the purchase request changed state during review".to_string(),
            ));
        }

        audit::record(
            &txn,
            admin.id,
            AuditAction::PurchaseRequestStatusChanged,
            AuditTarget::PurchaseRequest,
            request_id,
            json!({
                "from": request.status,
                "to": target,
                "product_name": request.product_name,
            }),
        )
        .await?;

        txn.commit().await?;
        info!(request_id, "purchase request reviewed");
        Ok(MutationOutcome::Changed)
    }
}
