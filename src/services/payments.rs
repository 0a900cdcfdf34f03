use std::sync::Arc;

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use tracing::{info, instrument};

use crate::config::Limits;
use crate::entities::payments::{self, PaymentType};
use crate::errors::ServiceError;
use crate::quantize;
use crate::services::Actor;

/// Records student payments. Payment rows are append-only.
#[derive(Clone)]
pub struct PaymentService {
    db: Arc<DatabaseConnection>,
    limits: Limits,
}

impl PaymentService {
    pub fn new(db: Arc<DatabaseConnection>, limits: Limits) -> Self {
        Self { db, limits }
    }

    /// Validates and records a payment for the acting user.
    ///
    /// An unrecognized payment type falls back to `one_time`; the amount must
    /// pass the money validation gate.
    #[instrument(skip(self))]
    pub async fn record_payment(
        &self,
        actor: &Actor,
        payment_type_raw: &str,
        amount_raw: &str,
    ) -> Result<payments::Model, ServiceError> {
        let payment_type = PaymentType::try_from_value(&payment_type_raw.trim().to_string())
            .unwrap_or(PaymentType::OneTime);
        let amount = quantize::parse_money(amount_raw, self.limits.max_payment_amount, "amount")?;

        let payment = payments::ActiveModel {
            user_id: Set(actor.id),
            payment_type: Set(payment_type),
            amount: Set(amount),
            status: Set(payments::STATUS_PAID.to_string()),
            created_at: Set(Some(Utc::now().naive_utc())),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        info!(payment_id = payment.id, "payment recorded");
        Ok(payment)
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<payments::Model>, ServiceError> {
        Ok(payments::Entity::find()
            .filter(payments::Column::UserId.eq(user_id))
            .order_by_desc(payments::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }
}
