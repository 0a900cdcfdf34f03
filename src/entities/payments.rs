use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::quantize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    #[sea_orm(string_value = "one_time")]
    OneTime,
    #[sea_orm(string_value = "subscription")]
    Subscription,
}

/// Payment rows are append-only; no service exposes an update or delete path.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub payment_type: PaymentType,
    pub amount: Decimal,
    pub status: String,
    pub created_at: Option<DateTime>,
}

impl Model {
    pub fn amount_display(&self) -> String {
        quantize::format_money(self.amount)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// The only payment status this system produces.
pub const STATUS_PAID: &str = "paid";
