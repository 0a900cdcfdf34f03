use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::quantize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub cook_id: i64,
    pub product_name: String,
    pub qty: Decimal,
    pub unit_price: Decimal,
    pub reason: String,
    pub status: RequestStatus,
    pub reviewed_by: Option<i64>,
    pub created_at: Option<DateTime>,
}

impl Model {
    pub fn qty_display(&self) -> String {
        quantize::format_quantity(self.qty)
    }

    pub fn unit_price_display(&self) -> String {
        quantize::format_money(self.unit_price)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
