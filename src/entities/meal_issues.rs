use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meal_issues")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub cook_id: i64,
    pub menu_item_id: i64,
    pub issued_qty: i32,
    pub issue_note: String,
    pub issued_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
