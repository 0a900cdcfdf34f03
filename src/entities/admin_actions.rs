use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only trail of privileged mutations. A row is written only when the
/// documented mutation actually changed state, on the same transaction.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admin_actions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub admin_id: i64,
    pub action_type: String,
    pub target_type: String,
    pub target_id: i64,
    pub details: Json,
    pub created_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
