use std::sync::Arc;

use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, TransactionTrait,
};
use serde_json::json;
use tracing::{info, instrument};

use crate::entities::users::{self, Role};
use crate::errors::ServiceError;
use crate::services::audit::{self, AuditAction, AuditTarget};
use crate::services::{Actor, MutationOutcome};

/// Admin-only account mutations: role changes and block/unblock.
#[derive(Clone)]
pub struct UserAdminService {
    db: Arc<DatabaseConnection>,
}

impl UserAdminService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn list_users(&self) -> Result<Vec<users::Model>, ServiceError> {
        Ok(users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&*self.db)
            .await?)
    }

    /// Assigns a new role to a user. Setting the role the user already has
    /// reports `Unchanged` and leaves no audit record.
    #[instrument(skip(self))]
    pub async fn change_role(
        &self,
        admin: &Actor,
        target_id: i64,
        new_role: Role,
    ) -> Result<MutationOutcome, ServiceError> {
        admin.require_role(Role::Admin)?;
        if admin.id == target_id {
            return Err(ServiceError::Forbidden(
                "administrators cannot change their own role".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let user = users::Entity::find_by_id(target_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {target_id}")))?;

        if user.role == new_role {
            return Ok(MutationOutcome::Unchanged);
        }

        let previous = user.role;
        let mut row: users::ActiveModel = user.into();
        row.role = Set(new_role);
        row.update(&txn).await?;

        audit::record(
            &txn,
            admin.id,
            AuditAction::UserRoleChanged,
            AuditTarget::User,
            target_id,
            json!({ "from": previous, "to": new_role }),
        )
        .await?;

        txn.commit().await?;
        info!(target_id, "user role changed");
        Ok(MutationOutcome::Changed)
    }

    /// Blocks or unblocks a user. A no-op flip reports `Unchanged` and
    /// leaves no audit record.
    #[instrument(skip(self))]
    pub async fn set_active(
        &self,
        admin: &Actor,
        target_id: i64,
        active: bool,
    ) -> Result<MutationOutcome, ServiceError> {
        admin.require_role(Role::Admin)?;
        if admin.id == target_id {
            return Err(ServiceError::Forbidden(
                "administrators cannot block their own account".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let user = users::Entity::find_by_id(target_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {target_id}")))?;

        if user.is_active == active {
            return Ok(MutationOutcome::Unchanged);
        }

        let previous = user.is_active;
        let mut row: users::ActiveModel = user.into();
        row.is_active = Set(active);
        row.update(&txn).await?;

        audit::record(
            &txn,
            admin.id,
            AuditAction::UserBlockStateChanged,
            AuditTarget::User,
            target_id,
            json!({ "from": previous, "to": active }),
        )
        .await?;

        txn.commit().await?;
        info!(target_id, active, "user block state changed");
        Ok(MutationOutcome::Changed)
    }
}
