//! Append-only audit trail for privileged mutations.
//!
//! A record is written on the same transaction as the mutation it documents;
//! the two commit or roll back together.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ConnectionTrait};

use crate::entities::admin_actions;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    UserRoleChanged,
    UserBlockStateChanged,
    PurchaseRequestStatusChanged,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::UserRoleChanged => "user_role_changed",
            AuditAction::UserBlockStateChanged => "user_block_state_changed",
            AuditAction::PurchaseRequestStatusChanged => "purchase_request_status_changed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditTarget {
    User,
    PurchaseRequest,
}

impl AuditTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditTarget::User => "user",
            AuditTarget::PurchaseRequest => "purchase_request",
        }
    }
}

/// Writes one audit record on `conn`, which is expected to be the mutation's
/// own transaction. Callers only invoke this after establishing that the new
/// state differs from the prior state.
pub async fn record<C: ConnectionTrait>(
    conn: &C,
    admin_id: i64,
    action: AuditAction,
    target: AuditTarget,
    target_id: i64,
    details: serde_json::Value,
) -> Result<(), ServiceError> {
    admin_actions::ActiveModel {
        admin_id: Set(admin_id),
        action_type: Set(action.as_str().to_string()),
        target_type: Set(target.as_str().to_string()),
        target_id: Set(target_id),
        details: Set(details),
        created_at: Set(Some(Utc::now().naive_utc())),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok(())
}
