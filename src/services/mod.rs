pub mod audit;
pub mod export;
pub mod ledger;
pub mod meals;
pub mod payments;
pub mod procurement;
pub mod users;

use sea_orm::ActiveEnum;

use crate::entities::users::Role;
use crate::errors::ServiceError;

/// Authenticated caller identity, supplied by the (external) auth layer.
/// The services never authenticate credentials themselves.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
}

impl Actor {
    /// Re-checks the capability an entry point depends on. The auth layer is
    /// expected to have verified this already.
    pub fn require_role(&self, role: Role) -> Result<(), ServiceError> {
        if self.role == role {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "this action requires the {} role",
                role.to_value()
            )))
        }
    }
}

/// Whether a mutation changed observable state. `Unchanged` mutations write
/// no audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Changed,
    Unchanged,
}

impl MutationOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, MutationOutcome::Changed)
    }
}
