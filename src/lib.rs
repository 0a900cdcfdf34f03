//! Data-integrity core for a school canteen backend.
//!
//! The crate owns the parts with real invariants: versioned schema
//! migrations, a startup normalizer that repairs legacy rows, the decimal
//! validation gate every money and quantity value passes through, the
//! ledger aggregation that feeds both the dashboard and the exported
//! report, and the audit trail of privileged mutations. Authentication,
//! session handling and page rendering are external collaborators: callers
//! hand the services an already-authenticated [`services::Actor`].

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod normalizer;
pub mod quantize;
pub mod seed;
pub mod services;

pub use errors::ServiceError;
pub use services::{Actor, MutationOutcome};
