//! Startup data normalization.
//!
//! Runs once per process start, after migrations, and repairs rows that
//! predate the current validation rules: missing timestamps, out-of-domain
//! flags, out-of-range quantities and prices, decimals stored at the wrong
//! scale, and approved purchase requests left over from before unit prices
//! existed. Running it on clean data mutates nothing.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, Statement, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::entities::purchase_requests::RequestStatus;
use crate::entities::{inventory, menu_items, payments, purchase_requests};
use crate::errors::ServiceError;
use crate::quantize::{self, MONEY_SCALE, QUANTITY_SCALE};

/// Appended to the reason of purchase requests force-rejected by the legacy
/// reconciliation rule. Never overwrites the original reason, and is added
/// at most once.
pub const LEGACY_ZERO_PRICE_MARKER: &str = "[auto-rejected: zero unit price]";

const INVENTORY_QTY_MAX: Decimal = Decimal::from_parts(10000, 0, 0, false, 0);
const PURCHASE_QTY_MAX: Decimal = Decimal::from_parts(10000, 0, 0, false, 0);
const UNIT_PRICE_MAX: Decimal = Decimal::from_parts(100000, 0, 0, false, 0);

/// Per-category affected-row counts for one normalization pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NormalizationReport {
    pub timestamps_backfilled: u64,
    pub flags_clamped: u64,
    pub values_clamped: u64,
    pub decimals_requantized: u64,
    pub legacy_requests_reconciled: u64,
}

impl NormalizationReport {
    pub fn total(&self) -> u64 {
        self.timestamps_backfilled
            + self.flags_clamped
            + self.values_clamped
            + self.decimals_requantized
            + self.legacy_requests_reconciled
    }

    /// True when the pass found nothing to repair.
    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

/// Runs one normalization pass in a single transaction.
///
/// Idempotent: a second pass over the same data reports all-zero counts.
#[instrument(skip(db))]
pub async fn run(db: &DatabaseConnection) -> Result<NormalizationReport, ServiceError> {
    let txn = db.begin().await?;

    let report = NormalizationReport {
        timestamps_backfilled: backfill_timestamps(&txn).await?,
        flags_clamped: clamp_flags(&txn).await?,
        values_clamped: clamp_ranges(&txn).await?,
        decimals_requantized: requantize_decimals(&txn).await?,
        legacy_requests_reconciled: reconcile_legacy_requests(&txn).await?,
    };

    txn.commit().await?;

    if report.is_clean() {
        info!("Normalization pass found nothing to repair");
    } else {
        info!(
            timestamps = report.timestamps_backfilled,
            flags = report.flags_clamped,
            values = report.values_clamped,
            requantized = report.decimals_requantized,
            reconciled = report.legacy_requests_reconciled,
            "Normalization pass repaired legacy rows"
        );
    }

    Ok(report)
}

/// NULL or blank timestamp columns receive the current time.
async fn backfill_timestamps(txn: &DatabaseTransaction) -> Result<u64, ServiceError> {
    const TIMESTAMP_COLUMNS: [(&str, &str); 7] = [
        ("users", "created_at"),
        ("payments", "created_at"),
        ("meal_claims", "claimed_at"),
        ("meal_issues", "issued_at"),
        ("purchase_requests", "created_at"),
        ("feedback", "created_at"),
        ("admin_actions", "created_at"),
    ];

    let now = Utc::now().naive_utc();
    let backend = txn.get_database_backend();
    let mut affected = 0;

    for (table, column) in TIMESTAMP_COLUMNS {
        let result = txn
            .execute(Statement::from_sql_and_values(
                backend,
                format!("UPDATE {table} SET {column} = ? WHERE {column} IS NULL OR TRIM({column}) = ''"),
                [now.into()],
            ))
            .await?;
        affected += result.rows_affected();
    }

    Ok(affected)
}

/// Boolean-like flags are forced back into their two-value domain. The typed
/// model cannot even represent the out-of-domain values, so this runs as raw
/// SQL.
async fn clamp_flags(txn: &DatabaseTransaction) -> Result<u64, ServiceError> {
    let result = txn
        .execute(Statement::from_string(
            txn.get_database_backend(),
            "UPDATE users SET is_active = 1 WHERE is_active NOT IN (0, 1)",
        ))
        .await?;
    Ok(result.rows_affected())
}

/// Inventory quantities clamp to the nearest bound; purchase quantities and
/// prices outside their ranges are discarded to zero; negative menu
/// availability becomes zero.
async fn clamp_ranges(txn: &DatabaseTransaction) -> Result<u64, ServiceError> {
    let backend = txn.get_database_backend();
    let statements = [
        Statement::from_string(backend, "UPDATE inventory SET qty = 0 WHERE qty < 0"),
        Statement::from_sql_and_values(
            backend,
            "UPDATE inventory SET qty = ? WHERE qty > ?",
            [INVENTORY_QTY_MAX.into(), INVENTORY_QTY_MAX.into()],
        ),
        Statement::from_string(
            backend,
            "UPDATE menu_items SET available_qty = 0 WHERE available_qty < 0",
        ),
        Statement::from_sql_and_values(
            backend,
            "UPDATE purchase_requests SET qty = 0 WHERE qty < 0 OR qty > ?",
            [PURCHASE_QTY_MAX.into()],
        ),
        Statement::from_sql_and_values(
            backend,
            "UPDATE purchase_requests SET unit_price = 0 WHERE unit_price < 0 OR unit_price > ?",
            [UNIT_PRICE_MAX.into()],
        ),
    ];

    let mut affected = 0;
    for statement in statements {
        affected += txn.execute(statement).await?.rows_affected();
    }
    Ok(affected)
}

/// Re-quantizes persisted decimals to their canonical scale so no read path
/// ever has to round again.
async fn requantize_decimals(txn: &DatabaseTransaction) -> Result<u64, ServiceError> {
    let mut affected = 0;

    for item in menu_items::Entity::find().all(txn).await? {
        let canonical = quantize::quantize(item.price, MONEY_SCALE);
        if canonical != item.price {
            let mut row: menu_items::ActiveModel = item.into();
            row.price = Set(canonical);
            row.update(txn).await?;
            affected += 1;
        }
    }

    for payment in payments::Entity::find().all(txn).await? {
        let canonical = quantize::quantize(payment.amount, MONEY_SCALE);
        if canonical != payment.amount {
            let mut row: payments::ActiveModel = payment.into();
            row.amount = Set(canonical);
            row.update(txn).await?;
            affected += 1;
        }
    }

    for stock in inventory::Entity::find().all(txn).await? {
        let canonical = quantize::quantize(stock.qty, QUANTITY_SCALE);
        if canonical != stock.qty {
            let mut row: inventory::ActiveModel = stock.into();
            row.qty = Set(canonical);
            row.update(txn).await?;
            affected += 1;
        }
    }

    for request in purchase_requests::Entity::find().all(txn).await? {
        let qty = quantize::quantize(request.qty, QUANTITY_SCALE);
        let unit_price = quantize::quantize(request.unit_price, MONEY_SCALE);
        if qty != request.qty || unit_price != request.unit_price {
            let mut row: purchase_requests::ActiveModel = request.into();
            row.qty = Set(qty);
            row.unit_price = Set(unit_price);
            row.update(txn).await?;
            affected += 1;
        }
    }

    Ok(affected)
}

/// Legacy reconciliation rule: an approved request with a zero unit price
/// predates price collection and is force-rejected, with the marker appended
/// to its reason once.
async fn reconcile_legacy_requests(txn: &DatabaseTransaction) -> Result<u64, ServiceError> {
    let stale = purchase_requests::Entity::find()
        .filter(purchase_requests::Column::Status.eq(RequestStatus::Approved))
        .filter(purchase_requests::Column::UnitPrice.eq(Decimal::ZERO))
        .all(txn)
        .await?;

    let affected = stale.len() as u64;

    for request in stale {
        let mut reason = request.reason.clone();
        if !reason.contains(LEGACY_ZERO_PRICE_MARKER) {
            if reason.is_empty() {
                reason = LEGACY_ZERO_PRICE_MARKER.to_string();
            } else {
                reason = format!("{reason} {LEGACY_ZERO_PRICE_MARKER}");
            }
        }

        let mut row: purchase_requests::ActiveModel = request.into();
        row.status = Set(RequestStatus::Rejected);
        row.reason = Set(reason);
        row.update(txn).await?;
    }

    Ok(affected)
}
