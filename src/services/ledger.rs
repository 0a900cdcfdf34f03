//! Ledger aggregation over a date range.
//!
//! One parameterized call produces the full snapshot consumed by both the
//! interactive dashboard and the exported report, so the two surfaces can
//! never disagree on a figure.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use tracing::{instrument, warn};

use crate::entities::menu_items::MealType;
use crate::entities::purchase_requests::RequestStatus;
use crate::entities::{
    feedback, meal_claims, meal_issues, menu_items, payments, purchase_requests,
};
use crate::errors::ServiceError;
use crate::quantize::{self, MONEY_SCALE};

/// Average ratings render with two fractional digits.
const RATING_SCALE: u32 = 2;

/// Inclusive date range a snapshot was computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportPeriod {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// True when supplied bounds were unusable and the default period was
    /// substituted.
    pub fallback_applied: bool,
}

/// Per-dish activity. Each metric is filtered by its own date predicate,
/// not a shared join.
#[derive(Debug, Clone, Serialize)]
pub struct DishRollup {
    pub menu_item_id: i64,
    pub title: String,
    pub meal_type: MealType,
    pub claim_count: i64,
    pub issued_qty: i64,
    pub avg_rating: Decimal,
    pub avg_rating_display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MealTypeRollup {
    pub meal_type: MealType,
    pub claim_count: i64,
    pub issued_qty: i64,
}

/// Derived financial and operational metrics for one period. Every monetary
/// field carries its canonical display string.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSnapshot {
    pub period: ReportPeriod,
    pub total_paid: Decimal,
    pub total_paid_display: String,
    pub total_claims: i64,
    pub unique_claimants: i64,
    pub total_issued: i64,
    pub approved_request_count: i64,
    pub approved_procurement_cost: Decimal,
    pub approved_procurement_cost_display: String,
    pub operating_balance: Decimal,
    pub operating_balance_display: String,
    pub dishes: Vec<DishRollup>,
    pub meal_types: Vec<MealTypeRollup>,
}

/// Resolves raw period bounds into an inclusive date range.
///
/// Missing, unparsable, or inverted bounds fall back to the first day of the
/// current month through today; `fallback_applied` flags the cases where
/// supplied input was discarded.
pub fn resolve_period(
    from_raw: Option<&str>,
    to_raw: Option<&str>,
    today: NaiveDate,
) -> ReportPeriod {
    let month_start = today.with_day(1).unwrap_or(today);

    let parse = |raw: Option<&str>| {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    };

    match (parse(from_raw), parse(to_raw)) {
        (None, None) => ReportPeriod {
            from: month_start,
            to: today,
            fallback_applied: false,
        },
        (Some(Some(from)), Some(Some(to))) if from <= to => ReportPeriod {
            from,
            to,
            fallback_applied: false,
        },
        _ => {
            warn!(
                ?from_raw,
                ?to_raw,
                "invalid report period, falling back to current month"
            );
            ReportPeriod {
                from: month_start,
                to: today,
                fallback_applied: true,
            }
        }
    }
}

#[derive(Clone)]
pub struct LedgerService {
    db: Arc<DatabaseConnection>,
}

impl LedgerService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Resolves the period from raw input and aggregates over it.
    #[instrument(skip(self))]
    pub async fn aggregate(
        &self,
        from_raw: Option<&str>,
        to_raw: Option<&str>,
    ) -> Result<LedgerSnapshot, ServiceError> {
        let period = resolve_period(from_raw, to_raw, Utc::now().date_naive());
        self.aggregate_period(period).await
    }

    /// Aggregates over an already-resolved period.
    #[instrument(skip(self))]
    pub async fn aggregate_period(
        &self,
        period: ReportPeriod,
    ) -> Result<LedgerSnapshot, ServiceError> {
        let db = &*self.db;
        let start = period.from.and_time(NaiveTime::MIN);
        let end_exclusive = period.to.and_time(NaiveTime::MIN) + Duration::days(1);

        let paid_rows = payments::Entity::find()
            .filter(payments::Column::Status.eq(payments::STATUS_PAID))
            .filter(payments::Column::CreatedAt.gte(start))
            .filter(payments::Column::CreatedAt.lt(end_exclusive))
            .all(db)
            .await?;
        let total_paid_raw: Decimal = paid_rows.iter().map(|p| p.amount).sum();
        let total_paid = quantize::quantize(total_paid_raw, MONEY_SCALE);

        let claims = meal_claims::Entity::find()
            .filter(meal_claims::Column::ClaimedAt.gte(start))
            .filter(meal_claims::Column::ClaimedAt.lt(end_exclusive))
            .all(db)
            .await?;
        let total_claims = claims.len() as i64;
        let unique_claimants = claims
            .iter()
            .map(|c| c.user_id)
            .collect::<HashSet<_>>()
            .len() as i64;
        let mut claims_by_dish: HashMap<i64, i64> = HashMap::new();
        for claim in &claims {
            *claims_by_dish.entry(claim.menu_item_id).or_insert(0) += 1;
        }

        let issues = meal_issues::Entity::find()
            .filter(meal_issues::Column::IssuedAt.gte(start))
            .filter(meal_issues::Column::IssuedAt.lt(end_exclusive))
            .all(db)
            .await?;
        let total_issued: i64 = issues.iter().map(|i| i64::from(i.issued_qty)).sum();
        let mut issues_by_dish: HashMap<i64, i64> = HashMap::new();
        for issue in &issues {
            *issues_by_dish.entry(issue.menu_item_id).or_insert(0) +=
                i64::from(issue.issued_qty);
        }

        let ratings = feedback::Entity::find()
            .filter(feedback::Column::CreatedAt.gte(start))
            .filter(feedback::Column::CreatedAt.lt(end_exclusive))
            .all(db)
            .await?;
        let mut ratings_by_dish: HashMap<i64, (i64, i64)> = HashMap::new();
        for entry in &ratings {
            let slot = ratings_by_dish.entry(entry.menu_item_id).or_insert((0, 0));
            slot.0 += i64::from(entry.rating);
            slot.1 += 1;
        }

        let approved = purchase_requests::Entity::find()
            .filter(purchase_requests::Column::Status.eq(RequestStatus::Approved))
            .filter(purchase_requests::Column::Qty.gt(Decimal::ZERO))
            .filter(purchase_requests::Column::UnitPrice.gt(Decimal::ZERO))
            .filter(purchase_requests::Column::CreatedAt.gte(start))
            .filter(purchase_requests::Column::CreatedAt.lt(end_exclusive))
            .all(db)
            .await?;
        let approved_request_count = approved.len() as i64;
        let cost_raw: Decimal = approved.iter().map(|r| r.qty * r.unit_price).sum();
        let approved_procurement_cost = quantize::quantize(cost_raw, MONEY_SCALE);

        let operating_balance =
            quantize::quantize(total_paid - approved_procurement_cost, MONEY_SCALE);

        let menu = menu_items::Entity::find()
            .order_by_desc(menu_items::Column::Date)
            .order_by_desc(menu_items::Column::Id)
            .all(db)
            .await?;

        let mut dishes = Vec::with_capacity(menu.len());
        let mut meal_type_rollups: HashMap<MealType, MealTypeRollup> = HashMap::new();
        for meal_type in [MealType::Breakfast, MealType::Lunch] {
            meal_type_rollups.insert(
                meal_type,
                MealTypeRollup {
                    meal_type,
                    claim_count: 0,
                    issued_qty: 0,
                },
            );
        }

        for item in &menu {
            let claim_count = claims_by_dish.get(&item.id).copied().unwrap_or(0);
            let issued_qty = issues_by_dish.get(&item.id).copied().unwrap_or(0);
            let avg_rating = match ratings_by_dish.get(&item.id) {
                Some((sum, count)) if *count > 0 => quantize::quantize(
                    Decimal::from(*sum) / Decimal::from(*count),
                    RATING_SCALE,
                ),
                _ => quantize::quantize(Decimal::ZERO, RATING_SCALE),
            };

            if let Some(rollup) = meal_type_rollups.get_mut(&item.meal_type) {
                rollup.claim_count += claim_count;
                rollup.issued_qty += issued_qty;
            }

            dishes.push(DishRollup {
                menu_item_id: item.id,
                title: item.title.clone(),
                meal_type: item.meal_type,
                claim_count,
                issued_qty,
                avg_rating,
                avg_rating_display: avg_rating.to_string(),
            });
        }

        let meal_types = [MealType::Breakfast, MealType::Lunch]
            .into_iter()
            .filter_map(|mt| meal_type_rollups.remove(&mt))
            .collect();

        Ok(LedgerSnapshot {
            period,
            total_paid,
            total_paid_display: quantize::format_money(total_paid),
            total_claims,
            unique_claimants,
            total_issued,
            approved_request_count,
            approved_procurement_cost,
            approved_procurement_cost_display: quantize::format_money(approved_procurement_cost),
            operating_balance,
            operating_balance_display: quantize::format_money(operating_balance),
            dishes,
            meal_types,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn missing_bounds_default_to_current_month() {
        let today = date(2024, 6, 17);
        let period = resolve_period(None, None, today);
        assert_eq!(period.from, date(2024, 6, 1));
        assert_eq!(period.to, today);
        assert!(!period.fallback_applied);
    }

    #[test]
    fn valid_bounds_pass_through() {
        let period = resolve_period(Some("2024-03-01"), Some("2024-03-15"), date(2024, 6, 17));
        assert_eq!(period.from, date(2024, 3, 1));
        assert_eq!(period.to, date(2024, 3, 15));
        assert!(!period.fallback_applied);
    }

    #[test]
    fn inverted_range_falls_back() {
        let today = date(2024, 6, 17);
        let period = resolve_period(Some("2024-03-15"), Some("2024-03-01"), today);
        assert_eq!(period.from, date(2024, 6, 1));
        assert_eq!(period.to, today);
        assert!(period.fallback_applied);
    }

    #[test]
    fn malformed_bound_falls_back() {
        let today = date(2024, 6, 17);
        let period = resolve_period(Some("17.06.2024"), Some("2024-06-30"), today);
        assert!(period.fallback_applied);
        assert_eq!(period.from, date(2024, 6, 1));
    }

    #[test]
    fn partial_bounds_fall_back() {
        let today = date(2024, 6, 17);
        let period = resolve_period(Some("2024-06-01"), None, today);
        assert!(period.fallback_applied);
    }
}
