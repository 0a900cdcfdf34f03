//! Delimited report rendering.
//!
//! Produces the spreadsheet-friendly document for a [`LedgerSnapshot`]: a
//! UTF-8 byte-order marker, semicolon-separated fields, CRLF line endings.
//! All figures are the snapshot's display strings verbatim, so the export
//! always prints exactly what the interactive view printed for the same
//! period.

use chrono::NaiveDateTime;
use sea_orm::ActiveEnum;

use crate::services::ledger::LedgerSnapshot;

const BOM: char = '\u{feff}';
const DELIMITER: char = ';';
const LINE_ENDING: &str = "\r\n";

/// Renders the full report document for one snapshot.
pub fn render_report(snapshot: &LedgerSnapshot, generated_at: NaiveDateTime) -> String {
    let mut out = String::new();
    out.push(BOM);

    push_row(&mut out, &["Section", "Metric", "Value"]);

    push_row(
        &mut out,
        &[
            "meta",
            "generated_at",
            &generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    );
    push_row(
        &mut out,
        &[
            "meta",
            "period_from",
            &snapshot.period.from.format("%Y-%m-%d").to_string(),
        ],
    );
    push_row(
        &mut out,
        &[
            "meta",
            "period_to",
            &snapshot.period.to.format("%Y-%m-%d").to_string(),
        ],
    );
    if snapshot.period.fallback_applied {
        push_row(
            &mut out,
            &[
                "meta",
                "period_warning",
                "invalid period input replaced with the default range",
            ],
        );
    }

    push_row(&mut out, &["summary", "total_paid", &snapshot.total_paid_display]);
    push_row(
        &mut out,
        &["summary", "total_claims", &snapshot.total_claims.to_string()],
    );
    push_row(
        &mut out,
        &[
            "summary",
            "unique_claimants",
            &snapshot.unique_claimants.to_string(),
        ],
    );
    push_row(
        &mut out,
        &["summary", "total_issued", &snapshot.total_issued.to_string()],
    );
    push_row(
        &mut out,
        &[
            "summary",
            "approved_request_count",
            &snapshot.approved_request_count.to_string(),
        ],
    );
    push_row(
        &mut out,
        &[
            "summary",
            "approved_procurement_cost",
            &snapshot.approved_procurement_cost_display,
        ],
    );
    push_row(
        &mut out,
        &[
            "summary",
            "operating_balance",
            &snapshot.operating_balance_display,
        ],
    );

    out.push_str(LINE_ENDING);
    push_row(
        &mut out,
        &["Dish", "Meal type", "Claims", "Issued", "Avg rating"],
    );
    for dish in &snapshot.dishes {
        push_row(
            &mut out,
            &[
                &dish.title,
                &dish.meal_type.to_value(),
                &dish.claim_count.to_string(),
                &dish.issued_qty.to_string(),
                &dish.avg_rating_display,
            ],
        );
    }

    out.push_str(LINE_ENDING);
    push_row(&mut out, &["Meal type", "Claims", "Issued"]);
    for rollup in &snapshot.meal_types {
        push_row(
            &mut out,
            &[
                &rollup.meal_type.to_value(),
                &rollup.claim_count.to_string(),
                &rollup.issued_qty.to_string(),
            ],
        );
    }

    out
}

fn push_row(out: &mut String, fields: &[&str]) {
    for (index, field) in fields.iter().enumerate() {
        if index > 0 {
            out.push(DELIMITER);
        }
        out.push_str(&escape_field(field));
    }
    out.push_str(LINE_ENDING);
}

/// Quotes a field when it contains the delimiter, a quote, or a line break,
/// doubling any inner quotes.
fn escape_field(field: &str) -> String {
    if field.contains([DELIMITER, '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
