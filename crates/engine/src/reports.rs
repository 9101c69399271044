//! Aggregations over a user's expenses.
//!
//! The folding here is pure: the engine loads a read-only snapshot of rows
//! and hands it to these functions, so the totals are exact integer sums
//! of the stored amounts.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, MoneyTotal, ResultEngine};

/// Name reported for a category id that no longer resolves.
pub const UNKNOWN_CATEGORY_NAME: &str = "Unknown";

/// Total spent in one category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category_id: Uuid,
    pub name: String,
    pub total: MoneyTotal,
}

/// Total spent in one calendar month (UTC).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthTotal {
    /// First instant of the month, `YYYY-MM-01T00:00:00Z`.
    pub month: DateTime<Utc>,
    pub total: MoneyTotal,
}

/// Both breakdowns, computed from the same snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpenseSummary {
    pub by_category: Vec<CategoryTotal>,
    pub by_month: Vec<MonthTotal>,
}

/// The slice of an expense the reports need.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ReportRow {
    pub(crate) category_id: Uuid,
    pub(crate) amount: MoneyCents,
    pub(crate) occurred_at: DateTime<Utc>,
}

/// Groups rows by category, ordered by total descending then category id.
pub(crate) fn fold_by_category(
    rows: &[ReportRow],
    names: &HashMap<Uuid, String>,
) -> Vec<CategoryTotal> {
    let mut totals: HashMap<Uuid, MoneyTotal> = HashMap::new();
    for row in rows {
        let entry = totals.entry(row.category_id).or_insert(MoneyTotal::ZERO);
        *entry += row.amount;
    }

    let mut out: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category_id, total)| CategoryTotal {
            category_id,
            name: names
                .get(&category_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_CATEGORY_NAME.to_string()),
            total,
        })
        .collect();
    out.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category_id.cmp(&b.category_id))
    });
    out
}

/// Groups rows by UTC calendar month, most recent month first.
pub(crate) fn fold_by_month(rows: &[ReportRow]) -> ResultEngine<Vec<MonthTotal>> {
    let mut totals: BTreeMap<(i32, u32), MoneyTotal> = BTreeMap::new();
    for row in rows {
        let key = (row.occurred_at.year(), row.occurred_at.month());
        let entry = totals.entry(key).or_insert(MoneyTotal::ZERO);
        *entry += row.amount;
    }

    totals
        .into_iter()
        .rev()
        .map(|((year, month), total)| {
            let month = NaiveDate::from_ymd_opt(year, month, 1)
                .map(|date| date.and_time(chrono::NaiveTime::MIN).and_utc())
                .ok_or_else(|| EngineError::InvalidDate(format!("{year}-{month:02}")))?;
            Ok(MonthTotal { month, total })
        })
        .collect()
}
