use std::collections::{BTreeSet, HashMap};

use sea_orm::{ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    MoneyCents, ResultEngine, UserId, categories, expenses,
    reports::{
        CategoryTotal, ExpenseSummary, MonthTotal, ReportRow, fold_by_category, fold_by_month,
    },
};

use super::{Engine, with_tx};

/// Loads the user's report rows together with the names of the categories
/// they reference.
async fn load_snapshot<C: ConnectionTrait>(
    db: &C,
    user_id: UserId,
) -> ResultEngine<(Vec<ReportRow>, HashMap<Uuid, String>)> {
    let models = expenses::Entity::find()
        .filter(expenses::Column::UserId.eq(user_id))
        .all(db)
        .await?;

    let rows = models
        .iter()
        .map(|model| {
            Ok(ReportRow {
                category_id: model.category_id,
                amount: MoneyCents::new(model.amount_minor)?,
                occurred_at: model.occurred_at,
            })
        })
        .collect::<ResultEngine<Vec<_>>>()?;

    let ids: BTreeSet<Uuid> = rows.iter().map(|row| row.category_id).collect();
    let names = if ids.is_empty() {
        HashMap::new()
    } else {
        categories::Entity::find()
            .filter(categories::Column::Id.is_in(ids))
            .all(db)
            .await?
            .into_iter()
            .map(|category| (category.id, category.name))
            .collect()
    };

    Ok((rows, names))
}

impl Engine {
    /// Sum of the user's expenses per category, largest total first.
    pub async fn totals_by_category(&self, user_id: UserId) -> ResultEngine<Vec<CategoryTotal>> {
        with_tx!(self, |db_tx| {
            let (rows, names) = load_snapshot(&db_tx, user_id).await?;
            Ok(fold_by_category(&rows, &names))
        })
    }

    /// Sum of the user's expenses per UTC calendar month, most recent first.
    pub async fn totals_by_month(&self, user_id: UserId) -> ResultEngine<Vec<MonthTotal>> {
        with_tx!(self, |db_tx| {
            let (rows, _) = load_snapshot(&db_tx, user_id).await?;
            fold_by_month(&rows)
        })
    }

    /// Both breakdowns over one snapshot, so their grand totals agree.
    pub async fn expense_summary(&self, user_id: UserId) -> ResultEngine<ExpenseSummary> {
        with_tx!(self, |db_tx| {
            let (rows, names) = load_snapshot(&db_tx, user_id).await?;
            Ok(ExpenseSummary {
                by_category: fold_by_category(&rows, &names),
                by_month: fold_by_month(&rows)?,
            })
        })
    }
}
