use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    CreateExpenseCmd, EngineError, Expense, MoneyCents, ResultEngine, UpdateExpenseCmd, UserId,
    categories, expenses,
    pagination::{Page, PageMeta, PageRequest},
    util::{apply_optional_text_patch, normalize_optional_text, normalize_required_name},
};

use super::{Engine, with_tx};

/// Expenses owned by `user_id`, newest first.
///
/// The id tie-break keeps the order total, so offset pages never overlap.
fn owned_by(user_id: UserId) -> Select<expenses::Entity> {
    expenses::Entity::find()
        .filter(expenses::Column::UserId.eq(user_id))
        .order_by_desc(expenses::Column::OccurredAt)
        .order_by_desc(expenses::Column::Id)
}

/// Loads an expense with its category, checking existence first and
/// ownership second.
async fn find_owned_expense<C: ConnectionTrait>(
    db: &C,
    expense_id: Uuid,
    user_id: UserId,
) -> ResultEngine<(expenses::Model, Option<categories::Model>)> {
    let (model, category) = expenses::Entity::find_by_id(expense_id)
        .find_also_related(categories::Entity)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
    if model.user_id != user_id {
        return Err(EngineError::Forbidden(
            "expense belongs to another user".to_string(),
        ));
    }
    Ok((model, category))
}

fn parse_amount(raw: &str) -> ResultEngine<MoneyCents> {
    raw.parse::<MoneyCents>()
}

fn into_expenses(
    rows: Vec<(expenses::Model, Option<categories::Model>)>,
) -> ResultEngine<Vec<Expense>> {
    rows.into_iter()
        .map(|(model, category)| Expense::from_models(model, category))
        .collect()
}

impl Engine {
    /// Records a new expense owned by `cmd.user_id`.
    ///
    /// Fails with [`EngineError::MissingField`] when title, amount or category
    /// are absent and with [`EngineError::KeyNotFound`] when the category does
    /// not exist.
    pub async fn create_expense(&self, cmd: CreateExpenseCmd) -> ResultEngine<Expense> {
        let title = cmd
            .title
            .as_deref()
            .ok_or_else(|| EngineError::MissingField("title".to_string()))?;
        let title = normalize_required_name(title, "title")?;
        let amount = cmd
            .amount
            .as_deref()
            .ok_or_else(|| EngineError::MissingField("amount".to_string()))
            .and_then(parse_amount)?;
        let category_id = cmd
            .category_id
            .ok_or_else(|| EngineError::MissingField("category_id".to_string()))?;
        let description = normalize_optional_text(cmd.description.as_deref());
        let now = Utc::now();
        let occurred_at = cmd.occurred_at.unwrap_or(now);

        with_tx!(self, |db_tx| {
            let category = self.require_category(&db_tx, category_id).await?;

            let active = expenses::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(cmd.user_id),
                category_id: ActiveValue::Set(category.id),
                title: ActiveValue::Set(title),
                amount_minor: ActiveValue::Set(amount.cents()),
                occurred_at: ActiveValue::Set(occurred_at),
                description: ActiveValue::Set(description),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            };
            let model = active.insert(&db_tx).await?;

            Expense::from_models(model, Some(category))
        })
    }

    /// Returns the expense `expense_id` if `user_id` owns it.
    pub async fn expense(&self, expense_id: Uuid, user_id: UserId) -> ResultEngine<Expense> {
        let (model, category) = find_owned_expense(&self.database, expense_id, user_id).await?;
        Expense::from_models(model, category)
    }

    /// Applies a partial update.
    ///
    /// Checks run in order: existence, ownership, field validation, category
    /// existence. Nothing is written unless every check passes.
    pub async fn update_expense(&self, cmd: UpdateExpenseCmd) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let (model, current_category) =
                find_owned_expense(&db_tx, cmd.expense_id, cmd.user_id).await?;

            let title = cmd
                .title
                .as_deref()
                .map(|title| normalize_required_name(title, "title"))
                .transpose()?;
            let amount = cmd.amount.as_deref().map(parse_amount).transpose()?;
            let new_category = match cmd.category_id {
                Some(category_id) => Some(self.require_category(&db_tx, category_id).await?),
                None => None,
            };
            let description =
                apply_optional_text_patch(model.description.clone(), cmd.description.as_deref());

            let mut active: expenses::ActiveModel = model.into();
            if let Some(title) = title {
                active.title = ActiveValue::Set(title);
            }
            if let Some(amount) = amount {
                active.amount_minor = ActiveValue::Set(amount.cents());
            }
            if let Some(category) = new_category.as_ref() {
                active.category_id = ActiveValue::Set(category.id);
            }
            if let Some(occurred_at) = cmd.occurred_at {
                active.occurred_at = ActiveValue::Set(occurred_at);
            }
            active.description = ActiveValue::Set(description);
            active.updated_at = ActiveValue::Set(Utc::now());

            let updated = active.update(&db_tx).await?;
            Expense::from_models(updated, new_category.or(current_category))
        })
    }

    /// Permanently removes the expense `expense_id` owned by `user_id`.
    pub async fn delete_expense(&self, expense_id: Uuid, user_id: UserId) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let (model, _) = find_owned_expense(&db_tx, expense_id, user_id).await?;
            expenses::Entity::delete_by_id(model.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Lists a page of the user's expenses, newest first.
    ///
    /// The count and the slice are read in the same transaction.
    pub async fn list_expenses(
        &self,
        user_id: UserId,
        request: PageRequest,
    ) -> ResultEngine<Page<Expense>> {
        with_tx!(self, |db_tx| {
            let total = expenses::Entity::find()
                .filter(expenses::Column::UserId.eq(user_id))
                .count(&db_tx)
                .await?;

            // Past the end there is nothing to read, and the offset may not
            // fit the SQLite integer.
            let items = if request.offset() >= total {
                Vec::new()
            } else {
                let rows = owned_by(user_id)
                    .find_also_related(categories::Entity)
                    .offset(request.offset())
                    .limit(request.page_size())
                    .all(&db_tx)
                    .await?;
                into_expenses(rows)?
            };

            Ok(Page {
                items,
                meta: PageMeta::new(request, total),
            })
        })
    }

    /// Every expense of the user, newest first, without pagination.
    pub async fn export_expenses(&self, user_id: UserId) -> ResultEngine<Vec<Expense>> {
        let rows = owned_by(user_id)
            .find_also_related(categories::Entity)
            .all(&self.database)
            .await?;
        into_expenses(rows)
    }
}
