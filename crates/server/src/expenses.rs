//! Expenses API endpoints

use api_types::{
    amount_number,
    expense::{
        ExpenseDeleted, ExpenseListQuery, ExpenseListResponse, ExpenseNew, ExpenseUpdate,
        ExpenseView, PageMeta,
    },
    summary::{CategoryTotalView, MonthTotalView, SummaryResponse},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use engine::{
    CreateExpenseCmd, DEFAULT_PAGE_SIZE, EngineError, PageRequest, UpdateExpenseCmd,
    parse_occurred_at,
};
use uuid::Uuid;

use crate::{ServerError, categories::map_category, server::AuthUser, server::ServerState};

pub(crate) fn map_expense(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        title: expense.title,
        amount: amount_number(i128::from(expense.amount.cents())),
        date: expense.occurred_at,
        description: expense.description,
        author_id: expense.user_id,
        category_id: expense.category_id,
        category: expense.category.map(map_category),
        created_at: expense.created_at,
        updated_at: expense.updated_at,
    }
}

/// A path id that does not parse cannot name an existing expense.
fn parse_expense_id(raw: &str) -> Result<Uuid, EngineError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| EngineError::KeyNotFound("expense not exists".to_string()))
}

fn parse_category_id(raw: Option<&str>) -> Result<Option<Uuid>, EngineError> {
    raw.map(|raw| {
        Uuid::parse_str(raw.trim())
            .map_err(|_| EngineError::InvalidId(format!("invalid categoryId: {raw}")))
    })
    .transpose()
}

/// Blank dates are treated as absent.
fn parse_date(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, EngineError> {
    raw.filter(|raw| !raw.trim().is_empty())
        .map(parse_occurred_at)
        .transpose()
}

fn parse_query_number(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

pub async fn create(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    payload: Result<Json<ExpenseNew>, JsonRejection>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let Json(payload) = payload?;

    let cmd = CreateExpenseCmd {
        user_id,
        title: payload.title,
        amount: payload.amount.map(|amount| amount.to_decimal_string()),
        category_id: parse_category_id(payload.category_id.as_deref())?,
        occurred_at: parse_date(payload.date.as_deref())?,
        description: payload.description,
    };

    let expense = state.engine.create_expense(cmd).await?;
    tracing::info!(user_id, expense_id = %expense.id, "expense created");

    Ok((StatusCode::CREATED, Json(map_expense(expense))))
}

pub async fn get(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense_id = parse_expense_id(&id)?;
    let expense = state.engine.expense(expense_id, user_id).await?;
    Ok(Json(map_expense(expense)))
}

pub async fn update(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<ExpenseUpdate>, JsonRejection>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense_id = parse_expense_id(&id)?;
    let Json(payload) = payload?;

    let cmd = UpdateExpenseCmd {
        expense_id,
        user_id,
        title: payload.title,
        amount: payload.amount.map(|amount| amount.to_decimal_string()),
        category_id: parse_category_id(payload.category_id.as_deref())?,
        occurred_at: parse_date(payload.date.as_deref())?,
        // `null` clears, like an empty string.
        description: payload
            .description
            .map(|description| description.unwrap_or_default()),
    };

    let expense = state.engine.update_expense(cmd).await?;
    tracing::info!(user_id, expense_id = %expense.id, "expense updated");

    Ok(Json(map_expense(expense)))
}

pub async fn delete(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<ExpenseDeleted>, ServerError> {
    let expense_id = parse_expense_id(&id)?;
    state.engine.delete_expense(expense_id, user_id).await?;
    tracing::info!(user_id, %expense_id, "expense deleted");

    Ok(Json(ExpenseDeleted {
        message: "Expense deleted successfully".to_string(),
    }))
}

pub async fn list(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<ExpenseListQuery>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let request = PageRequest::new(
        parse_query_number(query.page.as_deref(), 1),
        parse_query_number(query.page_size.as_deref(), DEFAULT_PAGE_SIZE as i64),
    );

    let page = state.engine.list_expenses(user_id, request).await?;

    Ok(Json(ExpenseListResponse {
        data: page.items.into_iter().map(map_expense).collect(),
        meta: PageMeta {
            page: page.meta.page,
            page_size: page.meta.page_size,
            total: page.meta.total,
            total_pages: page.meta.total_pages,
        },
    }))
}

pub async fn summary(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<SummaryResponse>, ServerError> {
    let summary = state.engine.expense_summary(user_id).await?;

    Ok(Json(SummaryResponse {
        by_category: summary
            .by_category
            .into_iter()
            .map(|total| CategoryTotalView {
                category_id: total.category_id,
                category: total.name,
                total: amount_number(total.total.cents()),
            })
            .collect(),
        monthly_breakdown: summary
            .by_month
            .into_iter()
            .map(|total| MonthTotalView {
                month: total.month,
                total: amount_number(total.total.cents()),
            })
            .collect(),
    }))
}
