//! CSV export of a user's expenses.

use axum::{
    Extension,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::SecondsFormat;
use csv::{Terminator, WriterBuilder};

use crate::{ServerError, server::AuthUser, server::ServerState};

pub(crate) const CSV_HEADER: [&str; 5] = ["Date", "Title", "Category", "Amount", "Description"];

/// Renders expenses as CSV, one row per expense in the given order.
///
/// Fields holding a delimiter, a quote or a line break are quoted with inner
/// quotes doubled.
pub(crate) fn expenses_to_csv(expenses: &[engine::Expense]) -> Result<Vec<u8>, ServerError> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .map_err(|err| ServerError::Internal(format!("csv header: {err}")))?;

    for expense in expenses {
        let date = expense
            .occurred_at
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let category = expense
            .category
            .as_ref()
            .map(|category| category.name.as_str())
            .unwrap_or_default();
        let amount = expense.amount.to_string();
        let description = expense.description.as_deref().unwrap_or_default();

        writer
            .write_record([
                date.as_str(),
                expense.title.as_str(),
                category,
                amount.as_str(),
                description,
            ])
            .map_err(|err| ServerError::Internal(format!("csv row: {err}")))?;
    }

    writer
        .into_inner()
        .map_err(|err| ServerError::Internal(format!("csv flush: {err}")))
}

pub async fn export_csv(
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Response, ServerError> {
    let expenses = state.engine.export_expenses(user_id).await?;
    let body = expenses_to_csv(&expenses)?;
    tracing::info!(user_id, rows = expenses.len(), "expenses exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"expenses.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}
