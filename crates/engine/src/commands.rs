//! Command structs for engine operations.
//!
//! These types group parameters for expense writes (create/update), keeping
//! call sites readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::UserId;

/// Create an expense.
///
/// Required inputs are `Option`s so that a missing field is reported by the
/// engine as [`EngineError::MissingField`](crate::EngineError::MissingField)
/// instead of being rejected by whatever decoded the request.
#[derive(Clone, Debug)]
pub struct CreateExpenseCmd {
    pub user_id: UserId,
    pub title: Option<String>,
    /// Decimal amount as text (`"12.50"`); parsed into [`MoneyCents`](crate::MoneyCents).
    pub amount: Option<String>,
    pub category_id: Option<Uuid>,
    /// Defaults to now when absent.
    pub occurred_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

impl CreateExpenseCmd {
    #[must_use]
    pub fn new(
        user_id: UserId,
        title: impl Into<String>,
        amount: impl Into<String>,
        category_id: Uuid,
    ) -> Self {
        Self {
            user_id,
            title: Some(title.into()),
            amount: Some(amount.into()),
            category_id: Some(category_id),
            occurred_at: None,
            description: None,
        }
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partially update an expense.
///
/// Every field left to `None` keeps its stored value. `description` set to
/// an empty string clears the stored description.
#[derive(Clone, Debug)]
pub struct UpdateExpenseCmd {
    pub expense_id: Uuid,
    pub user_id: UserId,
    pub title: Option<String>,
    pub amount: Option<String>,
    pub category_id: Option<Uuid>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

impl UpdateExpenseCmd {
    #[must_use]
    pub fn new(expense_id: Uuid, user_id: UserId) -> Self {
        Self {
            expense_id,
            user_id,
            title: None,
            amount: None,
            category_id: None,
            occurred_at: None,
            description: None,
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Clears the stored description.
    #[must_use]
    pub fn clear_description(mut self) -> Self {
        self.description = Some(String::new());
        self
    }
}
