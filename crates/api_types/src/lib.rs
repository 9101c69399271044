//! Wire types shared by the HTTP server and its clients.
//!
//! Request bodies keep their required fields optional so that the server can
//! answer a missing field with a 400 naming it, instead of a decoder error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Distinguishes an absent key (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Renders integer cents as a JSON number with up to two decimals, e.g.
/// `1250` as `12.5`.
pub fn amount_number(cents: i128) -> serde_json::Number {
    // Finite for every i128, so the fallback is never taken.
    serde_json::Number::from_f64(cents as f64 / 100.0).unwrap_or_else(|| 0.into())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod category {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryCreate {
        pub name: Option<String>,
    }
}

pub mod expense {
    use super::*;

    pub use super::category::CategoryView;

    /// An amount as sent by clients: `12.5` or `"12.50"`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum AmountInput {
        Number(serde_json::Number),
        Text(String),
    }

    impl AmountInput {
        /// Decimal text handed to the engine parser.
        pub fn to_decimal_string(&self) -> String {
            match self {
                Self::Number(number) => number.to_string(),
                Self::Text(text) => text.clone(),
            }
        }
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseNew {
        pub title: Option<String>,
        pub amount: Option<AmountInput>,
        /// Kept as text: a malformed id is a bad request, not a decode failure.
        pub category_id: Option<String>,
        pub date: Option<String>,
        pub description: Option<String>,
    }

    /// Partial update. Absent keys are left unchanged.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseUpdate {
        pub title: Option<String>,
        pub amount: Option<AmountInput>,
        pub category_id: Option<String>,
        pub date: Option<String>,
        /// `null` or `""` clears the description.
        #[serde(
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub description: Option<Option<String>>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseView {
        pub id: Uuid,
        pub title: String,
        /// See [`amount_number`](crate::amount_number).
        pub amount: serde_json::Number,
        pub date: DateTime<Utc>,
        pub description: Option<String>,
        pub author_id: i64,
        pub category_id: Uuid,
        pub category: Option<CategoryView>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// Query string of the listing. Values stay textual so that garbage falls
    /// back to the defaults instead of failing the request.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseListQuery {
        pub page: Option<String>,
        pub page_size: Option<String>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PageMeta {
        pub page: u64,
        pub page_size: u64,
        pub total: u64,
        pub total_pages: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub data: Vec<ExpenseView>,
        pub meta: PageMeta,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseDeleted {
        pub message: String,
    }
}

pub mod summary {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryTotalView {
        pub category_id: Uuid,
        pub category: String,
        pub total: serde_json::Number,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MonthTotalView {
        /// First instant of the month, UTC.
        pub month: DateTime<Utc>,
        pub total: serde_json::Number,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SummaryResponse {
        pub by_category: Vec<CategoryTotalView>,
        pub monthly_breakdown: Vec<MonthTotalView>,
    }
}
