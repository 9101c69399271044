//! Core of the expense ledger.
//!
//! The [`Engine`] owns the category store, the per-user expense repository and
//! the report computations. Every operation that touches more than one row runs
//! inside a single database transaction.

pub use categories::Category;
pub use commands::{CreateExpenseCmd, UpdateExpenseCmd};
pub use error::EngineError;
pub use expenses::{Expense, UserId};
pub use money::{MoneyCents, MoneyTotal};
pub use ops::{Engine, EngineBuilder};
pub use pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE, Page, PageMeta, PageRequest};
pub use reports::{CategoryTotal, ExpenseSummary, MonthTotal, UNKNOWN_CATEGORY_NAME};
pub use util::parse_occurred_at;

pub mod categories;
mod commands;
mod error;
pub mod expenses;
mod money;
mod ops;
mod pagination;
mod reports;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
