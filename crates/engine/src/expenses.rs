//! Expense primitives.
//!
//! An `Expense` is a single spending entry owned by the user who created it.
//! It always references a category, which is resolved at write time.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{Category, MoneyCents, ResultEngine, categories};

/// Identifier of an authenticated user, as resolved by the identity layer.
pub type UserId = i64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub id: Uuid,
    /// Owner of the expense. Set once at creation and never changed.
    pub user_id: UserId,
    pub title: String,
    pub amount: MoneyCents,
    pub occurred_at: DateTime<Utc>,
    pub description: Option<String>,
    pub category_id: Uuid,
    /// The referenced category, `None` if it no longer resolves.
    pub category: Option<Category>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Builds an `Expense` from a stored row and its (optional) category row.
    pub(crate) fn from_models(
        model: Model,
        category: Option<categories::Model>,
    ) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            amount: MoneyCents::new(model.amount_minor)?,
            occurred_at: model.occurred_at,
            description: model.description,
            category_id: model.category_id,
            category: category.map(Category::from),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    /// Returns `true` if `user_id` owns the expense.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: i64,
    pub category_id: Uuid,
    pub title: String,
    pub amount_minor: i64,
    pub occurred_at: DateTimeUtc,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Category,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
