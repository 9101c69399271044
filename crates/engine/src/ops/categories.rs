use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, SqlErr, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    Category, EngineError, ResultEngine, categories,
    util::{normalize_category_display, normalize_category_key},
};

use super::{Engine, with_tx};

impl Engine {
    /// Lists every category, ordered by normalized name.
    pub async fn list_categories(&self) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::NameNorm)
            .order_by_asc(categories::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    /// Creates a new category.
    ///
    /// Names are unique under case-insensitive comparison: "food" is rejected
    /// with [`EngineError::ExistingKey`] once "Food" exists.
    pub async fn create_category(&self, name: &str) -> ResultEngine<Category> {
        let display = normalize_category_display(name)?;
        let normalized = normalize_category_key(&display);

        with_tx!(self, |db_tx| {
            if let Some(existing) = categories::Entity::find()
                .filter(categories::Column::NameNorm.eq(normalized.clone()))
                .one(&db_tx)
                .await?
            {
                return Err(EngineError::ExistingKey(existing.name));
            }

            let active = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                name: ActiveValue::Set(display.clone()),
                name_norm: ActiveValue::Set(normalized),
            };
            // The unique index still guards against a concurrent create.
            let model = active.insert(&db_tx).await.map_err(|err| match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    EngineError::ExistingKey(display.clone())
                }
                _ => EngineError::Database(err),
            })?;

            Ok(Category::from(model))
        })
    }

    /// Returns `true` if a category with `id` exists.
    pub async fn category_exists(&self, id: Uuid) -> ResultEngine<bool> {
        Ok(categories::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .is_some())
    }

    pub(super) async fn require_category(
        &self,
        db: &DatabaseTransaction,
        id: Uuid,
    ) -> ResultEngine<categories::Model> {
        categories::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
    }
}
