//! Expense category repository for reference-data operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use curafin_shared::types::PageRequest;

use crate::entities::{expense_categories, expenses, sea_orm_active_enums::RecordStatus};

/// Error types for expense category operations.
#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    /// Category not found.
    #[error("Expense category not found: {0}")]
    NotFound(Uuid),

    /// Category name already exists.
    #[error("Expense category name already exists: {0}")]
    DuplicateName(String),

    /// Category is still referenced by expenses.
    #[error("Expense category is referenced by existing expenses")]
    InUse,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for updating an expense category.
#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryInput {
    /// New name.
    pub name: Option<String>,
    /// New activation status.
    pub status: Option<RecordStatus>,
}

/// Expense category repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    db: DatabaseConnection,
}

impl CategoryRepository {
    /// Creates a new category repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a category with the given name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already taken or the insert fails.
    pub async fn create(&self, name: &str) -> Result<expense_categories::Model, CategoryError> {
        if self.name_exists(name).await? {
            return Err(CategoryError::DuplicateName(name.to_string()));
        }

        let now = Utc::now().into();
        let category = expense_categories::ActiveModel {
            uid: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            status: Set(RecordStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = category.insert(&self.db).await?;
        Ok(inserted)
    }

    /// Gets a category by uid.
    ///
    /// # Errors
    ///
    /// Returns an error if the category is not found or the query fails.
    pub async fn get(&self, uid: Uuid) -> Result<expense_categories::Model, CategoryError> {
        expense_categories::Entity::find_by_id(uid)
            .one(&self.db)
            .await?
            .ok_or(CategoryError::NotFound(uid))
    }

    /// Lists categories ordered by name, with optional name search and
    /// status filter.
    ///
    /// Returns the page of rows plus the total row count for the filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        q: Option<&str>,
        status: Option<RecordStatus>,
        page: &PageRequest,
    ) -> Result<(Vec<expense_categories::Model>, u64), CategoryError> {
        let mut query = expense_categories::Entity::find();

        if let Some(q) = q {
            query = query.filter(expense_categories::Column::Name.contains(q));
        }
        if let Some(status) = status {
            query = query.filter(expense_categories::Column::Status.eq(status));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_asc(expense_categories::Column::Name)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((rows, total))
    }

    /// Updates a category's name and/or status.
    ///
    /// # Errors
    ///
    /// Returns an error if the category is not found, the new name is
    /// already taken, or the update fails.
    pub async fn update(
        &self,
        uid: Uuid,
        input: UpdateCategoryInput,
    ) -> Result<expense_categories::Model, CategoryError> {
        let category = self.get(uid).await?;

        if let Some(name) = &input.name {
            if *name != category.name && self.name_exists(name).await? {
                return Err(CategoryError::DuplicateName(name.clone()));
            }
        }

        let mut active: expense_categories::ActiveModel = category.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Deletes a category.
    ///
    /// Refused while any expense still references the category.
    ///
    /// # Errors
    ///
    /// Returns an error if the category is not found, still referenced, or
    /// the delete fails.
    pub async fn delete(&self, uid: Uuid) -> Result<(), CategoryError> {
        let category = self.get(uid).await?;

        let expense_refs = expenses::Entity::find()
            .filter(expenses::Column::CategoryUid.eq(uid))
            .count(&self.db)
            .await?;

        if expense_refs > 0 {
            return Err(CategoryError::InUse);
        }

        expense_categories::Entity::delete_by_id(category.uid)
            .exec(&self.db)
            .await?;

        Ok(())
    }

    /// Checks whether a category name is already taken.
    async fn name_exists(&self, name: &str) -> Result<bool, DbErr> {
        let count = expense_categories::Entity::find()
            .filter(expense_categories::Column::Name.eq(name))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }
}
