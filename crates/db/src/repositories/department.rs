//! Department repository for reference-data operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use curafin_shared::types::PageRequest;

use crate::entities::{budgets, departments, invoices, sea_orm_active_enums::RecordStatus, users};

/// Error types for department operations.
#[derive(Debug, thiserror::Error)]
pub enum DepartmentError {
    /// Department not found.
    #[error("Department not found: {0}")]
    NotFound(Uuid),

    /// Department name already exists.
    #[error("Department name already exists: {0}")]
    DuplicateName(String),

    /// Department is still referenced by budgets, invoices, or users.
    #[error("Department is referenced by existing budgets, invoices, or users")]
    InUse,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for updating a department.
#[derive(Debug, Clone, Default)]
pub struct UpdateDepartmentInput {
    /// New name.
    pub name: Option<String>,
    /// New activation status.
    pub status: Option<RecordStatus>,
}

/// Department repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct DepartmentRepository {
    db: DatabaseConnection,
}

impl DepartmentRepository {
    /// Creates a new department repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a department with the given name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already taken or the insert fails.
    pub async fn create(&self, name: &str) -> Result<departments::Model, DepartmentError> {
        if self.name_exists(name).await? {
            return Err(DepartmentError::DuplicateName(name.to_string()));
        }

        let now = Utc::now().into();
        let department = departments::ActiveModel {
            uid: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            status: Set(RecordStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = department.insert(&self.db).await?;
        Ok(inserted)
    }

    /// Gets a department by uid.
    ///
    /// # Errors
    ///
    /// Returns an error if the department is not found or the query fails.
    pub async fn get(&self, uid: Uuid) -> Result<departments::Model, DepartmentError> {
        departments::Entity::find_by_id(uid)
            .one(&self.db)
            .await?
            .ok_or(DepartmentError::NotFound(uid))
    }

    /// Lists departments ordered by name, with optional name search and
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
    ) -> Result<(Vec<departments::Model>, u64), DepartmentError> {
        let mut query = departments::Entity::find();

        if let Some(q) = q {
            query = query.filter(departments::Column::Name.contains(q));
        }
        if let Some(status) = status {
            query = query.filter(departments::Column::Status.eq(status));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_asc(departments::Column::Name)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((rows, total))
    }

    /// Updates a department's name and/or status.
    ///
    /// # Errors
    ///
    /// Returns an error if the department is not found, the new name is
    /// already taken, or the update fails.
    pub async fn update(
        &self,
        uid: Uuid,
        input: UpdateDepartmentInput,
    ) -> Result<departments::Model, DepartmentError> {
        let department = self.get(uid).await?;

        if let Some(name) = &input.name {
            if *name != department.name && self.name_exists(name).await? {
                return Err(DepartmentError::DuplicateName(name.clone()));
            }
        }

        let mut active: departments::ActiveModel = department.into();

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

    /// Deletes a department.
    ///
    /// Refused while any budget, invoice, or user still references the
    /// department; ledger history never loses its department silently.
    ///
    /// # Errors
    ///
    /// Returns an error if the department is not found, still referenced,
    /// or the delete fails.
    pub async fn delete(&self, uid: Uuid) -> Result<(), DepartmentError> {
        let department = self.get(uid).await?;

        let budget_refs = budgets::Entity::find()
            .filter(budgets::Column::DepartmentUid.eq(uid))
            .count(&self.db)
            .await?;
        let invoice_refs = invoices::Entity::find()
            .filter(invoices::Column::DepartmentUid.eq(uid))
            .count(&self.db)
            .await?;
        let user_refs = users::Entity::find()
            .filter(users::Column::DepartmentUid.eq(uid))
            .count(&self.db)
            .await?;

        if budget_refs > 0 || invoice_refs > 0 || user_refs > 0 {
            return Err(DepartmentError::InUse);
        }

        departments::Entity::delete_by_id(department.uid)
            .exec(&self.db)
            .await?;

        Ok(())
    }

    /// Checks whether a department name is already taken.
    async fn name_exists(&self, name: &str) -> Result<bool, DbErr> {
        let count = departments::Entity::find()
            .filter(departments::Column::Name.eq(name))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }
}
