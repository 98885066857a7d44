//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

use uuid::Uuid;

pub mod budget;
pub mod dashboard;
pub mod department;
pub mod expense_category;
pub mod invoice;
pub mod user;

pub use budget::{
    BudgetError, BudgetListFilter, BudgetOverview, BudgetRepository, CreateBudgetInput,
    CreateExpenseInput, UpdateBudgetInput, UpdateExpenseInput,
};
pub use dashboard::{DashboardError, DashboardRepository, DepartmentUtilization, UtilizationRange};
pub use department::{DepartmentError, DepartmentRepository, UpdateDepartmentInput};
pub use expense_category::{CategoryError, CategoryRepository, UpdateCategoryInput};
pub use invoice::{
    CreateInvoiceInput, CreatePaymentInput, InvoiceError, InvoiceListFilter, InvoiceOverview,
    InvoiceRepository, PaymentListFilter, UpdateInvoiceInput, UpdatePaymentInput,
};
pub use user::UserRepository;

/// Caller identity resolved by the auth layer.
///
/// Repositories use it for ownership checks, admin-only operations, and
/// budget auto-approval; token validation itself happens upstream.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    /// Uid of the authenticated user.
    pub user_uid: Uuid,
    /// Whether the user holds the administrator role.
    pub admin: bool,
}
