//! `SeaORM` entity definitions.
//!
//! Ledger tables (budgets, expenses, invoices, payments) carry a
//! `BIGSERIAL` numeric id used for serial numbers plus a unique `uid`
//! used everywhere else; foreign keys target the uid columns. Reference
//! tables (users, departments, expense categories) are keyed by uid only.

pub mod budgets;
pub mod departments;
pub mod expense_categories;
pub mod expenses;
pub mod invoices;
pub mod payments;
pub mod sea_orm_active_enums;
pub mod users;
