//! `SeaORM` active enums mapped to PostgreSQL enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Application role of a user.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full access to every ledger record and the admin dashboard.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Regular staff member, scoped to their own records.
    #[sea_orm(string_value = "staff")]
    Staff,
}

/// Active/inactive flag for reference data rows.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "record_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    /// Row is live and usable as a reference target.
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    /// Row is retired; existing references stay valid, new ones are rejected.
    #[sea_orm(string_value = "IN_ACTIVE")]
    InActive,
}

/// Approval state of a budget.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "budget_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetStatus {
    /// Awaiting an administrator's decision.
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Approved for spending.
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    /// Rejected.
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

/// Availability of a budget's funds.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "budget_availability")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetAvailability {
    /// Funds can be spent.
    #[sea_orm(string_value = "AVAILABLE")]
    Available,
    /// Spending is temporarily blocked.
    #[sea_orm(string_value = "FROZEN")]
    Frozen,
    /// Funds are exhausted.
    #[sea_orm(string_value = "DEPLETED")]
    Depleted,
    /// Funds are earmarked and not generally spendable.
    #[sea_orm(string_value = "RESERVED")]
    Reserved,
}

/// Kind of party or product an invoice bills for.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_type")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceType {
    /// Service rendered.
    #[sea_orm(string_value = "SERVICE")]
    Service,
    /// Product sold.
    #[sea_orm(string_value = "PRODUCT")]
    Product,
    /// Recurring subscription.
    #[sea_orm(string_value = "SUBSCRIPTION")]
    Subscription,
    /// Maintenance work.
    #[sea_orm(string_value = "MAINTENANCE")]
    Maintenance,
    /// Patient billing.
    #[sea_orm(string_value = "PATIENT")]
    Patient,
    /// Insurance claim.
    #[sea_orm(string_value = "INSURANCE")]
    Insurance,
    /// Government grant disbursement.
    #[sea_orm(string_value = "GOVERNMENT_GRANT")]
    GovernmentGrant,
    /// Donation received.
    #[sea_orm(string_value = "DONATION")]
    Donation,
    /// Anything else.
    #[sea_orm(string_value = "OTHERS")]
    Others,
}

/// How a payment was received.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash.
    #[sea_orm(string_value = "CASH")]
    Cash,
    /// Card payment.
    #[sea_orm(string_value = "CARD")]
    Card,
    /// Bank transfer.
    #[sea_orm(string_value = "BANK_TRANSFER")]
    BankTransfer,
    /// Settled by an insurer.
    #[sea_orm(string_value = "INSURANCE")]
    Insurance,
    /// Anything else.
    #[sea_orm(string_value = "OTHERS")]
    Others,
}
