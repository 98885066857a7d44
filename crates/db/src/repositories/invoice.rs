//! Invoice repository for the invoice and payment ledger.
//!
//! Unlike the budget ledger, invoices store no settlement scalar at all:
//! tax, discount, total, net due, and payment status are derived from the
//! stored financial fields and the live payment rows on every read. Payment
//! mutations still serialize on the invoice's advisory lock so they cannot
//! interleave with a delete or a financial-field patch of the parent.

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait, prelude::DateTimeWithTimeZone,
};
use uuid::Uuid;

use curafin_core::invoice::InvoiceFigures;
use curafin_core::serial::{self, SerialKind};
use curafin_core::validation::{self, ValidationError};
use curafin_shared::types::PageRequest;

use crate::entities::{
    departments, invoices, payments,
    sea_orm_active_enums::{InvoiceType, PaymentMethod, RecordStatus},
};
use crate::locks::{self, LockDomain};

use super::Caller;

/// Error types for invoice ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    NotFound(Uuid),

    /// Payment not found.
    #[error("Payment not found: {0}")]
    PaymentNotFound(Uuid),

    /// Department absent or inactive.
    #[error("Department not found or inactive: {0}")]
    DepartmentNotFound(Uuid),

    /// Caller does not own the row it is trying to change.
    #[error("Caller does not own this record")]
    NotOwner,

    /// Financial fields cannot change once a payment exists.
    #[error("Financial fields are frozen once payments have been recorded")]
    FinancialFieldsFrozen,

    /// Amount or percentage failed domain validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an invoice.
#[derive(Debug, Clone)]
pub struct CreateInvoiceInput {
    /// Invoice title.
    pub title: String,
    /// Gross amount before tax and discount (must not be negative).
    pub gross_amount: Decimal,
    /// Tax percentage in [0, 100].
    pub tax_percent: Decimal,
    /// Discount percentage in [0, 100].
    pub discount_percent: Decimal,
    /// Kind of billing.
    pub invoice_type: InvoiceType,
    /// When the invoice was issued.
    pub invoiced_at: Option<DateTimeWithTimeZone>,
    /// Department the billing belongs to.
    pub department_uid: Option<Uuid>,
    /// Opaque reference to the billed service.
    pub service_uid: Option<Uuid>,
    /// Opaque reference to the billed patient.
    pub patient_uid: Option<Uuid>,
}

/// Input for updating an invoice. `None` fields are left untouched;
/// nullable fields use a nested `Option` so the caller can clear them.
#[derive(Debug, Clone, Default)]
pub struct UpdateInvoiceInput {
    /// New title.
    pub title: Option<String>,
    /// New gross amount (frozen once payments exist).
    pub gross_amount: Option<Decimal>,
    /// New tax percentage (frozen once payments exist).
    pub tax_percent: Option<Decimal>,
    /// New discount percentage (frozen once payments exist).
    pub discount_percent: Option<Decimal>,
    /// New invoice type.
    pub invoice_type: Option<InvoiceType>,
    /// New issue timestamp (`Some(None)` clears it).
    pub invoiced_at: Option<Option<DateTimeWithTimeZone>>,
    /// New department (`Some(None)` clears it).
    pub department_uid: Option<Option<Uuid>>,
    /// New service reference (`Some(None)` clears it).
    pub service_uid: Option<Option<Uuid>>,
    /// New patient reference (`Some(None)` clears it).
    pub patient_uid: Option<Option<Uuid>>,
}

impl UpdateInvoiceInput {
    /// True when the patch touches a field that settlement figures are
    /// derived from. Such patches are refused once payments exist.
    #[must_use]
    pub const fn touches_financial_fields(&self) -> bool {
        self.gross_amount.is_some() || self.tax_percent.is_some() || self.discount_percent.is_some()
    }
}

/// Input for recording a payment against an invoice.
#[derive(Debug, Clone)]
pub struct CreatePaymentInput {
    /// Amount received (must be positive).
    pub amount_received: Decimal,
    /// How the money arrived.
    pub payment_method: PaymentMethod,
    /// External reference such as a transfer or receipt number.
    pub reference_number: String,
    /// Optional free-form note.
    pub note: Option<String>,
    /// When the money arrived; defaults to now.
    pub received_at: Option<DateTimeWithTimeZone>,
}

/// Input for updating a payment. `None` fields are left untouched;
/// `note` uses a nested `Option` so the caller can clear it.
#[derive(Debug, Clone, Default)]
pub struct UpdatePaymentInput {
    /// New amount (must be positive).
    pub amount_received: Option<Decimal>,
    /// New payment method.
    pub payment_method: Option<PaymentMethod>,
    /// New reference number.
    pub reference_number: Option<String>,
    /// New note (`Some(None)` clears it).
    pub note: Option<Option<String>>,
    /// New received-at timestamp.
    pub received_at: Option<DateTimeWithTimeZone>,
}

/// Filter for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceListFilter {
    /// Restrict to invoices owned by this user.
    pub owner_uid: Option<Uuid>,
    /// Restrict to this billing kind.
    pub invoice_type: Option<InvoiceType>,
    /// Case-insensitive search over title and serial number.
    pub q: Option<String>,
}

/// Filter for listing payments across invoices.
#[derive(Debug, Clone, Default)]
pub struct PaymentListFilter {
    /// Restrict to payments recorded by this user.
    pub owner_uid: Option<Uuid>,
    /// Restrict to this payment method.
    pub method: Option<PaymentMethod>,
    /// Restrict to this exact reference number.
    pub reference_number: Option<String>,
    /// Case-insensitive search over reference number and serial number.
    pub q: Option<String>,
}

/// An invoice row paired with figures derived from its live payment total.
#[derive(Debug, Clone)]
pub struct InvoiceOverview {
    /// The invoice record.
    pub invoice: invoices::Model,
    /// Derived settlement figures.
    pub figures: InvoiceFigures,
}

impl InvoiceOverview {
    /// Pairs an invoice row with figures computed from the live payment
    /// total.
    #[must_use]
    pub fn from_live_total(invoice: invoices::Model, total_payments: Decimal) -> Self {
        let figures = InvoiceFigures::compute(
            invoice.gross_amount,
            invoice.tax_percent,
            invoice.discount_percent,
            total_payments,
        );
        Self { invoice, figures }
    }
}

/// Invoice repository for ledger operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Invoice operations
    // ========================================================================

    /// Creates an invoice and assigns its serial number in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The gross amount is negative
    /// - A percentage falls outside [0, 100]
    /// - The department does not exist or is inactive
    /// - The database operation fails
    pub async fn create_invoice(
        &self,
        caller: &Caller,
        input: CreateInvoiceInput,
    ) -> Result<invoices::Model, InvoiceError> {
        validation::require_nonnegative(input.gross_amount)?;
        validation::require_percentage(input.tax_percent)?;
        validation::require_percentage(input.discount_percent)?;

        if let Some(department_uid) = input.department_uid {
            Self::active_department(&self.db, department_uid).await?;
        }

        let txn = self.db.begin().await?;

        let now = Utc::now().into();
        let invoice = invoices::ActiveModel {
            id: NotSet,
            uid: Set(Uuid::new_v4()),
            serial_no: Set(None),
            title: Set(input.title),
            gross_amount: Set(input.gross_amount),
            tax_percent: Set(input.tax_percent),
            discount_percent: Set(input.discount_percent),
            invoice_type: Set(input.invoice_type),
            invoiced_at: Set(input.invoiced_at),
            department_uid: Set(input.department_uid),
            service_uid: Set(input.service_uid),
            patient_uid: Set(input.patient_uid),
            user_uid: Set(caller.user_uid),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = invoice.insert(&txn).await?;

        let serial = serial::serial_no(SerialKind::Invoice, Utc::now().year(), inserted.id);
        let mut with_serial: invoices::ActiveModel = inserted.into();
        with_serial.serial_no = Set(Some(serial));
        let invoice = with_serial.update(&txn).await?;

        txn.commit().await?;
        Ok(invoice)
    }

    /// Gets an invoice by uid with figures derived from its live payments.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is not found or the query fails.
    pub async fn get_invoice(&self, invoice_uid: Uuid) -> Result<InvoiceOverview, InvoiceError> {
        let invoice = Self::invoice_by_uid(&self.db, invoice_uid).await?;
        let total = Self::live_payment_total(&self.db, invoice.uid).await?;
        Ok(InvoiceOverview::from_live_total(invoice, total))
    }

    /// Lists invoices newest-first with live-derived figures per row.
    ///
    /// Returns the page of overviews plus the total row count for the
    /// filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_invoices(
        &self,
        filter: &InvoiceListFilter,
        page: &PageRequest,
    ) -> Result<(Vec<InvoiceOverview>, u64), InvoiceError> {
        let mut query = invoices::Entity::find();

        if let Some(owner_uid) = filter.owner_uid {
            query = query.filter(invoices::Column::UserUid.eq(owner_uid));
        }
        if let Some(invoice_type) = filter.invoice_type.clone() {
            query = query.filter(invoices::Column::InvoiceType.eq(invoice_type));
        }
        if let Some(q) = filter.q.as_deref() {
            query = query.filter(
                Condition::any()
                    .add(invoices::Column::Title.contains(q))
                    .add(invoices::Column::SerialNo.contains(q)),
            );
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(invoices::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let mut result = Vec::with_capacity(rows.len());
        for invoice in rows {
            let received = Self::live_payment_total(&self.db, invoice.uid).await?;
            result.push(InvoiceOverview::from_live_total(invoice, received));
        }

        Ok((result, total))
    }

    /// Updates an invoice owned by the caller.
    ///
    /// Once at least one payment exists, any patch touching the gross
    /// amount or a percentage is refused outright; the payment count is
    /// read under the invoice's advisory lock so an in-flight payment
    /// cannot slip past the check.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The invoice is not found
    /// - The caller is not the owner
    /// - A patched amount or percentage fails validation
    /// - The patch touches financial fields while payments exist
    /// - The database operation fails
    pub async fn update_invoice(
        &self,
        caller: &Caller,
        invoice_uid: Uuid,
        input: UpdateInvoiceInput,
    ) -> Result<invoices::Model, InvoiceError> {
        if let Some(gross) = input.gross_amount {
            validation::require_nonnegative(gross)?;
        }
        if let Some(tax) = input.tax_percent {
            validation::require_percentage(tax)?;
        }
        if let Some(discount) = input.discount_percent {
            validation::require_percentage(discount)?;
        }

        let txn = self.db.begin().await?;

        let invoice = Self::invoice_by_uid(&txn, invoice_uid).await?;
        if invoice.user_uid != caller.user_uid {
            return Err(InvoiceError::NotOwner);
        }

        if input.touches_financial_fields() {
            locks::lock_aggregate(&txn, LockDomain::Invoice, invoice.id).await?;
            let recorded = payments::Entity::find()
                .filter(payments::Column::InvoiceUid.eq(invoice.uid))
                .count(&txn)
                .await?;
            if recorded > 0 {
                return Err(InvoiceError::FinancialFieldsFrozen);
            }
        }

        if let Some(Some(department_uid)) = input.department_uid {
            Self::active_department(&txn, department_uid).await?;
        }

        let mut active: invoices::ActiveModel = invoice.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(gross) = input.gross_amount {
            active.gross_amount = Set(gross);
        }
        if let Some(tax) = input.tax_percent {
            active.tax_percent = Set(tax);
        }
        if let Some(discount) = input.discount_percent {
            active.discount_percent = Set(discount);
        }
        if let Some(invoice_type) = input.invoice_type {
            active.invoice_type = Set(invoice_type);
        }
        if let Some(invoiced_at) = input.invoiced_at {
            active.invoiced_at = Set(invoiced_at);
        }
        if let Some(department_uid) = input.department_uid {
            active.department_uid = Set(department_uid);
        }
        if let Some(service_uid) = input.service_uid {
            active.service_uid = Set(service_uid);
        }
        if let Some(patient_uid) = input.patient_uid {
            active.patient_uid = Set(patient_uid);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes an invoice owned by the caller together with all its
    /// payments.
    ///
    /// The foreign key cascade removes the payment rows inside the same
    /// transaction; the aggregate lock keeps in-flight payment mutations
    /// from interleaving with the delete.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is not found, the caller is not the
    /// owner, or the database operation fails.
    pub async fn delete_invoice(
        &self,
        caller: &Caller,
        invoice_uid: Uuid,
    ) -> Result<(), InvoiceError> {
        let txn = self.db.begin().await?;

        let invoice = Self::invoice_by_uid(&txn, invoice_uid).await?;
        if invoice.user_uid != caller.user_uid {
            return Err(InvoiceError::NotOwner);
        }

        locks::lock_aggregate(&txn, LockDomain::Invoice, invoice.id).await?;
        invoices::Entity::delete_by_id(invoice.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    // ========================================================================
    // Payment operations
    // ========================================================================

    /// Records a payment against an invoice and assigns its serial number.
    ///
    /// Any authenticated user may record a payment; the row keeps the
    /// recorder as its owner. Settlement figures are not stored, so the
    /// insert itself needs no recomputation; the advisory lock only keeps
    /// the insert from racing a delete or financial patch of the invoice.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive, the invoice is not
    /// found, or the database operation fails.
    pub async fn add_payment(
        &self,
        caller: &Caller,
        invoice_uid: Uuid,
        input: CreatePaymentInput,
    ) -> Result<payments::Model, InvoiceError> {
        validation::require_positive(input.amount_received)?;

        let txn = self.db.begin().await?;

        let invoice = Self::invoice_by_uid(&txn, invoice_uid).await?;
        locks::lock_aggregate(&txn, LockDomain::Invoice, invoice.id).await?;
        // State may have moved while waiting for the lock.
        let invoice = Self::invoice_by_uid(&txn, invoice_uid).await?;

        let now = Utc::now().into();
        let payment = payments::ActiveModel {
            id: NotSet,
            uid: Set(Uuid::new_v4()),
            serial_no: Set(None),
            invoice_uid: Set(invoice.uid),
            amount_received: Set(input.amount_received),
            payment_method: Set(input.payment_method),
            reference_number: Set(input.reference_number),
            note: Set(input.note),
            user_uid: Set(caller.user_uid),
            received_at: Set(input.received_at.unwrap_or(now)),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = payment.insert(&txn).await?;

        let serial = serial::serial_no(SerialKind::Payment, Utc::now().year(), inserted.id);
        let mut with_serial: payments::ActiveModel = inserted.into();
        with_serial.serial_no = Set(Some(serial));
        let payment = with_serial.update(&txn).await?;

        txn.commit().await?;
        Ok(payment)
    }

    /// Gets a payment by uid.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment is not found or the query fails.
    pub async fn get_payment(&self, payment_uid: Uuid) -> Result<payments::Model, InvoiceError> {
        Self::payment_by_uid(&self.db, payment_uid).await
    }

    /// Lists the payments of an invoice newest-first.
    ///
    /// Returns the page of rows plus the total row count.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is not found or the query fails.
    pub async fn list_payments(
        &self,
        invoice_uid: Uuid,
        q: Option<&str>,
        page: &PageRequest,
    ) -> Result<(Vec<payments::Model>, u64), InvoiceError> {
        let _invoice = Self::invoice_by_uid(&self.db, invoice_uid).await?;

        let mut query =
            payments::Entity::find().filter(payments::Column::InvoiceUid.eq(invoice_uid));
        if let Some(q) = q {
            query = query.filter(
                Condition::any()
                    .add(payments::Column::ReferenceNumber.contains(q))
                    .add(payments::Column::SerialNo.contains(q)),
            );
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(payments::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((rows, total))
    }

    /// Lists payments across all invoices newest-first.
    ///
    /// Returns the page of rows plus the total row count for the filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all_payments(
        &self,
        filter: &PaymentListFilter,
        page: &PageRequest,
    ) -> Result<(Vec<payments::Model>, u64), InvoiceError> {
        let mut query = payments::Entity::find();

        if let Some(owner_uid) = filter.owner_uid {
            query = query.filter(payments::Column::UserUid.eq(owner_uid));
        }
        if let Some(method) = filter.method.clone() {
            query = query.filter(payments::Column::PaymentMethod.eq(method));
        }
        if let Some(reference) = filter.reference_number.as_deref() {
            query = query.filter(payments::Column::ReferenceNumber.eq(reference));
        }
        if let Some(q) = filter.q.as_deref() {
            query = query.filter(
                Condition::any()
                    .add(payments::Column::ReferenceNumber.contains(q))
                    .add(payments::Column::SerialNo.contains(q)),
            );
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(payments::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((rows, total))
    }

    /// Updates a payment recorded by the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The payment or its invoice is not found
    /// - The caller did not record the payment
    /// - The patched amount is not positive
    /// - The database operation fails
    pub async fn update_payment(
        &self,
        caller: &Caller,
        payment_uid: Uuid,
        input: UpdatePaymentInput,
    ) -> Result<payments::Model, InvoiceError> {
        if let Some(amount) = input.amount_received {
            validation::require_positive(amount)?;
        }

        let txn = self.db.begin().await?;

        let payment = Self::payment_by_uid(&txn, payment_uid).await?;
        let invoice = Self::invoice_by_uid(&txn, payment.invoice_uid).await?;
        locks::lock_aggregate(&txn, LockDomain::Invoice, invoice.id).await?;
        // State may have moved while waiting for the lock.
        let payment = Self::payment_by_uid(&txn, payment_uid).await?;

        if payment.user_uid != caller.user_uid {
            return Err(InvoiceError::NotOwner);
        }

        let mut active: payments::ActiveModel = payment.into();
        if let Some(amount) = input.amount_received {
            active.amount_received = Set(amount);
        }
        if let Some(method) = input.payment_method {
            active.payment_method = Set(method);
        }
        if let Some(reference) = input.reference_number {
            active.reference_number = Set(reference);
        }
        if let Some(note) = input.note {
            active.note = Set(note);
        }
        if let Some(received_at) = input.received_at {
            active.received_at = Set(received_at);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes a payment recorded by the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment or its invoice is not found, the
    /// caller did not record the payment, or the database operation fails.
    pub async fn delete_payment(
        &self,
        caller: &Caller,
        payment_uid: Uuid,
    ) -> Result<(), InvoiceError> {
        let txn = self.db.begin().await?;

        let payment = Self::payment_by_uid(&txn, payment_uid).await?;
        let invoice = Self::invoice_by_uid(&txn, payment.invoice_uid).await?;
        locks::lock_aggregate(&txn, LockDomain::Invoice, invoice.id).await?;
        // State may have moved while waiting for the lock.
        let payment = Self::payment_by_uid(&txn, payment_uid).await?;

        if payment.user_uid != caller.user_uid {
            return Err(InvoiceError::NotOwner);
        }

        payments::Entity::delete_by_id(payment.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    /// Fetches an invoice by uid or reports it missing.
    async fn invoice_by_uid<C: ConnectionTrait>(
        conn: &C,
        invoice_uid: Uuid,
    ) -> Result<invoices::Model, InvoiceError> {
        invoices::Entity::find()
            .filter(invoices::Column::Uid.eq(invoice_uid))
            .one(conn)
            .await?
            .ok_or(InvoiceError::NotFound(invoice_uid))
    }

    /// Fetches a payment by uid or reports it missing.
    async fn payment_by_uid<C: ConnectionTrait>(
        conn: &C,
        payment_uid: Uuid,
    ) -> Result<payments::Model, InvoiceError> {
        payments::Entity::find()
            .filter(payments::Column::Uid.eq(payment_uid))
            .one(conn)
            .await?
            .ok_or(InvoiceError::PaymentNotFound(payment_uid))
    }

    /// Requires an active department or reports it missing.
    async fn active_department<C: ConnectionTrait>(
        conn: &C,
        department_uid: Uuid,
    ) -> Result<departments::Model, InvoiceError> {
        departments::Entity::find_by_id(department_uid)
            .filter(departments::Column::Status.eq(RecordStatus::Active))
            .one(conn)
            .await?
            .ok_or(InvoiceError::DepartmentNotFound(department_uid))
    }

    /// Sums the live payment rows of an invoice.
    async fn live_payment_total<C: ConnectionTrait>(
        conn: &C,
        invoice_uid: Uuid,
    ) -> Result<Decimal, DbErr> {
        let rows = payments::Entity::find()
            .filter(payments::Column::InvoiceUid.eq(invoice_uid))
            .all(conn)
            .await?;
        Ok(total_received(&rows))
    }
}

// ============================================================================
// Aggregation helpers
// ============================================================================

/// Sums `amount_received` across payment rows.
#[must_use]
pub fn total_received(payments: &[payments::Model]) -> Decimal {
    payments.iter().map(|p| p.amount_received).sum()
}

#[cfg(test)]
#[path = "invoice_tests.rs"]
mod tests;
