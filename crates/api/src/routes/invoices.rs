//! Invoice ledger routes: invoices and their nested payments.
//!
//! Settlement figures (tax, discount, total, net due, payment status) are
//! derived on every read, so responses always reflect the live payment
//! ledger. Financial fields freeze once the first payment lands; the
//! repository enforces that along with ownership.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use crate::middleware::AuthUser;
use crate::routes::error_response;
use crate::AppState;
use curafin_db::{
    InvoiceRepository,
    entities::{
        invoices, payments,
        sea_orm_active_enums::{InvoiceType, PaymentMethod},
    },
    repositories::{
        CreateInvoiceInput, CreatePaymentInput, InvoiceError, InvoiceListFilter, InvoiceOverview,
        PaymentListFilter, UpdateInvoiceInput, UpdatePaymentInput,
    },
};
use curafin_shared::types::{PageRequest, PageResponse};
use curafin_shared::AppError;

/// Creates the invoice and payment routes (requires auth middleware to be
/// applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices))
        .route("/invoices", post(create_invoice))
        .route("/invoices/{invoice_uid}", get(get_invoice))
        .route("/invoices/{invoice_uid}", patch(update_invoice))
        .route("/invoices/{invoice_uid}", delete(delete_invoice))
        .route("/invoices/{invoice_uid}/payments", get(list_payments))
        .route("/invoices/{invoice_uid}/payments", post(add_payment))
        .route("/payments", get(list_all_payments))
        .route("/payments/{payment_uid}", get(get_payment))
        .route("/payments/{payment_uid}", patch(update_payment))
        .route("/payments/{payment_uid}", delete(delete_payment))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating an invoice.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    /// Invoice title.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Gross amount before tax and discount, as a decimal string.
    #[serde(with = "rust_decimal::serde::str")]
    pub gross_amount: Decimal,
    /// Tax percentage in [0, 100], as a decimal string.
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub tax_percent: Option<Decimal>,
    /// Discount percentage in [0, 100], as a decimal string.
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub discount_percent: Option<Decimal>,
    /// Kind of billing.
    pub invoice_type: InvoiceType,
    /// When the invoice was issued.
    pub invoiced_at: Option<DateTime<FixedOffset>>,
    /// Department the billing belongs to.
    pub department_uid: Option<Uuid>,
    /// Opaque reference to the billed service.
    pub service_uid: Option<Uuid>,
    /// Opaque reference to the billed patient.
    pub patient_uid: Option<Uuid>,
}

/// Request body for updating an invoice. Nullable references accept an
/// explicit `null` to clear them.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateInvoiceRequest {
    /// New title.
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    /// New gross amount (frozen once payments exist).
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub gross_amount: Option<Decimal>,
    /// New tax percentage (frozen once payments exist).
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub tax_percent: Option<Decimal>,
    /// New discount percentage (frozen once payments exist).
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub discount_percent: Option<Decimal>,
    /// New invoice type.
    pub invoice_type: Option<InvoiceType>,
    /// New issue timestamp; an explicit `null` clears it.
    #[serde(default, deserialize_with = "crate::routes::deserialize_patch")]
    pub invoiced_at: Option<Option<DateTime<FixedOffset>>>,
    /// New department; an explicit `null` clears it.
    #[serde(default, deserialize_with = "crate::routes::deserialize_patch")]
    pub department_uid: Option<Option<Uuid>>,
    /// New service reference; an explicit `null` clears it.
    #[serde(default, deserialize_with = "crate::routes::deserialize_patch")]
    pub service_uid: Option<Option<Uuid>>,
    /// New patient reference; an explicit `null` clears it.
    #[serde(default, deserialize_with = "crate::routes::deserialize_patch")]
    pub patient_uid: Option<Option<Uuid>>,
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    /// Amount received, as a decimal string.
    #[serde(with = "rust_decimal::serde::str")]
    pub amount_received: Decimal,
    /// How the money arrived.
    pub payment_method: PaymentMethod,
    /// External reference such as a transfer or receipt number.
    #[validate(length(min = 1, max = 100))]
    pub reference_number: String,
    /// Optional free-form note.
    pub note: Option<String>,
    /// When the money arrived; defaults to now.
    pub received_at: Option<DateTime<FixedOffset>>,
}

/// Request body for updating a payment.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePaymentRequest {
    /// New amount, as a decimal string.
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub amount_received: Option<Decimal>,
    /// New payment method.
    pub payment_method: Option<PaymentMethod>,
    /// New reference number.
    #[validate(length(min = 1, max = 100))]
    pub reference_number: Option<String>,
    /// New note; an explicit `null` clears it.
    #[serde(default, deserialize_with = "crate::routes::deserialize_patch")]
    pub note: Option<Option<String>>,
    /// New received-at timestamp.
    pub received_at: Option<DateTime<FixedOffset>>,
}

/// Query parameters for listing invoices.
#[derive(Debug, Deserialize)]
pub struct InvoiceListQuery {
    /// Filter by billing kind.
    pub invoice_type: Option<InvoiceType>,
    /// Search over title and serial number.
    pub q: Option<String>,
}

/// Query parameters for listing an invoice's payments.
#[derive(Debug, Deserialize)]
pub struct PaymentListQuery {
    /// Search over reference number and serial number.
    pub q: Option<String>,
}

/// Query parameters for the cross-invoice payment listing.
#[derive(Debug, Deserialize)]
pub struct AllPaymentsQuery {
    /// Filter by payment method.
    pub payment_method: Option<PaymentMethod>,
    /// Filter by exact reference number.
    pub reference_number: Option<String>,
    /// Search over reference number and serial number.
    pub q: Option<String>,
}

/// Renders an invoice overview: the row plus its derived settlement
/// figures.
fn invoice_json(overview: &InvoiceOverview) -> serde_json::Value {
    let invoice = &overview.invoice;
    json!({
        "uid": invoice.uid,
        "serial_no": invoice.serial_no,
        "title": invoice.title,
        "invoice_type": invoice.invoice_type,
        "invoiced_at": invoice.invoiced_at,
        "department_uid": invoice.department_uid,
        "service_uid": invoice.service_uid,
        "patient_uid": invoice.patient_uid,
        "owner_uid": invoice.user_uid,
        "created_at": invoice.created_at,
        "updated_at": invoice.updated_at,
        "figures": overview.figures
    })
}

/// Renders a payment row.
fn payment_json(payment: &payments::Model) -> serde_json::Value {
    json!({
        "uid": payment.uid,
        "serial_no": payment.serial_no,
        "invoice_uid": payment.invoice_uid,
        "amount_received": payment.amount_received,
        "payment_method": payment.payment_method,
        "reference_number": payment.reference_number,
        "note": payment.note,
        "recorded_by": payment.user_uid,
        "received_at": payment.received_at,
        "created_at": payment.created_at,
        "updated_at": payment.updated_at
    })
}

// ============================================================================
// Invoice Handlers
// ============================================================================

/// GET /invoices - List invoices. Staff see their own; administrators see
/// all.
async fn list_invoices(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(query): Query<InvoiceListQuery>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    let filter = InvoiceListFilter {
        owner_uid: (!auth.is_admin()).then(|| auth.user_uid()),
        invoice_type: query.invoice_type,
        q: query.q,
    };

    match repo.list_invoices(&filter, &page).await {
        Ok((rows, total)) => {
            let data: Vec<serde_json::Value> = rows.iter().map(invoice_json).collect();
            let response = PageResponse::new(data, page.page, page.per_page, total);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list invoices");
            map_invoice_error(&e)
        }
    }
}

/// POST /invoices - Create an invoice. Omitted percentages default to
/// zero.
async fn create_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateInvoiceRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return error_response(&AppError::BadRequest(e.to_string()));
    }

    let repo = InvoiceRepository::new((*state.db).clone());
    let input = CreateInvoiceInput {
        title: payload.title,
        gross_amount: payload.gross_amount,
        tax_percent: payload.tax_percent.unwrap_or(Decimal::ZERO),
        discount_percent: payload.discount_percent.unwrap_or(Decimal::ZERO),
        invoice_type: payload.invoice_type,
        invoiced_at: payload.invoiced_at,
        department_uid: payload.department_uid,
        service_uid: payload.service_uid,
        patient_uid: payload.patient_uid,
    };

    match repo.create_invoice(&auth.caller(), input).await {
        Ok(invoice) => {
            info!(
                invoice_uid = %invoice.uid,
                serial_no = invoice.serial_no.as_deref().unwrap_or_default(),
                owner_uid = %auth.user_uid(),
                "Invoice created"
            );
            // A new invoice has no payments, so the live total is zero
            let overview = InvoiceOverview::from_live_total(invoice, Decimal::ZERO);
            (StatusCode::CREATED, Json(invoice_json(&overview))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create invoice");
            map_invoice_error(&e)
        }
    }
}

/// GET `/invoices/{invoice_uid}` - Get an invoice with derived settlement
/// figures.
async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_uid): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    match repo.get_invoice(invoice_uid).await {
        Ok(overview) => (StatusCode::OK, Json(invoice_json(&overview))).into_response(),
        Err(e) => map_invoice_error(&e),
    }
}

/// PATCH `/invoices/{invoice_uid}` - Update an invoice. Owner only;
/// financial fields are refused once payments exist.
async fn update_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_uid): Path<Uuid>,
    Json(payload): Json<UpdateInvoiceRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return error_response(&AppError::BadRequest(e.to_string()));
    }

    let repo = InvoiceRepository::new((*state.db).clone());
    let input = UpdateInvoiceInput {
        title: payload.title,
        gross_amount: payload.gross_amount,
        tax_percent: payload.tax_percent,
        discount_percent: payload.discount_percent,
        invoice_type: payload.invoice_type,
        invoiced_at: payload.invoiced_at,
        department_uid: payload.department_uid,
        service_uid: payload.service_uid,
        patient_uid: payload.patient_uid,
    };

    let updated = match repo.update_invoice(&auth.caller(), invoice_uid, input).await {
        Ok(invoice) => invoice,
        Err(e) => {
            error!(error = %e, "Failed to update invoice");
            return map_invoice_error(&e);
        }
    };
    info!(invoice_uid = %updated.uid, "Invoice updated");

    // Figures need the live payment total, so re-read the overview
    match repo.get_invoice(updated.uid).await {
        Ok(overview) => (StatusCode::OK, Json(invoice_json(&overview))).into_response(),
        Err(e) => map_invoice_error(&e),
    }
}

/// DELETE `/invoices/{invoice_uid}` - Delete an invoice and all its
/// payments. Owner only.
async fn delete_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_uid): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    match repo.delete_invoice(&auth.caller(), invoice_uid).await {
        Ok(()) => {
            info!(invoice_uid = %invoice_uid, "Invoice deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to delete invoice");
            map_invoice_error(&e)
        }
    }
}

// ============================================================================
// Payment Handlers
// ============================================================================

/// GET `/invoices/{invoice_uid}/payments` - List an invoice's payments.
async fn list_payments(
    State(state): State<AppState>,
    Path(invoice_uid): Path<Uuid>,
    Query(page): Query<PageRequest>,
    Query(query): Query<PaymentListQuery>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    match repo
        .list_payments(invoice_uid, query.q.as_deref(), &page)
        .await
    {
        Ok((rows, total)) => {
            let data: Vec<serde_json::Value> = rows.iter().map(payment_json).collect();
            let response = PageResponse::new(data, page.page, page.per_page, total);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list payments");
            map_invoice_error(&e)
        }
    }
}

/// POST `/invoices/{invoice_uid}/payments` - Record a payment against an
/// invoice. Any authenticated user may record one; attribution is kept on
/// the payment row.
async fn add_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_uid): Path<Uuid>,
    Json(payload): Json<CreatePaymentRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return error_response(&AppError::BadRequest(e.to_string()));
    }

    let repo = InvoiceRepository::new((*state.db).clone());
    let input = CreatePaymentInput {
        amount_received: payload.amount_received,
        payment_method: payload.payment_method,
        reference_number: payload.reference_number,
        note: payload.note,
        received_at: payload.received_at,
    };

    match repo.add_payment(&auth.caller(), invoice_uid, input).await {
        Ok(payment) => {
            info!(
                payment_uid = %payment.uid,
                serial_no = payment.serial_no.as_deref().unwrap_or_default(),
                invoice_uid = %invoice_uid,
                "Payment recorded"
            );
            (StatusCode::CREATED, Json(payment_json(&payment))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to record payment");
            map_invoice_error(&e)
        }
    }
}

/// GET /payments - List payments across all invoices. Staff see payments
/// they recorded; administrators see all.
async fn list_all_payments(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(query): Query<AllPaymentsQuery>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    let filter = PaymentListFilter {
        owner_uid: (!auth.is_admin()).then(|| auth.user_uid()),
        method: query.payment_method,
        reference_number: query.reference_number,
        q: query.q,
    };

    match repo.list_all_payments(&filter, &page).await {
        Ok((rows, total)) => {
            let data: Vec<serde_json::Value> = rows.iter().map(payment_json).collect();
            let response = PageResponse::new(data, page.page, page.per_page, total);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list payments");
            map_invoice_error(&e)
        }
    }
}

/// GET `/payments/{payment_uid}` - Get a single payment.
async fn get_payment(
    State(state): State<AppState>,
    Path(payment_uid): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    match repo.get_payment(payment_uid).await {
        Ok(payment) => (StatusCode::OK, Json(payment_json(&payment))).into_response(),
        Err(e) => map_invoice_error(&e),
    }
}

/// PATCH `/payments/{payment_uid}` - Update a payment. Only the recorder
/// may change it.
async fn update_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(payment_uid): Path<Uuid>,
    Json(payload): Json<UpdatePaymentRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return error_response(&AppError::BadRequest(e.to_string()));
    }

    let repo = InvoiceRepository::new((*state.db).clone());
    let input = UpdatePaymentInput {
        amount_received: payload.amount_received,
        payment_method: payload.payment_method,
        reference_number: payload.reference_number,
        note: payload.note,
        received_at: payload.received_at,
    };

    match repo.update_payment(&auth.caller(), payment_uid, input).await {
        Ok(payment) => {
            info!(payment_uid = %payment.uid, "Payment updated");
            (StatusCode::OK, Json(payment_json(&payment))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to update payment");
            map_invoice_error(&e)
        }
    }
}

/// DELETE `/payments/{payment_uid}` - Delete a payment. Only the recorder
/// may remove it.
async fn delete_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(payment_uid): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    match repo.delete_payment(&auth.caller(), payment_uid).await {
        Ok(()) => {
            info!(payment_uid = %payment_uid, "Payment deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to delete payment");
            map_invoice_error(&e)
        }
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Maps invoice ledger errors to HTTP responses.
fn map_invoice_error(e: &InvoiceError) -> Response {
    let app = match e {
        InvoiceError::NotFound(uid) => AppError::NotFound(format!("Invoice not found: {uid}")),
        InvoiceError::PaymentNotFound(uid) => {
            AppError::NotFound(format!("Payment not found: {uid}"))
        }
        InvoiceError::DepartmentNotFound(uid) => {
            AppError::BadRequest(format!("Department not found or inactive: {uid}"))
        }
        InvoiceError::NotOwner => {
            AppError::InsufficientPermissions("You do not own this record".to_string())
        }
        InvoiceError::FinancialFieldsFrozen => AppError::BadRequest(
            "Financial fields cannot change once payments have been recorded".to_string(),
        ),
        InvoiceError::Validation(err) => AppError::BadRequest(err.to_string()),
        InvoiceError::Database(_) => {
            AppError::Database("An unexpected database error occurred".to_string())
        }
    };
    error_response(&app)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_create_invoice_payload_defaults_percentages() {
        let payload: CreateInvoiceRequest = serde_json::from_str(
            r#"{
                "title": "Radiology service",
                "gross_amount": "1000.00",
                "invoice_type": "SERVICE"
            }"#,
        )
        .expect("payload should deserialize");

        assert_eq!(payload.gross_amount, dec!(1000.00));
        assert!(payload.tax_percent.is_none());
        assert!(payload.discount_percent.is_none());
        assert_eq!(payload.invoice_type, InvoiceType::Service);
    }

    #[test]
    fn test_update_invoice_department_patch_states() {
        // Absent: leave untouched
        let payload: UpdateInvoiceRequest =
            serde_json::from_str(r#"{"title": "Renamed"}"#).expect("payload should deserialize");
        assert_eq!(payload.department_uid, None);

        // Explicit null: clear the reference
        let payload: UpdateInvoiceRequest =
            serde_json::from_str(r#"{"department_uid": null}"#)
                .expect("payload should deserialize");
        assert_eq!(payload.department_uid, Some(None));

        // Value: replace the reference
        let uid = Uuid::new_v4();
        let body = format!(r#"{{"department_uid": "{uid}"}}"#);
        let payload: UpdateInvoiceRequest =
            serde_json::from_str(&body).expect("payload should deserialize");
        assert_eq!(payload.department_uid, Some(Some(uid)));
    }

    #[test]
    fn test_create_payment_payload_parses_method() {
        let payload: CreatePaymentRequest = serde_json::from_str(
            r#"{
                "amount_received": "250.50",
                "payment_method": "BANK_TRANSFER",
                "reference_number": "TRX-20260815-001"
            }"#,
        )
        .expect("payload should deserialize");

        assert_eq!(payload.amount_received, dec!(250.50));
        assert_eq!(payload.payment_method, PaymentMethod::BankTransfer);
        assert!(payload.note.is_none());
    }

    #[rstest]
    #[case(InvoiceError::NotFound(Uuid::nil()), StatusCode::NOT_FOUND)]
    #[case(InvoiceError::PaymentNotFound(Uuid::nil()), StatusCode::NOT_FOUND)]
    #[case(InvoiceError::NotOwner, StatusCode::FORBIDDEN)]
    #[case(InvoiceError::FinancialFieldsFrozen, StatusCode::BAD_REQUEST)]
    #[case(InvoiceError::DepartmentNotFound(Uuid::nil()), StatusCode::BAD_REQUEST)]
    fn test_error_mapping_statuses(#[case] error: InvoiceError, #[case] expected: StatusCode) {
        assert_eq!(map_invoice_error(&error).status(), expected);
    }
}
