//! Invoice handlers.

use super::track;
use crate::dtos::{
    CreateInvoiceRequest, InvoiceResponse, InvoicesResponse, StatusResponse, UpdateInvoiceRequest,
};
use crate::models::{CreateInvoice, Invoice, InvoiceWithCompany, UpdateInvoice};
use crate::startup::AppState;
use crate::utils::ValidatedJson;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

fn parse_id(raw: &str) -> Result<i32, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid invoice id '{}'", raw)))
}

/// GET /invoices
pub async fn list_invoices(
    State(state): State<AppState>,
) -> Result<Json<InvoicesResponse>, AppError> {
    let invoices = state.invoices.list_invoices().await.map_err(track)?;
    Ok(Json(InvoicesResponse { invoices }))
}

/// GET /invoices/:id
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InvoiceResponse<InvoiceWithCompany>>, AppError> {
    let id = parse_id(&id).map_err(track)?;
    let invoice = state
        .aggregator
        .invoice_with_company(id)
        .await
        .map_err(track)?;
    Ok(Json(InvoiceResponse { invoice }))
}

/// POST /invoices
pub async fn create_invoice(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse<Invoice>>), AppError> {
    let input = CreateInvoice::from(req);
    let invoice = state
        .invoices
        .create_invoice(&input)
        .await
        .map_err(track)?;
    Ok((StatusCode::CREATED, Json(InvoiceResponse { invoice })))
}

/// PUT /invoices/:id
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateInvoiceRequest>,
) -> Result<Json<InvoiceResponse<Invoice>>, AppError> {
    let id = parse_id(&id).map_err(track)?;
    let input = UpdateInvoice::from(req);
    let invoice = state
        .invoices
        .update_invoice(id, &input)
        .await
        .map_err(track)?;
    Ok(Json(InvoiceResponse { invoice }))
}

/// DELETE /invoices/:id
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    let id = parse_id(&id).map_err(track)?;
    state.invoices.delete_invoice(id).await.map_err(track)?;
    Ok(Json(StatusResponse::deleted()))
}
