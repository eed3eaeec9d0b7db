//! Company handlers.

use super::track;
use crate::dtos::{
    CompaniesResponse, CompanyResponse, CreateCompanyRequest, StatusResponse,
    UpdateCompanyRequest,
};
use crate::models::{Company, CompanyCode, CompanyWithInvoices, CreateCompany, UpdateCompany};
use crate::startup::AppState;
use crate::utils::ValidatedJson;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

/// GET /companies
pub async fn list_companies(
    State(state): State<AppState>,
) -> Result<Json<CompaniesResponse>, AppError> {
    let companies = state.companies.list_companies().await.map_err(track)?;
    Ok(Json(CompaniesResponse { companies }))
}

/// GET /companies/:code
pub async fn get_company(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<CompanyResponse<CompanyWithInvoices>>, AppError> {
    let code = CompanyCode::normalize(&code);
    let company = state
        .aggregator
        .company_with_invoices(&code)
        .await
        .map_err(track)?;
    Ok(Json(CompanyResponse { company }))
}

/// POST /companies
pub async fn create_company(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<CompanyResponse<Company>>), AppError> {
    let input = CreateCompany::from(req);
    let company = state
        .companies
        .create_company(&input)
        .await
        .map_err(track)?;
    Ok((StatusCode::CREATED, Json(CompanyResponse { company })))
}

/// PUT /companies/:code
pub async fn update_company(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateCompanyRequest>,
) -> Result<Json<CompanyResponse<Company>>, AppError> {
    let code = CompanyCode::normalize(&code);
    let input = UpdateCompany::from(req);
    let company = state
        .companies
        .update_company(&code, &input)
        .await
        .map_err(track)?;
    Ok(Json(CompanyResponse { company }))
}

/// DELETE /companies/:code
pub async fn delete_company(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    let code = CompanyCode::normalize(&code);
    state.companies.delete_company(&code).await.map_err(track)?;
    Ok(Json(StatusResponse::deleted()))
}
