//! Storage seams used by the handlers and the aggregator.
//!
//! The PostgreSQL repositories are the production implementations. Every
//! method reports a missing row as `AppError::NotFound`, never as an empty
//! success.

use crate::models::{
    Company, CompanyCode, CompanySummary, CreateCompany, CreateInvoice, Invoice, InvoiceSummary,
    UpdateCompany, UpdateInvoice,
};
use async_trait::async_trait;
use service_core::error::AppError;

#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn list_companies(&self) -> Result<Vec<CompanySummary>, AppError>;

    async fn get_company(&self, code: &CompanyCode) -> Result<Company, AppError>;

    /// `Conflict` when the code is taken.
    async fn create_company(&self, input: &CreateCompany) -> Result<Company, AppError>;

    async fn update_company(
        &self,
        code: &CompanyCode,
        input: &UpdateCompany,
    ) -> Result<Company, AppError>;

    /// `Conflict` while invoices still reference the company.
    async fn delete_company(&self, code: &CompanyCode) -> Result<(), AppError>;
}

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn list_invoices(&self) -> Result<Vec<InvoiceSummary>, AppError>;

    async fn get_invoice(&self, id: i32) -> Result<Invoice, AppError>;

    async fn list_invoice_ids_for_company(&self, code: &CompanyCode)
        -> Result<Vec<i32>, AppError>;

    /// `NotFound` when `comp_code` names no company.
    async fn create_invoice(&self, input: &CreateInvoice) -> Result<Invoice, AppError>;

    /// Applies the paid-date transition atomically with the write.
    async fn update_invoice(&self, id: i32, input: &UpdateInvoice) -> Result<Invoice, AppError>;

    async fn delete_invoice(&self, id: i32) -> Result<(), AppError>;
}

/// Liveness of the backing store.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn health_check(&self) -> Result<(), AppError>;
}
