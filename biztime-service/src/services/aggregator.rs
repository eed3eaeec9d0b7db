//! Read-side joins across the company and invoice stores.

use super::store::{CompanyStore, InvoiceStore};
use crate::models::{CompanyCode, CompanyWithInvoices, InvoiceWithCompany};
use service_core::error::AppError;
use std::sync::Arc;
use tracing::{error, instrument};

#[derive(Clone)]
pub struct InvoiceAggregator {
    companies: Arc<dyn CompanyStore>,
    invoices: Arc<dyn InvoiceStore>,
}

impl InvoiceAggregator {
    pub fn new(companies: Arc<dyn CompanyStore>, invoices: Arc<dyn InvoiceStore>) -> Self {
        Self {
            companies,
            invoices,
        }
    }

    /// Invoice with its company embedded. A company that cannot be found for
    /// an existing invoice means the store lost referential integrity, which
    /// is an internal error rather than a missing resource.
    #[instrument(skip(self))]
    pub async fn invoice_with_company(&self, id: i32) -> Result<InvoiceWithCompany, AppError> {
        let invoice = self.invoices.get_invoice(id).await?;
        let comp_code = CompanyCode::normalize(&invoice.comp_code);

        let company = match self.companies.get_company(&comp_code).await {
            Ok(company) => company,
            Err(AppError::NotFound(_)) => {
                error!(
                    invoice_id = invoice.id,
                    comp_code = %invoice.comp_code,
                    "Invoice references a missing company"
                );
                return Err(AppError::InternalError(anyhow::anyhow!(
                    "Invoice {} references missing company '{}'",
                    invoice.id,
                    invoice.comp_code
                )));
            }
            Err(e) => return Err(e),
        };

        Ok(InvoiceWithCompany::new(invoice, company))
    }

    /// Company with the ids of every invoice it owns (possibly none).
    #[instrument(skip(self), fields(code = %code))]
    pub async fn company_with_invoices(
        &self,
        code: &CompanyCode,
    ) -> Result<CompanyWithInvoices, AppError> {
        let company = self.companies.get_company(code).await?;
        let invoices = self.invoices.list_invoice_ids_for_company(code).await?;

        Ok(CompanyWithInvoices { company, invoices })
    }
}
