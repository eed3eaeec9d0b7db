pub mod companies;
pub mod invoices;

use serde::Serialize;

pub use companies::{
    CompaniesResponse, CompanyResponse, CreateCompanyRequest, UpdateCompanyRequest,
};
pub use invoices::{CreateInvoiceRequest, InvoiceResponse, InvoicesResponse, UpdateInvoiceRequest};

/// Body returned by DELETE endpoints.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub fn deleted() -> Self {
        Self { status: "deleted" }
    }
}
