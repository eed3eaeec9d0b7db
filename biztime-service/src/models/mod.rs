//! Domain models for biztime-service.

mod company;
mod invoice;

pub use company::{
    Company, CompanyCode, CompanySummary, CompanyWithInvoices, CreateCompany, UpdateCompany,
};
pub use invoice::{CreateInvoice, Invoice, InvoiceSummary, InvoiceWithCompany, UpdateInvoice};
