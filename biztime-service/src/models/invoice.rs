//! Invoice model for biztime-service.

use super::{Company, CompanyCode};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Invoice row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: i32,
    pub comp_code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amt: Decimal,
    pub paid: bool,
    pub add_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
}

/// Row returned when listing invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct InvoiceSummary {
    pub id: i32,
    pub comp_code: String,
}

/// Invoice with its owning company embedded in place of `comp_code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceWithCompany {
    pub id: i32,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amt: Decimal,
    pub paid: bool,
    pub add_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub company: Company,
}

impl InvoiceWithCompany {
    pub fn new(invoice: Invoice, company: Company) -> Self {
        Self {
            id: invoice.id,
            amt: invoice.amt,
            paid: invoice.paid,
            add_date: invoice.add_date,
            paid_date: invoice.paid_date,
            company,
        }
    }
}

/// Input for creating an invoice.
#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub comp_code: CompanyCode,
    pub amt: Decimal,
}

/// Input for updating an invoice.
#[derive(Debug, Clone)]
pub struct UpdateInvoice {
    pub amt: Decimal,
    pub paid: bool,
}
