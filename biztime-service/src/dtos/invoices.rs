use crate::models::{CompanyCode, CreateInvoice, InvoiceSummary, UpdateInvoice};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    #[validate(length(min = 1, message = "Company code is required"))]
    pub comp_code: String,

    #[validate(custom(function = "validate_amount"))]
    pub amt: Decimal,
}

impl From<CreateInvoiceRequest> for CreateInvoice {
    fn from(req: CreateInvoiceRequest) -> Self {
        Self {
            comp_code: CompanyCode::normalize(&req.comp_code),
            amt: req.amt,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateInvoiceRequest {
    #[validate(custom(function = "validate_amount"))]
    pub amt: Decimal,

    pub paid: bool,
}

impl From<UpdateInvoiceRequest> for UpdateInvoice {
    fn from(req: UpdateInvoiceRequest) -> Self {
        Self {
            amt: req.amt,
            paid: req.paid,
        }
    }
}

/// `{invoices: [...]}`
#[derive(Debug, Serialize)]
pub struct InvoicesResponse {
    pub invoices: Vec<InvoiceSummary>,
}

/// `{invoice: {...}}`
#[derive(Debug, Serialize)]
pub struct InvoiceResponse<T> {
    pub invoice: T,
}

fn validate_amount(amt: &Decimal) -> Result<(), ValidationError> {
    if amt.is_sign_negative() || amt.is_zero() {
        let mut error = ValidationError::new("positive_amount");
        error.message = Some(Cow::from("Amount must be greater than zero"));
        return Err(error);
    }
    Ok(())
}
