use crate::models::{CompanyCode, CompanySummary, CreateCompany, UpdateCompany};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    #[validate(custom(function = "validate_company_code"))]
    pub code: String,

    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    pub description: Option<String>,
}

impl From<CreateCompanyRequest> for CreateCompany {
    fn from(req: CreateCompanyRequest) -> Self {
        Self {
            code: CompanyCode::normalize(&req.code),
            name: req.name,
            description: req.description,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    pub description: Option<String>,
}

impl From<UpdateCompanyRequest> for UpdateCompany {
    fn from(req: UpdateCompanyRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
        }
    }
}

/// `{companies: [...]}`
#[derive(Debug, Serialize)]
pub struct CompaniesResponse {
    pub companies: Vec<CompanySummary>,
}

/// `{company: {...}}`
#[derive(Debug, Serialize)]
pub struct CompanyResponse<T> {
    pub company: T,
}

fn validate_company_code(code: &str) -> Result<(), ValidationError> {
    if CompanyCode::normalize(code).is_empty() {
        let mut error = ValidationError::new("company_code");
        error.message = Some(Cow::from(
            "Code must contain at least one letter or digit",
        ));
        return Err(error);
    }
    Ok(())
}
