//! Company model for biztime-service.

use crate::utils::normalize_code;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// A company code that has been through [`normalize_code`].
///
/// Repositories only accept this type, so every lookup and every write is
/// keyed by the normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompanyCode(String);

impl CompanyCode {
    pub fn normalize(raw: &str) -> Self {
        Self(normalize_code(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CompanyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Company record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

/// Row returned when listing companies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CompanySummary {
    pub code: String,
    pub name: String,
}

impl From<&Company> for CompanySummary {
    fn from(company: &Company) -> Self {
        Self {
            code: company.code.clone(),
            name: company.name.clone(),
        }
    }
}

/// Company joined with the ids of the invoices that reference it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyWithInvoices {
    #[serde(flatten)]
    pub company: Company,
    pub invoices: Vec<i32>,
}

/// Input for creating a company.
#[derive(Debug, Clone)]
pub struct CreateCompany {
    pub code: CompanyCode,
    pub name: String,
    pub description: Option<String>,
}

/// Input for updating a company. The code itself never changes.
#[derive(Debug, Clone)]
pub struct UpdateCompany {
    pub name: String,
    pub description: Option<String>,
}
