//! PostgreSQL company repository.

use super::metrics::{record_company_operation, DB_QUERY_DURATION};
use super::store::CompanyStore;
use crate::models::{Company, CompanyCode, CompanySummary, CreateCompany, UpdateCompany};
use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::PgPool;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn not_found(code: &CompanyCode) -> AppError {
    AppError::NotFound(anyhow::anyhow!("Company '{}' not found", code))
}

#[async_trait]
impl CompanyStore for CompanyRepository {
    #[instrument(skip(self))]
    async fn list_companies(&self) -> Result<Vec<CompanySummary>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_companies"])
            .start_timer();

        let companies = sqlx::query_as::<_, CompanySummary>(
            r#"
            SELECT code, name
            FROM companies
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list companies: {}", e)))?;

        timer.observe_duration();

        Ok(companies)
    }

    #[instrument(skip(self), fields(code = %code))]
    async fn get_company(&self, code: &CompanyCode) -> Result<Company, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_company"])
            .start_timer();

        // Exact match only: a pattern lookup could resolve to the wrong company.
        let company = sqlx::query_as::<_, Company>(
            r#"
            SELECT code, name, description
            FROM companies
            WHERE code = $1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get company: {}", e)))?;

        timer.observe_duration();

        company.ok_or_else(|| not_found(code))
    }

    #[instrument(skip(self, input), fields(code = %input.code))]
    async fn create_company(&self, input: &CreateCompany) -> Result<Company, AppError> {
        if input.code.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Company code must contain at least one letter or digit"
            )));
        }

        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_company"])
            .start_timer();

        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (code, name, description)
            VALUES ($1, $2, $3)
            RETURNING code, name, description
            "#,
        )
        .bind(input.code.as_str())
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Company '{}' already exists",
                    input.code
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create company: {}", e)),
        })?;

        timer.observe_duration();
        record_company_operation("create");

        info!(code = %company.code, name = %company.name, "Company created");

        Ok(company)
    }

    #[instrument(skip(self, input), fields(code = %code))]
    async fn update_company(
        &self,
        code: &CompanyCode,
        input: &UpdateCompany,
    ) -> Result<Company, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_company"])
            .start_timer();

        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET name = $2,
                description = $3
            WHERE code = $1
            RETURNING code, name, description
            "#,
        )
        .bind(code.as_str())
        .bind(&input.name)
        .bind(&input.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update company: {}", e)))?
        .ok_or_else(|| not_found(code))?;

        timer.observe_duration();
        record_company_operation("update");

        info!(code = %company.code, "Company updated");

        Ok(company)
    }

    #[instrument(skip(self), fields(code = %code))]
    async fn delete_company(&self, code: &CompanyCode) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_company"])
            .start_timer();

        let deleted = sqlx::query_scalar::<_, String>(
            r#"
            DELETE FROM companies
            WHERE code = $1
            RETURNING code
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Company '{}' still has invoices",
                    code
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to delete company: {}", e)),
        })?;

        timer.observe_duration();

        if deleted.is_none() {
            return Err(not_found(code));
        }

        record_company_operation("delete");
        info!(code = %code, "Company deleted");

        Ok(())
    }
}
