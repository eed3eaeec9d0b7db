//! PostgreSQL invoice repository.

use super::metrics::{record_invoice_operation, record_payment_transition, DB_QUERY_DURATION};
use super::payment::{resolve_paid_date_on, PaymentTransition};
use super::store::InvoiceStore;
use crate::models::{CompanyCode, CreateInvoice, Invoice, InvoiceSummary, UpdateInvoice};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use service_core::error::AppError;
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Payment columns read under lock before an update.
#[derive(Debug, FromRow)]
struct PaymentState {
    paid: bool,
    paid_date: Option<NaiveDate>,
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(anyhow::anyhow!("Invoice {} not found", id))
}

fn write_error(action: &str, e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_check_violation() => {
            AppError::BadRequest(anyhow::anyhow!("Invalid invoice: {}", db_err.message()))
        }
        _ => AppError::DatabaseError(anyhow::anyhow!("Failed to {}: {}", action, e)),
    }
}

#[async_trait]
impl InvoiceStore for InvoiceRepository {
    #[instrument(skip(self))]
    async fn list_invoices(&self) -> Result<Vec<InvoiceSummary>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_invoices"])
            .start_timer();

        let invoices = sqlx::query_as::<_, InvoiceSummary>(
            r#"
            SELECT id, comp_code
            FROM invoices
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list invoices: {}", e)))?;

        timer.observe_duration();

        Ok(invoices)
    }

    #[instrument(skip(self))]
    async fn get_invoice(&self, id: i32) -> Result<Invoice, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_invoice"])
            .start_timer();

        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT id, comp_code, amt, paid, add_date, paid_date
            FROM invoices
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e)))?;

        timer.observe_duration();

        invoice.ok_or_else(|| not_found(id))
    }

    #[instrument(skip(self), fields(code = %code))]
    async fn list_invoice_ids_for_company(
        &self,
        code: &CompanyCode,
    ) -> Result<Vec<i32>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_invoice_ids_for_company"])
            .start_timer();

        let ids = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT id
            FROM invoices
            WHERE comp_code = $1
            ORDER BY id
            "#,
        )
        .bind(code.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list company invoices: {}", e))
        })?;

        timer.observe_duration();

        Ok(ids)
    }

    #[instrument(skip(self, input), fields(comp_code = %input.comp_code))]
    async fn create_invoice(&self, input: &CreateInvoice) -> Result<Invoice, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_invoice"])
            .start_timer();

        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            INSERT INTO invoices (comp_code, amt, paid, add_date, paid_date)
            VALUES ($1, $2, FALSE, $3, NULL)
            RETURNING id, comp_code, amt, paid, add_date, paid_date
            "#,
        )
        .bind(input.comp_code.as_str())
        .bind(input.amt)
        .bind(Utc::now().date_naive())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::NotFound(anyhow::anyhow!(
                    "Company '{}' not found",
                    input.comp_code
                ))
            }
            _ => write_error("create invoice", e),
        })?;

        timer.observe_duration();
        record_invoice_operation("create");

        info!(invoice_id = invoice.id, comp_code = %invoice.comp_code, amt = %invoice.amt, "Invoice created");

        Ok(invoice)
    }

    /// Read-modify-write in one transaction. The row lock taken by
    /// `FOR UPDATE` makes concurrent updates of the same invoice queue up, so
    /// each one resolves its paid date from the state the previous one wrote.
    #[instrument(skip(self, input), fields(paid = input.paid))]
    async fn update_invoice(&self, id: i32, input: &UpdateInvoice) -> Result<Invoice, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_invoice"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let previous = sqlx::query_as::<_, PaymentState>(
            r#"
            SELECT paid, paid_date
            FROM invoices
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to lock invoice: {}", e)))?
        .ok_or_else(|| not_found(id))?;

        let transition = PaymentTransition::between(previous.paid, input.paid);
        let paid_date = resolve_paid_date_on(
            previous.paid,
            previous.paid_date,
            input.paid,
            Utc::now().date_naive(),
        );

        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            UPDATE invoices
            SET amt = $2,
                paid = $3,
                paid_date = $4
            WHERE id = $1
            RETURNING id, comp_code, amt, paid, add_date, paid_date
            "#,
        )
        .bind(id)
        .bind(input.amt)
        .bind(input.paid)
        .bind(paid_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| write_error("update invoice", e))?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();
        record_invoice_operation("update");
        record_payment_transition(transition.as_str());

        info!(
            invoice_id = invoice.id,
            transition = transition.as_str(),
            paid_date = ?invoice.paid_date,
            "Invoice updated"
        );

        Ok(invoice)
    }

    #[instrument(skip(self))]
    async fn delete_invoice(&self, id: i32) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_invoice"])
            .start_timer();

        let deleted = sqlx::query_scalar::<_, i32>(
            r#"
            DELETE FROM invoices
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to delete invoice: {}", e)))?;

        timer.observe_duration();

        if deleted.is_none() {
            return Err(not_found(id));
        }

        record_invoice_operation("delete");
        info!(invoice_id = id, "Invoice deleted");

        Ok(())
    }
}
