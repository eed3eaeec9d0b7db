//! Common test utilities for biztime-service integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use biztime_service::config::{BiztimeConfig, DatabaseConfig};
use biztime_service::models::{
    Company, CompanyCode, CompanySummary, CreateCompany, CreateInvoice, Invoice, InvoiceSummary,
    UpdateCompany, UpdateInvoice,
};
use biztime_service::services::{resolve_paid_date, CompanyStore, HealthCheck, InvoiceStore};
use biztime_service::startup::{router, AppState, Application};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::Value;
use service_core::config::Config as CommonConfig;
use service_core::error::AppError;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};
use tower::ServiceExt;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,biztime_service=debug,sqlx=warn")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

// ----------------------------------------------------------------------------
// In-memory store
// ----------------------------------------------------------------------------

#[derive(Default)]
struct Tables {
    companies: BTreeMap<String, Company>,
    invoices: BTreeMap<i32, Invoice>,
    next_invoice_id: i32,
}

/// Store double with the same contract as the PostgreSQL repositories,
/// including the foreign-key rules between invoices and companies.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    unhealthy: AtomicBool,
}

impl MemoryStore {
    pub fn set_unhealthy(&self, unhealthy: bool) {
        self.unhealthy.store(unhealthy, Ordering::SeqCst);
    }

    /// Insert an invoice without checking its company, to simulate a store
    /// that lost referential integrity.
    pub fn insert_dangling_invoice(&self, comp_code: &str) -> i32 {
        let mut tables = self.tables.lock().unwrap();
        tables.next_invoice_id += 1;
        let id = tables.next_invoice_id;
        tables.invoices.insert(
            id,
            Invoice {
                id,
                comp_code: comp_code.to_string(),
                amt: 1.into(),
                paid: false,
                add_date: Utc::now().date_naive(),
                paid_date: None,
            },
        );
        id
    }

    pub fn invoice_count(&self) -> usize {
        self.tables.lock().unwrap().invoices.len()
    }
}

fn company_not_found(code: &CompanyCode) -> AppError {
    AppError::NotFound(anyhow::anyhow!("Company '{}' not found", code))
}

fn invoice_not_found(id: i32) -> AppError {
    AppError::NotFound(anyhow::anyhow!("Invoice {} not found", id))
}

#[async_trait]
impl CompanyStore for MemoryStore {
    async fn list_companies(&self) -> Result<Vec<CompanySummary>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.companies.values().map(CompanySummary::from).collect())
    }

    async fn get_company(&self, code: &CompanyCode) -> Result<Company, AppError> {
        let tables = self.tables.lock().unwrap();
        tables
            .companies
            .get(code.as_str())
            .cloned()
            .ok_or_else(|| company_not_found(code))
    }

    async fn create_company(&self, input: &CreateCompany) -> Result<Company, AppError> {
        if input.code.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!("empty code")));
        }
        let mut tables = self.tables.lock().unwrap();
        if tables.companies.contains_key(input.code.as_str()) {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Company '{}' already exists",
                input.code
            )));
        }
        let company = Company {
            code: input.code.as_str().to_string(),
            name: input.name.clone(),
            description: input.description.clone(),
        };
        tables
            .companies
            .insert(company.code.clone(), company.clone());
        Ok(company)
    }

    async fn update_company(
        &self,
        code: &CompanyCode,
        input: &UpdateCompany,
    ) -> Result<Company, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let company = tables
            .companies
            .get_mut(code.as_str())
            .ok_or_else(|| company_not_found(code))?;
        company.name = input.name.clone();
        company.description = input.description.clone();
        Ok(company.clone())
    }

    async fn delete_company(&self, code: &CompanyCode) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.companies.contains_key(code.as_str()) {
            return Err(company_not_found(code));
        }
        if tables
            .invoices
            .values()
            .any(|invoice| invoice.comp_code == code.as_str())
        {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Company '{}' still has invoices",
                code
            )));
        }
        tables.companies.remove(code.as_str());
        Ok(())
    }
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn list_invoices(&self) -> Result<Vec<InvoiceSummary>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .invoices
            .values()
            .map(|invoice| InvoiceSummary {
                id: invoice.id,
                comp_code: invoice.comp_code.clone(),
            })
            .collect())
    }

    async fn get_invoice(&self, id: i32) -> Result<Invoice, AppError> {
        let tables = self.tables.lock().unwrap();
        tables
            .invoices
            .get(&id)
            .cloned()
            .ok_or_else(|| invoice_not_found(id))
    }

    async fn list_invoice_ids_for_company(
        &self,
        code: &CompanyCode,
    ) -> Result<Vec<i32>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .invoices
            .values()
            .filter(|invoice| invoice.comp_code == code.as_str())
            .map(|invoice| invoice.id)
            .collect())
    }

    async fn create_invoice(&self, input: &CreateInvoice) -> Result<Invoice, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.companies.contains_key(input.comp_code.as_str()) {
            return Err(company_not_found(&input.comp_code));
        }
        tables.next_invoice_id += 1;
        let invoice = Invoice {
            id: tables.next_invoice_id,
            comp_code: input.comp_code.as_str().to_string(),
            amt: input.amt,
            paid: false,
            add_date: Utc::now().date_naive(),
            paid_date: None,
        };
        tables.invoices.insert(invoice.id, invoice.clone());
        Ok(invoice)
    }

    async fn update_invoice(&self, id: i32, input: &UpdateInvoice) -> Result<Invoice, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let invoice = tables
            .invoices
            .get_mut(&id)
            .ok_or_else(|| invoice_not_found(id))?;
        invoice.paid_date = resolve_paid_date(invoice.paid, invoice.paid_date, input.paid);
        invoice.paid = input.paid;
        invoice.amt = input.amt;
        Ok(invoice.clone())
    }

    async fn delete_invoice(&self, id: i32) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        tables
            .invoices
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| invoice_not_found(id))
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        if self.unhealthy.load(Ordering::SeqCst) {
            return Err(AppError::ServiceUnavailable);
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Router harness
// ----------------------------------------------------------------------------

/// Full router wired to a fresh in-memory store.
pub struct TestRouter {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestRouter {
    pub fn new() -> Self {
        init_tracing();
        let store = Arc::new(MemoryStore::default());
        let state = AppState::new(
            "biztime-service",
            store.clone(),
            store.clone(),
            store.clone(),
        );
        Self {
            router: router(state),
            store,
        }
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }
}

// ----------------------------------------------------------------------------
// PostgreSQL harness
// ----------------------------------------------------------------------------

/// Running application backed by `TEST_DATABASE_URL`.
pub struct TestApp {
    pub address: String,
    pub http_port: u16,
    pub client: reqwest::Client,
}

fn test_config(database_url: String) -> BiztimeConfig {
    BiztimeConfig {
        common: CommonConfig {
            port: 0,
            ..CommonConfig::default()
        },
        service_name: "biztime-service-test".to_string(),
        service_version: "test".to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: database_url,
            max_connections: 4,
            min_connections: 1,
        },
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        init_tracing();

        let database_url = std::env::var("TEST_DATABASE_URL")
            .expect("TEST_DATABASE_URL must be set to run the PostgreSQL tests");

        let app = Application::build(test_config(database_url))
            .await
            .expect("Failed to build application");

        let http_port = app.http_port();
        let address = format!("http://127.0.0.1:{}", http_port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            http_port,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

/// A company code no other test run will use.
pub fn unique_code(prefix: &str) -> String {
    format!("{} {}", prefix, uuid::Uuid::new_v4().simple())
}
