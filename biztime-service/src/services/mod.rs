//! Services module for biztime-service.

pub mod aggregator;
pub mod companies;
pub mod database;
pub mod invoices;
pub mod metrics;
pub mod payment;
pub mod store;

pub use aggregator::InvoiceAggregator;
pub use companies::CompanyRepository;
pub use database::Database;
pub use invoices::InvoiceRepository;
pub use metrics::{get_metrics, init_metrics, record_error};
pub use payment::{resolve_paid_date, resolve_paid_date_on, PaymentTransition};
pub use store::{CompanyStore, HealthCheck, InvoiceStore};
