pub mod companies;
pub mod health;
pub mod invoices;

pub use health::{health_check, metrics_handler, readiness_check};

use crate::services::record_error;
use service_core::error::AppError;

/// Count a failed request by error kind before it becomes a response.
fn track(err: AppError) -> AppError {
    record_error(err.kind());
    err
}
