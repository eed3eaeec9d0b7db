//! Biztime Service - companies and the invoices they owe, over HTTP.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;
