//! Clinic service: appointments, leads, and WhatsApp notifications.

pub mod config;
pub mod db;
pub mod error;
pub mod notify;
pub mod routes;
pub mod services;
pub mod telemetry;
pub mod validation;

pub use config::Config;
pub use error::{AppError, AppResult};
