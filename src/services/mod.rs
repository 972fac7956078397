//! Business services and their HTTP handlers.

pub mod appointments;
pub mod export;
pub mod leads;

use crate::db::Database;

pub use appointments::AppointmentService;
pub use leads::LeadService;

/// Shared application state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub appointments: AppointmentService,
    pub leads: LeadService,
}
