//! HTTP route table.

use axum::Router;
use axum::routing::{get, post, put};

use crate::services::{AppState, appointments, leads};

/// Build the `/api` route table.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/appointments",
            post(appointments::create_appointment).get(appointments::list_appointments),
        )
        .route("/api/appointments/:id", get(appointments::get_appointment))
        .route(
            "/api/appointments/:id/status",
            put(appointments::update_appointment_status),
        )
        .route(
            "/api/appointments/status/:status",
            get(appointments::list_appointments_by_status),
        )
        .route("/api/leads", post(leads::create_lead).get(leads::list_leads))
        .route("/api/leads/:id", get(leads::get_lead))
        .route("/api/leads/:id/status", put(leads::update_lead_status))
        .route("/api/leads/export/excel", get(leads::export_leads))
}
