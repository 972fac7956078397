//! Lead intake: validation, persistence, webhook forwarding, and export.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::db::LeadRepository;
use crate::db::models::{Lead, LeadRequest, LeadStatus};
use crate::error::{AppError, AppResult};
use crate::validation;

use super::AppState;
use super::export;

/// Forwards saved leads to an external webhook (e.g. a spreadsheet
/// collector). Failures are absorbed and logged; the lead row is already
/// durable by the time this runs.
pub struct LeadWebhook {
    client: reqwest::Client,
    url: String,
}

impl LeadWebhook {
    /// Create a webhook forwarder for the given URL.
    ///
    /// # Panics
    /// Panics if the HTTP client fails to create.
    #[must_use]
    pub fn new(url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self { client, url }
    }

    /// Forward one lead; never returns an error.
    async fn forward(&self, lead: &Lead) {
        match self.client.post(&self.url).json(lead).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(lead_id = %lead.id, "Lead forwarded to webhook");
            }
            Ok(response) => {
                error!(
                    lead_id = %lead.id,
                    status = %response.status(),
                    "Webhook rejected lead"
                );
            }
            Err(e) => {
                error!(lead_id = %lead.id, error = %e, "Failed to forward lead to webhook");
            }
        }
    }
}

/// Lead use cases.
#[derive(Clone)]
pub struct LeadService {
    repo: LeadRepository,
    webhook: Option<Arc<LeadWebhook>>,
}

impl LeadService {
    #[must_use]
    pub fn new(repo: LeadRepository, webhook: Option<Arc<LeadWebhook>>) -> Self {
        Self { repo, webhook }
    }

    /// Create a lead and forward it to the configured webhook, if any.
    ///
    /// # Errors
    /// Returns `AppError::InvalidArgument` on validation failure (before
    /// any persistence) and `AppError::Database` on storage failure.
    pub async fn create_lead(&self, request: LeadRequest) -> AppResult<Lead> {
        validation::validate_lead(&request)?;

        let lead = self.repo.create(&request).await?;
        info!(lead_id = %lead.id, source = %lead.source, "Lead created");

        if let Some(webhook) = &self.webhook {
            webhook.forward(&lead).await;
        }

        Ok(lead)
    }

    /// Get a lead by ID.
    pub async fn get_lead(&self, id: Uuid) -> AppResult<Lead> {
        self.repo.find_by_id(id).await
    }

    /// List all leads.
    pub async fn list_leads(&self) -> AppResult<Vec<Lead>> {
        self.repo.list_all().await
    }

    /// Update a lead's status; all other fields are unchanged.
    pub async fn update_status(&self, id: Uuid, status: LeadStatus) -> AppResult<Lead> {
        self.repo.update_status(id, status).await
    }

    /// Export all leads as a spreadsheet.
    pub async fn export_leads(&self) -> AppResult<Vec<u8>> {
        let leads = self.repo.list_all().await?;
        export::leads_to_xlsx(&leads)
            .map_err(|e| AppError::Internal(format!("Spreadsheet export failed: {e}")))
    }
}

// ============================================================================
// HTTP handlers
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: LeadStatus,
}

#[instrument(skip(state, request), fields(name = %request.name))]
pub async fn create_lead(
    State(state): State<AppState>,
    Json(request): Json<LeadRequest>,
) -> AppResult<(StatusCode, Json<Lead>)> {
    let lead = state.leads.create_lead(request).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

#[instrument(skip(state))]
pub async fn list_leads(State(state): State<AppState>) -> AppResult<Json<Vec<Lead>>> {
    Ok(Json(state.leads.list_leads().await?))
}

#[instrument(skip(state))]
pub async fn get_lead(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Lead>> {
    Ok(Json(state.leads.get_lead(id).await?))
}

#[instrument(skip(state))]
pub async fn update_lead_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<Lead>> {
    Ok(Json(state.leads.update_status(id, query.status).await?))
}

#[instrument(skip(state))]
pub async fn export_leads(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let bytes = state.leads.export_leads().await?;
    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"leads_export.xlsx\"",
            ),
        ],
        bytes,
    ))
}
