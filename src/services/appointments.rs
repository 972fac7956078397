//! Appointment booking: validation, persistence, and notification dispatch.
//!
//! The appointment row is persisted before any notification attempt and is
//! the durable result of `create_appointment` even when every later step
//! fails. Only validation errors surface before persistence; dispatch
//! outcomes never fail the operation.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::AppointmentRepository;
use crate::db::models::{Appointment, AppointmentRequest, AppointmentStatus};
use crate::error::AppResult;
use crate::notify::{Direction, NotificationDispatcher};
use crate::validation;

use super::AppState;

/// Appointment persistence.
///
/// Implemented by the sqlx-backed repository; test code substitutes an
/// in-memory store.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn create(&self, request: &AppointmentRequest) -> AppResult<Appointment>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Appointment>;
    async fn list_all(&self) -> AppResult<Vec<Appointment>>;
    async fn list_by_status(&self, status: AppointmentStatus) -> AppResult<Vec<Appointment>>;
    async fn update_status(&self, id: Uuid, status: AppointmentStatus) -> AppResult<Appointment>;
    async fn set_message_id(&self, id: Uuid, message_id: &str) -> AppResult<Appointment>;
}

#[async_trait]
impl AppointmentStore for AppointmentRepository {
    async fn create(&self, request: &AppointmentRequest) -> AppResult<Appointment> {
        AppointmentRepository::create(self, request).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Appointment> {
        AppointmentRepository::find_by_id(self, id).await
    }

    async fn list_all(&self) -> AppResult<Vec<Appointment>> {
        AppointmentRepository::list_all(self).await
    }

    async fn list_by_status(&self, status: AppointmentStatus) -> AppResult<Vec<Appointment>> {
        AppointmentRepository::list_by_status(self, status).await
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> AppResult<Appointment> {
        AppointmentRepository::update_status(self, id, status).await
    }

    async fn set_message_id(&self, id: Uuid, message_id: &str) -> AppResult<Appointment> {
        AppointmentRepository::set_message_id(self, id, message_id).await
    }
}

/// Appointment use cases.
#[derive(Clone)]
pub struct AppointmentService {
    repo: Arc<dyn AppointmentStore>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl AppointmentService {
    #[must_use]
    pub fn new(repo: Arc<dyn AppointmentStore>, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { repo, dispatcher }
    }

    /// Create an appointment and send the confirmation.
    ///
    /// # Errors
    /// Returns `AppError::InvalidArgument` on validation failure (before
    /// any persistence) and `AppError::Database` on storage failure.
    pub async fn create_appointment(
        &self,
        request: AppointmentRequest,
    ) -> AppResult<Appointment> {
        validation::validate_appointment(&request)?;

        let appointment = self.repo.create(&request).await?;
        info!(appointment_id = %appointment.id, "Appointment created");

        // Patient confirmation first; its reference is recorded on the row.
        let appointment = match self
            .dispatcher
            .dispatch(&appointment, Direction::Confirmation)
            .await
        {
            Some(reference) => self.repo.set_message_id(appointment.id, &reference).await?,
            None => appointment,
        };

        // Internal booking notice; the reference is not recorded.
        self.dispatcher
            .dispatch(&appointment, Direction::StaffNotice)
            .await;

        Ok(appointment)
    }

    /// Get an appointment by ID.
    pub async fn get_appointment(&self, id: Uuid) -> AppResult<Appointment> {
        self.repo.find_by_id(id).await
    }

    /// List all appointments.
    pub async fn list_appointments(&self) -> AppResult<Vec<Appointment>> {
        self.repo.list_all().await
    }

    /// List appointments filtered by status.
    pub async fn list_by_status(
        &self,
        status: AppointmentStatus,
    ) -> AppResult<Vec<Appointment>> {
        self.repo.list_by_status(status).await
    }

    /// Update an appointment's status; all other fields are unchanged.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> AppResult<Appointment> {
        let appointment = self.repo.update_status(id, status).await?;
        info!(appointment_id = %id, %status, "Appointment status updated");
        Ok(appointment)
    }
}

// ============================================================================
// HTTP handlers
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: AppointmentStatus,
}

#[instrument(skip(state, request), fields(patient = %request.patient_name))]
pub async fn create_appointment(
    State(state): State<AppState>,
    Json(request): Json<AppointmentRequest>,
) -> AppResult<(StatusCode, Json<Appointment>)> {
    let appointment = state.appointments.create_appointment(request).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

#[instrument(skip(state))]
pub async fn list_appointments(State(state): State<AppState>) -> AppResult<Json<Vec<Appointment>>> {
    Ok(Json(state.appointments.list_appointments().await?))
}

#[instrument(skip(state))]
pub async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Appointment>> {
    Ok(Json(state.appointments.get_appointment(id).await?))
}

#[instrument(skip(state))]
pub async fn update_appointment_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<Appointment>> {
    Ok(Json(
        state.appointments.update_status(id, query.status).await?,
    ))
}

#[instrument(skip(state))]
pub async fn list_appointments_by_status(
    State(state): State<AppState>,
    Path(status): Path<AppointmentStatus>,
) -> AppResult<Json<Vec<Appointment>>> {
    Ok(Json(state.appointments.list_by_status(status).await?))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::error::AppError;
    use crate::notify::dispatcher::{BoxError, DispatchConfig, MessageSender, PLACEHOLDER_PREFIX};

    struct InMemoryStore {
        rows: Mutex<HashMap<Uuid, Appointment>>,
    }

    impl InMemoryStore {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                rows: Mutex::new(HashMap::new()),
            })
        }

        fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }

        fn get(&self, id: Uuid) -> Option<Appointment> {
            self.rows.lock().unwrap().get(&id).cloned()
        }
    }

    #[async_trait]
    impl AppointmentStore for InMemoryStore {
        async fn create(&self, request: &AppointmentRequest) -> AppResult<Appointment> {
            let appointment = Appointment {
                id: Uuid::new_v4(),
                patient_name: request.patient_name.clone(),
                phone_number: request.phone_number.clone(),
                email: request.email.clone(),
                appointment_date_time: request.appointment_date_time,
                reason: request.reason.clone(),
                notes: request.notes.clone(),
                status: AppointmentStatus::Pending,
                whatsapp_message_id: None,
                created_at: Utc::now(),
            };
            self.rows
                .lock()
                .unwrap()
                .insert(appointment.id, appointment.clone());
            Ok(appointment)
        }

        async fn find_by_id(&self, id: Uuid) -> AppResult<Appointment> {
            self.get(id).ok_or_else(|| AppError::not_found("Appointment", id))
        }

        async fn list_all(&self) -> AppResult<Vec<Appointment>> {
            Ok(self.rows.lock().unwrap().values().cloned().collect())
        }

        async fn list_by_status(&self, status: AppointmentStatus) -> AppResult<Vec<Appointment>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|a| a.status == status)
                .cloned()
                .collect())
        }

        async fn update_status(
            &self,
            id: Uuid,
            status: AppointmentStatus,
        ) -> AppResult<Appointment> {
            let mut rows = self.rows.lock().unwrap();
            let appointment = rows
                .get_mut(&id)
                .ok_or_else(|| AppError::not_found("Appointment", id))?;
            appointment.status = status;
            Ok(appointment.clone())
        }

        async fn set_message_id(&self, id: Uuid, message_id: &str) -> AppResult<Appointment> {
            let mut rows = self.rows.lock().unwrap();
            let appointment = rows
                .get_mut(&id)
                .ok_or_else(|| AppError::not_found("Appointment", id))?;
            appointment.whatsapp_message_id = Some(message_id.to_string());
            Ok(appointment.clone())
        }
    }

    struct OkSender;

    #[async_trait]
    impl MessageSender for OkSender {
        async fn send(&self, _from: &str, _to: &str, _body: &str) -> Result<String, BoxError> {
            Ok("SM123".to_string())
        }
    }

    struct FailingSender;

    #[async_trait]
    impl MessageSender for FailingSender {
        async fn send(&self, _from: &str, _to: &str, _body: &str) -> Result<String, BoxError> {
            Err("connection timed out".into())
        }
    }

    fn request(phone: &str) -> AppointmentRequest {
        AppointmentRequest {
            patient_name: "Jane Doe".to_string(),
            phone_number: phone.to_string(),
            email: "jane@x.com".to_string(),
            appointment_date_time: NaiveDate::from_ymd_opt(2025, 1, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            reason: None,
            notes: None,
        }
    }

    fn service(
        store: Arc<InMemoryStore>,
        provider: Option<Arc<dyn MessageSender>>,
        enabled: bool,
    ) -> AppointmentService {
        let dispatcher = NotificationDispatcher::new(
            provider,
            DispatchConfig {
                enabled,
                from_number: Some("+14155238886".to_string()),
                staff_number: None,
            },
        );
        AppointmentService::new(store, Arc::new(dispatcher))
    }

    #[tokio::test]
    async fn create_persists_record_and_provider_reference() {
        let store = InMemoryStore::new();
        let service = service(store.clone(), Some(Arc::new(OkSender)), true);

        let appointment = service
            .create_appointment(request("555-123-4567"))
            .await
            .unwrap();

        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(appointment.whatsapp_message_id.as_deref(), Some("SM123"));
        // The reference is on the stored row, not just the returned value.
        let stored = store.get(appointment.id).unwrap();
        assert_eq!(stored.whatsapp_message_id.as_deref(), Some("SM123"));
    }

    #[tokio::test]
    async fn create_with_disabled_provider_records_placeholder_reference() {
        let store = InMemoryStore::new();
        let service = service(store.clone(), None, false);

        let appointment = service
            .create_appointment(request("555-123-4567"))
            .await
            .unwrap();

        let reference = appointment.whatsapp_message_id.unwrap();
        assert!(reference.starts_with(PLACEHOLDER_PREFIX));
    }

    #[tokio::test]
    async fn provider_failure_leaves_record_persisted_without_reference() {
        let store = InMemoryStore::new();
        let service = service(store.clone(), Some(Arc::new(FailingSender)), true);

        let appointment = service
            .create_appointment(request("555-123-4567"))
            .await
            .unwrap();

        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert!(appointment.whatsapp_message_id.is_none());
        let stored = store.get(appointment.id).unwrap();
        assert!(stored.whatsapp_message_id.is_none());
    }

    #[tokio::test]
    async fn validation_failure_persists_nothing() {
        let store = InMemoryStore::new();
        let service = service(store.clone(), Some(Arc::new(OkSender)), true);

        let result = service.create_appointment(request("")).await;

        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn status_update_changes_only_status() {
        let store = InMemoryStore::new();
        let service = service(store.clone(), None, false);

        let created = service
            .create_appointment(request("555-123-4567"))
            .await
            .unwrap();
        let updated = service
            .update_status(created.id, AppointmentStatus::Confirmed)
            .await
            .unwrap();

        assert_eq!(updated.status, AppointmentStatus::Confirmed);
        assert_eq!(updated.patient_name, created.patient_name);
        assert_eq!(updated.phone_number, created.phone_number);
        assert_eq!(updated.whatsapp_message_id, created.whatsapp_message_id);
    }

    #[tokio::test]
    async fn status_update_on_missing_id_is_not_found() {
        let store = InMemoryStore::new();
        let service = service(store, None, false);

        let result = service
            .update_status(Uuid::new_v4(), AppointmentStatus::Confirmed)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
