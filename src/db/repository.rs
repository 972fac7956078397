//! Repositories for appointments and leads.

use chrono::Utc;
use sqlx::postgres::PgPool;
use uuid::Uuid;

use super::models::{
    Appointment, AppointmentRequest, AppointmentStatus, DEFAULT_LEAD_SOURCE, Lead, LeadRequest,
    LeadStatus,
};
use crate::error::AppError;

/// Database repository for appointment operations.
#[derive(Debug, Clone)]
pub struct AppointmentRepository {
    pool: PgPool,
}

impl AppointmentRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new appointment in `Pending` status and return the stored row.
    pub async fn create(&self, request: &AppointmentRequest) -> Result<Appointment, AppError> {
        sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments
                (id, patient_name, phone_number, email, appointment_date_time,
                 reason, notes, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, patient_name, phone_number, email, appointment_date_time,
                      reason, notes, status, whatsapp_message_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.patient_name)
        .bind(&request.phone_number)
        .bind(&request.email)
        .bind(request.appointment_date_time)
        .bind(&request.reason)
        .bind(&request.notes)
        .bind(AppointmentStatus::Pending)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Get an appointment by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Appointment, AppError> {
        sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, patient_name, phone_number, email, appointment_date_time,
                   reason, notes, status, whatsapp_message_id, created_at
              FROM appointments
             WHERE id = $1
             LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("Appointment", id))
    }

    /// List all appointments, newest first.
    pub async fn list_all(&self) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, patient_name, phone_number, email, appointment_date_time,
                   reason, notes, status, whatsapp_message_id, created_at
              FROM appointments
             ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// List appointments with the given status, newest first.
    pub async fn list_by_status(
        &self,
        status: AppointmentStatus,
    ) -> Result<Vec<Appointment>, AppError> {
        sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, patient_name, phone_number, email, appointment_date_time,
                   reason, notes, status, whatsapp_message_id, created_at
              FROM appointments
             WHERE status = $1
             ORDER BY created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Update the status of an existing appointment; other fields unchanged.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppError> {
        sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
               SET status = $2
             WHERE id = $1
            RETURNING id, patient_name, phone_number, email, appointment_date_time,
                      reason, notes, status, whatsapp_message_id, created_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("Appointment", id))
    }

    /// Record the provider message reference for an appointment.
    ///
    /// Overwrites any previous reference; a later successful send wins.
    pub async fn set_message_id(
        &self,
        id: Uuid,
        message_id: &str,
    ) -> Result<Appointment, AppError> {
        sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
               SET whatsapp_message_id = $2
             WHERE id = $1
            RETURNING id, patient_name, phone_number, email, appointment_date_time,
                      reason, notes, status, whatsapp_message_id, created_at
            "#,
        )
        .bind(id)
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("Appointment", id))
    }
}

/// Database repository for lead operations.
#[derive(Debug, Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new lead in `New` status and return the stored row.
    pub async fn create(&self, request: &LeadRequest) -> Result<Lead, AppError> {
        let source = request
            .source
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_LEAD_SOURCE);
        sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (id, name, email, phone_number, message, source, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, email, phone_number, message, source, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone_number)
        .bind(&request.message)
        .bind(source)
        .bind(LeadStatus::New)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Get a lead by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Lead, AppError> {
        sqlx::query_as::<_, Lead>(
            r#"
            SELECT id, name, email, phone_number, message, source, status, created_at
              FROM leads
             WHERE id = $1
             LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("Lead", id))
    }

    /// List all leads, newest first.
    pub async fn list_all(&self) -> Result<Vec<Lead>, AppError> {
        sqlx::query_as::<_, Lead>(
            r#"
            SELECT id, name, email, phone_number, message, source, status, created_at
              FROM leads
             ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Update the status of an existing lead; other fields unchanged.
    pub async fn update_status(&self, id: Uuid, status: LeadStatus) -> Result<Lead, AppError> {
        sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads
               SET status = $2
             WHERE id = $1
            RETURNING id, name, email, phone_number, message, source, status, created_at
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("Lead", id))
    }
}
