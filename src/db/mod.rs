//! Database layer: models, repositories, and connection pooling.
//!
//! # Error Handling
//!
//! All repository methods return `Result<T, AppError>` where errors are:
//! - `AppError::Database` - Connection or query failures
//! - `AppError::NotFound` - Requested entity does not exist

pub mod models;
pub mod repository;

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;

pub use repository::{AppointmentRepository, LeadRepository};

/// Create database connection pool from service configuration.
///
/// # Errors
/// Returns an error if the database is unreachable.
pub async fn create_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .min_connections(config.db_pool_min)
        .max_connections(config.db_pool_max)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout_secs))
        .connect(&config.db_url)
        .await
}

/// Combined database context.
#[derive(Debug, Clone)]
pub struct Database {
    pub appointments: AppointmentRepository,
    pub leads: LeadRepository,
    pool: PgPool,
}

impl Database {
    /// Creates a new database context with all repositories.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            appointments: AppointmentRepository::new(pool.clone()),
            leads: LeadRepository::new(pool.clone()),
            pool,
        }
    }

    /// Check database health by executing a simple query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .is_ok()
    }

    /// Returns a reference to the underlying connection pool.
    #[inline]
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}
