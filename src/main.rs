//! Clinic service: REST API for appointments and leads with WhatsApp
//! notifications.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::{Json, Router, routing::get};
use clinic_whatsapp::{TwilioClient, TwilioConfig};
use http::Request;
use serde::Serialize;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};

use clinic_service::config::Config;
use clinic_service::db::{self, Database};
use clinic_service::notify::{DispatchConfig, MessageSender, NotificationDispatcher};
use clinic_service::routes::api_router;
use clinic_service::services::{AppState, AppointmentService, LeadService};
use clinic_service::services::leads::LeadWebhook;
use clinic_service::telemetry::{init_metrics, setup_telemetry};

/// Build version (injected at compile time or default)
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    checks: Option<HealthChecks>,
}

#[derive(Serialize)]
struct HealthChecks {
    database: CheckResult,
}

#[derive(Serialize)]
struct CheckResult {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl CheckResult {
    const fn healthy() -> Self {
        Self {
            status: "healthy",
            message: None,
        }
    }

    fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: "unhealthy",
            message: Some(message.into()),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::init()?;
    setup_telemetry(&config);
    let metrics_handle = init_metrics();

    info!(
        version = VERSION,
        address = %config.server_address,
        twilio = config.twilio_enabled,
        pid = std::process::id(),
        "Starting clinic-service"
    );

    // Database
    let pool = db::create_pool(&config).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Connected to database");
    let database = Database::new(pool);

    // Messaging provider
    let provider = init_twilio(&config);
    let dispatcher = Arc::new(NotificationDispatcher::new(
        provider,
        DispatchConfig {
            enabled: config.twilio_enabled,
            from_number: config.twilio_whatsapp_from.clone(),
            staff_number: config.clinic_staff_number.clone(),
        },
    ));

    // Lead webhook
    let webhook = config
        .lead_webhook_url
        .as_ref()
        .filter(|url| !url.trim().is_empty())
        .map(|url| Arc::new(LeadWebhook::new(url.clone())));

    let state = AppState {
        appointments: AppointmentService::new(Arc::new(database.appointments.clone()), dispatcher),
        leads: LeadService::new(database.leads.clone(), webhook),
        db: database,
    };

    let addr: SocketAddr = config.server_address.parse()?;

    // Build middleware stack with ServiceBuilder (executes top-to-bottom on request)
    let middleware = ServiceBuilder::new()
        // 1. Request ID - generate/propagate first
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        // 2. Tracing - create span with request details
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<_>| {
                    tracing::info_span!(
                        "request",
                        method = %req.method(),
                        uri = %req.uri(),
                    )
                })
                .on_response(tower_http::trace::DefaultOnResponse::new().level(Level::DEBUG)),
        )
        // 3. Timeout - prevent hung requests
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        // 4. CORS - handle preflight before handlers
        .layer(build_cors(config.cors_allow_origins.as_deref()));

    let app = Router::new()
        .route("/", get(|| async { "clinic-service" }))
        .route("/health", get(|| async { "OK" }))
        .route("/health/ready", get(readiness_handler))
        .route(
            "/metrics",
            get(move || async move { metrics_handle.render() }),
        )
        .merge(api_router())
        .with_state(state)
        .layer(middleware);

    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

/// Build the Twilio client when enabled and fully configured.
fn init_twilio(config: &Config) -> Option<Arc<dyn MessageSender>> {
    if !config.twilio_enabled {
        info!("Twilio not enabled. WhatsApp messages will be logged only");
        return None;
    }
    match (&config.twilio_account_sid, &config.twilio_auth_token) {
        (Some(account_sid), Some(auth_token)) => {
            let client = TwilioClient::new(TwilioConfig {
                account_sid: account_sid.clone(),
                auth_token: auth_token.clone(),
            });
            Some(Arc::new(client))
        }
        _ => {
            info!("Twilio credentials missing. WhatsApp messages will be logged only");
            None
        }
    }
}

fn build_cors(origins: Option<&str>) -> CorsLayer {
    let cors = match origins {
        Some(o) if o.trim() == "*" => CorsLayer::permissive(),
        Some(o) => {
            let origins: Vec<http::HeaderValue> =
                o.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            CorsLayer::new().allow_origin(origins)
        }
        None => CorsLayer::permissive(),
    };

    cors.allow_headers(Any)
        .allow_methods(Any)
        .max_age(Duration::from_secs(3600))
}

async fn readiness_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_check = if state.db.health_check().await {
        CheckResult::healthy()
    } else {
        CheckResult::unhealthy("Database connection failed")
    };

    let healthy = db_check.status == "healthy";

    Json(HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" },
        version: VERSION,
        checks: Some(HealthChecks { database: db_check }),
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
