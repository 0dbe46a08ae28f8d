//! Residence Hub Platform Server
//!
//! Marketplace REST API plus health, readiness and metrics endpoints.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RH_CONFIG` | - | TOML config file |
//! | `RH_HTTP_HOST` | `0.0.0.0` | Bind address |
//! | `RH_HTTP_PORT` / `PORT` | `5000` | HTTP port |
//! | `RH_CORS_ORIGINS` | `http://localhost:5173` | Comma-separated allowed origins |
//! | `RH_MONGODB_URI` | `mongodb://localhost:27017` | MongoDB connection URL |
//! | `RH_MONGODB_DATABASE` | `RealStateDb` | MongoDB database name |
//! | `RH_STORE_BACKEND` | `mongo` | `mongo` or `memory` |
//! | `RH_JWT_SECRET` / `ACCESS_TOKEN_SECRET` | - | HS256 signing secret |
//! | `RH_STRIPE_SECRET_KEY` / `STRIPE_SECRET_KEY` | - | Payment provider secret key |
//! | `RH_DEV_MODE` | `false` | Allow an empty signing secret |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;

use anyhow::Result;
use axum::{http::HeaderValue, response::Json, routing::get, Router};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa_swagger_ui::SwaggerUi;

use rh_config::{ConfigLoader, StoreBackend};
use rh_platform::payment::StripePaymentProvider;
use rh_platform::{build_app, initialize_indexes, AuthService, Repositories};

#[tokio::main]
async fn main() -> Result<()> {
    rh_common::init_logging("rh-platform-server");

    info!("Starting Residence Hub Platform Server");

    let mut config = ConfigLoader::new().load()?;
    config.validate()?;

    if config.auth.secret.is_empty() {
        warn!("No signing secret configured; using a random one for this dev run");
        config.auth.secret = uuid::Uuid::new_v4().to_string();
    }

    let repos = match config.store.backend {
        StoreBackend::Mongo => {
            info!("Connecting to MongoDB: {}/{}", config.mongodb.uri, config.mongodb.database);
            let client = mongodb::Client::with_uri_str(&config.mongodb.uri).await?;
            let db = client.database(&config.mongodb.database);
            initialize_indexes(&db).await?;
            Repositories::mongo(&db)
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data is lost on shutdown");
            Repositories::in_memory()
        }
    };
    info!("Repositories initialized");

    let auth_service = Arc::new(AuthService::new_with_secret(config.auth.clone()));
    let payment_provider = Arc::new(StripePaymentProvider::new(&config.payments)?);
    if config.payments.stripe_secret_key.is_empty() {
        warn!("STRIPE_SECRET_KEY is not set; payment intents will fail");
    }

    let (api, openapi) = build_app(repos, auth_service, payment_provider);

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/metrics", get(metrics_handler))
        .merge(api)
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", openapi))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.http.cors_origins));

    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Residence Hub Platform Server shutdown complete");
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(allowed)
    }
}

async fn root_handler() -> &'static str {
    "Real state server is running"
}

async fn metrics_handler() -> &'static str {
    "# HELP rh_platform_up Platform is up\n# TYPE rh_platform_up gauge\nrh_platform_up 1\n"
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn ready_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "READY"
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
