use axum::{http::Method, http::header::CONTENT_TYPE, Router};
use dotenv::dotenv;
use recipebook_api::api;
use recipebook_api::config::Settings;
use recipebook_api::state::RecipebookState;
use recipebook_core::database::Database;
use recipebook_core::identity::supabase::SupabaseIdentityProvider;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    let (writer, _log_guard) = tracing_appender::non_blocking(std::io::stdout());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let is_production = env::var("NODE_ENV").unwrap_or_default() == "production"
        || env::var("RUST_ENV").unwrap_or_default() == "production";

    if is_production {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(writer),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(writer))
            .init();
    }

    tracing::info!("Recipebook API starting");

    let settings = Settings::load()?;

    let database = Database::new(
        PathBuf::from(&settings.database_path),
        PathBuf::from(&settings.migrations_path),
    )
    .await?;
    tracing::info!("Database initialized at {}", settings.database_path);

    let identity = SupabaseIdentityProvider::new(
        settings.supabase_url.clone(),
        settings.supabase_key.clone(),
        settings.supabase_service_role_key.clone(),
    );

    let state = Arc::new(RecipebookState {
        db: database.pool.clone(),
        identity: Arc::new(identity),
        reset_redirect_url: settings.reset_redirect_url.clone(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, axum::http::header::AUTHORIZATION]);

    let app = Router::new()
        .merge(api::http::routes::routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(settings.bind_address()).await?;
    tracing::info!("API listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    database.pool.close().await;
    tracing::info!("Database pool closed, shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install terminate handler: {}", e);
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
}
