use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::signal;

use mail_template_service::config::Settings;
use mail_template_service::email::create_mailer;
use mail_template_service::postgres::PostgresPool;
use mail_template_service::server::{create_app, AppState};
use mail_template_service::telemetry::init_telemetry;
use mail_template_service::template::{create_template_repository, PostgresTemplateRepository};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;

    // Initialize tracing
    init_telemetry(&settings.logging)?;
    tracing::info!("Configuration loaded");

    // PostgreSQL is only needed by the postgres template backend
    let postgres_pool = if settings.templates.backend == "postgres" {
        match PostgresPool::new(&settings.database).await {
            Ok(pool) => {
                if settings.database.run_migrations {
                    PostgresTemplateRepository::new(pool.pool().clone())
                        .ensure_schema()
                        .await
                        .context("failed to create template schema")?;
                }
                Some(pool)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Failed to connect to PostgreSQL, template storage falls back to memory"
                );
                None
            }
        }
    } else {
        None
    };

    let repository = create_template_repository(
        &settings.templates,
        postgres_pool.as_ref().map(|pool| pool.pool().clone()),
    );
    let mailer = create_mailer(&settings.mailer).context("failed to create mailer")?;

    // Create application state
    let state = AppState::new(settings.clone(), repository, mailer, postgres_pool.clone());
    tracing::info!("Application state initialized");

    // Create Axum app
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_handler())
        .await?;

    if let Some(pool) = postgres_pool {
        pool.close().await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal_handler() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}

