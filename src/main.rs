use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clients_api::{
    cleanup::CleanupScheduler,
    config,
    db,
    repository::{CustomerRepository, Repository},
    routes,
    state::AppState,
    store::SqliteCustomerStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (embedded defaults -> clients-api.toml -> env/.env)
    let app_cfg = config::load()?;

    // Logging (stdout + daily file rotation)
    app_cfg.logging.ensure_dir()?;
    let (stdout_nb, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let file_appender = tracing_appender::rolling::daily(&app_cfg.logging.dir, &app_cfg.logging.file_prefix);
    let (file_nb, file_guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(stdout_nb))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_nb))
        .init();
    // Keep the guards alive so the non-blocking writers flush on exit
    let _log_guards = (stdout_guard, file_guard);

    let pool = db::connect(&app_cfg.database).await?;
    let repo: Arc<dyn CustomerRepository> = Arc::new(Repository::new(
        SqliteCustomerStore::new(pool.clone()),
        app_cfg.database.unique_customers,
        app_cfg.database.query_timeout(),
    ));

    // A table that does not match the customer shape is fatal
    repo.migrate().await.map_err(|e| anyhow::anyhow!("schema setup failed: {}", e))?;

    let mut cleanup = CleanupScheduler::new(repo.clone(), app_cfg.cleanup.interval(), app_cfg.cleanup.max_age_secs);
    cleanup.start();

    let state = AppState::new(repo, app_cfg.clone());
    let app = routes::router(state);

    let port: u16 = app_cfg.server.port;
    let host: String = app_cfg.server.host.clone();
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid listen addr {}:{} - {}", host, port, e))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Clients API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    cleanup.shutdown().await;
    pool.close().await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown signal received. Stopping server...");
}
