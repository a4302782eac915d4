//! `societiesd` — the societies server binary.
//!
//! Usage:
//!   societiesd -c <config-name-or-path> [--listen <addr>]
//!
//! The config name resolves to `/etc/societies/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod bootstrap;
mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use societies_core::Module;
use societies_notify::{Dispatcher, DispatcherConfig, Notifier, NullNotifier};
use tracing::{info, warn};

use config::ServerConfig;

/// Societies server.
#[derive(Parser, Debug)]
#[command(name = "societiesd", about = "Societies server")]
struct Cli {
    /// Config name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides the configured one).
    #[arg(long = "listen")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;
    bootstrap::verify_config(&server_config)?;

    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let sql: Arc<dyn societies_sql::SQLStore> = Arc::new(
        societies_sql::sqlite::SqliteStore::open(&server_config.sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    // Notifications go out for real only when a sender is configured.
    let notifier: Arc<dyn Notifier> = if server_config.notify.sender.is_empty() {
        warn!("no notification sender configured, side-effect delivery disabled");
        Arc::new(NullNotifier)
    } else {
        Arc::new(Dispatcher::new(DispatcherConfig {
            sender: server_config.notify.sender.clone(),
            cio_email: server_config.notify.cio_email.clone(),
            base_url: server_config.notify.base_url.clone(),
            mail: server_config.notify.mailgun.clone(),
            slack: server_config.notify.slack.clone(),
        }))
    };

    let auth_config = auth::service::AuthConfig {
        jwt_secret: server_config.jwt.secret.clone(),
        directory_base_url: server_config.directory.base_url.clone(),
    };
    let auth_module = auth::AuthModule::new(Arc::clone(&sql), auth_config)?;
    info!("Auth module initialized");

    let catalog_module = catalog::CatalogModule::new(Arc::clone(&sql))?;
    info!("Catalog module initialized");

    let points_module = points::PointsModule::new(
        Arc::clone(&sql),
        Arc::clone(catalog_module.service()),
        Arc::clone(auth_module.service()),
        notifier,
    )?;
    info!("Points module initialized");

    bootstrap::seed(auth_module.service(), catalog_module.service())?;

    let module_routes = vec![
        auth_module.routes(),
        catalog_module.routes(),
        points_module.routes(),
    ];
    let app = routes::build_router(Arc::clone(auth_module.service()), module_routes);

    let listen = cli.listen.unwrap_or_else(|| server_config.server.listen.clone());
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!("Societies server listening on {}", listen);
    axum::serve(listener, app).await?;

    Ok(())
}
