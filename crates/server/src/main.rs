use std::future::IntoFuture;
use std::path::Path;

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use tracing::{error, info, warn};

use inkwell_server::api::{AppState, HttpSettings};
use inkwell_server::auth::JwtManager;
use inkwell_server::config::InkwellConfig;

/// Inkwell blogging backend HTTP server.
#[derive(Parser, Debug)]
#[command(name = "inkwell-server", about = "HTTP server for the Inkwell blogging backend")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "inkwell.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run relational store migrations, then exit.
    Migrate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from TOML file, or use defaults if the file does not exist.
    let config_found = Path::new(&cli.config).exists();
    let mut config = if config_found {
        let contents = std::fs::read_to_string(&cli.config)?;
        InkwellConfig::from_toml(&contents)?
    } else {
        InkwellConfig::from_toml("")?
    };
    config.apply_env_overrides();

    if let Some(Commands::Migrate) = cli.command {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
        return run_migrate(&config).await;
    }

    inkwell_server::telemetry::init(&config.logging);

    if !config_found {
        info!(path = %cli.config, "config file not found, using defaults");
    }

    let backends = inkwell_server::factory::create_backends(&config).await?;

    let jwt_secret = config.auth.jwt_secret.take().unwrap_or_else(|| {
        warn!("no [auth] jwt_secret configured, generating a random one");
        SecretString::new(format!(
            "{}{}",
            uuid::Uuid::new_v4().simple(),
            uuid::Uuid::new_v4().simple()
        ))
    });
    let jwt = JwtManager::new(&jwt_secret, config.auth.jwt_expiry_seconds);

    let settings = HttpSettings {
        max_upload_bytes: config.server.max_upload_bytes,
        request_timeout: config.server.request_timeout(),
        cookie_secure: config.auth.cookie_secure,
    };
    let state = AppState::new(backends, jwt, config.storage.presign_ttl(), settings);
    let app = inkwell_server::api::router(state);

    let host = cli.host.unwrap_or_else(|| config.server.host.clone());
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "inkwell-server listening");

    // Serve with graceful shutdown on SIGINT / SIGTERM; in-flight requests get
    // at most the configured timeout once the signal arrives.
    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled_tx.send(());
        })
        .into_future();
    tokio::pin!(server);

    let shutdown_timeout = config.server.shutdown_timeout();
    tokio::select! {
        result = &mut server => result?,
        () = async {
            if signalled_rx.await.is_ok() {
                tokio::time::sleep(shutdown_timeout).await;
            } else {
                std::future::pending::<()>().await;
            }
        } => {
            warn!(
                timeout_secs = config.server.shutdown_timeout_seconds,
                "shutdown timeout exceeded, dropping in-flight requests"
            );
        }
    }

    info!("inkwell-server shut down");
    Ok(())
}

async fn run_migrate(config: &InkwellConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.postgres.url.is_none() {
        info!("no [postgres] url configured, nothing to migrate");
        return Ok(());
    }

    info!("running relational store migrations...");
    let _users = inkwell_server::factory::create_user_repository(&config.postgres).await?;
    info!("all migrations complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
