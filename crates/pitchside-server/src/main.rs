//! Pitchside scheduling server binary.
//!
//! Exit codes: 0 on clean shutdown, 1 on configuration errors, 2 when
//! the TLS identity cannot be loaded or the listen address cannot be
//! bound.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tonic::transport::{Identity, Server, ServerTlsConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pitchside_proto::SchedulerServer;
use pitchside_server::{
    HttpUsageHook, NoopUsageHook, SchedulerService, ServerConfig, TokenValidator, UsageHook,
};

/// Pitchside scheduling server.
#[derive(Parser, Debug)]
#[command(name = "pitchside-server")]
#[command(about = "Serve the Pitchside scheduling stream")]
#[command(version)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, thiserror::Error)]
enum ServeError {
    #[error("could not load TLS identity: {0}")]
    Tls(String),

    #[error("could not serve: {0}")]
    Transport(#[from] tonic::transport::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    info!("Pitchside server starting");

    let config = match ServerConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            error!(%error, "failed to load configuration");
            return ExitCode::from(1);
        }
    };

    if let Err(error) = config.validate() {
        error!(%error, "invalid configuration");
        return ExitCode::from(1);
    }

    info!(
        listen = %config.listen.addr,
        issuer = %config.auth.issuer,
        tls = config.tls.cert_path.is_some(),
        metering = config.usage.endpoint.is_some(),
        "configuration loaded"
    );

    match serve(config).await {
        Ok(()) => {
            info!("Pitchside server shutdown complete");
            ExitCode::SUCCESS
        }
        Err(error) => {
            error!(%error, "server failed");
            ExitCode::from(2)
        }
    }
}

async fn serve(config: ServerConfig) -> Result<(), ServeError> {
    let validator = Arc::new(TokenValidator::new(config.auth.clone()));

    let usage: Arc<dyn UsageHook> = match &config.usage.endpoint {
        Some(endpoint) => Arc::new(HttpUsageHook::new(endpoint.clone())),
        None => Arc::new(NoopUsageHook),
    };

    let service = SchedulerService::new(validator, usage, config.limits.clone());

    let (mut health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<SchedulerServer<SchedulerService>>()
        .await;

    let mut builder = Server::builder();

    if let (Some(cert_path), Some(key_path)) = (&config.tls.cert_path, &config.tls.key_path) {
        let cert = tokio::fs::read(cert_path)
            .await
            .map_err(|e| ServeError::Tls(format!("{}: {e}", cert_path.display())))?;
        let key = tokio::fs::read(key_path)
            .await
            .map_err(|e| ServeError::Tls(format!("{}: {e}", key_path.display())))?;

        builder = builder
            .tls_config(ServerTlsConfig::new().identity(Identity::from_pem(cert, key)))
            .map_err(|e| ServeError::Tls(e.to_string()))?;
        info!("TLS enabled");
    }

    info!(addr = %config.listen.addr, "scheduler listening");

    builder
        .add_service(health_service)
        .add_service(SchedulerServer::new(service))
        .serve_with_shutdown(config.listen.addr, shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            error!(%error, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                error!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
