#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use args::Args;
use clap::Parser;
use errgate_config::Config;
use errgate_server::Server;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;

    // Held until exit so buffered spans are flushed
    let _telemetry_guard = errgate_telemetry::init(config.telemetry.as_ref())?;

    tracing::info!(config_path = %args.config.display(), "starting errgate");

    let server = match args.listen {
        Some(listen) => Server::new(config)?.with_listen_address(listen),
        None => Server::new(config)?,
    };

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    server.serve(shutdown).await?;

    tracing::info!("errgate stopped");
    Ok(())
}

/// Cancel `shutdown` on `SIGINT` or `SIGTERM`
async fn cancel_on_signal(shutdown: CancellationToken) {
    let interrupt = async {
        tokio::signal::ctrl_c().await.expect("failed to install SIGINT handler");
        "SIGINT"
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
        "SIGTERM"
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&str>();

    let signal = tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    };

    tracing::info!(signal, "shutdown signal received");
    shutdown.cancel();
}
