use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notion_moments::api::{create_router, AppState};
use notion_moments::{Config, MomentService};

#[derive(Parser)]
#[command(name = "notion-moments")]
#[command(about = "Serves published Notion database entries as a JSON moment feed")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP feed server (default)
    Serve,
    /// Fetch the moment list once and print it as JSON
    Dump,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notion_moments=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    let service = MomentService::from_config(&config)?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Dump => dump(&service).await,
        Command::Serve => serve(config, service).await,
    }
}

async fn dump(service: &MomentService) -> anyhow::Result<()> {
    let moments = service.get_moments().await?;
    tracing::info!(count = moments.len(), "Fetched moments");
    println!("{}", serde_json::to_string_pretty(&moments)?);
    Ok(())
}

async fn serve(config: Config, service: MomentService) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let revalidate_secs = config.server.revalidate_secs;
    let app = create_router(AppState::new(config, service));

    tracing::info!("Moments feed starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  Feed:         http://{}/api/moments.json", addr);
    tracing::info!("  Revalidate:   every {}s", revalidate_secs);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received, draining connections...");
}
