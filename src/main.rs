use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};

use crossroads::config::Config;
use crossroads::gateway::DecisionGateway;
use crossroads::handlers::{self, AppState};
use crossroads::transport::GroqTransport;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::load();

    let transport = Arc::new(GroqTransport::new(config.groq.api_key.clone()));
    let gateway = Arc::new(DecisionGateway::new(transport, &config.groq));
    let router = handlers::router(AppState { gateway });

    let bind: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {:?}", config.server.bind))?;
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(%bind, model = %config.groq.model, "starting decision gateway");

    axum::serve(listener, router).await?;
    Ok(())
}
