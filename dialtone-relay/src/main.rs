use anyhow::{Context, Result};
use clap::Parser;
use dialtone_relay::{RelayService, router};
use std::net::SocketAddr;
use tracing::{Level, info};

#[derive(Parser)]
#[command(name = "dialtone-relay")]
#[command(about = "Broadcast relay for dialtone call signaling")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:3000")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let args = Args::parse();
    let app = router(RelayService::new());

    info!("relay listening on http://{}", args.bind);

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
