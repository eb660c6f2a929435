use std::net::SocketAddr;

use ed_server::config::ServerConfig;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::load()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    tracing::info!(
        port = config.port,
        prefix = %config.url_prefix,
        "Starting job server"
    );

    let listener = TcpListener::bind(addr).await?;
    ed_server::serve(listener, &config).await?;

    Ok(())
}
