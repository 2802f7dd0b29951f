use anyhow::Result;
use clap::Parser;

use eqbroker::config::ServerArgs;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = ServerArgs::parse();
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], args.port));

    eqbroker::server::run(addr, args.max_equipment).await
}
