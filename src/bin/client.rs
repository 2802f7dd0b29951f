use anyhow::Result;
use clap::Parser;

use eqbroker::config::ClientArgs;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = ClientArgs::parse();
    if let Err(e) = eqbroker::client::run(args).await {
        log::error!("client session ended: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
