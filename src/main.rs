use anyhow::Result;
use clap::Parser;
use log::info;

use echo_status::config::{Cli, Config};
use echo_status::EchoServer;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("echo_status=debug"))
        .init();

    let config = Config::from_cli(&Cli::parse())?;
    let server = EchoServer::start(config.port).await?;
    info!("listening on {}", server.local_addr()?);

    tokio::select! {
        result = server.listen() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, exiting");
            Ok(())
        }
    }
}
