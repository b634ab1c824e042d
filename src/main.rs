use clap::Parser;
use color_eyre::Result;
use hostinguard::{
    init_errors,
    init_logging,
    serve,
    shutdown_signal,
    Args,
    Config,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    init_errors()?;

    let config = Config::new(Args::parse())?;
    init_logging(&config.logging)?;
    config.validate()?;

    let listener = TcpListener::bind(config.listen_address).await?;
    serve(&config, listener, shutdown_signal()).await
}
