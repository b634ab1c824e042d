#[macro_use]
extern crate tracing;

mod logging;
mod server;

pub use hostinguard_config::{
    Args,
    Config,
};
pub use logging::init_logging;
pub use server::{
    http_client,
    serve,
    shutdown_signal,
};

pub fn init_errors() -> eyre::Result<()> {
    color_eyre::install()
}
