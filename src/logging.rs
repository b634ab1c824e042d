use eyre::{
    Context as _,
    Result,
};
use hostinguard_config::LoggingConfig;
use std::{
    fs::OpenOptions,
    sync::Mutex,
};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// `RUST_LOG` wins over the configured filter when it is set.
fn env_filter(rust_log: Option<String>, config: &LoggingConfig) -> Result<EnvFilter> {
    match rust_log {
        Some(directives) if !directives.is_empty() => {
            EnvFilter::try_new(&directives).wrap_err_with(|| format!("Invalid RUST_LOG filter {directives:?}"))
        }
        _ => EnvFilter::try_new(&config.filter)
            .wrap_err_with(|| format!("Invalid logging.filter {:?}", config.filter)),
    }
}

pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok(), config)?;

    let (stderr_layer, file_layer) = match &config.file {
        Some(path) => {
            if let Some(directory) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                std::fs::create_dir_all(directory)
                    .wrap_err_with(|| format!("Failed to create log directory {}", directory.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .wrap_err_with(|| format!("Failed to open log file {}", path.display()))?;
            (None, Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file))))
        }
        None => (Some(fmt::layer().with_writer(std::io::stderr)), None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .with(tracing_error::ErrorLayer::default())
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    fn config(filter: &str) -> LoggingConfig {
        LoggingConfig {
            filter: filter.to_string(),
            file: None,
        }
    }

    #[test]
    fn configured_filter_is_used_without_rust_log() {
        let filter = env_filter(None, &config("hostinguard_collector=debug,info")).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn rust_log_overrides_the_configured_filter() {
        let filter = env_filter(Some("warn".to_string()), &config("hostinguard=loud")).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));

        let filter = env_filter(Some(String::new()), &config("debug")).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn malformed_filter_is_rejected() {
        let err = env_filter(None, &config("hostinguard=loud")).unwrap_err();
        assert!(err.to_string().contains("logging.filter"));
    }
}
