use clap::Parser;
use std::{
    net::SocketAddr,
    path::PathBuf,
};

/// Collects server health metrics and indexes them into Elasticsearch.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    /// Configuration file to use instead of `config.yaml` in the config directory.
    #[clap(long, value_name = "FILE", env = "HOSTINGUARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address the HTTP server listens on.
    #[clap(long, value_name = "ADDRESS")]
    pub listen_address: Option<SocketAddr>,

    /// Elasticsearch base URL, e.g. `http://localhost:9200`.
    #[clap(long, value_name = "URL")]
    pub elasticsearch_url: Option<String>,

    /// Site triggered by `POST /hostinguard-update`.
    #[clap(long, value_name = "SITE")]
    pub default_site: Option<String>,

    /// Log filter directives, e.g. `hostinguard=debug,info`.
    #[clap(long, value_name = "FILTER")]
    pub log_filter: Option<String>,

    /// Append logs to this file instead of stderr.
    #[clap(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(listen_address) = &self.listen_address {
                cache.insert("listen_address".to_string(), listen_address.to_string().into());
            }
            if let Some(url) = &self.elasticsearch_url {
                cache.insert("elasticsearch.url".to_string(), url.clone().into());
            }
            if let Some(site) = &self.default_site {
                cache.insert("default_site".to_string(), site.clone().into());
            }
            if let Some(filter) = &self.log_filter {
                cache.insert("logging.filter".to_string(), filter.clone().into());
            }
            if let Some(file) = &self.log_file {
                cache.insert("logging.file".to_string(), file.display().to_string().into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();
    let config_dir_path = crate::get_config_dir().display().to_string();

    format!(
        "{}

Authors: {author}
Config directory: {config_dir_path}",
        clap::crate_version!()
    )
}
