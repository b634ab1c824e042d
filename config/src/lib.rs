#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod site_config;

use app_config::AppConfig;
pub use app_config::get_config_dir;
pub use args::Args;
use eyre::{
    bail,
    Result,
};
use serde::Deserialize;
pub use site_config::{
    AnalyticsConfig,
    ControlPanelAuth,
    ControlPanelConfig,
    CredentialsError,
    IndexConfig,
    SiteConfig,
    StaticResourceConfig,
};
use std::{
    collections::BTreeMap,
    net::SocketAddr,
    path::{
        Path,
        PathBuf,
    },
};
use url::Url;

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    app_config: AppConfig,
    pub listen_address: SocketAddr,
    #[serde(default)]
    pub default_site: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub elasticsearch: ElasticsearchConfig,
    #[serde(default)]
    pub sites: BTreeMap<String, SiteConfig>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Log sink. Stderr when unset.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file: None,
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ElasticsearchConfig {
    pub url: Url,
}

impl Config {
    /// Layers the built-in defaults, the config file, `HOSTINGUARD__*`
    /// environment variables and the command-line arguments, in that order.
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        let config_dir = get_config_dir();
        let config_file = args.config.clone().unwrap_or_else(|| config_dir.join("config.yaml"));
        let explicit_file = args.config.is_some();

        let builder = config::Config::builder()
            .set_default("config_dir", config_dir.display().to_string())?
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml))
            .add_source(
                config::File::from(config_file)
                    .format(config::FileFormat::Yaml)
                    .required(explicit_file),
            )
            .add_source(
                config::Environment::with_prefix("HOSTINGUARD")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .add_source(args);

        builder.build()?.try_deserialize()
    }

    /// Loads a configuration from YAML text only, without consulting the
    /// filesystem or the environment.
    pub fn from_yaml(content: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml))
            .add_source(config::File::from_str(content, config::FileFormat::Yaml))
            .build()?
            .try_deserialize()
    }

    pub fn config_dir(&self) -> &Path {
        &self.app_config.config_dir
    }

    /// The site answering `POST /hostinguard-update`: the configured default,
    /// or the only site when exactly one exists.
    pub fn default_site_name(&self) -> Option<&str> {
        match &self.default_site {
            Some(name) => Some(name.as_str()),
            None if self.sites.len() == 1 => self.sites.keys().next().map(String::as_str),
            None => None,
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn validate(&self) -> Result<()> {
        if self.sites.is_empty() {
            bail!("no sites configured, add at least one entry under `sites`");
        }
        if let Some(name) = &self.default_site {
            if !self.sites.contains_key(name) {
                bail!("default_site {name:?} is not one of the configured sites");
            }
        }
        for (name, site) in &self.sites {
            site.control_panel.auth()?;
            debug!(site = %name, index = %site.index.name, "Site configuration is valid");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TWO_SITES: &str = r#"
elasticsearch:
  url: http://es.internal:9200
sites:
  app1:
    analytics:
      access_token: token-1
      profile_id: "1234"
    control_panel:
      host: whm1.example.org
      username: root
      password: secret
    static_resource:
      free_ep: http://app1.example.org/free.txt
      logs_ep: http://app1.example.org/logs.txt
    index:
      name: hostinguard-app1
      doc_type: metrics
  app2:
    analytics:
      access_token: token-2
    control_panel:
      host: whm2.example.org
      username: root
      access_hash: abcdef
      use_ssl: false
    static_resource:
      free_ep: http://app2.example.org/free.txt
      logs_ep: http://app2.example.org/logs.txt
    index:
      name: hostinguard-app2
"#;

    #[test]
    fn defaults_are_layered_under_yaml() {
        let config = Config::from_yaml(TWO_SITES).unwrap();

        assert_eq!(config.listen_address, "127.0.0.1:8000".parse().unwrap());
        assert_eq!(config.logging, LoggingConfig::default());
        assert_eq!(config.elasticsearch.url.as_str(), "http://es.internal:9200/");
        assert_eq!(config.sites.len(), 2);
        assert_eq!(config.sites["app1"].index.doc_type, "metrics");
        assert_eq!(config.sites["app2"].index.doc_type, "_doc");
        assert!(!config.sites["app2"].control_panel.use_ssl);
        config.validate().unwrap();
    }

    #[test]
    fn default_site_needs_to_be_unambiguous() {
        let mut config = Config::from_yaml(TWO_SITES).unwrap();
        assert_eq!(config.default_site_name(), None);

        config.default_site = Some("app2".to_string());
        assert_eq!(config.default_site_name(), Some("app2"));

        config.sites.remove("app1");
        config.default_site = None;
        assert_eq!(config.default_site_name(), Some("app2"));
    }

    #[test]
    fn validation_rejects_bad_configurations() {
        let empty = Config::from_yaml("sites: {}").unwrap();
        assert!(empty.validate().is_err());

        let mut unknown_default = Config::from_yaml(TWO_SITES).unwrap();
        unknown_default.default_site = Some("app3".to_string());
        assert!(unknown_default.validate().is_err());

        let mut no_credentials = Config::from_yaml(TWO_SITES).unwrap();
        if let Some(site) = no_credentials.sites.get_mut("app1") {
            site.control_panel.password = None;
        }
        let err = no_credentials.validate().unwrap_err();
        assert!(err.to_string().contains("whm1.example.org"));
    }

    #[test]
    fn args_override_file_values() {
        let args = Args {
            listen_address: Some("0.0.0.0:9000".parse().unwrap()),
            log_filter: Some("debug".to_string()),
            ..Args::default()
        };
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml))
            .add_source(config::File::from_str(TWO_SITES, config::FileFormat::Yaml))
            .add_source(args)
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.listen_address, "0.0.0.0:9000".parse().unwrap());
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.sites.len(), 2);
    }
}
