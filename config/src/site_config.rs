use serde::Deserialize;
use url::Url;

/// Everything needed to collect and store the metrics of one monitored site.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SiteConfig {
    pub analytics: AnalyticsConfig,
    pub control_panel: ControlPanelConfig,
    pub static_resource: StaticResourceConfig,
    pub index: IndexConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AnalyticsConfig {
    #[serde(default = "default_analytics_api_url")]
    pub api_url: Url,
    /// OAuth bearer token issued for the analytics read-only scope.
    pub access_token: String,
    /// View to query. When unset the first view of the first account is used.
    #[serde(default)]
    pub profile_id: Option<String>,
}

fn default_analytics_api_url() -> Url {
    Url::parse("https://www.googleapis.com").expect("static url")
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ControlPanelConfig {
    pub host: String,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub access_hash: Option<String>,
    #[serde(default = "default_true")]
    pub use_ssl: bool,
    /// Talk to the cPanel ports instead of the WHM ones.
    #[serde(default)]
    pub cpanel: bool,
    /// Overrides the port derived from `cpanel` and `use_ssl`.
    #[serde(default)]
    pub port: Option<u16>,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlPanelAuth {
    Password(String),
    AccessHash(String),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("control panel for {0:?} needs either a password or an access hash")]
    Missing(String),
    #[error("control panel for {0:?} accepts a password or an access hash, not both")]
    Ambiguous(String),
    #[error("access hash authentication is not supported on cPanel ports ({0:?})")]
    AccessHashOnCpanel(String),
}

impl ControlPanelConfig {
    pub fn auth(&self) -> Result<ControlPanelAuth, CredentialsError> {
        match (&self.password, &self.access_hash) {
            (None, None) => Err(CredentialsError::Missing(self.host.clone())),
            (Some(_), Some(_)) => Err(CredentialsError::Ambiguous(self.host.clone())),
            (None, Some(_)) if self.cpanel => Err(CredentialsError::AccessHashOnCpanel(self.host.clone())),
            (None, Some(hash)) => Ok(ControlPanelAuth::AccessHash(hash.replace('\n', ""))),
            (Some(password), None) => Ok(ControlPanelAuth::Password(password.clone())),
        }
    }

    pub fn scheme(&self) -> &'static str {
        if self.use_ssl {
            "https"
        } else {
            "http"
        }
    }

    pub fn port(&self) -> u16 {
        if let Some(port) = self.port {
            return port;
        }
        match (self.cpanel, self.use_ssl) {
            (true, true) => 2083,
            (true, false) => 2082,
            (false, true) => 2087,
            (false, false) => 2086,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StaticResourceConfig {
    /// Serves the output of `free -m`.
    pub free_ep: Url,
    /// Serves the per-status-code request counts of today's access log.
    pub logs_ep: Url,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct IndexConfig {
    pub name: String,
    #[serde(default = "default_doc_type")]
    pub doc_type: String,
}

fn default_doc_type() -> String {
    "_doc".to_string()
}
