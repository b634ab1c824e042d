use crate::{
    collectors::{
        fields::float_field,
        Collector,
    },
    error::GatewayError,
    metrics::{
        LoadAverage,
        MetricsRecord,
    },
};
use eyre::Result;
use hostinguard_config::{
    ControlPanelAuth,
    ControlPanelConfig,
};
use reqwest::{
    header::AUTHORIZATION,
    Client as HttpClient,
};
use serde_json::Value;
use std::{
    future::Future,
    pin::Pin,
};
use url::Url;

const SERVICE: &str = "control panel API";

/// Reads the load average of a host through the WHM / cPanel JSON API.
pub struct ControlPanelCollector {
    config: ControlPanelConfig,
    auth: ControlPanelAuth,
    http_client: HttpClient,
}

impl ControlPanelCollector {
    pub fn new(config: ControlPanelConfig, http_client: HttpClient) -> Result<Self, GatewayError> {
        let auth = config.auth()?;
        Ok(Self {
            config,
            auth,
            http_client,
        })
    }

    fn api_url(&self, command: &str) -> Result<Url, GatewayError> {
        let base = format!(
            "{}://{}:{}/json-api/",
            self.config.scheme(),
            self.config.host,
            self.config.port()
        );
        Ok(Url::parse(&base)?.join(command)?)
    }

    /// Calls a WHM API function and returns its JSON response.
    async fn call(&self, command: &str) -> Result<Value, GatewayError> {
        let request = self.http_client.get(self.api_url(command)?);
        let request = match &self.auth {
            ControlPanelAuth::Password(password) => request.basic_auth(&self.config.username, Some(password)),
            ControlPanelAuth::AccessHash(hash) => {
                request.header(AUTHORIZATION, format!("WHM {}:{}", self.config.username, hash))
            }
        };
        let response = request
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(GatewayError::http(SERVICE))?;
        response.json().await.map_err(GatewayError::http(SERVICE))
    }

    #[instrument(level = "debug", skip(self), fields(host = %self.config.host))]
    pub async fn fetch_load_average(&self) -> Result<LoadAverage, GatewayError> {
        let loadavg = self.call("loadavg").await?;
        Ok(LoadAverage {
            cpu_1: float_field(SERVICE, &loadavg, "one")?,
            cpu_5: float_field(SERVICE, &loadavg, "five")?,
            cpu_15: float_field(SERVICE, &loadavg, "fifteen")?,
        })
    }
}

impl Collector for ControlPanelCollector {
    fn collect(&self) -> Pin<Box<dyn Future<Output = Result<MetricsRecord>> + Send + '_>> {
        Box::pin(async move { Ok(self.fetch_load_average().await?.into()) })
    }

    fn name(&self) -> &'static str {
        "ControlPanelCollector"
    }
}
