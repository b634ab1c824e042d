use crate::{
    collectors::{
        fields::integer_field,
        Collector,
    },
    error::GatewayError,
    metrics::{
        AnalyticsCounters,
        MetricsRecord,
    },
};
use eyre::Result;
use hostinguard_config::AnalyticsConfig;
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::{
    future::Future,
    pin::Pin,
};

const SERVICE: &str = "analytics API";

pub const REAL_TIME_USERS: &str = "rt:activeUsers";
pub const SESSIONS: &str = "ga:sessions";
pub const UNIQUE_USERS: &str = "ga:users";
pub const NEW_USERS: &str = "ga:newUsers";

/// Reads today's visitor counters from the Google Analytics reporting API (v3).
pub struct AnalyticsCollector {
    config: AnalyticsConfig,
    http_client: HttpClient,
}

impl AnalyticsCollector {
    pub fn new(config: AnalyticsConfig, http_client: HttpClient) -> Self {
        Self { config, http_client }
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, GatewayError> {
        let url = self.config.api_url.join(path)?;
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.config.access_token)
            .query(query)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(GatewayError::http(SERVICE))?;
        response.json().await.map_err(GatewayError::http(SERVICE))
    }

    /// The `id` of the first entry of a management listing.
    async fn first_item_id(&self, path: &str, what: &'static str) -> Result<String, GatewayError> {
        let listing = self.get_json(path, &[]).await?;
        listing
            .get("items")
            .and_then(|items| items.get(0))
            .and_then(|item| item.get("id"))
            .and_then(|id| match id {
                Value::String(id) => Some(id.clone()),
                Value::Number(id) => Some(id.to_string()),
                _ => None,
            })
            .ok_or(GatewayError::NoProfile(what))
    }

    /// The configured view, or the first view of the first property of the
    /// first account visible to the credentials.
    async fn profile_id(&self) -> Result<String, GatewayError> {
        if let Some(profile_id) = &self.config.profile_id {
            return Ok(profile_id.clone());
        }

        let account = self
            .first_item_id("analytics/v3/management/accounts", "accounts")
            .await?;
        let property = self
            .first_item_id(
                &format!("analytics/v3/management/accounts/{account}/webproperties"),
                "web properties",
            )
            .await?;
        let profile = self
            .first_item_id(
                &format!("analytics/v3/management/accounts/{account}/webproperties/{property}/profiles"),
                "profiles",
            )
            .await?;
        debug!(%account, %property, %profile, "Discovered analytics profile");
        Ok(profile)
    }

    fn totals(result: &Value) -> Result<&Value, GatewayError> {
        result.get("totalsForAllResults").ok_or_else(|| GatewayError::MissingField {
            service: SERVICE,
            field: "totalsForAllResults".to_string(),
        })
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_analytics(&self) -> Result<AnalyticsCounters, GatewayError> {
        let ids = format!("ga:{}", self.profile_id().await?);

        let realtime = self
            .get_json("analytics/v3/data/realtime", &[("ids", ids.as_str()), ("metrics", REAL_TIME_USERS)])
            .await?;
        let active_users = integer_field(SERVICE, Self::totals(&realtime)?, REAL_TIME_USERS)?;

        let metrics = [SESSIONS, UNIQUE_USERS, NEW_USERS].join(",");
        let daily = self
            .get_json(
                "analytics/v3/data/ga",
                &[
                    ("ids", ids.as_str()),
                    ("start-date", "today"),
                    ("end-date", "today"),
                    ("metrics", metrics.as_str()),
                ],
            )
            .await?;
        let totals = Self::totals(&daily)?;

        Ok(AnalyticsCounters {
            active_users,
            users_cnt: integer_field(SERVICE, totals, SESSIONS)?,
            unique_users_cnt: integer_field(SERVICE, totals, UNIQUE_USERS)?,
            new_users_cnt: integer_field(SERVICE, totals, NEW_USERS)?,
        })
    }
}

impl Collector for AnalyticsCollector {
    fn collect(&self) -> Pin<Box<dyn Future<Output = Result<MetricsRecord>> + Send + '_>> {
        Box::pin(async move { Ok(self.fetch_analytics().await?.into()) })
    }

    fn name(&self) -> &'static str {
        "AnalyticsCollector"
    }
}
