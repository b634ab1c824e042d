use crate::{
    error::AppError,
    health,
    trigger,
};
use axum::{
    routing::{
        get,
        post,
    },
    Router,
};
use eyre::{
    Context as _,
    Result,
};
use hostinguard_collector::{
    Collector,
    DocumentStore,
    ElasticsearchStore,
    Orchestrator,
};
use hostinguard_config::Config;
use reqwest::Client as HttpClient;
use std::{
    collections::BTreeMap,
    sync::Arc,
};

/// What a trigger of one site runs: its collectors and where the result goes.
#[derive(Clone)]
pub struct Site {
    pub collector: Arc<dyn Collector>,
    pub store: Arc<dyn DocumentStore>,
}

impl Site {
    pub fn new(collector: impl Collector + 'static, store: impl DocumentStore + 'static) -> Self {
        Self {
            collector: Arc::new(collector),
            store: Arc::new(store),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    sites: Arc<BTreeMap<String, Site>>,
    default_site: Option<String>,
}

impl AppState {
    pub fn new(sites: BTreeMap<String, Site>, default_site: Option<String>) -> Self {
        Self {
            sites: Arc::new(sites),
            default_site,
        }
    }

    /// Wires the collectors and the Elasticsearch index of every configured site.
    pub fn from_config(config: &Config, http_client: HttpClient) -> Result<Self> {
        let mut sites = BTreeMap::new();
        for (name, site_config) in &config.sites {
            let orchestrator = Orchestrator::for_site(site_config, http_client.clone())
                .wrap_err_with(|| format!("Failed to set up the collectors of site {name:?}"))?;
            let store = ElasticsearchStore::new(
                config.elasticsearch.url.clone(),
                site_config.index.clone(),
                http_client.clone(),
            );
            debug!(site = %name, collectors = ?orchestrator.collector_names(), "Site ready");
            sites.insert(name.clone(), Site::new(orchestrator, store));
        }
        Ok(Self::new(sites, config.default_site_name().map(String::from)))
    }

    pub fn site(&self, name: &str) -> Result<&Site, AppError> {
        self.sites.get(name).ok_or_else(|| AppError::UnknownSite(name.to_string()))
    }

    pub fn default_site(&self) -> Result<(&str, &Site), AppError> {
        let name = self.default_site.as_deref().ok_or(AppError::NoDefaultSite)?;
        Ok((name, self.site(name)?))
    }

    pub fn site_names(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(String::as_str)
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::handler))
        .route("/hostinguard-update", post(trigger::default_site_handler))
        .route("/{site}/hostinguard-update", post(trigger::site_handler))
        .with_state(state)
}
