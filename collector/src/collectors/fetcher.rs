use eyre::Result;
use reqwest::Client as HttpClient;
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    time::Duration,
};
use url::Url;

/// Status and body of a plain-text HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextResponse {
    pub status: u16,
    pub body: String,
}

impl TextResponse {
    /// A 200 with a non-empty body; anything else is retried.
    pub fn is_usable(&self) -> bool {
        self.status == 200 && !self.body.is_empty()
    }
}

/// Performs a single GET of a plain-text resource.
pub trait TextSource: Send + Sync {
    fn get<'a>(
        &'a self,
        url: &'a Url,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<TextResponse>> + Send + 'a>>;
}

/// [`TextSource`] backed by a shared reqwest client.
#[derive(Debug, Clone, Default)]
pub struct HttpTextSource {
    http_client: HttpClient,
}

impl HttpTextSource {
    pub fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }
}

impl TextSource for HttpTextSource {
    fn get<'a>(
        &'a self,
        url: &'a Url,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<TextResponse>> + Send + 'a>> {
        Box::pin(async move {
            let response = self.http_client.get(url.clone()).timeout(timeout).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(TextResponse { status, body })
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: u32,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_secs(1),
            multiplier: 2,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Fetches plain-text status reports that may not be ready yet on the
/// server side, backing off exponentially between attempts.
#[derive(Clone)]
pub struct RetryingFetcher {
    source: Arc<dyn TextSource>,
    policy: RetryPolicy,
}

impl RetryingFetcher {
    pub fn new(source: Arc<dyn TextSource>, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Returns the first usable response, or `None` once every attempt has
    /// failed. Exhaustion is not an error.
    #[instrument(level = "debug", skip_all, fields(url = %url))]
    pub async fn fetch_with_retry(&self, url: &Url) -> Option<TextResponse> {
        let mut backoff = self.policy.initial_backoff;

        for attempt in 1..=self.policy.max_attempts {
            match self.source.get(url, self.policy.timeout).await {
                Ok(response) if response.is_usable() => {
                    debug!(attempt, status = response.status, text = %response.body, "Fetched report");
                    return Some(response);
                }
                Ok(response) => {
                    warn!(
                        attempt,
                        status = response.status,
                        empty = response.body.is_empty(),
                        "Report not ready"
                    );
                }
                Err(err) => {
                    warn!(attempt, error = %err, "Report request failed");
                }
            }

            tokio::time::sleep(backoff).await;
            backoff *= self.policy.multiplier;
        }

        warn!(attempts = self.policy.max_attempts, "Giving up on report");
        None
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::test_server;
    use axum::{
        http::StatusCode,
        routing::get,
        Router,
    };
    use eyre::eyre;
    use pretty_assertions::assert_eq;
    use std::{
        collections::VecDeque,
        sync::Mutex,
    };
    use tokio::time::Instant;

    /// Replays canned responses and remembers when it was called.
    pub(crate) struct ScriptedSource {
        responses: Mutex<VecDeque<Result<TextResponse>>>,
        fallback: TextResponse,
        calls: Mutex<Vec<Instant>>,
        timeouts: Mutex<Vec<Duration>>,
    }

    impl ScriptedSource {
        pub(crate) fn new(responses: Vec<Result<TextResponse>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                fallback: response(404, ""),
                calls: Mutex::new(Vec::new()),
                timeouts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn always(response: TextResponse) -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                fallback: response,
                calls: Mutex::new(Vec::new()),
                timeouts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn calls(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().clone()
        }

        pub(crate) fn timeouts(&self) -> Vec<Duration> {
            self.timeouts.lock().unwrap().clone()
        }
    }

    impl TextSource for ScriptedSource {
        fn get<'a>(
            &'a self,
            _url: &'a Url,
            timeout: Duration,
        ) -> Pin<Box<dyn Future<Output = Result<TextResponse>> + Send + 'a>> {
            self.calls.lock().unwrap().push(Instant::now());
            self.timeouts.lock().unwrap().push(timeout);
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(self.fallback.clone()));
            Box::pin(async move { next })
        }
    }

    pub(crate) fn response(status: u16, body: &str) -> TextResponse {
        TextResponse {
            status,
            body: body.to_string(),
        }
    }

    fn url() -> Url {
        Url::parse("http://status.example.org/free.txt").unwrap()
    }

    fn fetcher(source: &Arc<ScriptedSource>) -> RetryingFetcher {
        RetryingFetcher::new(source.clone(), RetryPolicy::default())
    }

    #[tokio::test(start_paused = true)]
    async fn returns_first_usable_response_without_sleeping() {
        let source = Arc::new(ScriptedSource::always(response(200, "this_is_fake_data")));
        let start = Instant::now();

        let fetched = fetcher(&source).fetch_with_retry(&url()).await;

        assert_eq!(fetched, Some(response(200, "this_is_fake_data")));
        assert_eq!(source.calls().len(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_body_is_retried_until_exhausted() {
        let source = Arc::new(ScriptedSource::always(response(200, "")));
        let start = Instant::now();

        let fetched = fetcher(&source).fetch_with_retry(&url()).await;

        assert_eq!(fetched, None);
        assert_eq!(source.calls().len(), 5);
        assert_eq!(start.elapsed(), Duration::from_secs(1 + 2 + 4 + 8 + 16));
        assert_eq!(source.timeouts(), vec![Duration::from_secs(5); 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn bad_status_is_retried_until_exhausted() {
        let source = Arc::new(ScriptedSource::always(response(400, "this_is_fake_data")));

        let fetched = fetcher(&source).fetch_with_retry(&url()).await;

        assert_eq!(fetched, None);
        assert_eq!(source.calls().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_doubles_between_attempts() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(response(503, "")),
            Err(eyre!("connection reset")),
            Ok(response(200, "")),
            Ok(response(404, "not found")),
            Ok(response(200, "Mem: 1 2 3 4 5 6")),
        ]));

        let fetched = fetcher(&source).fetch_with_retry(&url()).await;
        assert_eq!(fetched, Some(response(200, "Mem: 1 2 3 4 5 6")));

        let calls = source.calls();
        let gaps: Vec<_> = calls.windows(2).map(|pair| pair[1] - pair[0]).collect();
        assert_eq!(
            gaps,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
            ]
        );
    }

    fn status_router() -> Router {
        Router::new()
            .route("/free.txt", get(|| async { "Mem: 1 2 3 4 5 6" }))
            .route("/missing.txt", get(|| async { (StatusCode::NOT_FOUND, "not found") }))
            .route(
                "/slow.txt",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    "too late"
                }),
            )
    }

    #[tokio::test]
    async fn http_source_returns_status_and_body() {
        let base_url = test_server::serve(status_router()).await;
        let source = HttpTextSource::new(HttpClient::new());

        let found = source
            .get(&base_url.join("free.txt").unwrap(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(found, response(200, "Mem: 1 2 3 4 5 6"));
        assert!(found.is_usable());

        let missing = source
            .get(&base_url.join("missing.txt").unwrap(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(missing, response(404, "not found"));
        assert!(!missing.is_usable());
    }

    #[tokio::test]
    async fn http_source_times_out() {
        let base_url = test_server::serve(status_router()).await;
        let source = HttpTextSource::new(HttpClient::new());

        let result = source
            .get(&base_url.join("slow.txt").unwrap(), Duration::from_millis(100))
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn timed_out_attempts_are_retried_then_given_up() {
        let base_url = test_server::serve(status_router()).await;
        let policy = RetryPolicy {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(10),
            multiplier: 2,
            timeout: Duration::from_millis(100),
        };
        let fetcher = RetryingFetcher::new(Arc::new(HttpTextSource::new(HttpClient::new())), policy);

        let fetched = fetcher.fetch_with_retry(&base_url.join("slow.txt").unwrap()).await;

        assert_eq!(fetched, None);
    }
}
