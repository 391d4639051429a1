use crate::error::Result;
use crate::result::{LinkProbe, PageFetchResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;
use url::Url;

const USER_AGENT: &str = concat!("seoscope/", env!("CARGO_PKG_VERSION"));
const MAX_PROBE_HOPS: usize = 10;

/// Retrieves pages and checks links. Failures are values, never errors.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a page body together with its timing, size and headers.
    async fn fetch(&self, url: &str) -> PageFetchResult;

    /// Lightweight existence check that reports the redirect chain length.
    async fn probe(&self, url: &str) -> LinkProbe;
}

pub struct HttpFetcher {
    client: Client,
    probe_client: Client,
    limiter: Option<Arc<Semaphore>>,
    timeout_secs: u64,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let timeout_secs = timeout_secs.max(1);
        let timeout = Duration::from_secs(timeout_secs);
        let connect_timeout = Duration::from_millis(timeout_secs * 500);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        // Redirects are followed by hand so the chain can be counted.
        let probe_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            probe_client,
            limiter: None,
            timeout_secs,
        })
    }

    /// Caps the number of requests this fetcher has outstanding at once.
    pub fn with_request_limit(mut self, max_in_flight: usize) -> Self {
        self.limiter = Some(Arc::new(Semaphore::new(max_in_flight.max(1))));
        self
    }

    async fn permit(&self) -> Option<OwnedSemaphorePermit> {
        match &self.limiter {
            Some(limiter) => limiter.clone().acquire_owned().await.ok(),
            None => None,
        }
    }

    fn describe_error(&self, error: &reqwest::Error) -> String {
        if error.is_timeout() {
            format!("Request timed out after {}s", self.timeout_secs)
        } else if error.is_redirect() {
            "Too many redirects".to_string()
        } else if error.is_connect() {
            format!("Connection failed: {}", error)
        } else {
            error.to_string()
        }
    }

    async fn probe_once(&self, url: &str) -> std::result::Result<(StatusCode, HeaderMap), reqwest::Error> {
        let _permit = self.permit().await;
        let response = self.probe_client.head(url).send().await?;
        let status = response.status();
        if status == StatusCode::METHOD_NOT_ALLOWED || status == StatusCode::NOT_IMPLEMENTED {
            let response = self.probe_client.get(url).send().await?;
            return Ok((response.status(), response.headers().clone()));
        }
        Ok((status, response.headers().clone()))
    }
}

fn collect_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut collected: HashMap<String, String> = HashMap::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    collected
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> PageFetchResult {
        debug!("Fetching {}", url);
        let _permit = self.permit().await;

        let start = Instant::now();
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                return PageFetchResult::with_error(url.to_string(), self.describe_error(&e))
                    .with_load_time(start.elapsed().as_millis() as u64);
            }
        };

        let status = response.status();
        if !status.is_success() {
            return PageFetchResult::with_error(url.to_string(), format!("HTTP {}", status.as_u16()))
                .with_status(status.as_u16())
                .with_load_time(start.elapsed().as_millis() as u64);
        }

        let headers = collect_headers(response.headers());
        match response.text().await {
            Ok(body) => PageFetchResult::success(
                url.to_string(),
                status.as_u16(),
                body,
                headers,
                start.elapsed().as_millis() as u64,
            ),
            Err(e) => PageFetchResult::with_error(url.to_string(), self.describe_error(&e))
                .with_status(status.as_u16())
                .with_load_time(start.elapsed().as_millis() as u64),
        }
    }

    async fn probe(&self, url: &str) -> LinkProbe {
        let mut current = url.to_string();
        let mut redirects = 0;

        loop {
            let (status, headers) = match self.probe_once(&current).await {
                Ok(answer) => answer,
                Err(e) => {
                    return LinkProbe::with_error(url.to_string(), redirects, self.describe_error(&e));
                }
            };

            if !status.is_redirection() {
                return LinkProbe::new(url.to_string(), status.as_u16(), redirects, current);
            }

            let next = headers
                .get(LOCATION)
                .and_then(|location| location.to_str().ok())
                .and_then(|location| Url::parse(&current).ok()?.join(location).ok());

            let Some(next) = next else {
                // A redirect without a usable Location is the final answer.
                return LinkProbe::new(url.to_string(), status.as_u16(), redirects, current);
            };

            redirects += 1;
            if redirects > MAX_PROBE_HOPS {
                return LinkProbe::with_error(
                    url.to_string(),
                    redirects,
                    "Too many redirects".to_string(),
                );
            }
            debug!("Probe {} redirected to {} (hop {})", url, next, redirects);
            current = next.to_string();
        }
    }
}
