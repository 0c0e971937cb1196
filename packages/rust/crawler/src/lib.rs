//! Crawl orchestrator: a configured source list in, knowledge records out.
//!
//! Sources are fetched with bounded parallelism and a per-source deadline.
//! Failures are isolated: one unreachable or malformed source is logged and
//! skipped, never aborting the batch. The resulting records preserve the
//! configured source order regardless of completion order, so the same
//! source list always yields the same snapshot shape.

pub mod extract;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use askbase_shared::{AskbaseError, CrawlConfig, KnowledgeRecord, Result};

/// User-Agent string for source fetches.
const USER_AGENT: &str = concat!("askbase/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// CrawlReport
// ---------------------------------------------------------------------------

/// Outcome of one harvest run over the configured source list.
///
/// A harvest itself never fails — even a run where every source errored
/// produces a report with an empty record set, signaling "no data" rather
/// than crashing the caller.
#[derive(Debug)]
pub struct CrawlReport {
    /// Records for the sources that succeeded, in configured order.
    pub records: Vec<KnowledgeRecord>,
    /// Failed sources as `(source, cause)` pairs.
    pub failures: Vec<(String, String)>,
    /// Total wall-clock time of the run.
    pub duration: Duration,
}

// ---------------------------------------------------------------------------
// SourceCrawler
// ---------------------------------------------------------------------------

/// Fetches a fixed list of sources and extracts their text content.
pub struct SourceCrawler {
    config: CrawlConfig,
    client: Client,
}

impl SourceCrawler {
    /// Create a crawler with the given configuration.
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(config.timeout)
            .build()
            .map_err(|e| AskbaseError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Visit every source in `sources`, in order, and collect a record per
    /// success.
    ///
    /// Fetches run concurrently up to the configured limit; results are
    /// assembled by awaiting the per-source tasks in spawn order, which keeps
    /// the record sequence aligned with the configured order. Each source is
    /// bounded by the per-source timeout, counted as a failure when it
    /// elapses.
    #[instrument(skip_all, fields(sources = sources.len()))]
    pub async fn harvest(&self, sources: &[String]) -> CrawlReport {
        let start = std::time::Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency as usize));

        info!(
            concurrency = self.config.concurrency,
            timeout_ms = self.config.timeout.as_millis() as u64,
            "starting harvest"
        );

        let mut handles = Vec::with_capacity(sources.len());
        for source in sources {
            let client = self.client.clone();
            let sem = semaphore.clone();
            let url = source.clone();
            let selector = self.config.content_selector.clone();
            let deadline = self.config.timeout;

            handles.push(tokio::spawn(async move {
                let _permit = sem.acquire().await.expect("semaphore closed");
                match tokio::time::timeout(deadline, fetch_source(&client, &url, &selector)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(AskbaseError::Network(format!(
                        "{url}: timed out after {}s",
                        deadline.as_secs_f64()
                    ))),
                }
            }));
        }

        let mut records = Vec::new();
        let mut failures = Vec::new();

        // Awaiting in spawn order preserves the configured source order.
        for (handle, source) in handles.into_iter().zip(sources) {
            match handle.await {
                Ok(Ok(content)) => {
                    debug!(source = %source, chars = content.chars().count(), "source fetched");
                    records.push(KnowledgeRecord::new(source.clone(), content));
                }
                Ok(Err(e)) => {
                    warn!(source = %source, error = %e, "source failed, skipping");
                    failures.push((source.clone(), e.to_string()));
                }
                Err(e) => {
                    warn!(source = %source, error = %e, "fetch task panicked, skipping");
                    failures.push((source.clone(), e.to_string()));
                }
            }
        }

        let report = CrawlReport {
            records,
            failures,
            duration: start.elapsed(),
        };

        info!(
            fetched = report.records.len(),
            failed = report.failures.len(),
            duration_ms = report.duration.as_millis() as u64,
            "harvest completed"
        );

        report
    }
}

// ---------------------------------------------------------------------------
// Source fetching
// ---------------------------------------------------------------------------

/// Fetch one source and extract its text content.
async fn fetch_source(client: &Client, url: &str, selector: &str) -> Result<String> {
    debug!(%url, "fetching source");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AskbaseError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AskbaseError::Network(format!("{url}: HTTP {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| AskbaseError::Network(format!("{url}: body read failed: {e}")))?;

    extract::extract_text(&body, selector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> CrawlConfig {
        CrawlConfig {
            concurrency: 4,
            timeout: Duration::from_secs(5),
            content_selector: String::new(),
        }
    }

    async fn mount_page(server: &MockServer, route: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    fn page(text: &str) -> String {
        format!("<html><body><main><p>{text}</p></main></body></html>")
    }

    #[tokio::test]
    async fn harvest_collects_records_in_configured_order() {
        let server = MockServer::start().await;
        mount_page(&server, "/laptops", &page("Laptop listings")).await;
        mount_page(&server, "/phones", &page("Phone listings")).await;
        mount_page(&server, "/tablets", &page("Tablet listings")).await;

        let sources = vec![
            format!("{}/laptops", server.uri()),
            format!("{}/phones", server.uri()),
            format!("{}/tablets", server.uri()),
        ];

        let crawler = SourceCrawler::new(test_config()).unwrap();
        let report = crawler.harvest(&sources).await;

        assert_eq!(report.records.len(), 3);
        assert!(report.failures.is_empty());
        assert_eq!(report.records[0].source, sources[0]);
        assert_eq!(report.records[1].source, sources[1]);
        assert_eq!(report.records[2].source, sources[2]);
        assert!(report.records[0].content.contains("Laptop listings"));
    }

    #[tokio::test]
    async fn one_failing_source_does_not_abort_the_batch() {
        let server = MockServer::start().await;
        mount_page(&server, "/a", &page("Alpha")).await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_page(&server, "/c", &page("Gamma")).await;

        let sources = vec![
            format!("{}/a", server.uri()),
            format!("{}/b", server.uri()),
            format!("{}/c", server.uri()),
        ];

        let crawler = SourceCrawler::new(test_config()).unwrap();
        let report = crawler.harvest(&sources).await;

        // Exactly N-K records, relative order preserved, no placeholder for /b.
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].source, sources[0]);
        assert_eq!(report.records[1].source, sources[2]);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, sources[1]);
        assert!(report.failures[0].1.contains("HTTP 500"));
    }

    #[tokio::test]
    async fn total_failure_yields_empty_report() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let sources = vec![format!("{}/x", server.uri()), format!("{}/y", server.uri())];

        let crawler = SourceCrawler::new(test_config()).unwrap();
        let report = crawler.harvest(&sources).await;

        assert!(report.records.is_empty());
        assert_eq!(report.failures.len(), 2);
    }

    #[tokio::test]
    async fn slow_source_times_out_without_blocking_siblings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(page("Too late"))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;
        mount_page(&server, "/fast", &page("On time")).await;

        let sources = vec![
            format!("{}/slow", server.uri()),
            format!("{}/fast", server.uri()),
        ];

        let config = CrawlConfig {
            concurrency: 2,
            timeout: Duration::from_millis(300),
            content_selector: String::new(),
        };
        let crawler = SourceCrawler::new(config).unwrap();
        let report = crawler.harvest(&sources).await;

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].source, sources[1]);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].1.contains("timed out"));
    }

    #[tokio::test]
    async fn configured_selector_applies_during_harvest() {
        let server = MockServer::start().await;
        let body = r#"<html><body>
            <div class="card"><p>Product A</p></div>
            <div class="card"><p>Product B</p></div>
            <footer>Site chrome</footer>
        </body></html>"#;
        mount_page(&server, "/catalog", body).await;

        let sources = vec![format!("{}/catalog", server.uri())];
        let config = CrawlConfig {
            content_selector: ".card".into(),
            ..test_config()
        };

        let crawler = SourceCrawler::new(config).unwrap();
        let report = crawler.harvest(&sources).await;

        assert_eq!(report.records.len(), 1);
        let content = &report.records[0].content;
        assert!(content.contains("Product A"));
        assert!(content.contains("Product B"));
        assert!(!content.contains("Site chrome"));
    }

    #[tokio::test]
    async fn unreachable_host_is_an_isolated_failure() {
        let server = MockServer::start().await;
        mount_page(&server, "/ok", &page("Fine")).await;

        let sources = vec![
            "http://127.0.0.1:1/unroutable".to_string(),
            format!("{}/ok", server.uri()),
        ];

        let crawler = SourceCrawler::new(test_config()).unwrap();
        let report = crawler.harvest(&sources).await;

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].source, sources[1]);
        assert_eq!(report.failures.len(), 1);
    }
}
