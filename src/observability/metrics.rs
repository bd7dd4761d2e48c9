use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;


// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the process-wide `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}

/// Text exposition of every registered metric.
pub async fn render() -> anyhow::Result<String> {
    let metrics = get_metrics().await;
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&metrics.registry.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Exchange metrics
    pub exchange_requests: IntCounterVec,
    pub exchange_failures: IntCounterVec,
    pub exchange_duration: HistogramVec,

    // Metadata service metrics
    pub metadata_requests: IntCounterVec,

    // Cache metrics
    pub cache_hits: IntCounter,
    pub cache_refreshes: IntCounter,
    pub token_expiry_unix: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("prismatoken".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Exchange
            exchange_requests: IntCounterVec::new(Opts::new("exchange_requests_total", "Total issue requests by realm"),&["realm"],).unwrap(),
            exchange_failures: IntCounterVec::new(Opts::new("exchange_failures_total", "Issue failures by reason"),&["realm", "reason"],).unwrap(),
            exchange_duration: HistogramVec::new(HistogramOpts::new("exchange_duration_seconds", "Issue request duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),&["realm"],).unwrap(),

            // Metadata
            metadata_requests: IntCounterVec::new(Opts::new("metadata_requests_total", "Instance metadata calls by provider and step"),&["provider", "step"],).unwrap(),

            // Cache
            cache_hits: IntCounter::new("cache_hits_total", "Token requests served from cache").unwrap(),
            cache_refreshes: IntCounter::new("cache_refreshes_total", "Tokens stored after a successful exchange").unwrap(),
            token_expiry_unix: IntGauge::new("token_expiry_unix_seconds", "Expiry of the most recently cached token").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.exchange_requests.clone())).unwrap();
        reg.register(Box::new(metrics.exchange_failures.clone())).unwrap();
        reg.register(Box::new(metrics.exchange_duration.clone())).unwrap();
        reg.register(Box::new(metrics.metadata_requests.clone())).unwrap();
        reg.register(Box::new(metrics.cache_hits.clone())).unwrap();
        reg.register(Box::new(metrics.cache_refreshes.clone())).unwrap();
        reg.register(Box::new(metrics.token_expiry_unix.clone())).unwrap();

        metrics
    }
}
