use once_cell::sync::Lazy;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use std::time::Duration;

pub static METRICS: Lazy<CourtsideMetrics> = Lazy::new(CourtsideMetrics::init);

pub struct CourtsideMetrics {
    pub registry: Registry,
    pub queries_total: IntCounter,
    pub query_errors_total: IntCounter,
    pub query_duration: Histogram,
    pub pool_wait_duration: Histogram,
}

impl CourtsideMetrics {
    pub fn init() -> Self {
        let registry = Registry::new_custom(Some("courtside".to_string()), None)
            .expect("failed to build prometheus registry");

        let queries_total = IntCounter::new("queries_total", "Total statements executed")
            .expect("failed to build queries_total");
        let query_errors_total =
            IntCounter::new("query_errors_total", "Statements that failed in the engine")
                .expect("failed to build query_errors_total");
        let query_duration = Histogram::with_opts(HistogramOpts::new(
            "query_duration_seconds",
            "Duration of statements",
        ))
        .expect("failed to build query_duration_seconds");
        let pool_wait_duration = Histogram::with_opts(HistogramOpts::new(
            "pool_wait_seconds",
            "Time spent waiting for a pooled connection",
        ))
        .expect("failed to build pool_wait_seconds");

        for collector in [
            Box::new(queries_total.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(query_errors_total.clone()),
            Box::new(query_duration.clone()),
            Box::new(pool_wait_duration.clone()),
        ] {
            registry
                .register(collector)
                .expect("metric registered twice");
        }

        Self {
            registry,
            queries_total,
            query_errors_total,
            query_duration,
            pool_wait_duration,
        }
    }

    pub fn record_query(&self, elapsed: Duration) {
        self.queries_total.inc();
        self.query_duration.observe(elapsed.as_secs_f64());
    }

    pub fn record_query_error(&self) {
        self.query_errors_total.inc();
    }

    pub fn observe_pool_wait(&self, waited: Duration) {
        self.pool_wait_duration.observe(waited.as_secs_f64());
    }

    /// Text exposition of every registered metric.
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            log::error!("failed to encode metrics: {e}");
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
