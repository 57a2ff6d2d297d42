use anyhow::Result;
use prometheus::{IntCounterVec, Opts, Registry, TextEncoder};

/// Upload and query counters, registered on a registry owned by the service
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    uploads: IntCounterVec,
    queries: IntCounterVec,
}

impl Metrics {
    pub fn new(namespace: &str) -> Result<Self> {
        let registry = Registry::new();

        let uploads = IntCounterVec::new(
            Opts::new("uploads_total", "Document uploads by kind and outcome").namespace(namespace),
            &["kind", "outcome"],
        )?;
        let queries = IntCounterVec::new(
            Opts::new("queries_total", "Build queries answered").namespace(namespace),
            &["query"],
        )?;

        registry.register(Box::new(uploads.clone()))?;
        registry.register(Box::new(queries.clone()))?;

        Ok(Self {
            registry,
            uploads,
            queries,
        })
    }

    pub fn record_upload(&self, kind: &str, succeeded: bool) {
        let outcome = if succeeded { "success" } else { "failure" };
        self.uploads.with_label_values(&[kind, outcome]).inc();
    }

    pub fn record_query(&self, query: &str) {
        self.queries.with_label_values(&[query]).inc();
    }

    pub fn encode(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        Ok(encoder.encode_to_string(&self.registry.gather())?)
    }
}
