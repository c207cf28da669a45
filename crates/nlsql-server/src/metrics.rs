//! Prometheus counters for conversions

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Instant;

/// Service-owned registry, rendered at `/metrics`
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    conversions: IntCounterVec,
    duration: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let conversions = IntCounterVec::new(
            Opts::new("nlsql_conversions_total", "Conversions by outcome"),
            &["outcome"],
        )?;
        let duration = Histogram::with_opts(HistogramOpts::new(
            "nlsql_conversion_duration_seconds",
            "Time spent translating and executing a question",
        ))?;

        registry.register(Box::new(conversions.clone()))?;
        registry.register(Box::new(duration.clone()))?;

        Ok(Self {
            registry,
            conversions,
            duration,
        })
    }

    /// Record one conversion; `outcome` is `success` or an error kind
    pub fn record(&self, outcome: &str, seconds: f64) {
        self.conversions.with_label_values(&[outcome]).inc();
        self.duration.observe(seconds);
    }

    pub fn timer(&self) -> ConversionTimer<'_> {
        ConversionTimer {
            metrics: self,
            start: Instant::now(),
        }
    }

    /// Text exposition format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

/// Measures one conversion from creation to [`finish`](Self::finish)
pub struct ConversionTimer<'a> {
    metrics: &'a Metrics,
    start: Instant,
}

impl ConversionTimer<'_> {
    pub fn finish(self, outcome: &str) {
        self.metrics
            .record(outcome, self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_counts_outcomes() {
        let metrics = Metrics::new().unwrap();
        metrics.record("success", 0.01);
        metrics.record("success", 0.02);
        metrics.timer().finish("no_match");

        let text = metrics.render().unwrap();
        assert!(text.contains(r#"nlsql_conversions_total{outcome="success"} 2"#));
        assert!(text.contains(r#"nlsql_conversions_total{outcome="no_match"} 1"#));
        assert!(text.contains("nlsql_conversion_duration_seconds_count 3"));
    }

    #[test]
    fn test_registries_are_independent() {
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.record("success", 0.0);
        assert!(!b.render().unwrap().contains(r#"outcome="success""#));
    }
}
