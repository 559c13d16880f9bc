/// Prometheus metrics for the prediction service.
///
/// Metrics live in a crate-local registry and are exposed in text format at
/// `GET /metrics`. Counters are updated even before `init_metrics` runs; they
/// only show up in the exposition once registered.
///
/// # Example
/// ```no_run
/// use rkt_predictor::metrics::PREDICTIONS_TOTAL;
///
/// PREDICTIONS_TOTAL.with_label_values(&["2"]).inc();
/// ```

use lazy_static::lazy_static;
use prometheus::{CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry};

lazy_static! {
    /// Registry for all service metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Successful predictions
    ///
    /// Labels: kategori
    pub static ref PREDICTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("predictions_total", "Total number of successful predictions")
            .namespace("rkt_predictor"),
        &["kategori"]
    ).expect("Failed to create PREDICTIONS_TOTAL metric");

    /// Failed prediction requests
    ///
    /// Labels: kind (validation, model_unavailable, prediction_failed)
    pub static ref PREDICTION_ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("prediction_errors_total", "Total number of failed prediction requests")
            .namespace("rkt_predictor"),
        &["kind"]
    ).expect("Failed to create PREDICTION_ERRORS_TOTAL metric");

    /// Model call latency in seconds
    pub static ref PREDICTION_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "prediction_duration_seconds",
            "Time spent in the model predict call"
        )
        .namespace("rkt_predictor")
        .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0])
    ).expect("Failed to create PREDICTION_DURATION_SECONDS metric");

    /// 1 when a model was loaded at startup, 0 otherwise
    pub static ref MODEL_LOADED: Gauge = Gauge::with_opts(
        Opts::new("model_loaded", "Whether a model artifact is loaded")
            .namespace("rkt_predictor")
    ).expect("Failed to create MODEL_LOADED metric");
}

/// Register all metrics with the registry.
///
/// Safe to call more than once; metrics that are already registered are skipped.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    register(Box::new(PREDICTIONS_TOTAL.clone()))?;
    register(Box::new(PREDICTION_ERRORS_TOTAL.clone()))?;
    register(Box::new(PREDICTION_DURATION_SECONDS.clone()))?;
    register(Box::new(MODEL_LOADED.clone()))?;

    tracing::debug!("Prometheus metrics registered");
    Ok(())
}

fn register(collector: Box<dyn prometheus::core::Collector>) -> Result<(), prometheus::Error> {
    match PROMETHEUS_REGISTRY.register(collector) {
        Ok(()) | Err(prometheus::Error::AlreadyReg) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Encode all registered metrics in Prometheus text format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initialization_is_idempotent() {
        assert!(init_metrics().is_ok());
        assert!(init_metrics().is_ok());
    }

    #[test]
    fn test_prediction_counters() {
        init_metrics().unwrap();

        PREDICTIONS_TOTAL.with_label_values(&["3"]).inc();
        PREDICTION_ERRORS_TOTAL
            .with_label_values(&["model_unavailable"])
            .inc();

        let output = gather_metrics();
        assert!(output.contains("rkt_predictor_predictions_total"));
        assert!(output.contains("rkt_predictor_prediction_errors_total"));
        assert!(output.contains("rkt_predictor_model_loaded"));
    }
}
