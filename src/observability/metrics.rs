use prometheus::{Encoder, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub matches_total: IntCounterVec,
    pub match_latency_seconds: HistogramVec,
    pub rides_pending: IntGauge,
    pub drivers_available: IntGauge,
    pub ride_transitions_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let matches_total = IntCounterVec::new(
            Opts::new("matches_total", "Match attempts by outcome"),
            &["outcome"],
        )
        .expect("valid matches_total metric");

        let match_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "match_latency_seconds",
                "Latency of a single match attempt in seconds",
            ),
            &["outcome"],
        )
        .expect("valid match_latency_seconds metric");

        let rides_pending = IntGauge::new(
            "rides_pending",
            "Requested rides currently parked on the match queue",
        )
        .expect("valid rides_pending metric");

        let drivers_available = IntGauge::new(
            "drivers_available",
            "Drivers currently marked available for matching",
        )
        .expect("valid drivers_available metric");

        let ride_transitions_total = IntCounterVec::new(
            Opts::new("ride_transitions_total", "Applied transitions by target status"),
            &["target"],
        )
        .expect("valid ride_transitions_total metric");

        registry
            .register(Box::new(matches_total.clone()))
            .expect("register matches_total");
        registry
            .register(Box::new(match_latency_seconds.clone()))
            .expect("register match_latency_seconds");
        registry
            .register(Box::new(rides_pending.clone()))
            .expect("register rides_pending");
        registry
            .register(Box::new(drivers_available.clone()))
            .expect("register drivers_available");
        registry
            .register(Box::new(ride_transitions_total.clone()))
            .expect("register ride_transitions_total");

        Self {
            registry,
            matches_total,
            match_latency_seconds,
            rides_pending,
            drivers_available,
            ride_transitions_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
