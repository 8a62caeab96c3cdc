use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

#[derive(Clone)]
pub struct DeviceMetrics {
    pub polls_ok: IntCounter,
    pub poll_failures: IntCounter,
    pub freq_writes: IntCounter,
    pub devices_loaded: IntGauge,
}

#[derive(Clone)]
pub struct MetricsHub {
    pub registry: Registry,
    pub dev: DeviceMetrics,
}

impl MetricsHub {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();
        let polls_ok = IntCounter::new("vfd_polls_total", "Successful VFD polls")?;
        let poll_failures =
            IntCounter::new("vfd_poll_failures_total", "VFD polls that returned an error")?;
        let freq_writes = IntCounter::new(
            "vfd_freq_writes_total",
            "Frequency set-points written to the drive",
        )?;
        let devices_loaded =
            IntGauge::new("vfd_devices_loaded", "Number of device descriptors loaded")?;
        let dev = DeviceMetrics {
            polls_ok,
            poll_failures,
            freq_writes,
            devices_loaded,
        };
        registry.register(Box::new(dev.polls_ok.clone()))?;
        registry.register(Box::new(dev.poll_failures.clone()))?;
        registry.register(Box::new(dev.freq_writes.clone()))?;
        registry.register(Box::new(dev.devices_loaded.clone()))?;
        Ok(Self { registry, dev })
    }

    pub fn encode_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            return format!("error encoding metrics: {e}");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}
