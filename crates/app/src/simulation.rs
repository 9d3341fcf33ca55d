//! Synthetic snapshot generator for simulation mode.
//!
//! Draws each metric from the bounded ranges the dashboard expects:
//! temperature 25–35 °C, humidity 30–60 %, pm2.5 10–50 µg/m³, gas with
//! ~20 % probability, AQI 20–180. Backed by a small seeded LCG so tests
//! are deterministic without an external RNG dependency.

use airhub_domain::snapshot::SensorSnapshot;

/// Seeded generator of plausible sensor snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotGenerator {
    state: u64,
}

impl SnapshotGenerator {
    /// Create a generator from an explicit seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Create a generator seeded from the system clock.
    #[must_use]
    pub fn from_entropy() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        Self::new(u64::from(nanos) | 1)
    }

    fn next_u64(&mut self) -> u64 {
        // LCG parameters from Numerical Recipes
        self.state = self.state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        self.state
    }

    /// Uniform draw in `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 40) as f64 / (1u64 << 24) as f64
    }

    /// Uniform integer-valued draw in `[lo, hi)`.
    fn in_range(&mut self, lo: f64, hi: f64) -> f64 {
        (self.next_f64() * (hi - lo) + lo).floor()
    }

    /// Produce the next synthetic snapshot, observed now.
    pub fn next_snapshot(&mut self) -> SensorSnapshot {
        let temperature = self.in_range(25.0, 35.0);
        let humidity = self.in_range(30.0, 60.0);
        let pm25 = self.in_range(10.0, 50.0);
        let gas_detected = self.next_f64() > 0.8;
        #[allow(clippy::cast_possible_truncation)]
        let aqi = self.in_range(20.0, 180.0) as i64;
        SensorSnapshot::new(temperature, humidity, pm25, gas_detected, aqi)
    }
}
