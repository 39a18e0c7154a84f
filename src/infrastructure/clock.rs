//! Simulated clock shared between the simulation driver and the exporter

use std::sync::atomic::{AtomicI64, Ordering};

use crate::application::ports::outbound::ClockPort;

/// Monotonic simulated clock advanced by the simulation loop
#[derive(Debug, Default)]
pub struct SimulationClock {
    millis: AtomicI64,
}

impl SimulationClock {
    /// Advance by `delta_millis`, returning the new time
    pub fn advance(&self, delta_millis: i64) -> i64 {
        self.millis.fetch_add(delta_millis, Ordering::SeqCst) + delta_millis
    }
}

impl ClockPort for SimulationClock {
    fn current_time_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}
