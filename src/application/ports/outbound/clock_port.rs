/// Source of simulated time
///
/// The export pipeline only reads the clock; advancing it belongs to the
/// simulation.
pub trait ClockPort: Send + Sync {
    /// Current simulated time in milliseconds
    fn current_time_millis(&self) -> i64;
}
