use std::time::Duration;

/// Periodic driver for buffer processing.
///
/// The callback invoked on every period is bound when the implementation is
/// constructed; the server only starts and stops it.
pub trait TimerPort: Send {
    fn start(&mut self, period: Duration);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}
