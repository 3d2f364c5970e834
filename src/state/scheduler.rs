//! Delay source for report runs.

use std::time::Duration;

/// Waits out the artificial report delay.
pub trait Scheduler {
    fn wait(&self, delay: Duration);
}

/// Blocks the current thread for the full delay.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn wait(&self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

/// Returns immediately. Used by tests and `--no-delay`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
    fn wait(&self, _delay: Duration) {}
}
