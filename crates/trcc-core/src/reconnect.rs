//! Reconnection with exponential backoff for device communication failures.
//!
//! When a device becomes unreachable (unplugged, USB subsystem hiccup,
//! etc.), this state machine manages retry timing so callers — the HR10
//! daemon's loop, or a CLI watch command — don't hammer the bus.

use std::time::{Duration, Instant};

/// Configuration for reconnection backoff.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Reconnection state machine with exponential backoff.
#[derive(Debug)]
pub struct ReconnectState {
    config: ReconnectConfig,
    current_delay: Duration,
    last_attempt: Option<Instant>,
    consecutive_failures: u32,
}

impl ReconnectState {
    pub fn new(config: ReconnectConfig) -> Self {
        Self {
            current_delay: config.initial_delay,
            config,
            last_attempt: None,
            consecutive_failures: 0,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(ReconnectConfig::default())
    }

    /// Whether enough time has elapsed to attempt reconnection.
    pub fn should_attempt(&self) -> bool {
        match self.last_attempt {
            None => true,
            Some(last) => last.elapsed() >= self.current_delay,
        }
    }

    pub fn record_failure(&mut self) {
        self.consecutive_failures += 1;
        self.last_attempt = Some(Instant::now());
        let next = self.current_delay.as_secs_f64() * self.config.multiplier;
        self.current_delay = Duration::from_secs_f64(next).min(self.config.max_delay);
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.current_delay = self.config.initial_delay;
        self.last_attempt = None;
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn current_delay(&self) -> Duration {
        self.current_delay
    }
}

/// Attempt to re-open a sender for `descriptor`, respecting backoff timing.
/// Returns `None` without attempting if the backoff timer hasn't elapsed.
pub fn try_reopen(
    state: &mut ReconnectState,
    cache: &crate::sender::SenderCache,
    descriptor: &crate::models::DeviceDescriptor,
) -> Option<std::sync::Arc<std::sync::Mutex<crate::sender::Sender>>> {
    if !state.should_attempt() {
        return None;
    }
    match cache.get_sender(descriptor) {
        Ok(sender) => {
            state.record_success();
            Some(sender)
        }
        Err(e) => {
            state.record_failure();
            log::warn!(
                "reconnect failed: {e} (attempt {}, retry in {:.1}s)",
                state.consecutive_failures(),
                state.current_delay().as_secs_f64()
            );
            None
        }
    }
}
