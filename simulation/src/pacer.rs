//! Wall-clock pacing for interactive drivers.

use std::time::{Duration, Instant};

use log::info;

/// Converts wall-clock instants into bounded simulation steps.
///
/// While paused no time accrues. Resuming re-anchors the clock so the pause
/// never arrives as one large step.
#[derive(Clone, Copy, Debug)]
pub struct Pacer {
    max_step: Duration,
    anchor: Option<Instant>,
}

impl Pacer {
    /// Creates a running pacer anchored at `now`.
    #[must_use]
    pub fn new(max_step: Duration, now: Instant) -> Self {
        Self {
            max_step,
            anchor: Some(now),
        }
    }

    /// Reports whether the pacer is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.anchor.is_none()
    }

    /// Stops accruing time.
    pub fn pause(&mut self) {
        if self.anchor.take().is_some() {
            info!("simulation paused");
        }
    }

    /// Restarts the clock from `now`.
    pub fn resume(&mut self, now: Instant) {
        if self.anchor.is_none() {
            info!("simulation resumed");
            self.anchor = Some(now);
        }
    }

    /// Returns the step to simulate for the time elapsed since the last call.
    ///
    /// `None` while paused. Elapsed time beyond the maximum step is dropped.
    pub fn advance(&mut self, now: Instant) -> Option<Duration> {
        let anchor = self.anchor.as_mut()?;
        let elapsed = now.saturating_duration_since(*anchor);
        *anchor = now;
        Some(elapsed.min(self.max_step))
    }
}
