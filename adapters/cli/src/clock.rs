//! Step sources for the headless host.

use std::{
    thread,
    time::{Duration, Instant},
};

use quiz_defence_simulation::Pacer;

/// Decides how much simulated time each host tick covers.
#[derive(Debug)]
pub(crate) enum Clock {
    /// Every tick advances by the same simulated delta.
    Fixed(Duration),
    /// Ticks follow the wall clock, one frame at a time.
    Realtime {
        /// Wall-clock time slept between frames.
        frame: Duration,
        /// Turns elapsed wall-clock time into clamped steps.
        pacer: Pacer,
    },
}

impl Clock {
    /// Paces ticks against the wall clock, never stepping more than `max_step`.
    pub(crate) fn realtime(frame: Duration, max_step: Duration) -> Self {
        Self::Realtime {
            frame,
            pacer: Pacer::new(max_step, Instant::now()),
        }
    }

    /// Delta for the next tick. Blocks for one frame in real-time mode.
    pub(crate) fn step(&mut self) -> Duration {
        match self {
            Self::Fixed(dt) => *dt,
            Self::Realtime { frame, pacer } => {
                thread::sleep(*frame);
                pacer.advance(Instant::now()).unwrap_or(Duration::ZERO)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_repeats_its_delta() {
        let mut clock = Clock::Fixed(Duration::from_millis(50));
        assert_eq!(clock.step(), Duration::from_millis(50));
        assert_eq!(clock.step(), Duration::from_millis(50));
    }

    #[test]
    fn realtime_steps_track_the_wall_clock_within_the_cap() {
        let mut clock = Clock::realtime(Duration::from_millis(5), Duration::from_millis(100));
        for _ in 0..3 {
            let dt = clock.step();
            assert!(dt >= Duration::from_millis(5), "{dt:?}");
            assert!(dt <= Duration::from_millis(100), "{dt:?}");
        }
    }

    #[test]
    fn realtime_steps_never_exceed_the_cap() {
        let mut clock = Clock::realtime(Duration::from_millis(20), Duration::from_millis(1));
        assert_eq!(clock.step(), Duration::from_millis(1));
    }
}
