//! Bookkeeping for the wave currently in flight.

use quiz_defence_core::WaveIndex;

#[derive(Clone, Debug, Default)]
pub(crate) struct WaveProgress {
    started: u32,
    current: Option<WaveIndex>,
    pending_spawns: u32,
    clear_announced: bool,
}

impl WaveProgress {
    /// Number of waves started since the run began.
    pub(crate) fn started(&self) -> u32 {
        self.started
    }

    pub(crate) fn begin(&mut self, wave: WaveIndex, total_spawns: u32) {
        self.started = self.started.saturating_add(1);
        self.current = Some(wave);
        self.pending_spawns = total_spawns;
        self.clear_announced = false;
    }

    /// Consumes one pending spawn of `wave`, reporting whether one was available.
    pub(crate) fn record_spawn(&mut self, wave: WaveIndex) -> bool {
        if self.current != Some(wave) || self.pending_spawns == 0 {
            return false;
        }
        self.pending_spawns -= 1;
        true
    }

    /// A wave stays active while spawns remain queued or its enemies are alive.
    pub(crate) fn is_active(&self, enemies_alive: bool) -> bool {
        self.current.is_some()
            && !self.clear_announced
            && (self.pending_spawns > 0 || enemies_alive)
    }

    /// Yields the current wave exactly once, the first time it stops being active.
    pub(crate) fn take_cleared(&mut self, enemies_alive: bool) -> Option<WaveIndex> {
        let wave = self.current?;
        if self.clear_announced || self.pending_spawns > 0 || enemies_alive {
            return None;
        }
        self.clear_announced = true;
        Some(wave)
    }
}
