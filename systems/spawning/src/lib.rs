#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave scheduler responsible for emitting enemy spawn commands.

use std::{collections::VecDeque, time::Duration};

use log::debug;
use quiz_defence_core::{Command, EnemyKind, Event, WaveDefinition, WaveIndex, WaveTable};

/// Single entry of the expanded spawn queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledSpawn {
    /// Simulation time at which the enemy becomes due.
    pub at: Duration,
    /// Archetype of the enemy to spawn.
    pub enemy: EnemyKind,
    /// Wave the spawn belongs to.
    pub wave: WaveIndex,
}

/// Expands a wave definition into a flat, time-ordered spawn queue.
///
/// The first spawn is due `lead_in` after `start`. Within a group spawns are
/// spaced by the group's delay, and each group begins where the previous
/// group's spacing left off.
#[must_use]
pub fn expand_wave(
    wave: WaveIndex,
    definition: &WaveDefinition,
    start: Duration,
    lead_in: Duration,
) -> Vec<ScheduledSpawn> {
    let mut cursor = start.saturating_add(lead_in);
    let mut queue = Vec::with_capacity(definition.total_spawns() as usize);
    for group in &definition.groups {
        for _ in 0..group.count {
            queue.push(ScheduledSpawn {
                at: cursor,
                enemy: group.enemy,
                wave,
            });
            cursor = cursor.saturating_add(group.delay);
        }
    }
    queue
}

/// Pure system that releases queued spawns once their scheduled time elapses.
#[derive(Debug, Default)]
pub struct WaveScheduler {
    queue: VecDeque<ScheduledSpawn>,
}

impl WaveScheduler {
    /// Creates a scheduler with an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of spawns still waiting to be released.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Consumes world events and emits spawn commands for every due entry.
    pub fn handle(&mut self, events: &[Event], waves: &WaveTable, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::WaveStarted { wave, at } => {
                    if let Some(definition) = waves.get(*wave) {
                        self.queue = expand_wave(*wave, definition, *at, waves.lead_in).into();
                        debug!("queued {} spawns for wave {}", self.queue.len(), wave.get());
                    }
                }
                Event::RunReset => self.queue.clear(),
                Event::TimeAdvanced { now, .. } => self.release_due(*now, out),
                _ => {}
            }
        }
    }

    fn release_due(&mut self, now: Duration, out: &mut Vec<Command>) {
        while let Some(next) = self.queue.front() {
            if next.at > now {
                break;
            }
            out.push(Command::SpawnEnemy {
                kind: next.enemy,
                wave: next.wave,
            });
            let _ = self.queue.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_defence_core::SpawnGroup;

    #[test]
    fn groups_continue_from_previous_cursor() {
        let definition = WaveDefinition::new(vec![
            SpawnGroup::new(EnemyKind::Normal, 2, Duration::from_millis(500)),
            SpawnGroup::new(EnemyKind::Tank, 1, Duration::from_secs(2)),
        ]);
        let queue = expand_wave(
            WaveIndex::new(0),
            &definition,
            Duration::from_secs(10),
            Duration::from_secs(1),
        );
        let times: Vec<_> = queue.iter().map(|spawn| spawn.at).collect();
        assert_eq!(
            times,
            vec![
                Duration::from_secs(11),
                Duration::from_millis(11_500),
                Duration::from_secs(12),
            ]
        );
        assert_eq!(queue[2].enemy, EnemyKind::Tank);
    }

    #[test]
    fn empty_wave_expands_to_nothing() {
        let queue = expand_wave(
            WaveIndex::new(3),
            &WaveDefinition::default(),
            Duration::ZERO,
            Duration::from_secs(1),
        );
        assert!(queue.is_empty());
    }
}
