#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that advances enemies along the path.

use std::time::Duration;

use quiz_defence_core::{Command, EnemySnapshot, EnemyView, Event};

/// Speed an enemy travels at, honouring a slow that is still in effect at `now`.
///
/// Lapsed slows are ignored, so the base speed is never permanently altered.
#[must_use]
pub fn effective_speed(enemy: &EnemySnapshot, now: Duration) -> f32 {
    match enemy.slow {
        Some(slow) if slow.is_active(now) => enemy.speed * slow.multiplier,
        _ => enemy.speed,
    }
}

/// Pure system that reacts to world events and emits movement commands.
#[derive(Debug, Default)]
pub struct Movement;

impl Movement {
    /// Creates a new movement system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes world events and the enemy view to emit one move per enemy.
    pub fn handle(&mut self, events: &[Event], enemies: &EnemyView, out: &mut Vec<Command>) {
        let mut elapsed = Duration::ZERO;
        let mut clock = None;
        for event in events {
            if let Event::TimeAdvanced { dt, now } = event {
                elapsed = elapsed.saturating_add(*dt);
                clock = Some(*now);
            }
        }
        let Some(now) = clock else {
            return;
        };
        if elapsed.is_zero() {
            return;
        }

        let seconds = elapsed.as_secs_f32();
        for enemy in enemies.iter() {
            let step = effective_speed(enemy, now).max(0.0) * seconds;
            out.push(Command::MoveEnemy {
                enemy: enemy.id,
                progress: enemy.progress + step,
            });
        }
    }
}
