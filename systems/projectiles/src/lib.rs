#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that flies homing projectiles and resolves their impacts.
//!
//! Every tick each projectile re-reads its target's live position from the
//! enemy view. Projectiles whose target vanished are pruned, projectiles that
//! close within the collision threshold detonate, and the rest move along
//! their heading. Damage is never applied here: detonations carry a hit list
//! that the world queues until the damage resolution phase.

use std::time::Duration;

use glam::Vec2;
use quiz_defence_core::{
    Command, EnemySnapshot, EnemyView, Event, Hit, ImpactEffect, ProjectileSnapshot,
    ProjectileView,
};

/// Configuration parameters required to construct the projectile system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    collision_threshold: f32,
}

impl Config {
    /// Creates a new configuration using the provided impact distance.
    #[must_use]
    pub const fn new(collision_threshold: f32) -> Self {
        Self {
            collision_threshold,
        }
    }
}

/// Computes the damage dealt when a projectile lands at `impact`.
///
/// Area effects strike every enemy within their radius of the impact point in
/// identifier order, the target included. Single and slow effects strike the
/// target only.
#[must_use]
pub fn impact_hits(
    effect: ImpactEffect,
    damage: f32,
    target: &EnemySnapshot,
    impact: Vec2,
    enemies: &EnemyView,
) -> Vec<Hit> {
    match effect {
        ImpactEffect::Single | ImpactEffect::Slow { .. } => vec![Hit::new(target.id, damage)],
        ImpactEffect::Splash { radius } | ImpactEffect::Explosion { radius } => {
            let mut hits: Vec<Hit> = enemies
                .iter()
                .filter(|enemy| enemy.position.distance(impact) <= radius)
                .map(|enemy| Hit::new(enemy.id, damage))
                .collect();
            if !hits.iter().any(|hit| hit.enemy == target.id) {
                hits.push(Hit::new(target.id, damage));
                hits.sort_by_key(|hit| hit.enemy);
            }
            hits
        }
    }
}

/// Projectile resolution system.
#[derive(Debug)]
pub struct ProjectileResolution {
    collision_threshold: f32,
}

impl ProjectileResolution {
    /// Creates a new projectile system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            collision_threshold: config.collision_threshold.max(0.0),
        }
    }

    /// Consumes world events and immutable views to emit projectile commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        projectiles: &ProjectileView,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt, .. } = event {
                elapsed = elapsed.saturating_add(*dt);
            }
        }
        if elapsed.is_zero() {
            return;
        }

        let seconds = elapsed.as_secs_f32();
        for projectile in projectiles.iter() {
            out.push(self.advance(projectile, enemies, seconds));
        }
    }

    fn advance(
        &self,
        projectile: &ProjectileSnapshot,
        enemies: &EnemyView,
        seconds: f32,
    ) -> Command {
        let Some(target) = enemies.get(projectile.target) else {
            return Command::PruneProjectile {
                projectile: projectile.id,
            };
        };

        let goal = target.position;
        let offset = goal - projectile.position;
        let distance = offset.length();
        let step = projectile.speed.max(0.0) * seconds;
        if step >= distance || distance - step < self.collision_threshold {
            return Command::DetonateProjectile {
                projectile: projectile.id,
                hits: impact_hits(projectile.effect, projectile.damage, target, goal, enemies),
            };
        }

        Command::MoveProjectile {
            projectile: projectile.id,
            position: projectile.position + offset / distance * step,
        }
    }
}
