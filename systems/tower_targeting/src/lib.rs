#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use glam::Vec2;
use quiz_defence_core::{Delivery, EnemyId, EnemyView, TowerId, TowerTarget, TowerView};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    tower_workspace: Vec<TowerWorkspace>,
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// Projectile towers lock onto the in-range enemy with the greatest path
    /// progress, ties going to the lowest identifier. Beam towers receive
    /// every in-range enemy in identifier order. Towers with nothing in range
    /// produce no assignment. The output buffer is cleared before populating
    /// it with the latest assignments.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<TowerTarget>) {
        out.clear();

        if towers.is_empty() || enemies.is_empty() {
            return;
        }

        self.prepare_tower_workspace(towers);
        self.prepare_enemy_workspace(enemies);

        for tower in &self.tower_workspace {
            let in_range = self
                .enemy_workspace
                .iter()
                .filter(|candidate| {
                    candidate.position.distance_squared(tower.position) <= tower.range_sq
                });

            if tower.beam {
                let swept: Vec<EnemyId> = in_range.map(|candidate| candidate.id).collect();
                if !swept.is_empty() {
                    out.push(TowerTarget::Beam {
                        tower: tower.id,
                        enemies: swept,
                    });
                }
                continue;
            }

            let mut best: Option<BestCandidate> = None;
            for candidate in in_range {
                let current = BestCandidate {
                    progress: candidate.progress,
                    enemy: candidate.id,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                out.push(TowerTarget::Homing {
                    tower: tower.id,
                    enemy: best_candidate.enemy,
                });
            }
        }
    }

    fn prepare_tower_workspace(&mut self, towers: &TowerView) {
        self.tower_workspace.clear();
        self.tower_workspace.reserve(towers.len());

        for snapshot in towers.iter() {
            if !(snapshot.range.is_finite() && snapshot.range > 0.0) {
                continue;
            }

            self.tower_workspace.push(TowerWorkspace {
                id: snapshot.id,
                position: snapshot.position,
                range_sq: snapshot.range * snapshot.range,
                beam: matches!(snapshot.delivery, Delivery::Beam),
            });
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());

        for snapshot in enemies.iter() {
            if snapshot.hp <= 0.0 {
                continue;
            }

            self.enemy_workspace.push(EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
                progress: snapshot.progress,
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerWorkspace {
    id: TowerId,
    position: Vec2,
    range_sq: f32,
    beam: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Vec2,
    progress: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    progress: f32,
    enemy: EnemyId,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.progress != other.progress {
            return self.progress > other.progress;
        }

        self.enemy < other.enemy
    }
}
