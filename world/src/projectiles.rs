//! Arena of in-flight homing projectiles.

use std::collections::BTreeMap;

use glam::Vec2;
use quiz_defence_core::{EnemyId, ImpactEffect, ProjectileId, ProjectileSnapshot, TowerId};

#[derive(Clone, Debug)]
pub(crate) struct ProjectileState {
    pub(crate) id: ProjectileId,
    pub(crate) tower: TowerId,
    pub(crate) target: EnemyId,
    pub(crate) position: Vec2,
    pub(crate) speed: f32,
    pub(crate) damage: f32,
    pub(crate) effect: ImpactEffect,
}

impl ProjectileState {
    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            tower: self.tower,
            target: self.target,
            position: self.position,
            speed: self.speed,
            damage: self.damage,
            effect: self.effect,
        }
    }
}

/// Launch parameters for a new projectile.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Launch {
    pub(crate) tower: TowerId,
    pub(crate) target: EnemyId,
    pub(crate) origin: Vec2,
    pub(crate) speed: f32,
    pub(crate) damage: f32,
    pub(crate) effect: ImpactEffect,
}

#[derive(Debug)]
pub(crate) struct ProjectileRegistry {
    entries: BTreeMap<ProjectileId, ProjectileState>,
    next_projectile_id: ProjectileId,
}

impl ProjectileRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_projectile_id: ProjectileId::new(0),
        }
    }

    pub(crate) fn launch(&mut self, launch: Launch) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            ProjectileState {
                id,
                tower: launch.tower,
                target: launch.target,
                position: launch.origin,
                speed: launch.speed,
                damage: launch.damage,
                effect: launch.effect,
            },
        );
        id
    }

    pub(crate) fn get_mut(&mut self, projectile: ProjectileId) -> Option<&mut ProjectileState> {
        self.entries.get_mut(&projectile)
    }

    pub(crate) fn remove(&mut self, projectile: ProjectileId) -> Option<ProjectileState> {
        self.entries.remove(&projectile)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &ProjectileState> {
        self.entries.values()
    }
}
