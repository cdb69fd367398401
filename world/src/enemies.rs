//! Arena of live enemies keyed by identifier.

use std::collections::BTreeMap;

use glam::Vec2;
use quiz_defence_core::{EnemyId, EnemyKind, EnemySnapshot, EnemyTypeDef, SlowEffect, WaveIndex};

#[derive(Clone, Debug)]
pub(crate) struct EnemyState {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) wave: WaveIndex,
    pub(crate) hp: f32,
    pub(crate) max_hp: f32,
    pub(crate) speed: f32,
    pub(crate) slow: Option<SlowEffect>,
    pub(crate) progress: f32,
    pub(crate) position: Vec2,
}

impl EnemyState {
    /// Subtracts `damage`, clamping health at zero.
    pub(crate) fn apply_damage(&mut self, damage: f32) {
        if damage.is_finite() && damage > 0.0 {
            self.hp = (self.hp - damage).max(0.0);
        }
    }

    pub(crate) fn is_defeated(&self) -> bool {
        self.hp <= 0.0
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            wave: self.wave,
            hp: self.hp,
            max_hp: self.max_hp,
            speed: self.speed,
            slow: self.slow,
            progress: self.progress,
            position: self.position,
        }
    }
}

#[derive(Debug)]
pub(crate) struct EnemyRegistry {
    entries: BTreeMap<EnemyId, EnemyState>,
    next_enemy_id: EnemyId,
}

impl EnemyRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
        }
    }

    pub(crate) fn spawn(
        &mut self,
        kind: EnemyKind,
        definition: &EnemyTypeDef,
        wave: WaveIndex,
        position: Vec2,
    ) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        let hp = definition.hp.max(0.0);
        let _ = self.entries.insert(
            id,
            EnemyState {
                id,
                kind,
                wave,
                hp,
                max_hp: hp,
                speed: definition.speed,
                slow: None,
                progress: 0.0,
                position,
            },
        );
        id
    }

    pub(crate) fn contains(&self, enemy: EnemyId) -> bool {
        self.entries.contains_key(&enemy)
    }

    pub(crate) fn get(&self, enemy: EnemyId) -> Option<&EnemyState> {
        self.entries.get(&enemy)
    }

    pub(crate) fn get_mut(&mut self, enemy: EnemyId) -> Option<&mut EnemyState> {
        self.entries.get_mut(&enemy)
    }

    pub(crate) fn remove(&mut self, enemy: EnemyId) -> Option<EnemyState> {
        self.entries.remove(&enemy)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &EnemyState> {
        self.entries.values()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifiers of every enemy at zero health, in ascending order.
    pub(crate) fn defeated(&self) -> Vec<EnemyId> {
        self.entries
            .values()
            .filter(|enemy| enemy.is_defeated())
            .map(|enemy| enemy.id)
            .collect()
    }
}
