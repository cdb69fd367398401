//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use quiz_defence_core::{TowerId, TowerKind, TowerSnapshot, TowerTypeDef};

/// Tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Centre of the tower footprint.
    pub(crate) position: Vec2,
    /// Current level, starting at one.
    pub(crate) level: u32,
    /// Simulation time of the most recent attack.
    pub(crate) last_attack: Option<Duration>,
}

impl TowerState {
    /// Simulated time left before the tower may attack again.
    pub(crate) fn ready_in(&self, definition: &TowerTypeDef, now: Duration) -> Duration {
        let interval = definition.attack_interval();
        match self.last_attack {
            None if interval == Duration::MAX => Duration::MAX,
            None => Duration::ZERO,
            Some(at) => interval.saturating_sub(now.saturating_sub(at)),
        }
    }

    pub(crate) fn snapshot(&self, definition: &TowerTypeDef, now: Duration) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            level: self.level,
            range: definition.range_at(self.level),
            damage: definition.damage_at(self.level),
            delivery: definition.delivery,
            ready_in: self.ready_in(definition, now),
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    pub(crate) fn insert(&mut self, kind: TowerKind, position: Vec2) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            TowerState {
                id,
                kind,
                position,
                level: 1,
                last_attack: None,
            },
        );
        id
    }

    pub(crate) fn get(&self, tower: TowerId) -> Option<&TowerState> {
        self.entries.get(&tower)
    }

    pub(crate) fn get_mut(&mut self, tower: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&tower)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    /// Finds the first tower whose centre lies within `distance` of `point`.
    pub(crate) fn within(&self, point: Vec2, distance: f32) -> Option<TowerId> {
        self.entries
            .values()
            .find(|tower| tower.position.distance(point) < distance)
            .map(|tower| tower.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_defence_core::TowerTable;

    #[test]
    fn registry_allocates_monotonic_identifiers() {
        let mut registry = TowerRegistry::new();
        let first = registry.insert(TowerKind::Basic, Vec2::new(10.0, 10.0));
        let second = registry.insert(TowerKind::Laser, Vec2::new(90.0, 10.0));
        assert_eq!(first, TowerId::new(0));
        assert_eq!(second, TowerId::new(1));
        assert_eq!(registry.get(second).map(|tower| tower.level), Some(1));
    }

    #[test]
    fn fresh_tower_is_ready_and_cools_down_after_attacking() {
        let definition = *TowerTable::standard().get(TowerKind::Basic);
        let mut registry = TowerRegistry::new();
        let id = registry.insert(TowerKind::Basic, Vec2::ZERO);
        let tower = registry.get_mut(id).expect("tower");
        assert_eq!(tower.ready_in(&definition, Duration::ZERO), Duration::ZERO);

        tower.last_attack = Some(Duration::from_millis(500));
        assert_eq!(
            tower.ready_in(&definition, Duration::from_millis(900)),
            Duration::from_millis(600)
        );
        assert!(tower
            .ready_in(&definition, Duration::from_millis(1500))
            .is_zero());
    }

    #[test]
    fn within_matches_nearby_centres_only() {
        let mut registry = TowerRegistry::new();
        let id = registry.insert(TowerKind::Basic, Vec2::new(50.0, 50.0));
        assert_eq!(registry.within(Vec2::new(60.0, 50.0), 32.0), Some(id));
        assert_eq!(registry.within(Vec2::new(90.0, 50.0), 32.0), None);
    }
}
