//! Immutable archetype tables and static run configuration.
//!
//! Everything in this module is loaded once and then shared read-only by the
//! world and the systems. The `standard` constructors provide the built-in
//! balance used whenever a host does not supply its own configuration.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Types of towers that can be constructed on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Cheap all-rounder firing single-target homing shots.
    Basic,
    /// Long-range, slow-firing, heavy single-target tower.
    Sniper,
    /// Lobs shells that damage everything near the impact point.
    Splash,
    /// Heavy shells with a wide explosion radius.
    Cannon,
    /// Chills its target, halving its movement speed for a while.
    Frost,
    /// Instant beam that hits every enemy in range without a projectile.
    Laser,
}

impl TowerKind {
    /// Every tower kind in table order.
    pub const ALL: [TowerKind; 6] = [
        Self::Basic,
        Self::Sniper,
        Self::Splash,
        Self::Cannon,
        Self::Frost,
        Self::Laser,
    ];

    const fn index(self) -> usize {
        match self {
            Self::Basic => 0,
            Self::Sniper => 1,
            Self::Splash => 2,
            Self::Cannon => 3,
            Self::Frost => 4,
            Self::Laser => 5,
        }
    }
}

/// Types of enemies that march along the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Baseline enemy.
    Normal,
    /// Fragile but quick.
    Fast,
    /// Slow and durable.
    Tank,
    /// Wave finisher with a large health pool.
    Boss,
}

impl EnemyKind {
    /// Every enemy kind in table order.
    pub const ALL: [EnemyKind; 4] = [Self::Normal, Self::Fast, Self::Tank, Self::Boss];

    const fn index(self) -> usize {
        match self {
            Self::Normal => 0,
            Self::Fast => 1,
            Self::Tank => 2,
            Self::Boss => 3,
        }
    }
}

/// Damage-application rule resolved when a projectile lands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImpactEffect {
    /// Damages the target only.
    Single,
    /// Damages every enemy within `radius` of the impact point.
    Splash {
        /// Secondary radius measured in map units.
        radius: f32,
    },
    /// Splash with a larger radius.
    Explosion {
        /// Secondary radius measured in map units.
        radius: f32,
    },
    /// Damages the target and scales its speed for `duration`.
    Slow {
        /// Multiplier applied to the target's base speed while slowed.
        multiplier: f32,
        /// How long the slow lasts after impact.
        duration: Duration,
    },
}

/// How a tower delivers its damage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Delivery {
    /// Fires a homing projectile that resolves `effect` on impact.
    Projectile {
        /// Travel speed in map units per second.
        speed: f32,
        /// Rule applied when the projectile lands.
        effect: ImpactEffect,
    },
    /// Hitscan against every enemy in range; no projectile entity exists.
    Beam,
}

/// Static description of a tower archetype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTypeDef {
    /// Gold required to place the tower.
    pub cost: u32,
    /// Damage dealt per attack at level one.
    pub damage: f32,
    /// Targeting radius at level one, in map units.
    pub range: f32,
    /// Attack cadence.
    pub attacks_per_second: f32,
    /// Damage delivery mode.
    pub delivery: Delivery,
    /// Fractional damage increase granted per level above one.
    pub damage_growth: f32,
    /// Fractional range increase granted per level above one.
    pub range_growth: f32,
    /// Base upgrade price, multiplied by the current level.
    pub upgrade_cost: u32,
}

impl TowerTypeDef {
    /// Damage dealt per attack at the provided level.
    #[must_use]
    pub fn damage_at(&self, level: u32) -> f32 {
        self.damage * (1.0 + self.damage_growth * level.saturating_sub(1) as f32)
    }

    /// Targeting radius at the provided level.
    #[must_use]
    pub fn range_at(&self, level: u32) -> f32 {
        self.range * (1.0 + self.range_growth * level.saturating_sub(1) as f32)
    }

    /// Minimum simulated time between two attacks.
    ///
    /// A non-positive cadence, or one whose interval does not fit in a
    /// [`Duration`], yields [`Duration::MAX`], so such a tower never becomes
    /// ready.
    #[must_use]
    pub fn attack_interval(&self) -> Duration {
        if self.attacks_per_second <= 0.0 || !self.attacks_per_second.is_finite() {
            return Duration::MAX;
        }
        Duration::try_from_secs_f32(1.0 / self.attacks_per_second).unwrap_or(Duration::MAX)
    }

    /// Gold required to raise a tower from `level` to `level + 1`.
    #[must_use]
    pub const fn upgrade_cost_at(&self, level: u32) -> u32 {
        self.upgrade_cost.saturating_mul(level)
    }
}

/// Static description of an enemy archetype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyTypeDef {
    /// Health at spawn.
    pub hp: f32,
    /// Base movement speed in map units per second.
    pub speed: f32,
    /// Gold granted when the enemy is destroyed.
    pub reward: u32,
}

/// Lookup table from [`TowerKind`] to its definition.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerTable {
    entries: [TowerTypeDef; 6],
}

impl TowerTable {
    /// Built-in tower balance.
    #[must_use]
    pub fn standard() -> Self {
        let single = |speed| Delivery::Projectile {
            speed,
            effect: ImpactEffect::Single,
        };
        Self {
            entries: [
                TowerTypeDef {
                    cost: 50,
                    damage: 20.0,
                    range: 120.0,
                    attacks_per_second: 1.0,
                    delivery: single(300.0),
                    damage_growth: 0.5,
                    range_growth: 0.1,
                    upgrade_cost: 40,
                },
                TowerTypeDef {
                    cost: 100,
                    damage: 60.0,
                    range: 250.0,
                    attacks_per_second: 0.4,
                    delivery: single(600.0),
                    damage_growth: 0.5,
                    range_growth: 0.1,
                    upgrade_cost: 75,
                },
                TowerTypeDef {
                    cost: 120,
                    damage: 15.0,
                    range: 110.0,
                    attacks_per_second: 0.8,
                    delivery: Delivery::Projectile {
                        speed: 220.0,
                        effect: ImpactEffect::Splash { radius: 40.0 },
                    },
                    damage_growth: 0.4,
                    range_growth: 0.1,
                    upgrade_cost: 80,
                },
                TowerTypeDef {
                    cost: 175,
                    damage: 40.0,
                    range: 140.0,
                    attacks_per_second: 0.5,
                    delivery: Delivery::Projectile {
                        speed: 180.0,
                        effect: ImpactEffect::Explosion { radius: 70.0 },
                    },
                    damage_growth: 0.4,
                    range_growth: 0.1,
                    upgrade_cost: 110,
                },
                TowerTypeDef {
                    cost: 80,
                    damage: 5.0,
                    range: 100.0,
                    attacks_per_second: 1.0,
                    delivery: Delivery::Projectile {
                        speed: 250.0,
                        effect: ImpactEffect::Slow {
                            multiplier: 0.5,
                            duration: Duration::from_secs(2),
                        },
                    },
                    damage_growth: 0.5,
                    range_growth: 0.1,
                    upgrade_cost: 60,
                },
                TowerTypeDef {
                    cost: 150,
                    damage: 8.0,
                    range: 90.0,
                    attacks_per_second: 2.0,
                    delivery: Delivery::Beam,
                    damage_growth: 0.4,
                    range_growth: 0.1,
                    upgrade_cost: 100,
                },
            ],
        }
    }

    /// Definition associated with the provided kind.
    #[must_use]
    pub const fn get(&self, kind: TowerKind) -> &TowerTypeDef {
        &self.entries[kind.index()]
    }

    /// Returns a copy of the table with `kind` replaced by `definition`.
    #[must_use]
    pub fn with(mut self, kind: TowerKind, definition: TowerTypeDef) -> Self {
        self.entries[kind.index()] = definition;
        self
    }

    /// Iterates every `(kind, definition)` pair in table order.
    pub fn iter(&self) -> impl Iterator<Item = (TowerKind, &TowerTypeDef)> {
        TowerKind::ALL.into_iter().zip(self.entries.iter())
    }
}

/// Lookup table from [`EnemyKind`] to its definition.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyTable {
    entries: [EnemyTypeDef; 4],
}

impl EnemyTable {
    /// Built-in enemy balance.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            entries: [
                EnemyTypeDef {
                    hp: 50.0,
                    speed: 60.0,
                    reward: 10,
                },
                EnemyTypeDef {
                    hp: 30.0,
                    speed: 110.0,
                    reward: 12,
                },
                EnemyTypeDef {
                    hp: 200.0,
                    speed: 35.0,
                    reward: 25,
                },
                EnemyTypeDef {
                    hp: 800.0,
                    speed: 25.0,
                    reward: 100,
                },
            ],
        }
    }

    /// Definition associated with the provided kind.
    #[must_use]
    pub const fn get(&self, kind: EnemyKind) -> &EnemyTypeDef {
        &self.entries[kind.index()]
    }

    /// Returns a copy of the table with `kind` replaced by `definition`.
    #[must_use]
    pub fn with(mut self, kind: EnemyKind, definition: EnemyTypeDef) -> Self {
        self.entries[kind.index()] = definition;
        self
    }

    /// Iterates every `(kind, definition)` pair in table order.
    pub fn iter(&self) -> impl Iterator<Item = (EnemyKind, &EnemyTypeDef)> {
        EnemyKind::ALL.into_iter().zip(self.entries.iter())
    }
}

/// Batch of identical enemies spawned at a fixed cadence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnGroup {
    /// Archetype spawned by the group.
    pub enemy: EnemyKind,
    /// Number of enemies in the group.
    pub count: u32,
    /// Gap between consecutive spawns of the group.
    pub delay: Duration,
}

impl SpawnGroup {
    /// Creates a new spawn group.
    #[must_use]
    pub const fn new(enemy: EnemyKind, count: u32, delay: Duration) -> Self {
        Self {
            enemy,
            count,
            delay,
        }
    }
}

/// Declarative description of a single wave.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaveDefinition {
    /// Spawn groups, concatenated in order.
    pub groups: Vec<SpawnGroup>,
}

impl WaveDefinition {
    /// Creates a wave from its ordered spawn groups.
    #[must_use]
    pub fn new(groups: Vec<SpawnGroup>) -> Self {
        Self { groups }
    }

    /// Total number of enemies the wave spawns.
    #[must_use]
    pub fn total_spawns(&self) -> u32 {
        self.groups
            .iter()
            .fold(0_u32, |total, group| total.saturating_add(group.count))
    }
}

/// Ordered set of waves plus the delay before each wave's first spawn.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveTable {
    /// Delay between a wave starting and its first spawn.
    pub lead_in: Duration,
    /// Waves in the order the player unlocks them.
    pub waves: Vec<WaveDefinition>,
}

impl WaveTable {
    /// Built-in five-wave schedule.
    #[must_use]
    pub fn standard() -> Self {
        let ms = Duration::from_millis;
        Self {
            lead_in: Duration::from_secs(1),
            waves: vec![
                WaveDefinition::new(vec![SpawnGroup::new(EnemyKind::Normal, 6, ms(1000))]),
                WaveDefinition::new(vec![
                    SpawnGroup::new(EnemyKind::Normal, 8, ms(800)),
                    SpawnGroup::new(EnemyKind::Fast, 4, ms(600)),
                ]),
                WaveDefinition::new(vec![
                    SpawnGroup::new(EnemyKind::Fast, 8, ms(500)),
                    SpawnGroup::new(EnemyKind::Tank, 2, ms(2000)),
                ]),
                WaveDefinition::new(vec![
                    SpawnGroup::new(EnemyKind::Normal, 10, ms(500)),
                    SpawnGroup::new(EnemyKind::Tank, 4, ms(1500)),
                ]),
                WaveDefinition::new(vec![
                    SpawnGroup::new(EnemyKind::Tank, 4, ms(1500)),
                    SpawnGroup::new(EnemyKind::Boss, 1, ms(2000)),
                    SpawnGroup::new(EnemyKind::Fast, 10, ms(400)),
                ]),
            ],
        }
    }

    /// Number of waves defined.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    /// Reports whether no waves are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Retrieves a wave by index.
    #[must_use]
    pub fn get(&self, wave: crate::WaveIndex) -> Option<&WaveDefinition> {
        usize::try_from(wave.get())
            .ok()
            .and_then(|index| self.waves.get(index))
    }
}

/// Gold, health and reward rules for a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EconomyRules {
    /// Gold available when the run begins.
    pub starting_gold: u32,
    /// Player health when the run begins.
    pub starting_hp: u32,
    /// Health removed per enemy reaching the base.
    pub arrival_damage: u32,
    /// Highest level a tower can be upgraded to.
    pub max_tower_level: u32,
    /// Health removed by an incorrect answer.
    pub wrong_answer_penalty: u32,
    /// Base gold for a correct answer.
    pub answer_reward: u32,
    /// Fractional bonus per consecutive correct answer.
    pub streak_bonus: f32,
    /// Streak length beyond which the bonus stops growing.
    pub streak_cap: u32,
}

impl EconomyRules {
    /// Built-in economy.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            starting_gold: 100,
            starting_hp: 100,
            arrival_damage: 10,
            max_tower_level: 3,
            wrong_answer_penalty: 5,
            answer_reward: 10,
            streak_bonus: 0.1,
            streak_cap: 10,
        }
    }
}

/// Map geometry: bounds, the enemy path, and footprint sizes.
#[derive(Clone, Debug, PartialEq)]
pub struct MapConfig {
    /// Width of the playable area in map units.
    pub width: f32,
    /// Height of the playable area in map units.
    pub height: f32,
    /// Ordered polyline from spawn to base.
    pub waypoints: Vec<Vec2>,
    /// Half of the path's width; towers may not intrude on it.
    pub path_half_width: f32,
    /// Radius of a tower's circular footprint.
    pub tower_radius: f32,
}

impl MapConfig {
    /// Built-in serpentine map.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            waypoints: vec![
                Vec2::new(0.0, 100.0),
                Vec2::new(600.0, 100.0),
                Vec2::new(600.0, 300.0),
                Vec2::new(200.0, 300.0),
                Vec2::new(200.0, 500.0),
                Vec2::new(800.0, 500.0),
            ],
            path_half_width: 20.0,
            tower_radius: 16.0,
        }
    }
}

/// Tick pacing and collision tolerances.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationRules {
    /// Nominal cadence at which hosts drive the simulation.
    pub tick_interval: Duration,
    /// Largest delta a single tick may simulate.
    pub max_tick: Duration,
    /// Distance below which a projectile counts as having landed.
    pub collision_threshold: f32,
}

impl SimulationRules {
    /// Built-in pacing: 20 ticks per second, clamped at 100 ms.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            tick_interval: Duration::from_millis(50),
            max_tick: Duration::from_millis(100),
            collision_threshold: 4.0,
        }
    }
}

/// Complete static configuration for a run.
#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    /// Tower archetypes.
    pub towers: TowerTable,
    /// Enemy archetypes.
    pub enemies: EnemyTable,
    /// Wave schedule.
    pub waves: WaveTable,
    /// Economy rules.
    pub economy: EconomyRules,
    /// Map geometry.
    pub map: MapConfig,
    /// Tick pacing.
    pub simulation: SimulationRules,
}

impl GameConfig {
    /// Built-in configuration used when no file is supplied.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            towers: TowerTable::standard(),
            enemies: EnemyTable::standard(),
            waves: WaveTable::standard(),
            economy: EconomyRules::standard(),
            map: MapConfig::standard(),
            simulation: SimulationRules::standard(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tower_matches_reference_balance() {
        let basic = *TowerTable::standard().get(TowerKind::Basic);
        assert_eq!(basic.cost, 50);
        assert!((basic.damage_at(1) - 20.0).abs() < f32::EPSILON);
        assert_eq!(basic.attack_interval(), Duration::from_secs(1));
    }

    #[test]
    fn level_scaling_grows_damage_and_range() {
        let frost = *TowerTable::standard().get(TowerKind::Frost);
        assert!(frost.damage_at(3) > frost.damage_at(2));
        assert!(frost.range_at(2) > frost.range_at(1));
        assert_eq!(frost.upgrade_cost_at(2), frost.upgrade_cost * 2);
    }

    #[test]
    fn zero_cadence_never_becomes_ready() {
        let stalled = TowerTypeDef {
            attacks_per_second: 0.0,
            ..*TowerTable::standard().get(TowerKind::Basic)
        };
        assert_eq!(stalled.attack_interval(), Duration::MAX);
    }

    #[test]
    fn vanishing_cadence_saturates_instead_of_overflowing() {
        let glacial = TowerTypeDef {
            attacks_per_second: 1e-20,
            ..*TowerTable::standard().get(TowerKind::Basic)
        };
        assert_eq!(glacial.attack_interval(), Duration::MAX);
    }

    #[test]
    fn table_overrides_replace_single_entry() {
        let table = EnemyTable::standard().with(
            EnemyKind::Fast,
            EnemyTypeDef {
                hp: 1.0,
                speed: 1.0,
                reward: 1,
            },
        );
        assert_eq!(table.get(EnemyKind::Fast).reward, 1);
        assert_eq!(table.get(EnemyKind::Normal).reward, 10);
    }

    #[test]
    fn wave_totals_sum_groups() {
        let table = WaveTable::standard();
        assert_eq!(table.len(), 5);
        assert_eq!(table.waves[1].total_spawns(), 12);
        assert!(table.get(crate::WaveIndex::new(5)).is_none());
    }
}
