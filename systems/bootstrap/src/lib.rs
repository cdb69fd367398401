#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bootstrap system that prepares the Quiz Defence experience.
//!
//! Static configuration is read once from a TOML document. Every section is
//! optional: anything left out keeps the built-in standard value, and tower
//! or enemy sections may override individual fields of a single archetype.
//!
//! ```toml
//! lead_in_ms = 1000
//!
//! [economy]
//! starting_gold = 150
//!
//! [map]
//! waypoints = [[0.0, 100.0], [600.0, 100.0], [600.0, 400.0]]
//!
//! [towers.frost]
//! effect = "slow"
//! slow_multiplier = 0.4
//!
//! [[waves]]
//! groups = [{ enemy = "normal", count = 6, delay_ms = 1000 }]
//! ```

use std::{collections::BTreeMap, fs, path::Path, time::Duration};

use glam::Vec2;
use log::info;
use quiz_defence_core::{
    Delivery, EnemyKind, GameConfig, ImpactEffect, SpawnGroup, TowerKind, TowerTypeDef,
    WaveDefinition,
};
use quiz_defence_world::{query, World};
use serde::Deserialize;
use thiserror::Error;

/// Failures raised while loading static configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration at {path}")]
    Io {
        /// Location that was being read.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid TOML or does not match the schema.
    #[error("failed to parse configuration toml")]
    Parse(#[from] toml::de::Error),
    /// The document parsed but describes an unplayable configuration.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Produces data required to greet the player and configure the world.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Builds a world from the configuration at `path`, or the standard
    /// configuration when no path is supplied.
    pub fn world(&self, path: Option<&Path>) -> Result<World, ConfigError> {
        let config = match path {
            Some(path) => load_config(path)?,
            None => GameConfig::standard(),
        };
        Ok(World::with_config(config))
    }
}

/// Reads, parses and validates the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<GameConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config = parse_config(&contents)?;
    info!("loaded configuration from {}", path.display());
    Ok(config)
}

/// Parses and validates a configuration document.
pub fn parse_config(contents: &str) -> Result<GameConfig, ConfigError> {
    let document: Document = toml::from_str(contents)?;
    let config = document.into_config()?;
    validate(&config)?;
    Ok(config)
}

/// Rejects configurations the simulation cannot run meaningfully.
pub fn validate(config: &GameConfig) -> Result<(), ConfigError> {
    let map = &config.map;
    if map.waypoints.len() < 2 {
        return invalid("the path needs at least two waypoints");
    }
    if !(map.width > 0.0 && map.height > 0.0) {
        return invalid("map dimensions must be positive");
    }
    if map.path_half_width < 0.0 || map.tower_radius <= 0.0 {
        return invalid("path width and tower radius must be positive");
    }
    if config.waves.is_empty() {
        return invalid("at least one wave must be defined");
    }
    if config.economy.max_tower_level == 0 {
        return invalid("max_tower_level must be at least one");
    }
    if config.simulation.max_tick.is_zero() {
        return invalid("max_tick_ms must be positive");
    }
    let threshold = config.simulation.collision_threshold;
    if !(threshold > 0.0 && threshold.is_finite()) {
        return invalid("collision_threshold must be positive");
    }

    for (kind, tower) in config.towers.iter() {
        if !(tower.attacks_per_second > 0.0 && tower.attacks_per_second.is_finite()) {
            return invalid(format!("{kind:?} tower needs a positive attack rate"));
        }
        if tower.attack_interval() == Duration::MAX {
            return invalid(format!("{kind:?} tower attack rate is too slow to schedule"));
        }
        if tower.range <= 0.0 || tower.damage < 0.0 {
            return invalid(format!("{kind:?} tower needs positive range and damage"));
        }
        if let Delivery::Projectile { speed, .. } = tower.delivery {
            if speed <= 0.0 {
                return invalid(format!("{kind:?} tower needs a positive projectile speed"));
            }
        }
    }
    for (kind, enemy) in config.enemies.iter() {
        if enemy.hp <= 0.0 || enemy.speed < 0.0 {
            return invalid(format!("{kind:?} enemy needs positive hp and speed"));
        }
    }
    Ok(())
}

fn invalid<T>(message: impl Into<String>) -> Result<T, ConfigError> {
    Err(ConfigError::Invalid(message.into()))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Document {
    lead_in_ms: Option<u64>,
    economy: Option<RawEconomy>,
    simulation: Option<RawSimulation>,
    map: Option<RawMap>,
    #[serde(default)]
    towers: BTreeMap<String, RawTower>,
    #[serde(default)]
    enemies: BTreeMap<String, RawEnemy>,
    waves: Option<Vec<RawWave>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEconomy {
    starting_gold: Option<u32>,
    starting_hp: Option<u32>,
    arrival_damage: Option<u32>,
    max_tower_level: Option<u32>,
    wrong_answer_penalty: Option<u32>,
    answer_reward: Option<u32>,
    streak_bonus: Option<f32>,
    streak_cap: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSimulation {
    tick_ms: Option<u64>,
    max_tick_ms: Option<u64>,
    collision_threshold: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMap {
    width: Option<f32>,
    height: Option<f32>,
    waypoints: Option<Vec<[f32; 2]>>,
    path_half_width: Option<f32>,
    tower_radius: Option<f32>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawDelivery {
    Projectile,
    Beam,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawEffect {
    Single,
    Splash,
    Explosion,
    Slow,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTower {
    cost: Option<u32>,
    damage: Option<f32>,
    range: Option<f32>,
    attacks_per_second: Option<f32>,
    damage_growth: Option<f32>,
    range_growth: Option<f32>,
    upgrade_cost: Option<u32>,
    delivery: Option<RawDelivery>,
    projectile_speed: Option<f32>,
    effect: Option<RawEffect>,
    effect_radius: Option<f32>,
    slow_multiplier: Option<f32>,
    slow_duration_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEnemy {
    hp: Option<f32>,
    speed: Option<f32>,
    reward: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWave {
    groups: Vec<RawGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGroup {
    enemy: String,
    count: u32,
    delay_ms: u64,
}

impl Document {
    fn into_config(self) -> Result<GameConfig, ConfigError> {
        let mut config = GameConfig::standard();

        if let Some(lead_in) = self.lead_in_ms {
            config.waves.lead_in = Duration::from_millis(lead_in);
        }
        if let Some(economy) = self.economy {
            let rules = &mut config.economy;
            overlay(&mut rules.starting_gold, economy.starting_gold);
            overlay(&mut rules.starting_hp, economy.starting_hp);
            overlay(&mut rules.arrival_damage, economy.arrival_damage);
            overlay(&mut rules.max_tower_level, economy.max_tower_level);
            overlay(&mut rules.wrong_answer_penalty, economy.wrong_answer_penalty);
            overlay(&mut rules.answer_reward, economy.answer_reward);
            overlay(&mut rules.streak_bonus, economy.streak_bonus);
            overlay(&mut rules.streak_cap, economy.streak_cap);
        }
        if let Some(simulation) = self.simulation {
            let rules = &mut config.simulation;
            overlay(
                &mut rules.tick_interval,
                simulation.tick_ms.map(Duration::from_millis),
            );
            overlay(
                &mut rules.max_tick,
                simulation.max_tick_ms.map(Duration::from_millis),
            );
            overlay(&mut rules.collision_threshold, simulation.collision_threshold);
        }
        if let Some(map) = self.map {
            let target = &mut config.map;
            overlay(&mut target.width, map.width);
            overlay(&mut target.height, map.height);
            overlay(
                &mut target.waypoints,
                map.waypoints
                    .map(|points| points.into_iter().map(Vec2::from).collect()),
            );
            overlay(&mut target.path_half_width, map.path_half_width);
            overlay(&mut target.tower_radius, map.tower_radius);
        }

        for (name, raw) in self.towers {
            let kind = tower_kind(&name)?;
            let merged = raw.merge(*config.towers.get(kind), &name)?;
            config.towers = config.towers.with(kind, merged);
        }
        for (name, raw) in self.enemies {
            let kind = enemy_kind(&name)?;
            let mut merged = *config.enemies.get(kind);
            overlay(&mut merged.hp, raw.hp);
            overlay(&mut merged.speed, raw.speed);
            overlay(&mut merged.reward, raw.reward);
            config.enemies = config.enemies.with(kind, merged);
        }

        if let Some(waves) = self.waves {
            config.waves.waves = waves
                .into_iter()
                .map(|wave| {
                    wave.groups
                        .into_iter()
                        .map(|group| {
                            Ok(SpawnGroup::new(
                                enemy_kind(&group.enemy)?,
                                group.count,
                                Duration::from_millis(group.delay_ms),
                            ))
                        })
                        .collect::<Result<Vec<_>, ConfigError>>()
                        .map(WaveDefinition::new)
                })
                .collect::<Result<_, _>>()?;
        }

        Ok(config)
    }
}

impl RawTower {
    fn merge(self, base: TowerTypeDef, name: &str) -> Result<TowerTypeDef, ConfigError> {
        let mut merged = base;
        overlay(&mut merged.cost, self.cost);
        overlay(&mut merged.damage, self.damage);
        overlay(&mut merged.range, self.range);
        overlay(&mut merged.attacks_per_second, self.attacks_per_second);
        overlay(&mut merged.damage_growth, self.damage_growth);
        overlay(&mut merged.range_growth, self.range_growth);
        overlay(&mut merged.upgrade_cost, self.upgrade_cost);

        let (base_speed, base_effect) = match base.delivery {
            Delivery::Projectile { speed, effect } => (Some(speed), Some(effect)),
            Delivery::Beam => (None, None),
        };
        let beam = match self.delivery {
            Some(RawDelivery::Beam) => true,
            Some(RawDelivery::Projectile) => false,
            None => base_speed.is_none(),
        };
        if beam {
            merged.delivery = Delivery::Beam;
            return Ok(merged);
        }

        let Some(speed) = self.projectile_speed.or(base_speed) else {
            return invalid(format!("tower `{name}` fires projectiles but has no projectile_speed"));
        };
        let effect = match self.effect {
            None => base_effect.unwrap_or(ImpactEffect::Single),
            Some(RawEffect::Single) => ImpactEffect::Single,
            Some(RawEffect::Splash) => ImpactEffect::Splash {
                radius: self.area_radius(base_effect, name)?,
            },
            Some(RawEffect::Explosion) => ImpactEffect::Explosion {
                radius: self.area_radius(base_effect, name)?,
            },
            Some(RawEffect::Slow) => {
                let (base_multiplier, base_duration) = match base_effect {
                    Some(ImpactEffect::Slow {
                        multiplier,
                        duration,
                    }) => (Some(multiplier), Some(duration)),
                    _ => (None, None),
                };
                let multiplier = self.slow_multiplier.or(base_multiplier).unwrap_or(0.5);
                let duration = self
                    .slow_duration_ms
                    .map(Duration::from_millis)
                    .or(base_duration)
                    .unwrap_or(Duration::from_secs(2));
                ImpactEffect::Slow {
                    multiplier,
                    duration,
                }
            }
        };
        merged.delivery = Delivery::Projectile { speed, effect };
        Ok(merged)
    }

    fn area_radius(&self, base: Option<ImpactEffect>, name: &str) -> Result<f32, ConfigError> {
        let inherited = match base {
            Some(ImpactEffect::Splash { radius } | ImpactEffect::Explosion { radius }) => {
                Some(radius)
            }
            _ => None,
        };
        match self.effect_radius.or(inherited) {
            Some(radius) => Ok(radius),
            None => invalid(format!("tower `{name}` has an area effect without effect_radius")),
        }
    }
}

fn overlay<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn tower_kind(name: &str) -> Result<TowerKind, ConfigError> {
    match name {
        "basic" => Ok(TowerKind::Basic),
        "sniper" => Ok(TowerKind::Sniper),
        "splash" => Ok(TowerKind::Splash),
        "cannon" => Ok(TowerKind::Cannon),
        "frost" => Ok(TowerKind::Frost),
        "laser" => Ok(TowerKind::Laser),
        _ => invalid(format!("unknown tower kind `{name}`")),
    }
}

fn enemy_kind(name: &str) -> Result<EnemyKind, ConfigError> {
    match name {
        "normal" => Ok(EnemyKind::Normal),
        "fast" => Ok(EnemyKind::Fast),
        "tank" => Ok(EnemyKind::Tank),
        "boss" => Ok(EnemyKind::Boss),
        _ => invalid(format!("unknown enemy kind `{name}`")),
    }
}
