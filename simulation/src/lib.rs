#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick driver that owns the world and pumps every system in phase order.
//!
//! One call to [`Simulation::tick`] advances the clock and then runs
//! spawning, movement, targeting with attack emission, projectile
//! resolution, damage resolution and run evaluation, applying each phase's
//! commands before the next phase reads its views. Player commands go
//! through [`Simulation::submit`] between ticks.

mod pacer;

use std::time::Duration;

use log::debug;
use quiz_defence_core::{
    Command, EnemyView, Event, GameConfig, ProjectileView, RunState, RunStatus, TowerTarget,
    TowerView,
};
use quiz_defence_system_movement::Movement;
use quiz_defence_system_projectiles::{Config as ProjectileConfig, ProjectileResolution};
use quiz_defence_system_spawning::WaveScheduler;
use quiz_defence_system_tower_combat::TowerCombat;
use quiz_defence_system_tower_targeting::TowerTargeting;
use quiz_defence_world::{self as world, query, World};

pub use pacer::Pacer;

/// Read-only snapshot of everything a renderer or HUD needs for one frame.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Towers on the map.
    pub towers: TowerView,
    /// Enemies on the path.
    pub enemies: EnemyView,
    /// Projectiles in flight.
    pub projectiles: ProjectileView,
    /// Gold, health and progress.
    pub run: RunState,
}

/// Authoritative world plus the systems that drive it.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    scheduler: WaveScheduler,
    movement: Movement,
    targeting: TowerTargeting,
    combat: TowerCombat,
    projectiles: ProjectileResolution,
    unseen_events: Vec<Event>,
    targets: Vec<TowerTarget>,
}

impl Simulation {
    /// Wraps an existing world.
    #[must_use]
    pub fn new(world: World) -> Self {
        let threshold = query::config(&world).simulation.collision_threshold;
        Self {
            world,
            scheduler: WaveScheduler::new(),
            movement: Movement::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            projectiles: ProjectileResolution::new(ProjectileConfig::new(threshold)),
            unseen_events: Vec::new(),
            targets: Vec::new(),
        }
    }

    /// Builds a fresh world from `config`.
    #[must_use]
    pub fn from_config(config: GameConfig) -> Self {
        Self::new(World::with_config(config))
    }

    /// Provides read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Captures the current snapshot for rendering.
    #[must_use]
    pub fn frame(&self) -> Frame {
        Frame {
            towers: query::tower_view(&self.world),
            enemies: query::enemy_view(&self.world),
            projectiles: query::projectile_view(&self.world),
            run: query::run_state(&self.world),
        }
    }

    /// Applies a player command immediately and returns the resulting events.
    ///
    /// The events are also retained so the wave scheduler observes them on
    /// the next tick.
    pub fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.unseen_events.extend(events.iter().cloned());
        events
    }

    /// Runs one full tick and returns every event it produced.
    ///
    /// Once the run is over the driver stops pumping phases and the tick
    /// produces no events.
    pub fn tick(&mut self, dt: Duration) -> Vec<Event> {
        let mut log = Vec::new();
        if !self.is_playing() {
            return log;
        }

        let mut clock = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut clock);
        log.extend(clock.iter().cloned());

        let mut observed = std::mem::take(&mut self.unseen_events);
        observed.extend(clock.iter().cloned());
        let mut commands = Vec::new();
        self.scheduler
            .handle(&observed, &query::config(&self.world).waves, &mut commands);
        if !self.pump(commands, &mut log) {
            return log;
        }

        let mut commands = Vec::new();
        self.movement
            .handle(&clock, &query::enemy_view(&self.world), &mut commands);
        if !self.pump(commands, &mut log) {
            return log;
        }

        let towers = query::tower_view(&self.world);
        let enemies = query::enemy_view(&self.world);
        self.targeting.handle(&towers, &enemies, &mut self.targets);
        let mut commands = Vec::new();
        self.combat.handle(&towers, &self.targets, &mut commands);
        if !self.pump(commands, &mut log) {
            return log;
        }

        let mut commands = Vec::new();
        self.projectiles.handle(
            &clock,
            &query::projectile_view(&self.world),
            &query::enemy_view(&self.world),
            &mut commands,
        );
        commands.push(Command::ResolveDamage);
        commands.push(Command::EvaluateRun);
        let _ = self.pump(commands, &mut log);

        debug!(
            "tick at {:?} produced {} events",
            query::now(&self.world),
            log.len()
        );
        log
    }

    fn is_playing(&self) -> bool {
        query::run_state(&self.world).status == RunStatus::Playing
    }

    /// Applies `commands` in order, stopping early if the run ends.
    fn pump(&mut self, commands: Vec<Command>, log: &mut Vec<Event>) -> bool {
        for command in commands {
            if !self.is_playing() {
                return false;
            }
            world::apply(&mut self.world, command, log);
        }
        self.is_playing()
    }
}
