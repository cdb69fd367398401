#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Quiz Defence.
//!
//! The world owns every tower, enemy and projectile together with the gold
//! and health ledger. It is mutated exclusively through [`apply`], which
//! validates each [`Command`] and reports the outcome as [`Event`] values.
//! Invalid requests never panic: they leave the state untouched and surface
//! as rejection or `CommandIgnored` events.

mod enemies;
mod ledger;
mod path;
mod projectiles;
mod towers;
mod waves;

use std::time::Duration;

use glam::Vec2;
use log::{debug, info, warn};
use quiz_defence_core::{
    AnswerOutcome, Command, Delivery, EnemyId, EnemyKind, Event, GameConfig, Hit,
    IgnoredCommand, ImpactEffect, PlacementError, ProjectileId, RunStatus, SlowEffect, TowerId,
    TowerKind, UpgradeError, WaveIndex, WaveStartError, WELCOME_BANNER,
};

use enemies::EnemyRegistry;
use ledger::Ledger;
use path::PathModel;
use projectiles::{Launch, ProjectileRegistry};
use towers::TowerRegistry;
use waves::WaveProgress;

pub use ledger::answer_reward;

/// Represents the authoritative Quiz Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: GameConfig,
    path: PathModel,
    now: Duration,
    towers: TowerRegistry,
    enemies: EnemyRegistry,
    projectiles: ProjectileRegistry,
    pending_hits: Vec<Hit>,
    ledger: Ledger,
    waves: WaveProgress,
}

impl World {
    /// Creates a new world using the built-in standard configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(GameConfig::standard())
    }

    /// Creates a new world that takes ownership of the provided configuration.
    #[must_use]
    pub fn with_config(config: GameConfig) -> Self {
        let path = PathModel::new(config.map.waypoints.clone());
        let ledger = Ledger::new(&config.economy);
        Self {
            banner: WELCOME_BANNER,
            path,
            now: Duration::ZERO,
            towers: TowerRegistry::new(),
            enemies: EnemyRegistry::new(),
            projectiles: ProjectileRegistry::new(),
            pending_hits: Vec::new(),
            ledger,
            waves: WaveProgress::default(),
            config,
        }
    }

    fn wave_active(&self) -> bool {
        self.waves.is_active(!self.enemies.is_empty())
    }

    fn placement_error(&self, kind: TowerKind, position: Vec2) -> Option<PlacementError> {
        let map = &self.config.map;
        let radius = map.tower_radius;
        let inside = position.x - radius >= 0.0
            && position.y - radius >= 0.0
            && position.x + radius <= map.width
            && position.y + radius <= map.height;
        if !inside {
            return Some(PlacementError::OutOfBounds);
        }
        if self.path.clearance(position) < map.path_half_width + radius {
            return Some(PlacementError::OnPath);
        }
        if self.towers.within(position, 2.0 * radius).is_some() {
            return Some(PlacementError::Occupied);
        }
        if self.ledger.gold() < self.config.towers.get(kind).cost {
            return Some(PlacementError::InsufficientGold);
        }
        None
    }

    fn upgrade_error(&self, tower: TowerId) -> Result<u32, UpgradeError> {
        let Some(state) = self.towers.get(tower) else {
            return Err(UpgradeError::MissingTower);
        };
        if state.level >= self.config.economy.max_tower_level {
            return Err(UpgradeError::MaxLevel);
        }
        Ok(self.config.towers.get(state.kind).upgrade_cost_at(state.level))
    }

    fn settle_loss(&mut self, out_events: &mut Vec<Event>) {
        if self.ledger.is_playing() && self.ledger.player_hp() == 0 {
            self.ledger.finish(RunStatus::Lost);
            info!("run lost after {} waves", self.waves.started());
            out_events.push(Event::RunLost);
        }
    }

    fn place_tower(&mut self, kind: TowerKind, position: Vec2, out_events: &mut Vec<Event>) {
        if let Some(reason) = self.placement_error(kind, position) {
            out_events.push(Event::TowerPlacementRejected {
                kind,
                position,
                reason,
            });
            return;
        }

        let cost = self.config.towers.get(kind).cost;
        if !self.ledger.spend(cost) {
            out_events.push(Event::TowerPlacementRejected {
                kind,
                position,
                reason: PlacementError::InsufficientGold,
            });
            return;
        }
        let tower = self.towers.insert(kind, position);
        self.ledger.record_tower_placed();
        debug!("placed {kind:?} tower {} at {position}", tower.get());
        out_events.push(Event::TowerPlaced {
            tower,
            kind,
            position,
            gold: self.ledger.gold(),
        });
    }

    fn upgrade_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        let cost = match self.upgrade_error(tower) {
            Ok(cost) => cost,
            Err(reason) => {
                out_events.push(Event::TowerUpgradeRejected { tower, reason });
                return;
            }
        };
        if !self.ledger.spend(cost) {
            out_events.push(Event::TowerUpgradeRejected {
                tower,
                reason: UpgradeError::InsufficientGold,
            });
            return;
        }
        let Some(state) = self.towers.get_mut(tower) else {
            return;
        };
        state.level += 1;
        out_events.push(Event::TowerUpgraded {
            tower,
            level: state.level,
            gold: self.ledger.gold(),
        });
    }

    fn start_wave(&mut self, out_events: &mut Vec<Event>) {
        if self.wave_active() {
            out_events.push(Event::WaveStartRejected {
                reason: WaveStartError::WaveInProgress,
            });
            return;
        }
        let wave = WaveIndex::new(self.waves.started());
        let Some(definition) = self.config.waves.get(wave) else {
            out_events.push(Event::WaveStartRejected {
                reason: WaveStartError::NoWavesRemaining,
            });
            return;
        };

        self.waves.begin(wave, definition.total_spawns());
        self.ledger.set_wave(self.waves.started());
        info!(
            "wave {} started with {} spawns",
            wave.get() + 1,
            definition.total_spawns()
        );
        out_events.push(Event::WaveStarted { wave, at: self.now });
    }

    fn submit_answer(&mut self, outcome: AnswerOutcome, out_events: &mut Vec<Event>) {
        match outcome {
            AnswerOutcome::Correct {
                elapsed,
                time_limit,
            } => {
                let amount = self
                    .ledger
                    .reward_answer(&self.config.economy, elapsed, time_limit);
                out_events.push(Event::GoldAwarded {
                    amount,
                    streak: self.ledger.streak(),
                });
            }
            AnswerOutcome::Incorrect => {
                self.ledger.reset_streak();
                let player_hp = self
                    .ledger
                    .damage_player(self.config.economy.wrong_answer_penalty);
                out_events.push(Event::AnswerPenalized { player_hp });
                self.settle_loss(out_events);
            }
        }
    }

    fn spawn_enemy(&mut self, kind: EnemyKind, wave: WaveIndex, out_events: &mut Vec<Event>) {
        if !self.waves.record_spawn(wave) {
            ignore(IgnoredCommand::NoPendingSpawn(wave), out_events);
            return;
        }
        let definition = self.config.enemies.get(kind);
        let enemy = self
            .enemies
            .spawn(kind, definition, wave, self.path.start());
        out_events.push(Event::EnemySpawned { enemy, kind, wave });
    }

    fn move_enemy(&mut self, enemy: EnemyId, progress: f32, out_events: &mut Vec<Event>) {
        let now = self.now;
        let length = self.path.length();
        let Some(state) = self.enemies.get_mut(enemy) else {
            ignore(IgnoredCommand::MissingEnemy(enemy), out_events);
            return;
        };

        if state.slow.is_some_and(|slow| !slow.is_active(now)) {
            state.slow = None;
        }
        let progress = if progress.is_finite() {
            progress.max(state.progress)
        } else {
            state.progress
        };

        if progress < length {
            state.progress = progress;
            state.position = self.path.point_at(progress);
            return;
        }

        let _ = self.enemies.remove(enemy);
        let player_hp = self
            .ledger
            .damage_player(self.config.economy.arrival_damage);
        debug!("enemy {} reached the base, {player_hp} hp left", enemy.get());
        out_events.push(Event::EnemyArrived { enemy, player_hp });
        self.settle_loss(out_events);
    }

    fn fire_projectile(&mut self, tower: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
        let Some(state) = self.towers.get(tower) else {
            ignore(IgnoredCommand::MissingTower(tower), out_events);
            return;
        };
        let definition = self.config.towers.get(state.kind);
        let Delivery::Projectile { speed, effect } = definition.delivery else {
            ignore(IgnoredCommand::WrongDelivery(tower), out_events);
            return;
        };
        if !state.ready_in(definition, self.now).is_zero() {
            ignore(IgnoredCommand::TowerNotReady(tower), out_events);
            return;
        }
        if !self.enemies.contains(target) {
            ignore(IgnoredCommand::MissingEnemy(target), out_events);
            return;
        }

        let launch = Launch {
            tower,
            target,
            origin: state.position,
            speed,
            damage: definition.damage_at(state.level),
            effect,
        };
        let projectile = self.projectiles.launch(launch);
        self.stamp_attack(tower);
        out_events.push(Event::ProjectileFired {
            projectile,
            tower,
            target,
        });
    }

    fn fire_beam(
        &mut self,
        tower: TowerId,
        mut targets: Vec<EnemyId>,
        out_events: &mut Vec<Event>,
    ) {
        let Some(state) = self.towers.get(tower) else {
            ignore(IgnoredCommand::MissingTower(tower), out_events);
            return;
        };
        let definition = self.config.towers.get(state.kind);
        if definition.delivery != Delivery::Beam {
            ignore(IgnoredCommand::WrongDelivery(tower), out_events);
            return;
        }
        if !state.ready_in(definition, self.now).is_zero() {
            ignore(IgnoredCommand::TowerNotReady(tower), out_events);
            return;
        }

        targets.sort_unstable();
        targets.dedup();
        targets.retain(|enemy| self.enemies.contains(*enemy));
        if targets.is_empty() {
            ignore(IgnoredCommand::NoTargets(tower), out_events);
            return;
        }

        let damage = definition.damage_at(state.level);
        self.pending_hits
            .extend(targets.iter().map(|enemy| Hit::new(*enemy, damage)));
        self.stamp_attack(tower);
        out_events.push(Event::BeamFired { tower, targets });
    }

    fn stamp_attack(&mut self, tower: TowerId) {
        if let Some(state) = self.towers.get_mut(tower) {
            state.last_attack = Some(self.now);
        }
    }

    fn move_projectile(
        &mut self,
        projectile: ProjectileId,
        position: Vec2,
        out_events: &mut Vec<Event>,
    ) {
        match self.projectiles.get_mut(projectile) {
            Some(state) => state.position = position,
            None => ignore(IgnoredCommand::MissingProjectile(projectile), out_events),
        }
    }

    fn detonate_projectile(
        &mut self,
        projectile: ProjectileId,
        hits: Vec<Hit>,
        out_events: &mut Vec<Event>,
    ) {
        let Some(state) = self.projectiles.remove(projectile) else {
            ignore(IgnoredCommand::MissingProjectile(projectile), out_events);
            return;
        };

        let now = self.now;
        let position = self
            .enemies
            .get(state.target)
            .map_or(state.position, |enemy| enemy.position);
        match state.effect {
            ImpactEffect::Slow {
                multiplier,
                duration,
            } => {
                let slow = SlowEffect {
                    multiplier,
                    until: now.saturating_add(duration),
                };
                // The later expiry wins; multipliers never stack.
                if let Some(enemy) = self.enemies.get_mut(state.target) {
                    if !enemy.slow.is_some_and(|current| current.until > slow.until) {
                        enemy.slow = Some(slow);
                    }
                }
            }
            ImpactEffect::Single
            | ImpactEffect::Splash { .. }
            | ImpactEffect::Explosion { .. } => {}
        }

        let enemies = &self.enemies;
        self.pending_hits
            .extend(hits.into_iter().filter(|hit| enemies.contains(hit.enemy)));
        out_events.push(Event::ProjectileDetonated {
            projectile,
            position,
        });
    }

    fn prune_projectile(&mut self, projectile: ProjectileId, out_events: &mut Vec<Event>) {
        if self.projectiles.remove(projectile).is_none() {
            ignore(IgnoredCommand::MissingProjectile(projectile), out_events);
            return;
        }
        debug!("pruned orphaned projectile {}", projectile.get());
        out_events.push(Event::ProjectilePruned { projectile });
    }

    fn resolve_damage(&mut self, out_events: &mut Vec<Event>) {
        for hit in self.pending_hits.drain(..) {
            if let Some(enemy) = self.enemies.get_mut(hit.enemy) {
                enemy.apply_damage(hit.damage);
            }
        }

        for enemy in self.enemies.defeated() {
            let Some(state) = self.enemies.remove(enemy) else {
                continue;
            };
            let reward = self.config.enemies.get(state.kind).reward;
            self.ledger.credit_kill(reward);
            debug!("enemy {} defeated for {reward} gold", enemy.get());
            out_events.push(Event::EnemyDefeated {
                enemy,
                kind: state.kind,
                reward,
            });
        }
    }

    fn evaluate_run(&mut self, out_events: &mut Vec<Event>) {
        self.settle_loss(out_events);
        if !self.ledger.is_playing() {
            return;
        }

        if let Some(wave) = self.waves.take_cleared(!self.enemies.is_empty()) {
            info!("wave {} cleared", wave.get() + 1);
            out_events.push(Event::WaveCleared { wave });
        }

        let all_started = self.waves.started() as usize >= self.config.waves.len();
        if all_started && !self.wave_active() && self.ledger.player_hp() > 0 {
            self.ledger.finish(RunStatus::Won);
            info!("run won with {} hp left", self.ledger.player_hp());
            out_events.push(Event::RunWon);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn ignore(reason: IgnoredCommand, out_events: &mut Vec<Event>) {
    warn!("command ignored: {reason}");
    out_events.push(Event::CommandIgnored { reason });
}

fn reject_finished(command: &Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PlaceTower { kind, position } => {
            out_events.push(Event::TowerPlacementRejected {
                kind: *kind,
                position: *position,
                reason: PlacementError::RunOver,
            });
        }
        Command::UpgradeTower { tower } => out_events.push(Event::TowerUpgradeRejected {
            tower: *tower,
            reason: UpgradeError::RunOver,
        }),
        Command::StartWave => out_events.push(Event::WaveStartRejected {
            reason: WaveStartError::RunOver,
        }),
        _ => ignore(IgnoredCommand::RunOver, out_events),
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if let Command::ResetRun = command {
        let config = std::mem::take(&mut world.config);
        *world = World::with_config(config);
        info!("run reset");
        out_events.push(Event::RunReset);
        return;
    }
    if !world.ledger.is_playing() {
        reject_finished(&command, out_events);
        return;
    }

    match command {
        Command::PlaceTower { kind, position } => world.place_tower(kind, position, out_events),
        Command::UpgradeTower { tower } => world.upgrade_tower(tower, out_events),
        Command::StartWave => world.start_wave(out_events),
        Command::SubmitAnswer { outcome } => world.submit_answer(outcome, out_events),
        Command::ResetRun => {}
        Command::Tick { dt } => {
            let dt = dt.min(world.config.simulation.max_tick);
            world.now = world.now.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt, now: world.now });
        }
        Command::SpawnEnemy { kind, wave } => world.spawn_enemy(kind, wave, out_events),
        Command::MoveEnemy { enemy, progress } => world.move_enemy(enemy, progress, out_events),
        Command::FireProjectile { tower, target } => {
            world.fire_projectile(tower, target, out_events);
        }
        Command::FireBeam { tower, targets } => world.fire_beam(tower, targets, out_events),
        Command::MoveProjectile {
            projectile,
            position,
        } => world.move_projectile(projectile, position, out_events),
        Command::DetonateProjectile { projectile, hits } => {
            world.detonate_projectile(projectile, hits, out_events);
        }
        Command::PruneProjectile { projectile } => world.prune_projectile(projectile, out_events),
        Command::ResolveDamage => world.resolve_damage(out_events),
        Command::EvaluateRun => world.evaluate_run(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use glam::Vec2;
    use quiz_defence_core::{
        EnemyView, GameConfig, PlacementError, ProjectileView, RunState, RunSummary, TowerId,
        TowerKind, TowerView,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the configuration the world was built from.
    #[must_use]
    pub fn config(world: &World) -> &GameConfig {
        &world.config
    }

    /// Current simulation clock.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.now
    }

    /// Total distance an enemy travels from spawn to the base.
    #[must_use]
    pub fn path_length(world: &World) -> f32 {
        world.path.length()
    }

    /// Waypoints of the enemy path in travel order.
    #[must_use]
    pub fn waypoints(world: &World) -> &[Vec2] {
        world.path.waypoints()
    }

    /// Captures a read-only view of every tower on the map.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        let towers = &world.config.towers;
        TowerView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| tower.snapshot(towers.get(tower.kind), world.now))
                .collect(),
        )
    }

    /// Captures a read-only view of every live enemy.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Captures a read-only view of every projectile in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .map(|projectile| projectile.snapshot())
                .collect(),
        )
    }

    /// Gold, health and progress for HUD display.
    #[must_use]
    pub fn run_state(world: &World) -> RunState {
        world.ledger.snapshot()
    }

    /// End-of-run summary for the result screen.
    #[must_use]
    pub fn run_summary(world: &World) -> RunSummary {
        RunSummary::from(world.ledger.snapshot())
    }

    /// Reports whether the current wave still has spawns queued or enemies alive.
    #[must_use]
    pub fn wave_active(world: &World) -> bool {
        world.wave_active()
    }

    /// Number of defined waves that have not been started yet.
    #[must_use]
    pub fn waves_remaining(world: &World) -> usize {
        world
            .config
            .waves
            .len()
            .saturating_sub(world.waves.started() as usize)
    }

    /// Previews whether a placement would succeed without mutating the world.
    pub fn placement_check(
        world: &World,
        kind: TowerKind,
        position: Vec2,
    ) -> Result<(), PlacementError> {
        if !world.ledger.is_playing() {
            return Err(PlacementError::RunOver);
        }
        world.placement_error(kind, position).map_or(Ok(()), Err)
    }

    /// Gold needed to upgrade the tower, or `None` when it is missing or capped.
    #[must_use]
    pub fn upgrade_cost(world: &World, tower: TowerId) -> Option<u32> {
        world.upgrade_error(tower).ok()
    }
}
