#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Quiz Defence combat engine.
//!
//! This crate defines the message surface that connects hosts, the
//! authoritative world, and pure systems. Hosts and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod tables;

pub use tables::{
    Delivery, EconomyRules, EnemyKind, EnemyTable, EnemyTypeDef, GameConfig, ImpactEffect,
    MapConfig, SimulationRules, SpawnGroup, TowerKind, TowerTable, TowerTypeDef, WaveDefinition,
    WaveTable,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Quiz Defence.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Requests placement of a tower centred on the provided map position.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Centre of the tower footprint in map space.
        position: Vec2,
    },
    /// Requests that an existing tower gain one level.
    UpgradeTower {
        /// Identifier of the tower to upgrade.
        tower: TowerId,
    },
    /// Requests that the next wave begin spawning.
    StartWave,
    /// Reports the outcome of a trivia question answered by the player.
    SubmitAnswer {
        /// Correctness and timing of the answer.
        outcome: AnswerOutcome,
    },
    /// Restores the run to its starting state.
    ResetRun,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that an enemy from the active wave enter the path.
    SpawnEnemy {
        /// Archetype of the enemy to create.
        kind: EnemyKind,
        /// Wave the spawn belongs to.
        wave: WaveIndex,
    },
    /// Moves an enemy to a new distance along the path.
    MoveEnemy {
        /// Identifier of the enemy to move.
        enemy: EnemyId,
        /// Distance travelled from the first waypoint.
        progress: f32,
    },
    /// Requests that a projectile tower fire at a target.
    FireProjectile {
        /// Identifier of the firing tower.
        tower: TowerId,
        /// Enemy the projectile homes onto.
        target: EnemyId,
    },
    /// Requests that a beam tower strike every listed enemy this tick.
    FireBeam {
        /// Identifier of the firing tower.
        tower: TowerId,
        /// Enemies caught in the beam.
        targets: Vec<EnemyId>,
    },
    /// Moves an in-flight projectile.
    MoveProjectile {
        /// Identifier of the projectile to move.
        projectile: ProjectileId,
        /// New position in map space.
        position: Vec2,
    },
    /// Lands a projectile, queueing the provided hits.
    DetonateProjectile {
        /// Identifier of the projectile that landed.
        projectile: ProjectileId,
        /// Damage dealt by the impact.
        hits: Vec<Hit>,
    },
    /// Removes a projectile whose target no longer exists.
    PruneProjectile {
        /// Identifier of the orphaned projectile.
        projectile: ProjectileId,
    },
    /// Applies every pending hit and removes defeated enemies.
    ResolveDamage,
    /// Evaluates wave completion and the win/loss conditions.
    EvaluateRun,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick, after clamping.
        dt: Duration,
        /// Simulation clock after the advance.
        now: Duration,
    },
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Centre of the tower footprint.
        position: Vec2,
        /// Gold remaining after the purchase.
        gold: u32,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Position provided in the placement request.
        position: Vec2,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower gained a level.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Level reached by the tower.
        level: u32,
        /// Gold remaining after the purchase.
        gold: u32,
    },
    /// Reports that an upgrade request was rejected.
    TowerUpgradeRejected {
        /// Identifier provided in the upgrade request.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Announces that a wave began.
    WaveStarted {
        /// Wave that started.
        wave: WaveIndex,
        /// Simulation time at which the wave started.
        at: Duration,
    },
    /// Reports that a wave-start request was rejected.
    WaveStartRejected {
        /// Specific reason the request failed.
        reason: WaveStartError,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Wave the enemy belongs to.
        wave: WaveIndex,
    },
    /// Reports that an enemy reached the base.
    EnemyArrived {
        /// Identifier of the enemy that arrived.
        enemy: EnemyId,
        /// Player health remaining after the arrival.
        player_hp: u32,
    },
    /// Confirms that a tower launched a projectile.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Enemy the projectile homes onto.
        target: EnemyId,
    },
    /// Confirms that a beam tower struck its targets.
    BeamFired {
        /// Tower that fired.
        tower: TowerId,
        /// Enemies struck by the beam.
        targets: Vec<EnemyId>,
    },
    /// Confirms that a projectile landed.
    ProjectileDetonated {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Impact point.
        position: Vec2,
    },
    /// Confirms that an orphaned projectile was removed.
    ProjectilePruned {
        /// Identifier of the projectile.
        projectile: ProjectileId,
    },
    /// Reports that an enemy was destroyed.
    EnemyDefeated {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
        /// Archetype of the destroyed enemy.
        kind: EnemyKind,
        /// Gold granted for the kill.
        reward: u32,
    },
    /// Reports that a wave has no spawns left and no surviving enemies.
    WaveCleared {
        /// Wave that was cleared.
        wave: WaveIndex,
    },
    /// Reports gold granted for a correct answer.
    GoldAwarded {
        /// Amount of gold granted.
        amount: u32,
        /// Consecutive correct answers including this one.
        streak: u32,
    },
    /// Reports the penalty applied for an incorrect answer.
    AnswerPenalized {
        /// Player health remaining after the penalty.
        player_hp: u32,
    },
    /// The final wave was cleared with the base intact.
    RunWon,
    /// Player health reached zero.
    RunLost,
    /// The run was restored to its starting state.
    RunReset,
    /// A phase command could not be applied and was dropped.
    CommandIgnored {
        /// Reason the command was dropped.
        reason: IgnoredCommand,
    },
}

/// Reasons a phase command may be dropped without mutating the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum IgnoredCommand {
    /// The run already ended.
    #[error("the run is over")]
    RunOver,
    /// The referenced tower does not exist.
    #[error("tower {0:?} does not exist")]
    MissingTower(TowerId),
    /// The referenced enemy does not exist.
    #[error("enemy {0:?} does not exist")]
    MissingEnemy(EnemyId),
    /// The referenced projectile does not exist.
    #[error("projectile {0:?} does not exist")]
    MissingProjectile(ProjectileId),
    /// The tower is still cooling down.
    #[error("tower {0:?} is not ready to attack")]
    TowerNotReady(TowerId),
    /// The tower's delivery does not match the fire command.
    #[error("tower {0:?} cannot fire that way")]
    WrongDelivery(TowerId),
    /// A beam was fired without any surviving targets.
    #[error("beam from tower {0:?} had no targets")]
    NoTargets(TowerId),
    /// The wave has no spawns left to materialise.
    #[error("wave {0:?} has no pending spawns")]
    NoPendingSpawn(WaveIndex),
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The run already ended.
    #[error("the run is over")]
    RunOver,
    /// The player cannot afford the tower.
    #[error("not enough gold")]
    InsufficientGold,
    /// The footprint extends beyond the map bounds.
    #[error("position is outside the map")]
    OutOfBounds,
    /// The footprint overlaps the enemy path.
    #[error("position overlaps the path")]
    OnPath,
    /// The footprint overlaps another tower.
    #[error("position overlaps another tower")]
    Occupied,
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum UpgradeError {
    /// The run already ended.
    #[error("the run is over")]
    RunOver,
    /// No tower with the provided identifier exists.
    #[error("tower does not exist")]
    MissingTower,
    /// The tower already reached the level cap.
    #[error("tower is already at maximum level")]
    MaxLevel,
    /// The player cannot afford the upgrade.
    #[error("not enough gold")]
    InsufficientGold,
}

/// Reasons a wave-start request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum WaveStartError {
    /// The run already ended.
    #[error("the run is over")]
    RunOver,
    /// The previous wave still has spawns queued or enemies alive.
    #[error("a wave is already in progress")]
    WaveInProgress,
    /// Every defined wave has already been started.
    #[error("no waves remain")]
    NoWavesRemaining,
}

/// Correctness and timing of an answered question.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The player answered correctly.
    Correct {
        /// Time the player took to answer.
        elapsed: Duration,
        /// Time allowed for the question.
        time_limit: Duration,
    },
    /// The player answered incorrectly or ran out of time.
    Incorrect,
}

/// Damage queued against a single enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Enemy receiving the damage.
    pub enemy: EnemyId,
    /// Amount of damage.
    pub damage: f32,
}

impl Hit {
    /// Creates a new hit record.
    #[must_use]
    pub const fn new(enemy: EnemyId, damage: f32) -> Self {
        Self { enemy, damage }
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Zero-based index of a wave within the wave table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaveIndex(u32);

impl WaveIndex {
    /// Creates a new wave index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Timed speed reduction applied to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlowEffect {
    /// Multiplier applied to the enemy's base speed.
    pub multiplier: f32,
    /// Simulation time at which the slow stops applying.
    pub until: Duration,
}

impl SlowEffect {
    /// Reports whether the slow still applies at `now`.
    #[must_use]
    pub fn is_active(&self, now: Duration) -> bool {
        self.until > now
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Centre of the tower footprint.
    pub position: Vec2,
    /// Current level, starting at one.
    pub level: u32,
    /// Targeting radius at the current level.
    pub range: f32,
    /// Damage per attack at the current level.
    pub damage: f32,
    /// Damage delivery mode.
    pub delivery: Delivery,
    /// Simulated time remaining before the tower may attack again.
    pub ready_in: Duration,
}

impl TowerSnapshot {
    /// Reports whether the tower's cooldown elapsed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready_in.is_zero()
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Wave the enemy belongs to.
    pub wave: WaveIndex,
    /// Remaining health, never negative.
    pub hp: f32,
    /// Health at spawn.
    pub max_hp: f32,
    /// Base movement speed.
    pub speed: f32,
    /// Active or lapsed slow, if any was applied.
    pub slow: Option<SlowEffect>,
    /// Distance travelled along the path.
    pub progress: f32,
    /// Position interpolated from `progress`.
    pub position: Vec2,
}

/// Immutable representation of a single projectile's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Unique identifier assigned to the projectile.
    pub id: ProjectileId,
    /// Tower that fired the projectile.
    pub tower: TowerId,
    /// Enemy the projectile homes onto.
    pub target: EnemyId,
    /// Current position.
    pub position: Vec2,
    /// Travel speed in map units per second.
    pub speed: f32,
    /// Damage carried by the projectile.
    pub damage: f32,
    /// Rule applied on impact.
    pub effect: ImpactEffect,
}

/// Read-only snapshot describing all towers on the map.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a tower snapshot by identifier.
    #[must_use]
    pub fn get(&self, tower: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&tower, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of towers captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot describing all enemies on the path.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up an enemy snapshot by identifier.
    #[must_use]
    pub fn get(&self, enemy: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&enemy, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of enemies captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of projectiles captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Target assignment computed for a single tower.
#[derive(Clone, Debug, PartialEq)]
pub enum TowerTarget {
    /// A projectile tower locked onto one enemy.
    Homing {
        /// Tower that owns the assignment.
        tower: TowerId,
        /// Enemy closest to the base within range.
        enemy: EnemyId,
    },
    /// A beam tower sweeping every enemy within range.
    Beam {
        /// Tower that owns the assignment.
        tower: TowerId,
        /// Enemies within range in identifier order.
        enemies: Vec<EnemyId>,
    },
}

impl TowerTarget {
    /// Tower that owns the assignment.
    #[must_use]
    pub const fn tower(&self) -> TowerId {
        match self {
            Self::Homing { tower, .. } | Self::Beam { tower, .. } => *tower,
        }
    }
}

/// Lifecycle of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    /// The run is in progress.
    Playing,
    /// Every wave was cleared with the base intact.
    Won,
    /// Player health reached zero.
    Lost,
}

/// Cumulative counters tracked for the result screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunStats {
    /// Enemies destroyed by towers.
    pub enemies_killed: u32,
    /// Gold earned from kills and answers.
    pub gold_earned: u32,
    /// Towers successfully placed.
    pub towers_placed: u32,
}

/// Gold, health and progress ledger exposed for HUD display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RunState {
    /// Gold available to spend.
    pub gold: u32,
    /// Remaining player health.
    pub player_hp: u32,
    /// Number of waves started so far, which doubles as the current wave number.
    pub wave: u32,
    /// Lifecycle of the run.
    pub status: RunStatus,
    /// Consecutive correct answers.
    pub streak: u32,
    /// Cumulative counters.
    pub stats: RunStats,
}

/// End-of-run summary consumed by the result screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunSummary {
    /// Highest wave number reached.
    pub waves_reached: u32,
    /// Total gold earned across the run.
    pub gold_earned: u32,
    /// Towers placed across the run.
    pub towers_placed: u32,
    /// Enemies destroyed across the run.
    pub enemies_killed: u32,
    /// Outcome of the run.
    pub status: RunStatus,
}

impl From<RunState> for RunSummary {
    fn from(state: RunState) -> Self {
        Self {
            waves_reached: state.wave,
            gold_earned: state.stats.gold_earned,
            towers_placed: state.stats.towers_placed,
            enemies_killed: state.stats.enemies_killed,
            status: state.status,
        }
    }
}
