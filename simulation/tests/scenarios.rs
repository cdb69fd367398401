use std::time::Duration;

use glam::Vec2;
use quiz_defence_core::{
    AnswerOutcome, Command, EnemyKind, EnemyTypeDef, Event, GameConfig, PlacementError,
    RunStatus, SpawnGroup, TowerId, TowerKind, WaveDefinition, WaveStartError, WaveTable,
};
use quiz_defence_simulation::Simulation;
use quiz_defence_world::query;

const TICK: Duration = Duration::from_millis(50);

fn normal(hp: f32, speed: f32) -> EnemyTypeDef {
    EnemyTypeDef {
        hp,
        speed,
        reward: 10,
    }
}

fn single_wave(count: u32) -> WaveTable {
    WaveTable {
        lead_in: Duration::ZERO,
        waves: vec![WaveDefinition::new(vec![SpawnGroup::new(
            EnemyKind::Normal,
            count,
            Duration::ZERO,
        )])],
    }
}

fn place(simulation: &mut Simulation, kind: TowerKind, x: f32, y: f32) -> Vec<Event> {
    simulation.submit(Command::PlaceTower {
        kind,
        position: Vec2::new(x, y),
    })
}

fn run_until<F>(simulation: &mut Simulation, limit: usize, mut done: F) -> Vec<Event>
where
    F: FnMut(&Simulation) -> bool,
{
    let mut events = Vec::new();
    for _ in 0..limit {
        events.extend(simulation.tick(TICK));
        if done(simulation) {
            break;
        }
    }
    events
}

fn count<F>(events: &[Event], predicate: F) -> usize
where
    F: Fn(&Event) -> bool,
{
    events.iter().filter(|event| predicate(event)).count()
}

#[test]
fn placing_a_tower_spends_its_cost() {
    let mut simulation = Simulation::from_config(GameConfig::standard());

    let events = place(&mut simulation, TowerKind::Basic, 100.0, 150.0);

    assert!(matches!(
        events.as_slice(),
        [Event::TowerPlaced { gold: 50, .. }]
    ));
    let frame = simulation.frame();
    assert_eq!(frame.run.gold, 50);
    assert_eq!(frame.towers.len(), 1);
    assert_eq!(frame.run.stats.towers_placed, 1);
}

#[test]
fn placement_on_the_path_changes_nothing() {
    let mut simulation = Simulation::from_config(GameConfig::standard());

    let events = place(&mut simulation, TowerKind::Basic, 100.0, 110.0);

    assert_eq!(
        events,
        vec![Event::TowerPlacementRejected {
            kind: TowerKind::Basic,
            position: Vec2::new(100.0, 110.0),
            reason: PlacementError::OnPath,
        }]
    );
    let frame = simulation.frame();
    assert_eq!(frame.run.gold, 100);
    assert!(frame.towers.is_empty());
}

#[test]
fn basic_tower_kills_a_normal_enemy_with_three_shots() {
    let mut config = GameConfig::standard();
    config.enemies = config.enemies.with(EnemyKind::Normal, normal(50.0, 60.0));
    config.waves = single_wave(1);
    let mut simulation = Simulation::from_config(config);
    let _ = place(&mut simulation, TowerKind::Basic, 100.0, 140.0);
    let _ = simulation.submit(Command::StartWave);

    let events = run_until(&mut simulation, 200, |simulation| {
        query::run_state(simulation.world()).stats.enemies_killed > 0
    });

    let kill_at = events
        .iter()
        .position(|event| matches!(event, Event::EnemyDefeated { .. }))
        .expect("enemy defeated");
    let shots = count(&events[..kill_at], |event| {
        matches!(event, Event::ProjectileFired { .. })
    });
    assert_eq!(shots, 3);
    assert_eq!(
        count(&events, |event| matches!(event, Event::EnemyDefeated { .. })),
        1
    );

    let state = query::run_state(simulation.world());
    assert_eq!(state.gold, 50 + 10);
    assert_eq!(state.stats.gold_earned, 10);
    assert_eq!(state.player_hp, 100);
    assert_eq!(state.status, RunStatus::Won);
}

#[test]
fn upgraded_tower_hits_harder_in_play() {
    let mut config = GameConfig::standard();
    config.enemies = config.enemies.with(EnemyKind::Normal, normal(50.0, 60.0));
    config.waves = single_wave(1);
    let mut simulation = Simulation::from_config(config);
    let _ = place(&mut simulation, TowerKind::Basic, 100.0, 140.0);

    let events = simulation.submit(Command::UpgradeTower {
        tower: TowerId::new(0),
    });
    assert_eq!(
        events,
        vec![Event::TowerUpgraded {
            tower: TowerId::new(0),
            level: 2,
            gold: 10,
        }]
    );
    let frame = simulation.frame();
    let tower = frame.towers.get(TowerId::new(0)).expect("placed tower");
    assert_eq!(tower.damage, 30.0);
    assert!(tower.range > 120.0);

    let _ = simulation.submit(Command::StartWave);
    let events = run_until(&mut simulation, 200, |simulation| {
        query::run_state(simulation.world()).stats.enemies_killed > 0
    });

    let first_impact = events
        .iter()
        .position(|event| matches!(event, Event::ProjectileDetonated { .. }))
        .expect("projectile detonated");
    let kill_at = events
        .iter()
        .position(|event| matches!(event, Event::EnemyDefeated { .. }))
        .expect("enemy defeated");
    assert!(first_impact < kill_at);
    let shots = count(&events[..kill_at], |event| {
        matches!(event, Event::ProjectileFired { .. })
    });
    assert_eq!(shots, 2);
    assert_eq!(query::run_state(simulation.world()).gold, 10 + 10);
}

#[test]
fn splash_damages_a_whole_cluster_in_one_resolution() {
    let mut config = GameConfig::standard();
    config.economy.starting_gold = 500;
    config.enemies = config.enemies.with(EnemyKind::Normal, normal(50.0, 60.0));
    config.waves = single_wave(3);
    let mut simulation = Simulation::from_config(config);
    let _ = place(&mut simulation, TowerKind::Splash, 40.0, 150.0);
    let _ = simulation.submit(Command::StartWave);

    let mut impact = Vec::new();
    for _ in 0..40 {
        let events = simulation.tick(TICK);
        if events
            .iter()
            .any(|event| matches!(event, Event::ProjectileDetonated { .. }))
        {
            impact = events;
            break;
        }
    }

    assert_eq!(
        count(&impact, |event| matches!(event, Event::ProjectileDetonated { .. })),
        1
    );
    let frame = simulation.frame();
    assert_eq!(frame.enemies.len(), 3);
    assert!(frame.enemies.iter().all(|enemy| enemy.hp == 35.0));
}

#[test]
fn cannon_blast_sweeps_each_defeated_enemy_once() {
    let mut config = GameConfig::standard();
    config.economy.starting_gold = 500;
    config.enemies = config.enemies.with(EnemyKind::Normal, normal(30.0, 60.0));
    config.waves = single_wave(3);
    let mut simulation = Simulation::from_config(config);
    let _ = place(&mut simulation, TowerKind::Cannon, 40.0, 150.0);
    let _ = simulation.submit(Command::StartWave);

    let events = run_until(&mut simulation, 40, |simulation| {
        query::run_state(simulation.world()).stats.enemies_killed > 0
    });

    let mut defeated: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::EnemyDefeated { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .collect();
    assert_eq!(defeated.len(), 3);
    defeated.dedup();
    assert_eq!(defeated.len(), 3);
    assert_eq!(
        count(&events, |event| matches!(event, Event::ProjectileDetonated { .. })),
        1
    );

    let state = query::run_state(simulation.world());
    assert_eq!(state.stats.enemies_killed, 3);
    assert_eq!(state.gold, 500 - 175 + 3 * 10);
    assert_eq!(state.status, RunStatus::Won);
    assert!(simulation.frame().enemies.is_empty());
}

#[test]
fn enemy_reaching_the_end_costs_health_and_pays_nothing() {
    let mut config = GameConfig::standard();
    config.map.waypoints = vec![Vec2::new(0.0, 100.0), Vec2::new(30.0, 100.0)];
    config.enemies = config.enemies.with(EnemyKind::Normal, normal(30.0, 120.0));
    config.waves = single_wave(1);
    let mut simulation = Simulation::from_config(config);
    let _ = simulation.submit(Command::StartWave);

    let events = run_until(&mut simulation, 40, |simulation| {
        query::enemy_view(simulation.world()).is_empty()
    });

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemyArrived { player_hp: 90, .. })));
    let state = query::run_state(simulation.world());
    assert_eq!(state.player_hp, 90);
    assert_eq!(state.gold, 100);
    assert_eq!(state.stats.enemies_killed, 0);
}

#[test]
fn laser_strikes_every_enemy_in_range_at_once() {
    let mut config = GameConfig::standard();
    config.economy.starting_gold = 500;
    config.enemies = config.enemies.with(EnemyKind::Normal, normal(50.0, 60.0));
    config.waves = single_wave(3);
    let mut simulation = Simulation::from_config(config);
    let _ = place(&mut simulation, TowerKind::Laser, 40.0, 150.0);
    let _ = simulation.submit(Command::StartWave);

    let events = simulation.tick(TICK);

    let beams: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::BeamFired { targets, .. } => Some(targets.len()),
            _ => None,
        })
        .collect();
    assert_eq!(beams, vec![3]);
    assert_eq!(
        count(&events, |event| matches!(event, Event::ProjectileFired { .. })),
        0
    );
    let frame = simulation.frame();
    assert!(frame.projectiles.is_empty());
    assert_eq!(frame.enemies.len(), 3);
    assert!(frame.enemies.iter().all(|enemy| enemy.hp == 42.0));
}

#[test]
fn starting_a_wave_while_enemies_live_is_rejected() {
    let mut config = GameConfig::standard();
    config.map.waypoints = vec![Vec2::new(0.0, 100.0), Vec2::new(60.0, 100.0)];
    config.enemies = config.enemies.with(EnemyKind::Normal, normal(50.0, 60.0));
    config.waves = WaveTable {
        lead_in: Duration::ZERO,
        waves: vec![
            WaveDefinition::new(vec![SpawnGroup::new(EnemyKind::Normal, 1, Duration::ZERO)]),
            WaveDefinition::new(vec![SpawnGroup::new(EnemyKind::Normal, 4, Duration::ZERO)]),
        ],
    };
    let mut simulation = Simulation::from_config(config);
    let _ = simulation.submit(Command::StartWave);
    let _ = run_until(&mut simulation, 100, |simulation| {
        !query::wave_active(simulation.world())
    });
    assert_eq!(query::run_state(simulation.world()).status, RunStatus::Playing);

    let _ = simulation.submit(Command::StartWave);
    let _ = simulation.tick(TICK);
    assert_eq!(simulation.frame().enemies.len(), 4);
    let before = query::run_state(simulation.world());

    let events = simulation.submit(Command::StartWave);

    assert_eq!(
        events,
        vec![Event::WaveStartRejected {
            reason: WaveStartError::WaveInProgress,
        }]
    );
    assert_eq!(query::run_state(simulation.world()), before);
    assert_eq!(before.wave, 2);
    assert_eq!(query::waves_remaining(simulation.world()), 0);
}

#[test]
fn answer_streak_raises_rewards_until_a_miss() {
    let mut simulation = Simulation::from_config(GameConfig::standard());
    let correct = Command::SubmitAnswer {
        outcome: AnswerOutcome::Correct {
            elapsed: Duration::from_secs(5),
            time_limit: Duration::from_secs(10),
        },
    };
    let mut rewards = Vec::new();
    for _ in 0..6 {
        for event in simulation.submit(correct.clone()) {
            if let Event::GoldAwarded { amount, .. } = event {
                rewards.push(amount);
            }
        }
    }
    assert_eq!(rewards.len(), 6);
    assert!(rewards[5] > rewards[0]);
    assert!(rewards.windows(2).all(|pair| pair[1] >= pair[0]));
    assert_eq!(query::run_state(simulation.world()).streak, 6);

    let events = simulation.submit(Command::SubmitAnswer {
        outcome: AnswerOutcome::Incorrect,
    });
    assert_eq!(events, vec![Event::AnswerPenalized { player_hp: 95 }]);
    assert_eq!(query::run_state(simulation.world()).streak, 0);

    let events = simulation.submit(correct);
    assert_eq!(
        events,
        vec![Event::GoldAwarded {
            amount: rewards[0],
            streak: 1,
        }]
    );
}

#[test]
fn lost_run_freezes_until_reset() {
    let mut config = GameConfig::standard();
    config.economy.starting_hp = 10;
    config.map.waypoints = vec![Vec2::new(0.0, 100.0), Vec2::new(30.0, 100.0)];
    config.enemies = config.enemies.with(EnemyKind::Normal, normal(50.0, 120.0));
    config.waves = single_wave(1);
    let mut simulation = Simulation::from_config(config);
    let _ = simulation.submit(Command::StartWave);

    let events = run_until(&mut simulation, 40, |simulation| {
        query::run_state(simulation.world()).status != RunStatus::Playing
    });

    assert_eq!(count(&events, |event| *event == Event::RunLost), 1);
    assert_eq!(query::run_state(simulation.world()).status, RunStatus::Lost);
    assert!(simulation.tick(TICK).is_empty());
    assert_eq!(
        place(&mut simulation, TowerKind::Basic, 100.0, 150.0),
        vec![Event::TowerPlacementRejected {
            kind: TowerKind::Basic,
            position: Vec2::new(100.0, 150.0),
            reason: PlacementError::RunOver,
        }]
    );

    assert_eq!(simulation.submit(Command::ResetRun), vec![Event::RunReset]);
    let state = query::run_state(simulation.world());
    assert_eq!(state.status, RunStatus::Playing);
    assert_eq!(state.player_hp, 10);
    assert_eq!(state.wave, 0);
    assert_eq!(query::now(simulation.world()), Duration::ZERO);
    assert!(simulation.frame().enemies.is_empty());
}

#[test]
fn reset_discards_scheduled_spawns() {
    let mut simulation = Simulation::from_config(GameConfig::standard());
    let _ = simulation.submit(Command::StartWave);
    let _ = simulation.submit(Command::ResetRun);

    let events = run_until(&mut simulation, 60, |_| false);

    assert_eq!(
        count(&events, |event| matches!(event, Event::EnemySpawned { .. })),
        0
    );
    assert_eq!(query::waves_remaining(simulation.world()), 5);
}
