use std::time::Duration;

use glam::Vec2;
use quiz_defence_core::{
    Command, EnemyKind, EnemyTypeDef, Event, GameConfig, RunStatus, SpawnGroup, WaveDefinition,
    WaveIndex, WaveTable,
};
use quiz_defence_system_movement::Movement;
use quiz_defence_world::{self as world, query, World};

fn short_course(waypoints: Vec<Vec2>, speed: f32, count: u32) -> GameConfig {
    let mut config = GameConfig::standard();
    config.map.waypoints = waypoints;
    config.enemies = config.enemies.with(
        EnemyKind::Normal,
        EnemyTypeDef {
            hp: 50.0,
            speed,
            reward: 10,
        },
    );
    config.waves = WaveTable {
        lead_in: Duration::ZERO,
        waves: vec![WaveDefinition::new(vec![SpawnGroup::new(
            EnemyKind::Normal,
            count,
            Duration::ZERO,
        )])],
    };
    config
}

fn spawn_all(world: &mut World, count: u32) {
    let mut events = Vec::new();
    world::apply(world, Command::StartWave, &mut events);
    for _ in 0..count {
        world::apply(
            world,
            Command::SpawnEnemy {
                kind: EnemyKind::Normal,
                wave: WaveIndex::new(0),
            },
            &mut events,
        );
    }
}

fn step(world: &mut World, movement: &mut Movement, millis: u64) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(millis),
        },
        &mut events,
    );

    let mut commands = Vec::new();
    movement.handle(&events, &query::enemy_view(world), &mut commands);

    let mut produced = Vec::new();
    for command in commands {
        world::apply(world, command, &mut produced);
    }
    produced
}

#[test]
fn enemies_advance_by_speed_times_dt() {
    let mut world = World::new();
    spawn_all(&mut world, 1);
    let mut movement = Movement::new();

    let _ = step(&mut world, &mut movement, 100);

    let enemy = *query::enemy_view(&world).iter().next().expect("enemy");
    assert!((enemy.progress - 6.0).abs() < 1e-3);
    assert!(enemy.position.distance(Vec2::new(6.0, 100.0)) < 1e-3);
}

#[test]
fn advance_across_waypoint_continues_on_next_segment() {
    let config = short_course(
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 100.0),
        ],
        150.0,
        1,
    );
    let mut world = World::with_config(config);
    spawn_all(&mut world, 1);
    let mut movement = Movement::new();

    let _ = step(&mut world, &mut movement, 100);

    let enemy = *query::enemy_view(&world).iter().next().expect("enemy");
    assert!(
        enemy.position.distance(Vec2::new(10.0, 5.0)) < 1e-3,
        "corner must not swallow the remaining distance: {:?}",
        enemy.position
    );
}

#[test]
fn arrival_costs_health_and_grants_no_gold() {
    let config = short_course(vec![Vec2::new(0.0, 0.0), Vec2::new(20.0, 0.0)], 60.0, 1);
    let mut world = World::with_config(config);
    spawn_all(&mut world, 1);
    let mut movement = Movement::new();

    let mut arrived = Vec::new();
    for _ in 0..4 {
        arrived.extend(step(&mut world, &mut movement, 100));
    }

    assert!(arrived
        .iter()
        .any(|event| matches!(event, Event::EnemyArrived { player_hp: 90, .. })));
    let state = query::run_state(&world);
    assert_eq!(state.player_hp, 90);
    assert_eq!(state.gold, 100);
    assert_eq!(state.stats.gold_earned, 0);
    assert_eq!(state.stats.enemies_killed, 0);
    assert!(query::enemy_view(&world).is_empty());
}

#[test]
fn simultaneous_arrivals_drain_health_to_zero() {
    let mut config = short_course(vec![Vec2::new(0.0, 0.0), Vec2::new(5.0, 0.0)], 60.0, 3);
    config.economy.starting_hp = 20;
    let mut world = World::with_config(config);
    spawn_all(&mut world, 3);
    let mut movement = Movement::new();

    let events = step(&mut world, &mut movement, 100);

    let lost = events
        .iter()
        .filter(|event| matches!(event, Event::RunLost))
        .count();
    assert_eq!(lost, 1, "loss is reported exactly once");
    let state = query::run_state(&world);
    assert_eq!(state.player_hp, 0);
    assert_eq!(state.status, RunStatus::Lost);
}

#[test]
fn progress_accumulates_across_ticks() {
    let mut world = World::new();
    spawn_all(&mut world, 1);
    let mut movement = Movement::new();

    for _ in 0..3 {
        let _ = step(&mut world, &mut movement, 100);
    }
    let enemy = *query::enemy_view(&world).iter().next().expect("enemy");
    assert!(enemy.slow.is_none());
    assert!((enemy.progress - 18.0).abs() < 1e-3);
    assert_eq!(query::now(&world), Duration::from_millis(300));
}
