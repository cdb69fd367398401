use std::time::Duration;

use glam::Vec2;
use quiz_defence_core::{
    Command, EnemyId, EnemyKind, EnemyTypeDef, Event, GameConfig, TowerId, TowerKind, WaveIndex,
};
use quiz_defence_system_projectiles::{Config, ProjectileResolution};
use quiz_defence_world::{self as world, query, World};

fn arena(enemy_hp: f32) -> World {
    let mut config = GameConfig::standard();
    config.economy.starting_gold = 500;
    config.enemies = config.enemies.with(
        EnemyKind::Normal,
        EnemyTypeDef {
            hp: enemy_hp,
            speed: 60.0,
            reward: 10,
        },
    );
    World::with_config(config)
}

fn apply_all(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn spawn_one(world: &mut World) {
    let _ = apply_all(
        world,
        vec![
            Command::StartWave,
            Command::SpawnEnemy {
                kind: EnemyKind::Normal,
                wave: WaveIndex::new(0),
            },
        ],
    );
}

fn step(world: &mut World, system: &mut ProjectileResolution) -> Vec<Event> {
    let tick = apply_all(
        world,
        vec![Command::Tick {
            dt: Duration::from_millis(100),
        }],
    );
    let mut commands = Vec::new();
    system.handle(
        &tick,
        &query::projectile_view(world),
        &query::enemy_view(world),
        &mut commands,
    );
    commands.push(Command::ResolveDamage);
    apply_all(world, commands)
}

#[test]
fn simultaneous_hits_kill_exactly_once() {
    let mut world = arena(30.0);
    let _ = apply_all(
        &mut world,
        vec![
            Command::PlaceTower {
                kind: TowerKind::Basic,
                position: Vec2::new(100.0, 150.0),
            },
            Command::PlaceTower {
                kind: TowerKind::Basic,
                position: Vec2::new(100.0, 50.0),
            },
        ],
    );
    spawn_one(&mut world);
    let fired = apply_all(
        &mut world,
        vec![
            Command::FireProjectile {
                tower: TowerId::new(0),
                target: EnemyId::new(0),
            },
            Command::FireProjectile {
                tower: TowerId::new(1),
                target: EnemyId::new(0),
            },
        ],
    );
    assert_eq!(query::projectile_view(&world).len(), 2, "{fired:?}");

    let mut system = ProjectileResolution::new(Config::new(4.0));
    let mut events = Vec::new();
    for _ in 0..6 {
        events.extend(step(&mut world, &mut system));
    }

    let kills = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyDefeated { .. }))
        .count();
    assert_eq!(kills, 1);
    let state = query::run_state(&world);
    assert_eq!(state.stats.enemies_killed, 1);
    assert_eq!(state.gold, 500 - 100 + 10);
    assert!(query::projectile_view(&world).is_empty());
    assert!(query::enemy_view(&world).is_empty());
}

#[test]
fn projectile_is_pruned_once_its_target_escapes() {
    let mut world = arena(50.0);
    let _ = apply_all(
        &mut world,
        vec![Command::PlaceTower {
            kind: TowerKind::Sniper,
            position: Vec2::new(100.0, 150.0),
        }],
    );
    spawn_one(&mut world);
    let _ = apply_all(
        &mut world,
        vec![
            Command::FireProjectile {
                tower: TowerId::new(0),
                target: EnemyId::new(0),
            },
            Command::MoveEnemy {
                enemy: EnemyId::new(0),
                progress: 1.0e6,
            },
        ],
    );
    assert!(query::enemy_view(&world).is_empty());

    let mut system = ProjectileResolution::new(Config::new(4.0));
    let events = step(&mut world, &mut system);

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ProjectilePruned { .. })));
    assert!(query::projectile_view(&world).is_empty());
}

#[test]
fn frost_impact_applies_timed_slow() {
    let mut world = arena(50.0);
    let _ = apply_all(
        &mut world,
        vec![Command::PlaceTower {
            kind: TowerKind::Frost,
            position: Vec2::new(40.0, 150.0),
        }],
    );
    spawn_one(&mut world);
    let _ = apply_all(
        &mut world,
        vec![Command::FireProjectile {
            tower: TowerId::new(0),
            target: EnemyId::new(0),
        }],
    );

    let mut system = ProjectileResolution::new(Config::new(4.0));
    let mut events = Vec::new();
    for _ in 0..5 {
        events.extend(step(&mut world, &mut system));
        if !query::projectile_view(&world).is_empty() {
            continue;
        }
        break;
    }

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ProjectileDetonated { .. })));
    let enemy = *query::enemy_view(&world).iter().next().expect("enemy survives");
    let slow = enemy.slow.expect("slow applied");
    assert_eq!(slow.multiplier, 0.5);
    assert_eq!(slow.until, query::now(&world) + Duration::from_secs(2));
    assert_eq!(enemy.hp, 45.0);
}
