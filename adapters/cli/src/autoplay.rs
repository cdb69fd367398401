//! Simple automated player used by the `--auto` flag.

use std::time::Duration;

use glam::Vec2;
use quiz_defence_core::{AnswerOutcome, Command, RunStatus, TowerId, TowerKind};
use quiz_defence_world::{query, World};

/// Extra spacing kept between a candidate footprint and the path edge.
const PATH_MARGIN: f32 = 4.0;
/// Fractions along each path segment where towers are considered.
const SEGMENT_STOPS: [f32; 3] = [0.25, 0.5, 0.75];
/// Ticks between simulated quiz answers.
const ANSWER_INTERVAL: u64 = 100;

/// Strategy that builds basic towers beside the path, upgrades them once
/// the spots run out, answers quiz questions at a steady pace and starts
/// waves whenever the field is clear.
#[derive(Debug)]
pub(crate) struct AutoPlayer {
    kind: TowerKind,
    candidates: Vec<Vec2>,
}

impl AutoPlayer {
    /// Precomputes build spots on both sides of every path segment.
    pub(crate) fn new(world: &World) -> Self {
        let map = &query::config(world).map;
        let clearance = map.path_half_width + map.tower_radius + PATH_MARGIN;
        let mut candidates = Vec::new();
        for segment in query::waypoints(world).windows(2) {
            let (start, end) = (segment[0], segment[1]);
            let normal = (end - start).normalize_or_zero().perp();
            for stop in SEGMENT_STOPS {
                let anchor = start.lerp(end, stop);
                candidates.push(anchor + normal * clearance);
                candidates.push(anchor - normal * clearance);
            }
        }
        Self {
            kind: TowerKind::Basic,
            candidates,
        }
    }

    /// Number of build spots the strategy considers.
    pub(crate) fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Emits the player commands for `tick`.
    pub(crate) fn plan(&self, tick: u64, world: &World, out: &mut Vec<Command>) {
        if query::run_state(world).status != RunStatus::Playing {
            return;
        }

        if tick > 0 && tick % ANSWER_INTERVAL == 0 {
            out.push(Command::SubmitAnswer {
                outcome: AnswerOutcome::Correct {
                    elapsed: Duration::from_secs(4),
                    time_limit: Duration::from_secs(10),
                },
            });
        }

        if let Some(position) = self.next_spot(world) {
            out.push(Command::PlaceTower {
                kind: self.kind,
                position,
            });
        } else if let Some(tower) = self.cheapest_upgrade(world) {
            out.push(Command::UpgradeTower { tower });
        }

        if !query::wave_active(world) && query::waves_remaining(world) > 0 {
            out.push(Command::StartWave);
        }
    }

    fn next_spot(&self, world: &World) -> Option<Vec2> {
        self.candidates
            .iter()
            .copied()
            .find(|position| query::placement_check(world, self.kind, *position).is_ok())
    }

    fn cheapest_upgrade(&self, world: &World) -> Option<TowerId> {
        let gold = query::run_state(world).gold;
        query::tower_view(world)
            .iter()
            .filter_map(|tower| {
                query::upgrade_cost(world, tower.id)
                    .filter(|cost| *cost <= gold)
                    .map(|cost| (cost, tower.id))
            })
            .min()
            .map(|(_, tower)| tower)
    }
}
