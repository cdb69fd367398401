#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits attack commands from targeting data.

use quiz_defence_core::{Command, TowerSnapshot, TowerTarget, TowerView};

/// Tower combat system that queues attack commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `FireProjectile` or `FireBeam` entries for towers ready to attack.
    ///
    /// Towers without an assignment never appear in `tower_targets`, so a
    /// tower with nothing in range keeps its cooldown untouched.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if tower_targets.is_empty() || towers.is_empty() {
            return;
        }

        self.scratch.clear();

        for target in tower_targets {
            let Some(snapshot) = find_tower(towers, target) else {
                continue;
            };
            if !snapshot.is_ready() {
                continue;
            }

            match target {
                TowerTarget::Homing { tower, enemy } => {
                    self.scratch.push(Command::FireProjectile {
                        tower: *tower,
                        target: *enemy,
                    });
                }
                TowerTarget::Beam { tower, enemies } => {
                    self.scratch.push(Command::FireBeam {
                        tower: *tower,
                        targets: enemies.clone(),
                    });
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn find_tower<'a>(towers: &'a TowerView, target: &TowerTarget) -> Option<&'a TowerSnapshot> {
    towers.get(target.tower())
}
