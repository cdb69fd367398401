//! Scripted command logs replayed by the headless host.
//!
//! A script is a TOML document made of `[[step]]` tables. Each step names
//! the tick before which it is submitted and an action `type`:
//!
//! ```toml
//! [[step]]
//! tick = 0
//! type = "place"
//! kind = "basic"
//! x = 100.0
//! y = 150.0
//!
//! [[step]]
//! tick = 5
//! type = "start_wave"
//! ```

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use glam::Vec2;
use quiz_defence_core::{AnswerOutcome, Command, TowerId, TowerKind};
use serde::Deserialize;

const DEFAULT_TIME_LIMIT_MS: u64 = 10_000;

/// Ordered list of player commands keyed by tick.
#[derive(Debug, Deserialize)]
pub(crate) struct Script {
    #[serde(default, rename = "step")]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    tick: u64,
    #[serde(flatten)]
    action: Action,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Action {
    Place {
        kind: TowerKind,
        x: f32,
        y: f32,
    },
    Upgrade {
        tower: u32,
    },
    StartWave,
    Answer {
        correct: bool,
        #[serde(default)]
        elapsed_ms: u64,
        #[serde(default = "default_time_limit")]
        time_limit_ms: u64,
    },
    Reset,
}

fn default_time_limit() -> u64 {
    DEFAULT_TIME_LIMIT_MS
}

impl Action {
    fn command(self) -> Command {
        match self {
            Self::Place { kind, x, y } => Command::PlaceTower {
                kind,
                position: Vec2::new(x, y),
            },
            Self::Upgrade { tower } => Command::UpgradeTower {
                tower: TowerId::new(tower),
            },
            Self::StartWave => Command::StartWave,
            Self::Answer {
                correct: true,
                elapsed_ms,
                time_limit_ms,
            } => Command::SubmitAnswer {
                outcome: AnswerOutcome::Correct {
                    elapsed: Duration::from_millis(elapsed_ms),
                    time_limit: Duration::from_millis(time_limit_ms),
                },
            },
            Self::Answer { correct: false, .. } => Command::SubmitAnswer {
                outcome: AnswerOutcome::Incorrect,
            },
            Self::Reset => Command::ResetRun,
        }
    }
}

impl Script {
    /// Reads a script from disk.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid script {}", path.display()))
    }

    /// Parses a script document. Steps sharing a tick keep their file order.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let mut script: Self = toml::from_str(contents)?;
        script.steps.sort_by_key(|step| step.tick);
        Ok(script)
    }

    /// Number of steps in the script.
    pub(crate) fn len(&self) -> usize {
        self.steps.len()
    }

    /// Tick of the final step, if any.
    pub(crate) fn last_tick(&self) -> Option<u64> {
        self.steps.last().map(|step| step.tick)
    }

    /// Commands to submit before `tick` runs.
    pub(crate) fn commands_at(&self, tick: u64) -> impl Iterator<Item = Command> + '_ {
        self.steps
            .iter()
            .skip_while(move |step| step.tick < tick)
            .take_while(move |step| step.tick == tick)
            .map(|step| step.action.command())
    }
}
