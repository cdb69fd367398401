//! Gold, health and run statistics.

use std::time::Duration;

use quiz_defence_core::{EconomyRules, RunState, RunStats, RunStatus};

/// Computes the gold granted for a correct answer.
///
/// Faster answers earn up to double the base reward, and every prior
/// consecutive correct answer (capped at `streak_cap`) adds `streak_bonus`
/// on top. A zero time limit is treated as having no time left.
#[must_use]
pub fn answer_reward(
    rules: &EconomyRules,
    elapsed: Duration,
    time_limit: Duration,
    streak: u32,
) -> u32 {
    let remaining = if time_limit.is_zero() {
        0.0
    } else {
        (1.0 - elapsed.as_secs_f32() / time_limit.as_secs_f32()).clamp(0.0, 1.0)
    };
    let streak_factor = 1.0 + rules.streak_bonus.max(0.0) * streak.min(rules.streak_cap) as f32;
    let gold = rules.answer_reward as f32 * (1.0 + remaining) * streak_factor;
    gold.round() as u32
}

#[derive(Clone, Debug)]
pub(crate) struct Ledger {
    gold: u32,
    player_hp: u32,
    wave: u32,
    status: RunStatus,
    streak: u32,
    stats: RunStats,
}

impl Ledger {
    pub(crate) fn new(rules: &EconomyRules) -> Self {
        Self {
            gold: rules.starting_gold,
            player_hp: rules.starting_hp,
            wave: 0,
            status: RunStatus::Playing,
            streak: 0,
            stats: RunStats::default(),
        }
    }

    pub(crate) fn gold(&self) -> u32 {
        self.gold
    }

    pub(crate) fn player_hp(&self) -> u32 {
        self.player_hp
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.status == RunStatus::Playing
    }

    /// Deducts `cost` when affordable, reporting whether the purchase succeeded.
    pub(crate) fn spend(&mut self, cost: u32) -> bool {
        match self.gold.checked_sub(cost) {
            Some(remaining) => {
                self.gold = remaining;
                true
            }
            None => false,
        }
    }

    fn earn(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
        self.stats.gold_earned = self.stats.gold_earned.saturating_add(amount);
    }

    pub(crate) fn credit_kill(&mut self, reward: u32) {
        self.earn(reward);
        self.stats.enemies_killed = self.stats.enemies_killed.saturating_add(1);
    }

    pub(crate) fn record_tower_placed(&mut self) {
        self.stats.towers_placed = self.stats.towers_placed.saturating_add(1);
    }

    pub(crate) fn set_wave(&mut self, wave: u32) {
        self.wave = wave;
    }

    /// Removes health, saturating at zero, and returns what remains.
    pub(crate) fn damage_player(&mut self, amount: u32) -> u32 {
        self.player_hp = self.player_hp.saturating_sub(amount);
        self.player_hp
    }

    /// Grants the answer reward for the current streak, then extends the streak.
    pub(crate) fn reward_answer(
        &mut self,
        rules: &EconomyRules,
        elapsed: Duration,
        time_limit: Duration,
    ) -> u32 {
        let amount = answer_reward(rules, elapsed, time_limit, self.streak);
        self.earn(amount);
        self.streak = self.streak.saturating_add(1);
        amount
    }

    pub(crate) fn reset_streak(&mut self) {
        self.streak = 0;
    }

    pub(crate) fn streak(&self) -> u32 {
        self.streak
    }

    pub(crate) fn finish(&mut self, status: RunStatus) {
        if self.status == RunStatus::Playing {
            self.status = status;
        }
    }

    pub(crate) fn snapshot(&self) -> RunState {
        RunState {
            gold: self.gold,
            player_hp: self.player_hp,
            wave: self.wave,
            status: self.status,
            streak: self.streak,
            stats: self.stats,
        }
    }
}
