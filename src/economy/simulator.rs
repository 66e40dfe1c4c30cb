//! Headless balance simulator.
//!
//! Drives a real `Economy` over in-memory storage with a fixed click rhythm
//! and a greedy buyer (cheapest affordable upgrade first). Seeded, so every
//! run with the same settings produces the same report.
//!
//! Run the long scenarios with: cargo test simulate_ -- --nocapture

use std::fmt::Write as _;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::EngineConfig;

use super::catalog::UPGRADES;
use super::logic::RngRoll;
use super::save::MemoryStorage;
use super::view::format_money;
use super::Economy;

/// Wall-clock origin of a simulated session (ms).
const SIM_EPOCH_MS: f64 = 1_700_000_000_000.0;

/// Upper bound on purchases in a single buying spree.
const MAX_PURCHASES_PER_STEP: usize = 20;

#[derive(Clone, Debug)]
pub struct SimulationSettings {
    pub duration_secs: u32,
    /// Milliseconds between two clicks. Below 260 every click is rushed.
    pub click_interval_ms: f64,
    pub tick_interval_ms: f64,
    pub seed: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            duration_secs: 600,
            click_interval_ms: 300.0,
            tick_interval_ms: 400.0,
            seed: 42,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PurchaseRecord {
    pub at_secs: f64,
    pub id: &'static str,
    pub level: u32,
    pub cost: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationReport {
    pub duration_secs: u32,
    pub currency: f64,
    pub total_actions: u64,
    pub best_single_action_yield: f64,
    pub total_bonus_yield: f64,
    pub care: f64,
    /// Lowest care seen after any click.
    pub min_care: f64,
    pub auto_yield_per_second: f64,
    pub purchases: Vec<PurchaseRecord>,
    pub levels: Vec<(&'static str, u32)>,
}

impl SimulationReport {
    /// Longest stretch (seconds) without a purchase, counted from the start.
    pub fn longest_purchase_gap(&self) -> f64 {
        let mut last = 0.0;
        let mut longest: f64 = 0.0;
        for p in &self.purchases {
            longest = longest.max(p.at_secs - last);
            last = p.at_secs;
        }
        longest.max(f64::from(self.duration_secs) - last)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "==== balance simulation: {}s ====", self.duration_secs);
        let _ = writeln!(
            out,
            "money: {}  wheels: {}  best click: {}  tips: {}",
            format_money(self.currency),
            self.total_actions,
            format_money(self.best_single_action_yield),
            format_money(self.total_bonus_yield)
        );
        let _ = writeln!(
            out,
            "care: {:.2} (min {:.2})  passive: {}/s",
            self.care,
            self.min_care,
            format_money(self.auto_yield_per_second)
        );
        let levels: Vec<String> = self
            .levels
            .iter()
            .map(|(id, level)| format!("{id}:{level}"))
            .collect();
        let _ = writeln!(out, "levels: {}", levels.join("  "));
        let _ = writeln!(
            out,
            "purchases: {}  longest gap: {:.0}s",
            self.purchases.len(),
            self.longest_purchase_gap()
        );
        for p in &self.purchases {
            let _ = writeln!(
                out,
                "  {:>7.1}s  {} -> {} ({})",
                p.at_secs,
                p.id,
                p.level,
                format_money(p.cost)
            );
        }
        out
    }
}

/// Cheapest upgrade the player can pay for right now.
fn cheapest_affordable(economy: &Economy<MemoryStorage>) -> Option<&'static str> {
    economy
        .view()
        .upgrades
        .into_iter()
        .filter(|row| row.affordable)
        .min_by(|a, b| a.cost.total_cmp(&b.cost))
        .map(|row| row.id)
}

pub fn simulate(settings: &SimulationSettings) -> SimulationReport {
    let config = EngineConfig {
        tick_interval_ms: settings.tick_interval_ms,
        ..EngineConfig::default()
    };
    let (mut economy, _) = Economy::start(MemoryStorage::new(), config, SIM_EPOCH_MS);
    let mut roll = RngRoll(ChaCha8Rng::seed_from_u64(settings.seed));

    let end_ms = f64::from(settings.duration_secs) * 1000.0;
    let click_step = settings.click_interval_ms.max(1.0);
    let tick_step = settings.tick_interval_ms.max(1.0);
    let mut next_click = click_step;
    let mut next_tick = tick_step;
    let mut min_care = economy.state().care;
    let mut purchases = Vec::new();

    while next_click.min(next_tick) <= end_ms {
        let now = if next_click <= next_tick {
            let now = next_click;
            let result = economy.click(now, &mut roll);
            min_care = min_care.min(result.care);
            next_click += click_step;
            now
        } else {
            let now = next_tick;
            economy.tick(SIM_EPOCH_MS + now);
            next_tick += tick_step;
            now
        };

        for _ in 0..MAX_PURCHASES_PER_STEP {
            let Some(id) = cheapest_affordable(&economy) else {
                break;
            };
            match economy.purchase(id, SIM_EPOCH_MS + now) {
                Ok(receipt) => purchases.push(PurchaseRecord {
                    at_secs: now / 1000.0,
                    id: receipt.id,
                    level: receipt.level,
                    cost: receipt.cost,
                }),
                Err(_) => break,
            }
        }
    }

    let state = economy.state();
    SimulationReport {
        duration_secs: settings.duration_secs,
        currency: state.currency,
        total_actions: state.total_actions,
        best_single_action_yield: state.best_single_action_yield,
        total_bonus_yield: state.total_bonus_yield,
        care: state.care,
        min_care,
        auto_yield_per_second: state.derived().auto_yield_per_second,
        purchases,
        levels: UPGRADES
            .iter()
            .map(|def| (def.id, state.upgrade_level(def.id)))
            .collect(),
    }
}
