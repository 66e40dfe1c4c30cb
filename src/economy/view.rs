//! Read model handed to renderers.

use super::catalog::UPGRADES;
use super::state::EconomyState;

/// Care thresholds used for colouring the care gauge.
pub const CARE_CRITICAL_BELOW: f64 = 0.35;
pub const CARE_STRAINED_BELOW: f64 = 0.7;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CareBand {
    Critical,
    Strained,
    Steady,
}

impl CareBand {
    pub fn of(care: f64) -> Self {
        if care < CARE_CRITICAL_BELOW {
            CareBand::Critical
        } else if care < CARE_STRAINED_BELOW {
            CareBand::Strained
        } else {
            CareBand::Steady
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CareBand::Critical => "careless",
            CareBand::Strained => "hurried",
            CareBand::Steady => "careful",
        }
    }
}

/// One line of the upgrade shop.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeRow {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub level: u32,
    /// Price of the next level.
    pub cost: f64,
    pub affordable: bool,
}

/// Snapshot of everything a frame needs to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct EconomyView {
    pub currency: f64,
    pub total_actions: u64,
    pub best_single_action_yield: f64,
    pub total_bonus_yield: f64,
    pub care: f64,
    pub care_band: CareBand,
    pub base_yield_per_action: f64,
    pub yield_multiplier: f64,
    pub ideal_action_yield: f64,
    pub auto_yield_per_second: f64,
    pub bonus_roll_chance: f64,
    pub upgrades: Vec<UpgradeRow>,
}

impl EconomyView {
    pub fn of(state: &EconomyState) -> Self {
        let stats = state.derived();
        let upgrades = UPGRADES
            .iter()
            .map(|def| {
                let level = state.upgrade_level(def.id);
                let cost = def.cost(level);
                UpgradeRow {
                    id: def.id,
                    name: def.name,
                    description: def.description,
                    level,
                    cost,
                    affordable: state.currency >= cost,
                }
            })
            .collect();

        Self {
            currency: state.currency,
            total_actions: state.total_actions,
            best_single_action_yield: state.best_single_action_yield,
            total_bonus_yield: state.total_bonus_yield,
            care: state.care,
            care_band: CareBand::of(state.care),
            base_yield_per_action: stats.base_yield_per_action,
            yield_multiplier: stats.yield_multiplier,
            ideal_action_yield: stats.ideal_action_yield(),
            auto_yield_per_second: stats.auto_yield_per_second,
            bonus_roll_chance: stats.bonus_roll_chance,
            upgrades,
        }
    }
}

/// Whole units with space-separated thousands (e.g. 1234567.8 → "1 234 567").
pub fn format_money(amount: f64) -> String {
    if !amount.is_finite() {
        return "0".to_string();
    }
    let floored = amount.floor();
    if floored < 0.0 {
        return format!("-{}", format_money(-floored));
    }

    let digits = (floored as u64).to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}
