//! Economy state definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog::UPGRADES;
use super::derived;

// ── Tuning ──────────────────────────────────────────────────────

/// Two clicks closer together than this count as rushed work.
pub const FAST_CLICK_THRESHOLD_MS: f64 = 260.0;
/// Care restored per second of elapsed time.
pub const CARE_RECOVERY_PER_SECOND: f64 = 0.06;
/// Care restored by a well-spaced click.
pub const CARE_RECOVERY_PER_ACTION: f64 = 0.02;
/// Below this care level a rushed click raises a warning.
pub const LOW_CARE_WARNING: f64 = 0.4;
/// Tip chance before any upgrades.
pub const BASE_TIP_CHANCE: f64 = 0.02;
/// Care lost per rushed click before any upgrades.
pub const BASE_CARE_PENALTY: f64 = 0.06;
/// The care penalty never drops below this.
pub const MIN_CARE_PENALTY: f64 = 0.01;
/// Income per wheel before any upgrades.
pub const BASE_YIELD_PER_ACTION: f64 = 50.0;
/// A tip adds this fraction of the click's yield.
pub const TIP_FRACTION: f64 = 0.4;
/// Longest span a single tick may simulate (suspended or backgrounded host).
pub const MAX_TICK_SECS: f64 = 60.0;

/// Clamp into `[0, 1]`. NaN maps to 0.
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Owned level of a single upgrade.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeLevel {
    #[serde(default)]
    pub level: u32,
}

/// Upgrade id → owned level. A missing id means level 0.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpgradeOwnership(BTreeMap<String, UpgradeLevel>);

impl UpgradeOwnership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Owned level of `id` (0 if never bought).
    pub fn level(&self, id: &str) -> u32 {
        self.0.get(id).map_or(0, |u| u.level)
    }

    pub(crate) fn set_level(&mut self, id: &str, level: u32) {
        self.0.insert(id.to_string(), UpgradeLevel { level });
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(id, u)| (id.as_str(), u.level))
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|u| u.level == 0)
    }

    /// Drop entries whose id is not in the catalog.
    pub(crate) fn retain_known(&mut self) {
        self.0.retain(|id, _| UPGRADES.iter().any(|def| def.id == id));
    }
}

/// Stats derived from upgrade levels. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DerivedStats {
    pub base_yield_per_action: f64,
    pub yield_multiplier: f64,
    pub auto_yield_per_second: f64,
    /// Tip chance as computed; may exceed 1, clamp before use as a probability.
    pub bonus_roll_chance: f64,
    pub care_penalty_magnitude: f64,
}

impl Default for DerivedStats {
    fn default() -> Self {
        Self {
            base_yield_per_action: BASE_YIELD_PER_ACTION,
            yield_multiplier: 1.0,
            auto_yield_per_second: 0.0,
            bonus_roll_chance: BASE_TIP_CHANCE,
            care_penalty_magnitude: BASE_CARE_PENALTY,
        }
    }
}

impl DerivedStats {
    /// Yield of a click at full care without a tip.
    pub fn ideal_action_yield(&self) -> f64 {
        self.base_yield_per_action * self.yield_multiplier
    }
}

/// Full state of the economy.
///
/// Upgrade levels and the derived cache are private so that every change to
/// the former recomputes the latter.
#[derive(Clone, Debug)]
pub struct EconomyState {
    /// Money on hand.
    pub currency: f64,
    /// Wheels serviced (clicks).
    pub total_actions: u64,
    /// Highest yield of a single click.
    pub best_single_action_yield: f64,
    /// All tips earned.
    pub total_bonus_yield: f64,
    /// Care level in `[0, 1]`.
    pub care: f64,
    /// Monotonic timestamp (ms) of the last click, 0 before the first one.
    pub last_action_at: f64,
    /// Wall-clock timestamp (ms) of the last successful save.
    pub last_persisted_at: Option<f64>,
    /// Wall-clock timestamp (ms) of the last tick.
    pub last_tick_at: f64,
    upgrades: UpgradeOwnership,
    derived: DerivedStats,
}

impl EconomyState {
    /// Fresh state, as on the very first launch.
    pub fn new(now_wall_ms: f64) -> Self {
        Self {
            currency: 0.0,
            total_actions: 0,
            best_single_action_yield: 0.0,
            total_bonus_yield: 0.0,
            care: 1.0,
            last_action_at: 0.0,
            last_persisted_at: None,
            last_tick_at: now_wall_ms,
            upgrades: UpgradeOwnership::new(),
            derived: DerivedStats::default(),
        }
    }

    pub fn upgrades(&self) -> &UpgradeOwnership {
        &self.upgrades
    }

    pub fn derived(&self) -> &DerivedStats {
        &self.derived
    }

    pub fn upgrade_level(&self, id: &str) -> u32 {
        self.upgrades.level(id)
    }

    pub(crate) fn set_upgrade_level(&mut self, id: &str, level: u32) {
        self.upgrades.set_level(id, level);
        self.recalc();
    }

    pub(crate) fn replace_upgrades(&mut self, upgrades: UpgradeOwnership) {
        self.upgrades = upgrades;
        self.recalc();
    }

    fn recalc(&mut self) {
        self.derived = derived::recalc(&self.upgrades, UPGRADES);
    }
}
