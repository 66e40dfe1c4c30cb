//! Derived-stat recalculation from owned upgrade levels.

use super::catalog::{UpgradeDefinition, UpgradeEffect};
use super::state::{DerivedStats, UpgradeOwnership, MIN_CARE_PENALTY};

/// Recompute every derived stat from scratch.
///
/// Levels of one income-multiplier upgrade stack linearly inside its own
/// factor; separate income-multiplier upgrades multiply together. Every other
/// effect is additive, so catalog order does not matter.
pub fn recalc(upgrades: &UpgradeOwnership, catalog: &[UpgradeDefinition]) -> DerivedStats {
    let mut stats = DerivedStats::default();

    for def in catalog {
        let level = upgrades.level(def.id);
        if level == 0 {
            continue;
        }
        let level = f64::from(level);
        match def.effect {
            UpgradeEffect::IncomeMultiplier(m) => {
                stats.yield_multiplier *= 1.0 + m * level;
            }
            UpgradeEffect::FlatClickBonus(m) => {
                stats.base_yield_per_action += m * level;
            }
            UpgradeEffect::AutoIncome(m) => {
                stats.auto_yield_per_second += m * level;
            }
            UpgradeEffect::TipChanceBonus(m) => {
                stats.bonus_roll_chance += m * level;
            }
            UpgradeEffect::CarePenaltyReduction(m) => {
                stats.care_penalty_magnitude =
                    (stats.care_penalty_magnitude - m * level).max(MIN_CARE_PENALTY);
            }
        }
    }

    stats
}
