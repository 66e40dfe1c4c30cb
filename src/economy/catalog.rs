//! Upgrade catalog and cost curve.

/// Growth factor applied to an upgrade's price for every level already owned.
pub const COST_GROWTH: f64 = 1.35;

/// What one level of an upgrade does. The payload is the per-level magnitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UpgradeEffect {
    /// Multiplies click yield by `1 + magnitude * level`.
    IncomeMultiplier(f64),
    /// Adds a flat amount to the base click yield.
    FlatClickBonus(f64),
    /// Adds passive income per second.
    AutoIncome(f64),
    /// Raises the tip chance.
    TipChanceBonus(f64),
    /// Lowers the care lost on a rushed click (floored at 0.01).
    CarePenaltyReduction(f64),
}

impl UpgradeEffect {
    pub fn magnitude(&self) -> f64 {
        match *self {
            UpgradeEffect::IncomeMultiplier(m)
            | UpgradeEffect::FlatClickBonus(m)
            | UpgradeEffect::AutoIncome(m)
            | UpgradeEffect::TipChanceBonus(m)
            | UpgradeEffect::CarePenaltyReduction(m) => m,
        }
    }
}

/// A purchasable, levelled upgrade.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub base_cost: f64,
    pub effect: UpgradeEffect,
}

impl UpgradeDefinition {
    /// Price of the next level when `level` levels are already owned.
    pub fn cost(&self, level: u32) -> f64 {
        cost(self, level)
    }
}

/// `floor(base_cost * 1.35^level)`.
pub fn cost(def: &UpgradeDefinition, level: u32) -> f64 {
    let exponent = i32::try_from(level).unwrap_or(i32::MAX);
    (def.base_cost * COST_GROWTH.powi(exponent)).floor()
}

/// The full upgrade catalog, in display order.
pub static UPGRADES: &[UpgradeDefinition] = &[
    UpgradeDefinition {
        id: "balancer",
        name: "Balancer PRO",
        description: "Raises income per wheel by 10% per level.",
        base_cost: 500.0,
        effect: UpgradeEffect::IncomeMultiplier(0.1),
    },
    UpgradeDefinition {
        id: "machine",
        name: "Premium tire machine",
        description: "Adds a flat bonus to income per wheel.",
        base_cost: 1_500.0,
        effect: UpgradeEffect::FlatClickBonus(15.0),
    },
    UpgradeDefinition {
        id: "training",
        name: "Staff training",
        description: "Softens the care penalty for rushed work.",
        base_cost: 1_800.0,
        effect: UpgradeEffect::CarePenaltyReduction(0.01),
    },
    UpgradeDefinition {
        id: "loyalty",
        name: "Loyalty program",
        description: "Happy customers tip more often.",
        base_cost: 2_200.0,
        effect: UpgradeEffect::TipChanceBonus(0.01),
    },
    UpgradeDefinition {
        id: "ads",
        name: "Protector advertising",
        description: "Brings in passive income every second.",
        base_cost: 3_200.0,
        effect: UpgradeEffect::AutoIncome(4.0),
    },
];

/// Look up a catalog entry by id.
pub fn find(id: &str) -> Option<&'static UpgradeDefinition> {
    UPGRADES.iter().find(|def| def.id == id)
}
