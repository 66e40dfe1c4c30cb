//! End-to-end scenarios against the public engine API.

use careful_tires::{
    CareBand, Economy, EconomyState, EngineConfig, MemoryStorage, PurchaseError, SaveStorage,
};

const START: f64 = 1_700_000_000_000.0;

fn no_tip() -> impl FnMut() -> f64 {
    || 0.999_f64
}

fn fresh() -> (Economy<MemoryStorage>, MemoryStorage) {
    let storage = MemoryStorage::new();
    let (economy, grant) = Economy::start(storage.clone(), EngineConfig::default(), START);
    assert!(grant.first_run);
    (economy, storage)
}

/// Seed storage with a save owning the given upgrade levels.
fn seeded(levels: &str, last_persisted_at: f64) -> MemoryStorage {
    let storage = MemoryStorage::new();
    storage.insert(
        &EngineConfig::default().storage_key,
        &format!(
            r#"{{"version":1,"upgrades":{levels},"last_persisted_at":{last_persisted_at},"last_tick_at":{last_persisted_at}}}"#
        ),
    );
    storage
}

/// Click `n` times, spaced out so care never suffers.
fn earn(economy: &mut Economy<MemoryStorage>, n: usize) {
    let mut t = 1_000.0;
    for _ in 0..n {
        economy.click(t, &mut no_tip());
        t += 1_000.0;
    }
}

#[test]
fn one_careful_click_earns_fifty() {
    let (mut economy, _) = fresh();
    let result = economy.click(5_000.0, &mut no_tip());

    assert!((result.yield_amount - 50.0).abs() < f64::EPSILON);
    assert!(result.bonus.is_none());
    assert!(!result.rushed);
    let view = economy.view();
    assert!((view.currency - 50.0).abs() < f64::EPSILON);
    assert!((view.care - 1.0).abs() < f64::EPSILON);
    assert_eq!(view.total_actions, 1);
}

#[test]
fn balancer_purchase_raises_click_value() {
    let (mut economy, storage) = fresh();
    earn(&mut economy, 10);

    let receipt = economy.purchase("balancer", START + 1.0).unwrap();
    assert!((receipt.cost - 500.0).abs() < f64::EPSILON);
    assert_eq!(receipt.level, 1);

    let view = economy.view();
    assert!((view.currency - 0.0).abs() < f64::EPSILON);
    assert!((view.yield_multiplier - 1.1).abs() < 1e-12);
    assert!((view.ideal_action_yield - 55.0).abs() < 1e-9);
    assert!((view.upgrades[0].cost - 675.0).abs() < f64::EPSILON);

    // Saved right after the purchase.
    let payload = storage.read(&EngineConfig::default().storage_key).unwrap().unwrap();
    assert!(payload.contains(r#""balancer":{"level":1}"#));
}

#[test]
fn failed_purchase_leaves_state_untouched() {
    let (mut economy, _) = fresh();
    earn(&mut economy, 3);

    let err = economy.purchase("machine", START).unwrap_err();
    assert_eq!(
        err,
        PurchaseError::InsufficientFunds {
            cost: 1_500.0,
            available: 150.0
        }
    );
    assert!((economy.state().currency - 150.0).abs() < f64::EPSILON);
    assert!(economy.state().upgrades().is_empty());
}

#[test]
fn ten_second_tick_with_ads() {
    let storage = seeded(r#"{"ads":{"level":1}}"#, START);
    let (mut economy, grant) = Economy::start(storage, EngineConfig::default(), START);
    assert!(grant.is_empty());

    let outcome = economy.tick(START + 10_000.0);
    assert!((outcome.passive_income - 40.0).abs() < 1e-9);
    assert!((economy.state().currency - 40.0).abs() < 1e-9);
    assert!((economy.state().care - 1.0).abs() < f64::EPSILON);
}

#[test]
fn hundred_seconds_offline_with_ads() {
    let storage = seeded(r#"{"ads":{"level":1}}"#, START - 100_000.0);
    let (economy, grant) = Economy::start(storage, EngineConfig::default(), START);

    assert!(!grant.first_run);
    assert!((grant.seconds_away - 100.0).abs() < 1e-9);
    assert!((grant.amount - 400.0).abs() < f64::EPSILON);
    assert!((economy.state().currency - 400.0).abs() < f64::EPSILON);
}

#[test]
fn sleeping_tab_is_capped_at_one_minute() {
    let storage = seeded(r#"{"ads":{"level":1}}"#, START);
    let (mut economy, _) = Economy::start(storage, EngineConfig::default(), START);

    let outcome = economy.tick(START + 3_600_000.0);
    assert!((outcome.elapsed_secs - 60.0).abs() < f64::EPSILON);
    assert!((economy.state().currency - 240.0).abs() < 1e-9);
}

#[test]
fn rushing_hurts_care_and_resting_heals_it() {
    let (mut economy, _) = fresh();
    let mut t = 10_000.0;
    for _ in 0..15 {
        economy.click(t, &mut no_tip());
        t += 100.0;
    }
    let view = economy.view();
    assert_eq!(view.care_band, CareBand::Critical);
    let rushed_yield = economy.click(t + 100.0, &mut no_tip()).yield_amount;
    assert!(rushed_yield < 50.0);
    assert!(rushed_yield >= 25.0);

    // A minute of rest brings care all the way back.
    economy.tick(START + 60_000.0);
    assert!((economy.state().care - 1.0).abs() < f64::EPSILON);
    assert_eq!(economy.view().care_band, CareBand::Steady);
}

#[test]
fn progress_survives_a_reload() {
    let (mut economy, storage) = fresh();
    earn(&mut economy, 12);
    economy.purchase("balancer", START + 10.0).unwrap();
    economy.click(100_000.0, &mut || 0.0_f64);
    economy.save(START + 20.0).unwrap();

    let before: EconomyState = economy.state().clone();
    drop(economy);

    let (reloaded, grant) = Economy::start(storage, EngineConfig::default(), START + 20.0);
    assert!(grant.is_empty());
    let after = reloaded.state();
    assert!((after.currency - before.currency).abs() < 1e-9);
    assert_eq!(after.total_actions, 13);
    assert!((after.total_bonus_yield - before.total_bonus_yield).abs() < 1e-9);
    assert!(after.total_bonus_yield > 0.0);
    assert_eq!(after.upgrade_level("balancer"), 1);
    assert_eq!(after.derived(), before.derived());
}

#[test]
fn corrupt_save_is_discarded() {
    let storage = MemoryStorage::new();
    storage.insert(&EngineConfig::default().storage_key, "not json at all");
    let (economy, grant) = Economy::start(storage.clone(), EngineConfig::default(), START);

    assert!(grant.first_run);
    assert!((economy.state().currency - 0.0).abs() < f64::EPSILON);
    assert!(storage.get(&EngineConfig::default().storage_key).is_none());
}

#[test]
fn first_click_after_reload_is_not_rushed() {
    let (mut economy, storage) = fresh();
    economy.click(3_600_000.0, &mut no_tip());
    economy.save(START + 10.0).unwrap();
    drop(economy);

    // The reloaded page's monotonic clock starts over near zero.
    let (mut reloaded, _) = Economy::start(storage, EngineConfig::default(), START + 20.0);
    let result = reloaded.click(2_000.0, &mut no_tip());
    assert!(!result.rushed);
    assert!((result.care - 1.0).abs() < f64::EPSILON);
}
