//! Economy logic: pure functions over `EconomyState`, fully testable.
//!
//! Every function here reads the derived-stat cache but never recomputes it;
//! only `purchase` changes upgrade levels, and that goes through the state's
//! recalculating setter.

use crate::error::PurchaseError;
use crate::time::AutosaveTimer;

use super::catalog;
use super::state::{
    clamp01, EconomyState, CARE_RECOVERY_PER_ACTION, CARE_RECOVERY_PER_SECOND,
    FAST_CLICK_THRESHOLD_MS, LOW_CARE_WARNING, MAX_TICK_SECS, TIP_FRACTION,
};

// ── Randomness ──────────────────────────────────────────────────

/// Uniform `[0, 1)` source for the tip roll.
pub trait BonusRoll {
    fn roll(&mut self) -> f64;
}

impl<F: FnMut() -> f64> BonusRoll for F {
    fn roll(&mut self) -> f64 {
        self()
    }
}

/// Adapter turning any `rand::Rng` into a `BonusRoll`.
pub struct RngRoll<R>(pub R);

impl<R: rand::Rng> BonusRoll for RngRoll<R> {
    fn roll(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

// ── Click ───────────────────────────────────────────────────────

/// Everything a UI needs to render the feedback of one click.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionResult {
    /// Total earned by this click, tip included.
    pub yield_amount: f64,
    /// Tip amount, if the bonus roll hit.
    pub bonus: Option<f64>,
    /// The click came too soon after the previous one.
    pub rushed: bool,
    /// A rushed click left care below the warning threshold.
    pub low_care_warning: bool,
    /// Care after the click.
    pub care: f64,
}

/// Score one click at monotonic time `now_ms`.
pub fn resolve_action<R>(state: &mut EconomyState, now_ms: f64, roll: &mut R) -> ActionResult
where
    R: BonusRoll + ?Sized,
{
    let stats = *state.derived();

    // A zero timestamp means there was no previous click. A timestamp ahead of
    // `now_ms` comes from an earlier session's monotonic clock (the value is
    // saved, the clock restarts near zero on reload), so it is not compared.
    let previous = state.last_action_at;
    let rushed = previous > 0.0
        && now_ms >= previous
        && now_ms - previous < FAST_CLICK_THRESHOLD_MS;

    let mut low_care_warning = false;
    if rushed {
        state.care = clamp01(state.care - stats.care_penalty_magnitude);
        low_care_warning = state.care < LOW_CARE_WARNING;
    } else {
        state.care = clamp01(state.care + CARE_RECOVERY_PER_ACTION);
    }
    state.last_action_at = now_ms;

    // Care scales income between 50% and 100%, never to zero.
    let care_factor = 0.5 + 0.5 * clamp01(state.care);
    let mut yield_amount = stats.base_yield_per_action * stats.yield_multiplier * care_factor;

    let mut bonus = None;
    if roll.roll() < clamp01(stats.bonus_roll_chance) {
        let tip = yield_amount * TIP_FRACTION;
        yield_amount += tip;
        state.total_bonus_yield += tip;
        bonus = Some(tip);
    }

    state.currency += yield_amount;
    state.total_actions += 1;
    if yield_amount > state.best_single_action_yield {
        state.best_single_action_yield = yield_amount;
    }

    ActionResult {
        yield_amount,
        bonus,
        rushed,
        low_care_warning,
        care: state.care,
    }
}

// ── Tick ────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct TickOutcome {
    /// Seconds actually simulated after clamping.
    pub elapsed_secs: f64,
    /// Passive income credited by this tick.
    pub passive_income: f64,
    /// The autosave interval was reached; the caller should persist now.
    pub flush_due: bool,
}

/// Advance the economy by `elapsed_secs` of real time.
///
/// The step is clamped to `[0, MAX_TICK_SECS]`; a non-finite step counts as 0.
pub fn advance(
    state: &mut EconomyState,
    elapsed_secs: f64,
    now_wall_ms: f64,
    autosave: &mut AutosaveTimer,
) -> TickOutcome {
    let dt = if elapsed_secs.is_finite() {
        elapsed_secs.clamp(0.0, MAX_TICK_SECS)
    } else {
        0.0
    };

    let auto = state.derived().auto_yield_per_second;
    let mut passive_income = 0.0;
    if auto > 0.0 {
        passive_income = auto * dt;
        state.currency += passive_income;
    }

    if state.care < 1.0 {
        state.care = clamp01(state.care + CARE_RECOVERY_PER_SECOND * dt);
    }

    let flush_due = autosave.accumulate(dt);
    state.last_tick_at = now_wall_ms;

    TickOutcome {
        elapsed_secs: dt,
        passive_income,
        flush_due,
    }
}

// ── Offline income ──────────────────────────────────────────────

/// Income credited at startup for the time the game was closed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OfflineGrant {
    /// No save existed; nothing was granted.
    pub first_run: bool,
    /// Seconds between the last save and now (0 if unknown or negative).
    pub seconds_away: f64,
    /// Whole currency units granted.
    pub amount: f64,
}

impl OfflineGrant {
    pub fn is_empty(&self) -> bool {
        self.amount <= 0.0
    }
}

/// Credit passive income for the span since the last save.
///
/// Uses the current auto-income rate for the whole span, including upgrades
/// bought after that save.
pub fn reconcile_offline(state: &mut EconomyState, now_wall_ms: f64) -> OfflineGrant {
    let Some(last_persisted) = state.last_persisted_at else {
        state.last_persisted_at = Some(now_wall_ms);
        state.last_tick_at = now_wall_ms;
        return OfflineGrant {
            first_run: true,
            ..OfflineGrant::default()
        };
    };

    state.last_tick_at = now_wall_ms;

    let seconds_away = (now_wall_ms - last_persisted) / 1000.0;
    if seconds_away.is_nan() || seconds_away <= 0.0 {
        return OfflineGrant::default();
    }

    let amount = (state.derived().auto_yield_per_second * seconds_away).floor();
    if amount > 0.0 {
        state.currency += amount;
    }

    OfflineGrant {
        first_run: false,
        seconds_away,
        amount: amount.max(0.0),
    }
}

// ── Purchase ────────────────────────────────────────────────────

/// A successful upgrade purchase.
#[derive(Clone, Debug, PartialEq)]
pub struct PurchaseReceipt {
    pub id: &'static str,
    /// Level after the purchase.
    pub level: u32,
    /// Amount debited.
    pub cost: f64,
}

/// Buy the next level of upgrade `id`.
///
/// On error nothing is changed.
pub fn purchase(state: &mut EconomyState, id: &str) -> Result<PurchaseReceipt, PurchaseError> {
    let def = catalog::find(id).ok_or_else(|| PurchaseError::UnknownUpgrade { id: id.to_string() })?;

    let level = state.upgrade_level(def.id);
    let cost = def.cost(level);
    if state.currency < cost {
        return Err(PurchaseError::InsufficientFunds {
            cost,
            available: state.currency,
        });
    }

    state.currency -= cost;
    state.set_upgrade_level(def.id, level + 1);

    Ok(PurchaseReceipt {
        id: def.id,
        level: level + 1,
        cost,
    })
}

/// True when the next level of `id` is affordable right now.
pub fn can_afford(state: &EconomyState, id: &str) -> bool {
    catalog::find(id).is_some_and(|def| state.currency >= def.cost(state.upgrade_level(def.id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A roll that never hits the tip chance.
    fn no_tip() -> impl FnMut() -> f64 {
        || 0.999
    }

    /// A roll that always hits.
    fn always_tip() -> impl FnMut() -> f64 {
        || 0.0
    }

    fn state_with(levels: &[(&str, u32)]) -> EconomyState {
        let mut state = EconomyState::new(0.0);
        for (id, level) in levels {
            state.set_upgrade_level(id, *level);
        }
        state
    }

    // ── resolve_action ─────────────────────────────────────────

    #[test]
    fn first_click_at_defaults_yields_fifty() {
        let mut state = EconomyState::new(0.0);
        let result = resolve_action(&mut state, 1_000.0, &mut no_tip());
        assert!((result.yield_amount - 50.0).abs() < f64::EPSILON);
        assert!((state.currency - 50.0).abs() < f64::EPSILON);
        assert!((state.care - 1.0).abs() < f64::EPSILON);
        assert_eq!(state.total_actions, 1);
        assert!(result.bonus.is_none());
        assert!(!result.rushed);
        assert!(!result.low_care_warning);
    }

    #[test]
    fn first_click_is_never_rushed() {
        let mut state = EconomyState::new(0.0);
        // Monotonic clocks start near zero; the very first click must not be penalized.
        let result = resolve_action(&mut state, 10.0, &mut no_tip());
        assert!(!result.rushed);
        assert!((state.care - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn click_after_clock_restart_is_not_rushed() {
        let mut state = EconomyState::new(0.0);
        resolve_action(&mut state, 3_600_000.0, &mut no_tip());
        // New session: the monotonic clock starts over below the saved value.
        let result = resolve_action(&mut state, 2_000.0, &mut no_tip());
        assert!(!result.rushed);
        assert!((state.care - 1.0).abs() < f64::EPSILON);
        assert!((state.last_action_at - 2_000.0).abs() < f64::EPSILON);

        // Timing resumes against the new clock.
        let result = resolve_action(&mut state, 2_100.0, &mut no_tip());
        assert!(result.rushed);
    }

    #[test]
    fn rushed_click_costs_care() {
        let mut state = EconomyState::new(0.0);
        resolve_action(&mut state, 1_000.0, &mut no_tip());
        let result = resolve_action(&mut state, 1_100.0, &mut no_tip());
        assert!(result.rushed);
        assert!((state.care - 0.94).abs() < 1e-12);
        // care_factor = 0.5 + 0.5 * 0.94 = 0.97
        assert!((result.yield_amount - 48.5).abs() < 1e-9);
    }

    #[test]
    fn click_exactly_at_threshold_is_not_rushed() {
        let mut state = EconomyState::new(0.0);
        state.care = 0.5;
        resolve_action(&mut state, 1_000.0, &mut no_tip());
        let result = resolve_action(&mut state, 1_260.0, &mut no_tip());
        assert!(!result.rushed);
        assert!((state.care - 0.54).abs() < 1e-12);
    }

    #[test]
    fn low_care_warning_fires_below_threshold() {
        let mut state = EconomyState::new(0.0);
        state.care = 0.45;
        state.last_action_at = 1_000.0;
        let result = resolve_action(&mut state, 1_050.0, &mut no_tip());
        assert!(result.low_care_warning);
        assert!((result.care - 0.39).abs() < 1e-12);
    }

    #[test]
    fn slow_click_never_warns() {
        let mut state = EconomyState::new(0.0);
        state.care = 0.1;
        state.last_action_at = 1_000.0;
        let result = resolve_action(&mut state, 5_000.0, &mut no_tip());
        assert!(!result.low_care_warning);
    }

    #[test]
    fn zero_care_halves_income() {
        let mut state = EconomyState::new(0.0);
        state.care = 0.0;
        state.last_action_at = 1_000.0;
        let result = resolve_action(&mut state, 1_010.0, &mut no_tip());
        assert!((state.care - 0.0).abs() < f64::EPSILON);
        assert!((result.yield_amount - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tip_adds_forty_percent() {
        let mut state = EconomyState::new(0.0);
        let result = resolve_action(&mut state, 1_000.0, &mut always_tip());
        let tip = result.bonus.unwrap();
        assert!((tip - 20.0).abs() < 1e-9);
        assert!((result.yield_amount - 70.0).abs() < 1e-9);
        assert!((state.total_bonus_yield - 20.0).abs() < 1e-9);
        assert!((state.best_single_action_yield - 70.0).abs() < 1e-9);
    }

    #[test]
    fn roll_equal_to_chance_misses() {
        let mut state = EconomyState::new(0.0);
        let result = resolve_action(&mut state, 1_000.0, &mut || 0.02_f64);
        assert!(result.bonus.is_none());
    }

    #[test]
    fn tip_chance_above_one_is_clamped() {
        let mut state = state_with(&[("loyalty", 500)]);
        assert!(state.derived().bonus_roll_chance > 1.0);
        let result = resolve_action(&mut state, 1_000.0, &mut || 0.999_999_f64);
        assert!(result.bonus.is_some());
    }

    #[test]
    fn best_click_is_a_high_water_mark() {
        let mut state = EconomyState::new(0.0);
        resolve_action(&mut state, 1_000.0, &mut always_tip());
        let best = state.best_single_action_yield;
        resolve_action(&mut state, 2_000.0, &mut no_tip());
        assert!((state.best_single_action_yield - best).abs() < f64::EPSILON);
    }

    #[test]
    fn balancer_scales_ideal_click() {
        let mut state = state_with(&[("balancer", 1)]);
        let result = resolve_action(&mut state, 1_000.0, &mut no_tip());
        assert!((result.yield_amount - 55.0).abs() < 1e-9);
    }

    #[test]
    fn rng_roll_adapter_yields_unit_interval() {
        use rand::SeedableRng;
        let mut roll = RngRoll(rand_chacha::ChaCha8Rng::seed_from_u64(7));
        for _ in 0..1_000 {
            let r = roll.roll();
            assert!((0.0..1.0).contains(&r));
        }
    }

    // ── advance ────────────────────────────────────────────────

    #[test]
    fn ten_second_tick_with_ads() {
        let mut state = state_with(&[("ads", 1)]);
        let mut timer = AutosaveTimer::new(5.0);
        let outcome = advance(&mut state, 10.0, 10_000.0, &mut timer);
        assert!((state.currency - 40.0).abs() < f64::EPSILON);
        assert!((state.care - 1.0).abs() < f64::EPSILON);
        assert!((outcome.passive_income - 40.0).abs() < f64::EPSILON);
        assert!(outcome.flush_due);
        assert!((state.last_tick_at - 10_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tick_without_auto_income_adds_nothing() {
        let mut state = EconomyState::new(0.0);
        let mut timer = AutosaveTimer::new(5.0);
        advance(&mut state, 3.0, 3_000.0, &mut timer);
        assert!((state.currency - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tick_recovers_care() {
        let mut state = EconomyState::new(0.0);
        state.care = 0.5;
        let mut timer = AutosaveTimer::new(5.0);
        advance(&mut state, 2.0, 2_000.0, &mut timer);
        assert!((state.care - 0.62).abs() < 1e-12);
        advance(&mut state, 60.0, 62_000.0, &mut timer);
        assert!((state.care - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn huge_gap_is_clamped_to_a_minute() {
        let mut state = state_with(&[("ads", 1)]);
        let mut timer = AutosaveTimer::new(5.0);
        let outcome = advance(&mut state, 3_600.0, 3_600_000.0, &mut timer);
        assert!((outcome.elapsed_secs - 60.0).abs() < f64::EPSILON);
        assert!((state.currency - 240.0).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_or_nan_step_is_a_no_op() {
        let mut state = state_with(&[("ads", 1)]);
        state.care = 0.5;
        let mut timer = AutosaveTimer::new(5.0);
        advance(&mut state, -5.0, 1.0, &mut timer);
        advance(&mut state, f64::NAN, 2.0, &mut timer);
        assert!((state.currency - 0.0).abs() < f64::EPSILON);
        assert!((state.care - 0.5).abs() < f64::EPSILON);
        assert!((state.last_tick_at - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn autosave_due_every_five_seconds() {
        let mut state = EconomyState::new(0.0);
        let mut timer = AutosaveTimer::new(5.0);
        let flushes = (1..=25)
            .filter(|i| advance(&mut state, 0.5, *i as f64 * 500.0, &mut timer).flush_due)
            .count();
        // 12.5 simulated seconds → flushes at 5s and 10s
        assert_eq!(flushes, 2);
    }

    // ── reconcile_offline ──────────────────────────────────────

    #[test]
    fn first_run_grants_nothing_and_stamps_times() {
        let mut state = state_with(&[("ads", 3)]);
        let grant = reconcile_offline(&mut state, 50_000.0);
        assert!(grant.first_run);
        assert!(grant.is_empty());
        assert_eq!(state.last_persisted_at, Some(50_000.0));
        assert!((state.last_tick_at - 50_000.0).abs() < f64::EPSILON);
        assert!((state.currency - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn hundred_seconds_at_four_per_second() {
        let now = 1_700_000_000_000.0;
        let mut state = state_with(&[("ads", 1)]);
        state.last_persisted_at = Some(now - 100_000.0);
        let grant = reconcile_offline(&mut state, now);
        assert!((grant.amount - 400.0).abs() < f64::EPSILON);
        assert!((grant.seconds_away - 100.0).abs() < 1e-9);
        assert!((state.currency - 400.0).abs() < f64::EPSILON);
        assert!((state.last_tick_at - now).abs() < f64::EPSILON);
    }

    #[test]
    fn offline_grant_is_truncated() {
        let mut state = state_with(&[("ads", 1)]);
        state.last_persisted_at = Some(0.0);
        // 1.7 s at 4/s = 6.8 → 6
        let grant = reconcile_offline(&mut state, 1_700.0);
        assert!((grant.amount - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn clock_going_backwards_grants_nothing() {
        let mut state = state_with(&[("ads", 1)]);
        state.last_persisted_at = Some(10_000.0);
        let grant = reconcile_offline(&mut state, 5_000.0);
        assert!(grant.is_empty());
        assert!((state.currency - 0.0).abs() < f64::EPSILON);
        assert!((state.last_tick_at - 5_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn no_auto_income_grants_nothing() {
        let mut state = EconomyState::new(0.0);
        state.last_persisted_at = Some(0.0);
        let grant = reconcile_offline(&mut state, 3_600_000.0);
        assert!(grant.is_empty());
        assert!(!grant.first_run);
    }

    // ── purchase ───────────────────────────────────────────────

    #[test]
    fn buy_balancer_once() {
        let mut state = EconomyState::new(0.0);
        state.currency = 500.0;
        let receipt = purchase(&mut state, "balancer").unwrap();
        assert_eq!(receipt.level, 1);
        assert!((receipt.cost - 500.0).abs() < f64::EPSILON);
        assert!((state.currency - 0.0).abs() < f64::EPSILON);
        assert!((state.derived().yield_multiplier - 1.1).abs() < 1e-12);
        assert!((state.derived().ideal_action_yield() - 50.0 * 1.1).abs() < 1e-9);
    }

    #[test]
    fn second_level_costs_more() {
        let mut state = EconomyState::new(0.0);
        state.currency = 2_000.0;
        purchase(&mut state, "balancer").unwrap();
        let receipt = purchase(&mut state, "balancer").unwrap();
        assert!((receipt.cost - 675.0).abs() < f64::EPSILON);
        assert_eq!(state.upgrade_level("balancer"), 2);
        assert!((state.currency - 825.0).abs() < f64::EPSILON);
    }

    #[test]
    fn insufficient_funds_changes_nothing() {
        let mut state = EconomyState::new(0.0);
        state.currency = 499.0;
        let err = purchase(&mut state, "balancer").unwrap_err();
        assert_eq!(
            err,
            PurchaseError::InsufficientFunds {
                cost: 500.0,
                available: 499.0
            }
        );
        assert!((state.currency - 499.0).abs() < f64::EPSILON);
        assert_eq!(state.upgrade_level("balancer"), 0);
        assert!(state.upgrades().is_empty());
    }

    #[test]
    fn unknown_upgrade_is_reported() {
        let mut state = EconomyState::new(0.0);
        state.currency = 1e9;
        let err = purchase(&mut state, "turbo").unwrap_err();
        assert_eq!(err, PurchaseError::UnknownUpgrade { id: "turbo".into() });
        assert!((state.currency - 1e9).abs() < f64::EPSILON);
    }

    #[test]
    fn can_afford_tracks_cost() {
        let mut state = EconomyState::new(0.0);
        assert!(!can_afford(&state, "balancer"));
        state.currency = 500.0;
        assert!(can_afford(&state, "balancer"));
        assert!(!can_afford(&state, "turbo"));
    }
}
