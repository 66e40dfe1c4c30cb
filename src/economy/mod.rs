//! Tire-service economy: a clicker whose income depends on how carefully the
//! player works.

pub mod catalog;
pub mod derived;
pub mod logic;
pub mod save;
pub mod simulator;
pub mod state;
pub mod view;

use crate::config::EngineConfig;
use crate::error::{PurchaseError, StorageError};
use crate::time::AutosaveTimer;

use logic::{ActionResult, BonusRoll, OfflineGrant, PurchaseReceipt, TickOutcome};
use save::SaveStorage;
use state::EconomyState;
use view::EconomyView;

/// Owns the state and its storage. Every mutation goes through here.
pub struct Economy<S: SaveStorage> {
    state: EconomyState,
    storage: S,
    config: EngineConfig,
    autosave: AutosaveTimer,
}

impl<S: SaveStorage> Economy<S> {
    /// Load the saved state (or start fresh) and credit offline income.
    ///
    /// Storage faults never abort startup; they are logged and the game starts
    /// from defaults.
    pub fn start(mut storage: S, config: EngineConfig, now_wall_ms: f64) -> (Self, OfflineGrant) {
        let state = match save::load_snapshot(&mut storage, &config.storage_key) {
            Ok(Some(snapshot)) => {
                log::info!("loaded save (version {})", snapshot.version);
                snapshot.restore(now_wall_ms)
            }
            Ok(None) => {
                log::info!("no save found, starting fresh");
                EconomyState::new(now_wall_ms)
            }
            Err(e) => {
                log::warn!("failed to load save, starting fresh: {e}");
                EconomyState::new(now_wall_ms)
            }
        };

        let autosave = AutosaveTimer::new(config.autosave_interval_secs);
        let mut economy = Self {
            state,
            storage,
            config,
            autosave,
        };

        let grant = logic::reconcile_offline(&mut economy.state, now_wall_ms);
        if !grant.is_empty() {
            log::info!(
                "offline income: {} over {:.0}s away",
                grant.amount,
                grant.seconds_away
            );
            // Persist right away so a quick reload cannot credit the same span twice.
            economy.flush(now_wall_ms);
        }

        (economy, grant)
    }

    /// Resolve one click at monotonic time `now_ms`.
    pub fn click<R: BonusRoll + ?Sized>(&mut self, now_ms: f64, roll: &mut R) -> ActionResult {
        let result = logic::resolve_action(&mut self.state, now_ms, roll);
        if result.low_care_warning {
            log::debug!("care dropped to {:.2} after a rushed click", result.care);
        }
        result
    }

    /// Advance by the wall time since the previous tick, autosaving when due.
    pub fn tick(&mut self, now_wall_ms: f64) -> TickOutcome {
        let elapsed_secs = (now_wall_ms - self.state.last_tick_at) / 1000.0;
        let outcome = logic::advance(&mut self.state, elapsed_secs, now_wall_ms, &mut self.autosave);
        if outcome.flush_due {
            self.flush(now_wall_ms);
        }
        outcome
    }

    /// Buy the next level of `id`; saves on success.
    pub fn purchase(&mut self, id: &str, now_wall_ms: f64) -> Result<PurchaseReceipt, PurchaseError> {
        let receipt = logic::purchase(&mut self.state, id)?;
        log::debug!(
            "bought {} level {} for {}",
            receipt.id,
            receipt.level,
            receipt.cost
        );
        self.flush(now_wall_ms);
        Ok(receipt)
    }

    /// Write the current state to storage.
    pub fn save(&mut self, now_wall_ms: f64) -> Result<(), StorageError> {
        save::save_snapshot(
            &mut self.storage,
            &self.config.storage_key,
            &self.state,
            now_wall_ms,
        )?;
        self.state.last_persisted_at = Some(now_wall_ms);
        log::debug!("saved at {now_wall_ms}");
        Ok(())
    }

    /// Best-effort save; a failure is logged and retried at the next autosave.
    fn flush(&mut self, now_wall_ms: f64) {
        if let Err(e) = self.save(now_wall_ms) {
            log::warn!("save failed: {e}");
        }
    }

    pub fn view(&self) -> EconomyView {
        EconomyView::of(&self.state)
    }

    pub fn state(&self) -> &EconomyState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
