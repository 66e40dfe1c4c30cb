//! Host-side session: the engine plus what the screen shows around it.

use std::collections::VecDeque;

use crate::config::EngineConfig;
use crate::economy::catalog::UPGRADES;
use crate::economy::logic::{ActionResult, BonusRoll, OfflineGrant, TickOutcome};
use crate::economy::save::SaveStorage;
use crate::economy::view::format_money;
use crate::economy::Economy;
use crate::error::PurchaseError;
use crate::time::TickClock;

use super::input::Command;

/// Entries kept in the event log.
const MAX_LOG_ENTRIES: usize = 50;

#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub text: String,
    pub important: bool,
}

pub struct App<S: SaveStorage, R: BonusRoll> {
    economy: Economy<S>,
    roll: R,
    clock: TickClock,
    log: VecDeque<LogEntry>,
    last_action: Option<ActionResult>,
}

impl<S: SaveStorage, R: BonusRoll> App<S, R> {
    pub fn new(storage: S, config: EngineConfig, roll: R, now_wall_ms: f64) -> Self {
        let clock = TickClock::new(config.tick_interval_ms);
        let (economy, grant) = Economy::start(storage, config, now_wall_ms);
        let mut app = Self {
            economy,
            roll,
            clock,
            log: VecDeque::new(),
            last_action: None,
        };
        app.greet(&grant);
        app
    }

    fn greet(&mut self, grant: &OfflineGrant) {
        if grant.first_run {
            self.add_log("Welcome to the workshop. Press [C] to service a wheel.", true);
        } else if !grant.is_empty() {
            self.add_log(
                format!(
                    "While you were away the service carefully earned {}.",
                    format_money(grant.amount)
                ),
                true,
            );
        } else {
            self.add_log("Welcome back.", false);
        }
    }

    pub fn add_log(&mut self, text: impl Into<String>, important: bool) {
        self.log.push_back(LogEntry {
            text: text.into(),
            important,
        });
        while self.log.len() > MAX_LOG_ENTRIES {
            self.log.pop_front();
        }
    }

    /// Apply a player command. Returns false when the command did nothing.
    pub fn handle(&mut self, command: Command, now_mono_ms: f64, now_wall_ms: f64) -> bool {
        match command {
            Command::Service => {
                let result = self.economy.click(now_mono_ms, &mut self.roll);
                if let Some(tip) = result.bonus {
                    self.add_log(format!("A happy client tipped {}!", format_money(tip)), true);
                }
                if result.low_care_warning {
                    self.add_log("Too rough! Slow down and handle the wheels with care.", true);
                }
                self.last_action = Some(result);
                true
            }
            Command::Buy(idx) => {
                let Some(def) = UPGRADES.get(idx) else {
                    return false;
                };
                match self.economy.purchase(def.id, now_wall_ms) {
                    Ok(receipt) => {
                        self.add_log(
                            format!(
                                "Bought {} (level {}) for {}.",
                                def.name,
                                receipt.level,
                                format_money(receipt.cost)
                            ),
                            true,
                        );
                    }
                    Err(PurchaseError::InsufficientFunds { cost, .. }) => {
                        self.add_log(
                            format!("Not enough money for {}: need {}.", def.name, format_money(cost)),
                            false,
                        );
                    }
                    Err(e) => self.add_log(e.to_string(), false),
                }
                true
            }
            Command::Save => {
                match self.economy.save(now_wall_ms) {
                    Ok(()) => self.add_log("Progress saved.", false),
                    Err(e) => self.add_log(format!("Save failed: {e}"), true),
                }
                true
            }
        }
    }

    /// Called every frame; runs a tick when the cadence allows.
    pub fn frame(&mut self, now_mono_ms: f64, now_wall_ms: f64) -> Option<TickOutcome> {
        if self.clock.poll(now_mono_ms) {
            Some(self.economy.tick(now_wall_ms))
        } else {
            None
        }
    }

    pub fn economy(&self) -> &Economy<S> {
        &self.economy
    }

    pub fn log(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + ExactSizeIterator {
        self.log.iter()
    }

    pub fn last_action(&self) -> Option<&ActionResult> {
        self.last_action.as_ref()
    }
}
