//! Tick scheduling primitives.
//!
//! `draw_web()` calls at ~60fps with variable delta. `TickClock` gates those
//! frames down to the fixed tick cadence; the engine then measures the real
//! elapsed time since its previous tick, so delayed or skipped frames
//! (backgrounded tab, throttling) are accounted for rather than lost.
//!
//! `AutosaveTimer` accumulates simulated seconds and reports when a
//! persistence flush is due.

/// Decides on which frames a tick should run.
pub struct TickClock {
    /// Minimum milliseconds between two ticks.
    interval_ms: f64,
    /// Timestamp of the last tick that fired (ms), None before the first frame.
    last_fire: Option<f64>,
}

impl TickClock {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_fire: None,
        }
    }

    /// Feed a frame timestamp (from `performance.now()` or similar).
    /// Returns true when at least one interval has passed since the last tick.
    ///
    /// The first frame only arms the clock. A timestamp earlier than the last
    /// tick re-arms it instead of waiting for the clock to catch up.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.last_fire {
            None => {
                self.last_fire = Some(now_ms);
                false
            }
            Some(prev) if now_ms < prev => {
                self.last_fire = Some(now_ms);
                false
            }
            Some(prev) if now_ms - prev >= self.interval_ms => {
                self.last_fire = Some(now_ms);
                true
            }
            Some(_) => false,
        }
    }
}

/// Counts simulated seconds towards the next autosave.
#[derive(Clone, Debug)]
pub struct AutosaveTimer {
    interval_secs: f64,
    elapsed_secs: f64,
}

impl AutosaveTimer {
    pub fn new(interval_secs: f64) -> Self {
        Self {
            interval_secs,
            elapsed_secs: 0.0,
        }
    }

    /// Add `secs` to the counter. Returns true (and resets the counter) once
    /// the interval is reached.
    pub fn accumulate(&mut self, secs: f64) -> bool {
        self.elapsed_secs += secs;
        if self.elapsed_secs >= self.interval_secs {
            self.elapsed_secs = 0.0;
            true
        } else {
            false
        }
    }

    /// Seconds accumulated since the last flush.
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }
}
