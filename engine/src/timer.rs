use serde::{Deserialize, Serialize};

use crate::rules::Side;

/// Ten minutes per side.
pub const DEFAULT_SECONDS: f64 = 600.0;

/// Countdown clocks for both sides, advanced only by explicit ticks.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Timers {
    white: f64,
    black: f64,
    running: bool,
}

impl Timers {
    pub fn new(seconds: f64) -> Self {
        Self {
            white: seconds,
            black: seconds,
            running: false,
        }
    }

    pub fn with_remaining(white: f64, black: f64) -> Self {
        Self {
            white,
            black,
            running: false,
        }
    }

    pub fn remaining(&self, side: Side) -> f64 {
        match side {
            Side::White => self.white,
            Side::Black => self.black,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Charge `elapsed` seconds to `side`. Returns true when that side's
    /// clock is at zero after the charge, including a clock that was
    /// already empty. Non-finite or negative `elapsed` is ignored.
    pub fn tick(&mut self, side: Side, elapsed: f64) -> bool {
        if !self.running || !elapsed.is_finite() || elapsed < 0.0 {
            return false;
        }
        let clock = match side {
            Side::White => &mut self.white,
            Side::Black => &mut self.black,
        };
        *clock = (*clock - elapsed).max(0.0);
        *clock <= 0.0
    }
}

impl Default for Timers {
    fn default() -> Self {
        Self::new(DEFAULT_SECONDS)
    }
}

/// `MM:SS`, truncating fractional seconds.
pub fn format_clock(seconds: f64) -> String {
    let whole = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", whole / 60, whole % 60)
}
