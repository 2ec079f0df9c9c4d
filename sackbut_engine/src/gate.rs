//! Change gate: hysteresis per continuous signal plus one shared rate limit.
//!
//! Each signal remembers the last value that was actually emitted. A new value
//! only gets through when it moves by *more than* the signal's threshold. A
//! signal that has never been emitted has no last value, so its first value
//! always gets through.
//!
//! The rate limit applies to steady-state batches only: the note machine asks
//! [`ChangeGate::begin_batch`] before re-sending continuous data while a note
//! holds, and note transitions skip that check entirely.

use std::time::{Duration, Instant};

/// The continuous signals the gate tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    PitchBend,
    Breath,
    AxisX,
    AxisY,
}

impl Signal {
    fn slot(self) -> usize {
        match self {
            Signal::PitchBend => 0,
            Signal::Breath    => 1,
            Signal::AxisX     => 2,
            Signal::AxisY     => 3,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ChangeGate
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeGate {
    last:       [Option<i32>; 4],
    last_batch: Option<Instant>,
}

impl ChangeGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last emitted value of `signal`, if any.
    pub fn last(&self, signal: Signal) -> Option<i32> {
        self.last[signal.slot()]
    }

    /// Instant of the last steady-state batch.
    #[cfg(test)]
    fn last_batch(&self) -> Option<Instant> {
        self.last_batch
    }

    /// Whether `value` differs enough from the stored value to be sent.
    pub fn would_admit(&self, signal: Signal, value: i32, threshold: u16) -> bool {
        match self.last[signal.slot()] {
            None       => true,
            Some(last) => (value - last).abs() > threshold as i32,
        }
    }

    /// Admit `value` if it clears the threshold, recording it as emitted.
    pub fn admit(&mut self, signal: Signal, value: i32, threshold: u16) -> bool {
        if self.would_admit(signal, value, threshold) {
            self.last[signal.slot()] = Some(value);
            true
        } else {
            false
        }
    }

    /// True when strictly more than `min_interval` has passed since the last
    /// steady-state batch (or no batch has run yet).
    pub fn interval_elapsed(&self, now: Instant, min_interval: Duration) -> bool {
        match self.last_batch {
            None       => true,
            Some(prev) => now.saturating_duration_since(prev) > min_interval,
        }
    }

    /// Try to open a steady-state batch at `now`.
    ///
    /// On success the shared timestamp moves to `now`, whether or not the
    /// batch ends up emitting anything.
    pub fn begin_batch(&mut self, now: Instant, min_interval: Duration) -> bool {
        if self.interval_elapsed(now, min_interval) {
            self.last_batch = Some(now);
            true
        } else {
            false
        }
    }
}
