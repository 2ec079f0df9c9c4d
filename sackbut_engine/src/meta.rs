//! Meta latch: the thumb switch turns the chord into an out-of-band command.
//!
//! Pressing the meta switch captures the raw chord; releasing it emits one
//! [`Event::Meta`] carrying that chord. Nothing is emitted while it is held.
//! The latch neither reads nor changes the note machine, so a note may keep
//! sounding (or change) while a meta command is being entered.

use crate::chord::CHORD_MASK;
use crate::config::MetaCapture;
use crate::event::Event;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetaLatch {
    held:  bool,
    value: u8,
}

impl MetaLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the meta switch is down.
    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Chord value captured so far.
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Feed one cycle's meta switch and raw chord. Returns the command to
    /// emit on the release edge.
    pub fn step(&mut self, pressed: bool, chord: u8, capture: MetaCapture, channel: u8) -> Option<Event> {
        match (pressed, self.held) {
            (true, false) => {
                self.held  = true;
                self.value = chord & CHORD_MASK;
                None
            }
            (true, true) => {
                if capture == MetaCapture::WhileHeld {
                    self.value = chord & CHORD_MASK;
                }
                None
            }
            (false, true) => {
                self.held = false;
                log::debug!(target: "engine", "meta command {:X}", self.value);
                Some(Event::Meta { value: self.value, channel })
            }
            (false, false) => None,
        }
    }
}
