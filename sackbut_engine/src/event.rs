//! Outgoing performance events.
//!
//! Events are produced by the engine and handed straight to a transport;
//! nothing in the engine keeps them around.

// ════════════════════════════════════════════════════════════════════════════
// Event
// ════════════════════════════════════════════════════════════════════════════

/// One outgoing performance message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Start sounding `note`.
    NoteOn  { note: u8, velocity: u8, channel: u8 },

    /// Stop sounding `note`.
    NoteOff { note: u8, velocity: u8, channel: u8 },

    /// 14-bit bend, 0–16383. 8191 is neutral; the slide only bends down.
    PitchBend { value: u16, channel: u8 },

    /// Continuous controller (breath, X, Y).
    ControlChange { controller: u8, value: u8, channel: u8 },

    /// Meta command: the raw chord captured while the meta switch was held.
    ///
    /// Kept apart from `NoteOn` even though the wire encoding is NoteOn-shaped.
    Meta { value: u8, channel: u8 },
}

/// Velocity used for every performance note-on.
pub const NOTE_ON_VELOCITY:  u8 = 127;
/// Velocity used for every note-off.
pub const NOTE_OFF_VELOCITY: u8 = 0;

impl Event {
    pub fn note_on(note: u8, channel: u8) -> Self {
        Event::NoteOn { note, velocity: NOTE_ON_VELOCITY, channel }
    }

    pub fn note_off(note: u8, channel: u8) -> Self {
        Event::NoteOff { note, velocity: NOTE_OFF_VELOCITY, channel }
    }

    /// True for the continuous-data kinds governed by the change gate.
    pub fn is_continuous(&self) -> bool {
        matches!(self, Event::PitchBend { .. } | Event::ControlChange { .. })
    }
}
