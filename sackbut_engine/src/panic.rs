//! Panic switch: all notes off, every cycle it is held.
//!
//! The note machine is not told: if it believed a note was sounding, it
//! still does, and the next breath stop sends that note's `NoteOff` again.

use crate::event::Event;

/// Number of MIDI note values.
pub const NOTE_COUNT: u8 = 128;

/// Append a `NoteOff` for every note when `pressed`.
pub fn step(pressed: bool, channel: u8, out: &mut Vec<Event>) {
    if !pressed {
        return;
    }
    log::debug!(target: "engine", "panic: all notes off on channel {}", channel);
    out.extend((0..NOTE_COUNT).map(|note| Event::note_off(note, channel)));
}
