//! Chord decoding: four finger switches select one of eight overtones.
//!
//! The switch patterns walk a "progression": fingers go down one at a time
//! from switch 0 up to all four, then lift one at a time from switch 0.
//!
//! ```text
//!  switch 3210   overtone   note
//!         0000      0        48  C3
//!         0001      1        55  G3
//!         0011      2        60  C4
//!         0111      3        64  E4
//!         1111      4        67  G4
//!         1110      5        70  Bb4
//!         1100      6        72  C5
//!         1000      7        74  D5
//! ```
//!
//! Every other pattern is unassigned and decodes to `None`.

/// Mask for the four switch bits of a chord.
pub const CHORD_MASK: u8 = 0x0F;

/// One row of the overtone table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Overtone {
    /// Switch pattern, pressed = 1, switch *i* in bit *i*.
    pub pattern: u8,
    /// MIDI note sounded for this overtone.
    pub note:    u8,
}

/// The instrument's overtone series: a fifth, a fourth, then alternating.
pub const OVERTONES: [Overtone; 8] = [
    Overtone { pattern: 0b0000, note: 48 },
    Overtone { pattern: 0b0001, note: 55 },
    Overtone { pattern: 0b0011, note: 60 },
    Overtone { pattern: 0b0111, note: 64 },
    Overtone { pattern: 0b1111, note: 67 },
    Overtone { pattern: 0b1110, note: 70 },
    Overtone { pattern: 0b1100, note: 72 },
    Overtone { pattern: 0b1000, note: 74 },
];

/// Decode a chord into an overtone index (0–7).
///
/// Bits above the low nibble are ignored. Returns `None` for unassigned
/// patterns; callers treat that as "no change", not silence.
pub fn decode(chord: u8) -> Option<usize> {
    let chord = chord & CHORD_MASK;
    OVERTONES.iter().position(|ot| ot.pattern == chord)
}

/// MIDI note for an overtone index.
pub fn note_for(overtone: usize) -> Option<u8> {
    OVERTONES.get(overtone).map(|ot| ot.note)
}

/// Decode a chord straight to its MIDI note.
pub fn decode_note(chord: u8) -> Option<u8> {
    decode(chord).and_then(note_for)
}
