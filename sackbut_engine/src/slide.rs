//! Slide mapping: raw soft-pot reading → 14-bit pitch bend.
//!
//! All bends are *down* from the pitch selected by the chord: first position
//! is neutral (8191), seventh position is the full bend down (0). The synth
//! patch is expected to have a bend range of seven semitones so that the
//! positions land on the trombone's chromatic steps.
//!
//! Quantization divides the bend range into seven bands. Each position is one
//! band wide, centred on its nominal value, except first and seventh, which
//! are half-width at the edges:
//!
//! ```text
//!   1    2    3    4    5    6    7
//!   ^^^
//!      ^^^^^
//!           ^^^^^
//!                ^^^^^
//!                     ^^^^^
//!                          ^^^^^
//!                               ^^^
//! ```

use crate::config::SlideConfig;
use crate::range::{constrain, map_range};

/// Neutral (un-bent) pitch-bend value.
pub const PITCH_BEND_NEUTRAL: u16 = 16383 / 2;
/// Pitch-bend value at seventh position.
pub const MAX_PITCH_BEND_DOWN: u16 = 0;
/// Largest valid 14-bit bend.
pub const PITCH_BEND_MAX: u16 = 16383;

/// Number of slide positions.
pub const POSITIONS: u8 = 7;

// ════════════════════════════════════════════════════════════════════════════
// Mapping
// ════════════════════════════════════════════════════════════════════════════

/// Map a raw slide reading to a pitch bend.
///
/// Returns `None` when the reading is in the no-touch zone. That is "no data"
/// for this cycle, not a request to return to neutral.
pub fn pitch_bend(raw: u16, cfg: &SlideConfig, quantize: bool) -> Option<u16> {
    if raw > cfg.no_touch_ceiling {
        return None;
    }

    let p1 = cfg.position_1 as i32;
    let p7 = cfg.position_7 as i32;
    let clamped = constrain(raw as i32, p1, p7);

    let bend = map_range(
        clamped, p1, p7,
        PITCH_BEND_NEUTRAL as i32, MAX_PITCH_BEND_DOWN as i32,
    ).max(0);

    let bend = if quantize { quantize_bend(bend) } else { bend };
    Some(bend.min(PITCH_BEND_MAX as i32) as u16)
}

/// Snap a bend value in `[0, 8192]` to one of the seven position levels.
/// Anything outside that domain maps to 0.
pub fn quantize_bend(value: i32) -> i32 {
    match value {
        0..=683     => 0,
        684..=2048  => 1365,
        2049..=3413 => 2731,
        3414..=4779 => 4096,
        4780..=6144 => 5461,
        6145..=7509 => 6827,
        7510..=8192 => 8191,
        _           => 0,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SlidePosition: which of the seven positions the slide is nearest
// ════════════════════════════════════════════════════════════════════════════

/// A slide position, 1 (closed) to 7 (fully extended).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SlidePosition(pub u8);

impl SlidePosition {
    /// Nearest position for a raw reading, or `None` if not touched.
    pub fn nearest(raw: u16, cfg: &SlideConfig) -> Option<Self> {
        if raw > cfg.no_touch_ceiling {
            return None;
        }
        let p1   = cfg.position_1 as i32;
        let p7   = cfg.position_7 as i32;
        let span = (p7 - p1).abs().max(1);
        let off  = (constrain(raw as i32, p1, p7) - p1).abs();
        // Round to the nearest of six equal steps.
        let step = (off * 6 + span / 2) / span;
        Some(SlidePosition(step as u8 + 1))
    }

    /// Nominal raw reading for this position.
    pub fn raw(self, cfg: &SlideConfig) -> u16 {
        let n = self.0.clamp(1, POSITIONS) as i32 - 1;
        map_range(n, 0, 6, cfg.position_1 as i32, cfg.position_7 as i32) as u16
    }
}
