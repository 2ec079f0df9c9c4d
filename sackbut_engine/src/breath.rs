//! Breath mapping: raw pressure → volume 0–127.
//!
//! Volume 0 is the only thing that stops a sounding note.

use crate::config::BreathConfig;
use crate::range::{constrain, map_range};

/// Largest volume value.
pub const VOLUME_MAX: u8 = 127;

/// Map a raw pressure reading to a volume.
///
/// Readings under the noise floor give 0; the working range
/// `[threshold, max_pressure]` maps linearly onto `[0, 127]`.
pub fn volume(raw: u16, cfg: &BreathConfig) -> u8 {
    if raw < cfg.threshold {
        return 0;
    }
    let lo = cfg.threshold as i32;
    let hi = cfg.max_pressure as i32;
    let v  = map_range(constrain(raw as i32, lo, hi), lo, hi, 0, VOLUME_MAX as i32);
    v.clamp(0, VOLUME_MAX as i32) as u8
}
