//! Engine configuration.
//!
//! Every section deserialises with `#[serde(default)]`, so a partial TOML
//! table only overrides the keys it names. The defaults are the calibration
//! of the reference instrument.

use std::time::Duration;

use serde::Deserialize;

// ════════════════════════════════════════════════════════════════════════════
// EngineConfig
// ════════════════════════════════════════════════════════════════════════════

/// Everything the engine needs besides the per-cycle readings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub slide:       SlideConfig,
    pub breath:      BreathConfig,
    pub gate:        GateConfig,
    pub channels:    ChannelConfig,
    pub controllers: ControllerNumbers,
    pub meta:        MetaConfig,
}

// ── slide ─────────────────────────────────────────────────────────────────

/// Soft-pot calibration for the slide.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SlideConfig {
    /// Readings above this mean nobody is touching the slide.
    pub no_touch_ceiling: u16,
    /// Raw reading at first position (slide fully in, no bend).
    pub position_1:       u16,
    /// Raw reading at seventh position (maximum bend down).
    pub position_7:       u16,
    /// Snap the bend to the seven slide positions.
    pub quantize:         bool,
}

impl Default for SlideConfig {
    fn default() -> Self {
        SlideConfig {
            no_touch_ceiling: 1010,
            position_1:       144,
            position_7:       350,
            quantize:         false,
        }
    }
}

// ── breath ────────────────────────────────────────────────────────────────

/// Pressure-sensor calibration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BreathConfig {
    /// Noise floor; anything below reads as silence.
    pub threshold:    u16,
    /// Reading that maps to full volume.
    pub max_pressure: u16,
}

impl Default for BreathConfig {
    fn default() -> Self {
        BreathConfig { threshold: 60, max_pressure: 500 }
    }
}

// ── gate ──────────────────────────────────────────────────────────────────

/// Hysteresis and rate limit for continuous data.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub pitch_bend_threshold: u16,
    pub breath_threshold:     u16,
    pub axis_threshold:       u16,
    /// Minimum time between steady-state batches, in milliseconds.
    pub min_interval_ms:      u64,
}

impl GateConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        GateConfig {
            pitch_bend_threshold: 10,
            breath_threshold:     1,
            axis_threshold:       1,
            min_interval_ms:      10,
        }
    }
}

// ── channels / controllers ────────────────────────────────────────────────

/// MIDI channels (0–15) per event source.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Notes, pitch bend and controllers.
    pub performance: u8,
    pub meta:        u8,
    pub panic:       u8,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig { performance: 0, meta: 1, panic: 1 }
    }
}

/// Controller numbers for the continuous signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ControllerNumbers {
    pub breath: u8,
    pub x:      u8,
    pub y:      u8,
}

impl Default for ControllerNumbers {
    fn default() -> Self {
        ControllerNumbers { breath: 2, x: 16, y: 17 }
    }
}

// ── meta ──────────────────────────────────────────────────────────────────

/// When the meta latch reads the chord.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaCapture {
    /// Capture once, on the press edge.
    #[default]
    OnPress,
    /// Re-capture every cycle the switch is held; the last chord wins.
    WhileHeld,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MetaConfig {
    pub capture: MetaCapture,
}
