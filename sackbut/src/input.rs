//! Acquisition: from line levels to [`CycleInputs`], and the simulator that
//! produces line levels from the keyboard and mouse.
//!
//! The instrument's switches are wired with pull-ups, so a released switch
//! reads *high*. [`PinLevels::readings`] does the inversion and packs the
//! four overtone switches into the chord, switch *i* in bit *i*.
//!
//! The simulator panel is fed [`SimInput`] events over an `mpsc` channel by
//! the visualizer window and is drained once per cycle, when it is sampled.

use std::sync::mpsc::{Receiver, TryRecvError};

use sackbut_engine::CycleInputs;

/// Highest reading of a 10-bit analog input.
pub const RAW_MAX: u16 = 1023;

// ════════════════════════════════════════════════════════════════════════════
// PinLevels
// ════════════════════════════════════════════════════════════════════════════

/// One read of every input line, as the hardware presents it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinLevels {
    /// Overtone switch lines, `true` = high = released.
    pub switches: [bool; 4],
    pub meta:     bool,
    pub panic:    bool,
    pub slide:    u16,
    pub breath:   u16,
    pub x:        u16,
    pub y:        u16,
}

impl PinLevels {
    /// All switches released, analog lines as for an untouched instrument.
    pub fn idle() -> Self {
        Self::from_readings(&CycleInputs::released())
    }

    /// Convert to the engine's per-cycle readings.
    pub fn readings(&self) -> CycleInputs {
        let chord = self.switches.iter().enumerate()
            .filter(|(_, &high)| !high)
            .fold(0u8, |acc, (i, _)| acc | (1 << i));
        CycleInputs {
            chord,
            meta_pressed:  !self.meta,
            panic_pressed: !self.panic,
            raw_slide:     self.slide.min(RAW_MAX),
            raw_breath:    self.breath.min(RAW_MAX),
            raw_x:         self.x.min(RAW_MAX),
            raw_y:         self.y.min(RAW_MAX),
        }
    }

    /// The line levels that would read back as `inputs`.
    pub fn from_readings(inputs: &CycleInputs) -> Self {
        let mut switches = [true; 4];
        for (i, line) in switches.iter_mut().enumerate() {
            *line = inputs.chord & (1 << i) == 0;
        }
        PinLevels {
            switches,
            meta:   !inputs.meta_pressed,
            panic:  !inputs.panic_pressed,
            slide:  inputs.raw_slide,
            breath: inputs.raw_breath,
            x:      inputs.raw_x,
            y:      inputs.raw_y,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// InputSource: hardware or simulator
// ════════════════════════════════════════════════════════════════════════════

/// What the driver gets from one sample of the instrument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample {
    pub levels:          PinLevels,
    /// The player asked to flip slide quantization since the last sample.
    pub toggle_quantize: bool,
}

impl Sample {
    pub fn new(levels: PinLevels) -> Self {
        Sample { levels, toggle_quantize: false }
    }
}

/// Anything that can be sampled once per control cycle.
pub trait InputSource {
    /// Read the instrument. `None` ends the session.
    fn sample(&mut self) -> Option<Sample>;
}

// ════════════════════════════════════════════════════════════════════════════
// Simulator
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    KeyDown(SimKey),
    KeyUp(SimKey),
    /// Mouse on the slide strip: the raw reading under the pointer, or
    /// `None` when the button is let go.
    Slide(Option<u16>),
}

/// Simulated controls (mapped from minifb keys by the visualizer).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    Switch(u8),     // J K L ;
    Meta,           // Space
    Panic,          // Backspace
    Blow,           // B
    XDown,          // Left
    XUp,            // Right
    YDown,          // Down
    YUp,            // Up
    Quantize,       // Tab
    Quit,           // Q
}

/// Breath pressure gained per sample while blowing.
const BREATH_RISE: u16 = 60;
/// Breath pressure lost per sample after blowing stops.
const BREATH_FALL: u16 = 150;
/// Peak simulated pressure; a little above the default full-volume reading.
const BREATH_PEAK: u16 = 560;
/// Axis movement per sample while an arrow key is held.
const AXIS_STEP:   u16 = 24;

/// Keyboard/mouse model of the instrument.
pub struct SimPanel {
    rx:       Receiver<SimInput>,
    switches: [bool; 4],
    meta:     bool,
    panic:    bool,
    blowing:  bool,
    breath:   u16,
    slide:    Option<u16>,
    x:        u16,
    y:        u16,
    /// Arrow keys held: x down, x up, y down, y up.
    arrows:   [bool; 4],
    /// Switches pressed since the last sample, so a tap inside one cycle
    /// still reads as pressed once.
    tapped:   Taps,
    toggle:   bool,
    quit:     bool,
}

impl SimPanel {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimPanel {
            rx,
            switches: [false; 4],
            meta:     false,
            panic:    false,
            blowing:  false,
            breath:   0,
            slide:    None,
            x:        0,
            y:        0,
            arrows:   [false; 4],
            tapped:   Taps::default(),
            toggle:   false,
            quit:     false,
        }
    }

    fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::KeyDown(key) => self.set_key(key, true),
            SimInput::KeyUp(key)   => self.set_key(key, false),
            SimInput::Slide(raw)   => self.slide = raw.map(|r| r.min(RAW_MAX)),
        }
    }

    fn set_key(&mut self, key: SimKey, down: bool) {
        match key {
            SimKey::Switch(i) => {
                if let Some(s) = self.switches.get_mut(i as usize) {
                    *s = down;
                }
                if let Some(t) = self.tapped.switches.get_mut(i as usize) {
                    *t |= down;
                }
            }
            SimKey::Meta     => { self.meta  = down; self.tapped.meta  |= down; }
            SimKey::Panic    => { self.panic = down; self.tapped.panic |= down; }
            SimKey::Blow     => self.blowing   = down,
            SimKey::XDown    => self.arrows[0] = down,
            SimKey::XUp      => self.arrows[1] = down,
            SimKey::YDown    => self.arrows[2] = down,
            SimKey::YUp      => self.arrows[3] = down,
            SimKey::Quantize => if down { self.toggle = !self.toggle },
            SimKey::Quit     => if down { self.quit = true },
        }
    }

    /// Advance the simulated pressure and axes by one sample.
    fn advance(&mut self) {
        self.breath = if self.blowing {
            (self.breath + BREATH_RISE).min(BREATH_PEAK)
        } else {
            self.breath.saturating_sub(BREATH_FALL)
        };
        let [x_down, x_up, y_down, y_up] = self.arrows;
        self.x = step_axis(self.x, direction(x_down, x_up));
        self.y = step_axis(self.y, direction(y_down, y_up));
    }

    /// Line levels for this sample; consumes the taps.
    fn levels(&mut self) -> PinLevels {
        let taps = std::mem::take(&mut self.tapped);
        let mut switches = [true; 4];
        for (i, line) in switches.iter_mut().enumerate() {
            *line = !(self.switches[i] || taps.switches[i]);
        }
        PinLevels {
            switches,
            meta:     !(self.meta  || taps.meta),
            panic:    !(self.panic || taps.panic),
            slide:    self.slide.unwrap_or(RAW_MAX),
            breath:   self.breath,
            x:        self.x,
            y:        self.y,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Taps {
    switches: [bool; 4],
    meta:     bool,
    panic:    bool,
}

/// Net direction of a pair of opposing keys.
fn direction(down: bool, up: bool) -> i8 {
    up as i8 - down as i8
}

fn step_axis(value: u16, dir: i8) -> u16 {
    match dir {
        d if d > 0 => (value + AXIS_STEP).min(RAW_MAX),
        d if d < 0 => value.saturating_sub(AXIS_STEP),
        _          => value,
    }
}

impl InputSource for SimPanel {
    fn sample(&mut self) -> Option<Sample> {
        loop {
            match self.rx.try_recv() {
                Ok(input)                       => self.apply(input),
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => return None,
            }
        }
        if self.quit {
            return None;
        }
        self.advance();
        let toggle_quantize = std::mem::take(&mut self.toggle);
        Some(Sample { levels: self.levels(), toggle_quantize })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    // ── PinLevels ────────────────────────────────────────────────────────
    #[test]
    fn idle_lines_read_as_released() {
        assert_eq!(PinLevels::idle().readings(), CycleInputs::released());
    }

    #[test]
    fn low_lines_are_pressed_and_packed_by_index() {
        let levels = PinLevels {
            switches: [false, true, true, false],
            meta:     false,
            panic:    true,
            ..PinLevels::idle()
        };
        let r = levels.readings();
        assert_eq!(r.chord, 0b1001);
        assert!(r.meta_pressed);
        assert!(!r.panic_pressed);
    }

    #[test]
    fn analog_readings_are_clamped() {
        let levels = PinLevels { breath: 4000, x: 1024, ..PinLevels::idle() };
        let r = levels.readings();
        assert_eq!(r.raw_breath, RAW_MAX);
        assert_eq!(r.raw_x, RAW_MAX);
    }

    #[test]
    fn from_readings_inverts_readings() {
        let inputs = CycleInputs {
            chord: 0b0110, panic_pressed: true, raw_breath: 300, raw_slide: 200,
            ..CycleInputs::released()
        };
        assert_eq!(PinLevels::from_readings(&inputs).readings(), inputs);
    }

    // ── SimPanel ─────────────────────────────────────────────────────────
    fn panel() -> (mpsc::Sender<SimInput>, SimPanel) {
        let (tx, rx) = mpsc::channel();
        (tx, SimPanel::new(rx))
    }

    #[test]
    fn switches_and_slide_follow_events() {
        let (tx, mut p) = panel();
        tx.send(SimInput::KeyDown(SimKey::Switch(0))).unwrap();
        tx.send(SimInput::KeyDown(SimKey::Switch(1))).unwrap();
        tx.send(SimInput::Slide(Some(144))).unwrap();
        let r = p.sample().unwrap().levels.readings();
        assert_eq!(r.chord, 0b0011);
        assert_eq!(r.raw_slide, 144);

        tx.send(SimInput::KeyUp(SimKey::Switch(0))).unwrap();
        tx.send(SimInput::Slide(None)).unwrap();
        let r = p.sample().unwrap().levels.readings();
        assert_eq!(r.chord, 0b0010);
        assert_eq!(r.raw_slide, RAW_MAX);
    }

    #[test]
    fn breath_ramps_while_blowing() {
        let (tx, mut p) = panel();
        tx.send(SimInput::KeyDown(SimKey::Blow)).unwrap();
        let first = p.sample().unwrap().levels.breath;
        let second = p.sample().unwrap().levels.breath;
        assert_eq!(first, BREATH_RISE);
        assert!(second > first);
        for _ in 0..20 {
            p.sample();
        }
        assert_eq!(p.sample().unwrap().levels.breath, BREATH_PEAK);

        tx.send(SimInput::KeyUp(SimKey::Blow)).unwrap();
        for _ in 0..10 {
            p.sample();
        }
        assert_eq!(p.sample().unwrap().levels.breath, 0);
    }

    #[test]
    fn quantize_toggle_is_reported_once() {
        let (tx, mut p) = panel();
        tx.send(SimInput::KeyDown(SimKey::Quantize)).unwrap();
        assert!(p.sample().unwrap().toggle_quantize);
        assert!(!p.sample().unwrap().toggle_quantize);
    }

    #[test]
    fn quit_and_disconnect_end_session() {
        let (tx, mut p) = panel();
        tx.send(SimInput::KeyDown(SimKey::Quit)).unwrap();
        assert!(p.sample().is_none());

        let (tx, mut p) = panel();
        drop(tx);
        assert!(p.sample().is_none());
    }

    #[test]
    fn releasing_one_arrow_keeps_the_other_moving() {
        let (tx, mut p) = panel();
        tx.send(SimInput::KeyDown(SimKey::XUp)).unwrap();
        for _ in 0..50 {
            p.sample();
        }
        assert_eq!(p.sample().unwrap().levels.x, RAW_MAX);

        tx.send(SimInput::KeyDown(SimKey::XDown)).unwrap();
        assert_eq!(p.sample().unwrap().levels.x, RAW_MAX, "opposite arrows cancel");

        tx.send(SimInput::KeyUp(SimKey::XUp)).unwrap();
        assert_eq!(p.sample().unwrap().levels.x, RAW_MAX - AXIS_STEP);
        assert_eq!(p.sample().unwrap().levels.x, RAW_MAX - 2 * AXIS_STEP);
    }

    #[test]
    fn tap_inside_one_cycle_is_seen_once() {
        let (tx, mut p) = panel();
        tx.send(SimInput::KeyDown(SimKey::Meta)).unwrap();
        tx.send(SimInput::KeyUp(SimKey::Meta)).unwrap();
        tx.send(SimInput::KeyDown(SimKey::Switch(2))).unwrap();
        tx.send(SimInput::KeyUp(SimKey::Switch(2))).unwrap();
        let r = p.sample().unwrap().levels.readings();
        assert!(r.meta_pressed);
        assert_eq!(r.chord, 0b0100);

        let r = p.sample().unwrap().levels.readings();
        assert!(!r.meta_pressed);
        assert_eq!(r.chord, 0);
    }

    #[test]
    fn held_switch_survives_the_tap_reset() {
        let (tx, mut p) = panel();
        tx.send(SimInput::KeyDown(SimKey::Panic)).unwrap();
        assert!(p.sample().unwrap().levels.readings().panic_pressed);
        assert!(p.sample().unwrap().levels.readings().panic_pressed);
    }

    #[test]
    fn axes_move_and_clamp() {
        let (tx, mut p) = panel();
        tx.send(SimInput::KeyDown(SimKey::XUp)).unwrap();
        for _ in 0..100 {
            p.sample();
        }
        assert_eq!(p.sample().unwrap().levels.x, RAW_MAX);
        tx.send(SimInput::KeyUp(SimKey::XUp)).unwrap();
        tx.send(SimInput::KeyDown(SimKey::YDown)).unwrap();
        let s = p.sample().unwrap().levels;
        assert_eq!((s.x, s.y), (RAW_MAX, 0));
    }
}
