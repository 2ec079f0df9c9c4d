//! One control cycle: readings in, ordered events out.
//!
//! The driver samples the instrument at a roughly constant period and calls
//! [`process_cycle`] with the readings and the current monotonic time. The
//! call never blocks and keeps all session state in [`PerformanceState`].
//!
//! Within a cycle the components run in a fixed order:
//!
//! 1. panic switch (all notes off),
//! 2. meta latch,
//! 3. note state machine.
//!
//! They share the input snapshot and nothing else.

use std::time::Instant;

use crate::config::EngineConfig;
use crate::event::Event;
use crate::gate::ChangeGate;
use crate::machine::{self, Frame, NoteState};
use crate::meta::MetaLatch;
use crate::{axis, breath, chord, panic, slide};

// ════════════════════════════════════════════════════════════════════════════
// CycleInputs
// ════════════════════════════════════════════════════════════════════════════

/// Readings supplied by the acquisition layer for one cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleInputs {
    /// Overtone switches, pressed = 1, switch *i* in bit *i*.
    pub chord:         u8,
    pub meta_pressed:  bool,
    pub panic_pressed: bool,
    /// Slide soft pot, 0–1023; above the no-touch ceiling when released.
    pub raw_slide:     u16,
    /// Breath pressure, 0–1023.
    pub raw_breath:    u16,
    pub raw_x:         u16,
    pub raw_y:         u16,
}

impl CycleInputs {
    /// Nothing pressed, no breath, slide untouched, axes at rest.
    pub fn released() -> Self {
        CycleInputs {
            chord:         0,
            meta_pressed:  false,
            panic_pressed: false,
            raw_slide:     1023,
            raw_breath:    0,
            raw_x:         0,
            raw_y:         0,
        }
    }
}

impl Default for CycleInputs {
    fn default() -> Self {
        Self::released()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PerformanceState
// ════════════════════════════════════════════════════════════════════════════

/// Mutable session state, created at startup and kept for the process
/// lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PerformanceState {
    pub note:     NoteState,
    pub gate:     ChangeGate,
    pub meta:     MetaLatch,
    /// Slide quantization, seeded from configuration.
    pub quantize: bool,
}

impl PerformanceState {
    pub fn new(cfg: &EngineConfig) -> Self {
        PerformanceState {
            note:     NoteState::Silent,
            gate:     ChangeGate::new(),
            meta:     MetaLatch::new(),
            quantize: cfg.slide.quantize,
        }
    }

    pub fn current_note(&self) -> Option<u8> {
        self.note.current_note()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// process_cycle
// ════════════════════════════════════════════════════════════════════════════

/// Map one set of readings to the values the note machine consumes.
pub fn frame_for(inputs: &CycleInputs, cfg: &EngineConfig, quantize: bool) -> Frame {
    let (x, y) = axis::controller_values(inputs.raw_x, inputs.raw_y);
    Frame {
        note:   chord::decode_note(inputs.chord),
        volume: breath::volume(inputs.raw_breath, &cfg.breath),
        bend:   slide::pitch_bend(inputs.raw_slide, &cfg.slide, quantize),
        x,
        y,
    }
}

/// Advance the performance by one cycle.
pub fn process_cycle(
    state:  &mut PerformanceState,
    cfg:    &EngineConfig,
    inputs: &CycleInputs,
    now:    Instant,
) -> Vec<Event> {
    let mut out = Vec::new();

    panic::step(inputs.panic_pressed, cfg.channels.panic, &mut out);

    if let Some(cmd) = state.meta.step(
        inputs.meta_pressed, inputs.chord, cfg.meta.capture, cfg.channels.meta,
    ) {
        out.push(cmd);
    }

    let frame = frame_for(inputs, cfg, state.quantize);
    machine::step(&mut state.note, &mut state.gate, &frame, cfg, now, &mut out);

    out
}

// ════════════════════════════════════════════════════════════════════════════
// Engine: config + state in one owner
// ════════════════════════════════════════════════════════════════════════════

pub struct Engine {
    config: EngineConfig,
    state:  PerformanceState,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let state = PerformanceState::new(&config);
        Engine { config, state }
    }

    pub fn process_cycle(&mut self, inputs: &CycleInputs, now: Instant) -> Vec<Event> {
        process_cycle(&mut self.state, &self.config, inputs, now)
    }

    pub fn config(&self) -> &EngineConfig   { &self.config }
    pub fn state(&self)  -> &PerformanceState { &self.state }

    pub fn quantize(&self) -> bool { self.state.quantize }

    pub fn set_quantize(&mut self, on: bool) {
        log::info!(target: "engine", "slide quantization {}", if on { "on" } else { "off" });
        self.state.quantize = on;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn panic_meta_and_note_in_fixed_order() {
        let mut engine = Engine::new(EngineConfig::default());
        let t0 = Instant::now();

        let mut held = CycleInputs { chord: 0b0110, meta_pressed: true, ..CycleInputs::released() };
        assert!(engine.process_cycle(&held, t0).is_empty());

        held.meta_pressed  = false;
        held.panic_pressed = true;
        held.chord         = 0b0011;
        held.raw_breath    = 500;
        let ev = engine.process_cycle(&held, t0 + Duration::from_millis(50));

        assert_eq!(ev[..128].iter().filter(|e| matches!(e, Event::NoteOff { channel: 1, .. })).count(), 128);
        assert_eq!(ev[128], Event::Meta { value: 0b0110, channel: 1 });
        assert_eq!(ev.last(), Some(&Event::note_on(60, 0)));
    }

    #[test]
    fn panic_does_not_reset_note_machine() {
        let mut engine = Engine::new(EngineConfig::default());
        let t0 = Instant::now();
        let playing = CycleInputs { chord: 0b0011, raw_breath: 300, ..CycleInputs::released() };
        engine.process_cycle(&playing, t0);

        let panicking = CycleInputs { panic_pressed: true, ..playing };
        engine.process_cycle(&panicking, t0 + Duration::from_millis(50));
        assert_eq!(engine.state().current_note(), Some(60));
    }

    #[test]
    fn quantize_toggle_changes_bend() {
        let mut engine = Engine::new(EngineConfig::default());
        assert!(!engine.quantize());
        engine.set_quantize(true);
        let inputs = CycleInputs { chord: 0b0011, raw_breath: 300, raw_slide: 160, ..CycleInputs::released() };
        let ev = engine.process_cycle(&inputs, Instant::now());
        assert!(ev.contains(&Event::PitchBend { value: 8191, channel: 0 }));
    }
}
