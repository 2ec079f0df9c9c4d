//! Note state machine: the single sounding note and the ordered events that
//! move it.
//!
//! ## Transitions (checked in this order, once per cycle)
//!
//! | From | Condition | Events | To |
//! |---|---|---|---|
//! | `Sounding(n)` | volume = 0 | `NoteOff(n)` | `Silent` |
//! | `Silent` | volume > 0, note known | breath, bend, X, Y, `NoteOn(m)` | `Sounding(m)` |
//! | `Sounding(n)` | note m ≠ n | `NoteOff(n)`, bend, breath, X, Y, `NoteOn(m)` | `Sounding(m)` |
//! | `Sounding(n)` | otherwise | bend, breath, X, Y if the rate limit allows | `Sounding(n)` |
//! | `Silent` | otherwise | nothing | `Silent` |
//!
//! Continuous values always pass the change-gate thresholds first, so any of
//! them may be missing from a batch. Only the steady-state batch consults the
//! rate limit.

use std::time::Instant;

use crate::config::EngineConfig;
use crate::event::Event;
use crate::gate::{ChangeGate, Signal};

// ════════════════════════════════════════════════════════════════════════════
// NoteState
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoteState {
    #[default]
    Silent,
    Sounding(u8),
}

impl NoteState {
    pub fn current_note(&self) -> Option<u8> {
        match *self {
            NoteState::Silent      => None,
            NoteState::Sounding(n) => Some(n),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Frame: the mapped readings for one cycle
// ════════════════════════════════════════════════════════════════════════════

/// Derived values the machine consumes each cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Note selected by the chord, `None` for an unassigned chord.
    pub note:   Option<u8>,
    pub volume: u8,
    /// `None` when the slide is not touched.
    pub bend:   Option<u16>,
    pub x:      u8,
    pub y:      u8,
}

// ════════════════════════════════════════════════════════════════════════════
// step
// ════════════════════════════════════════════════════════════════════════════

/// Advance the machine by one cycle, appending events to `out`.
pub fn step(
    state: &mut NoteState,
    gate:  &mut ChangeGate,
    frame: &Frame,
    cfg:   &EngineConfig,
    now:   Instant,
    out:   &mut Vec<Event>,
) {
    let ch = cfg.channels.performance;
    // Unassigned chords hold whatever is sounding.
    let note = frame.note.or(state.current_note());

    match (*state, note) {
        (NoteState::Sounding(current), _) if frame.volume == 0 => {
            log::debug!(target: "engine", "breath stopped, releasing {}", current);
            out.push(Event::note_off(current, ch));
            *state = NoteState::Silent;
        }

        (NoteState::Silent, Some(next)) if frame.volume > 0 => {
            log::debug!(target: "engine", "note on {} at volume {}", next, frame.volume);
            send_breath(gate, frame, cfg, out);
            send_bend(gate, frame, cfg, out);
            send_axes(gate, frame, cfg, out);
            out.push(Event::note_on(next, ch));
            *state = NoteState::Sounding(next);
        }

        (NoteState::Sounding(current), Some(next)) if next != current => {
            log::debug!(target: "engine", "overtone change {} -> {}", current, next);
            out.push(Event::note_off(current, ch));
            send_bend(gate, frame, cfg, out);
            send_breath(gate, frame, cfg, out);
            send_axes(gate, frame, cfg, out);
            out.push(Event::note_on(next, ch));
            *state = NoteState::Sounding(next);
        }

        (NoteState::Sounding(_), _) => {
            if gate.begin_batch(now, cfg.gate.min_interval()) {
                send_bend(gate, frame, cfg, out);
                send_breath(gate, frame, cfg, out);
                send_axes(gate, frame, cfg, out);
            }
        }

        (NoteState::Silent, _) => {}
    }
}

// ── gated senders ─────────────────────────────────────────────────────────

fn send_bend(gate: &mut ChangeGate, frame: &Frame, cfg: &EngineConfig, out: &mut Vec<Event>) {
    let Some(value) = frame.bend else { return };
    if gate.admit(Signal::PitchBend, value as i32, cfg.gate.pitch_bend_threshold) {
        out.push(Event::PitchBend { value, channel: cfg.channels.performance });
    }
}

fn send_breath(gate: &mut ChangeGate, frame: &Frame, cfg: &EngineConfig, out: &mut Vec<Event>) {
    if gate.admit(Signal::Breath, frame.volume as i32, cfg.gate.breath_threshold) {
        out.push(Event::ControlChange {
            controller: cfg.controllers.breath,
            value:      frame.volume,
            channel:    cfg.channels.performance,
        });
    }
}

fn send_axes(gate: &mut ChangeGate, frame: &Frame, cfg: &EngineConfig, out: &mut Vec<Event>) {
    let ch = cfg.channels.performance;
    if gate.admit(Signal::AxisX, frame.x as i32, cfg.gate.axis_threshold) {
        out.push(Event::ControlChange { controller: cfg.controllers.x, value: frame.x, channel: ch });
    }
    if gate.admit(Signal::AxisY, frame.y as i32, cfg.gate.axis_threshold) {
        out.push(Event::ControlChange { controller: cfg.controllers.y, value: frame.y, channel: ch });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn frame(note: Option<u8>, volume: u8) -> Frame {
        Frame { note, volume, bend: Some(8191), x: 0, y: 0 }
    }

    struct Rig {
        state: NoteState,
        gate:  ChangeGate,
        cfg:   EngineConfig,
        t0:    Instant,
    }

    impl Rig {
        fn new() -> Self {
            Rig {
                state: NoteState::Silent,
                gate:  ChangeGate::new(),
                cfg:   EngineConfig::default(),
                t0:    Instant::now(),
            }
        }

        fn run(&mut self, f: Frame, ms: u64) -> Vec<Event> {
            let mut out = Vec::new();
            step(&mut self.state, &mut self.gate, &f, &self.cfg,
                 self.t0 + Duration::from_millis(ms), &mut out);
            out
        }
    }

    #[test]
    fn silent_without_breath_is_noop() {
        let mut rig = Rig::new();
        assert!(rig.run(frame(Some(60), 0), 0).is_empty());
        assert_eq!(rig.state, NoteState::Silent);
    }

    #[test]
    fn silent_with_unassigned_chord_is_noop() {
        let mut rig = Rig::new();
        assert!(rig.run(frame(None, 90), 0).is_empty());
        assert_eq!(rig.state, NoteState::Silent);
    }

    #[test]
    fn note_on_sends_continuous_data_first() {
        let mut rig = Rig::new();
        let ev = rig.run(Frame { note: Some(60), volume: 80, bend: Some(8191), x: 5, y: 9 }, 0);
        assert_eq!(ev, vec![
            Event::ControlChange { controller: 2,  value: 80, channel: 0 },
            Event::PitchBend     { value: 8191, channel: 0 },
            Event::ControlChange { controller: 16, value: 5,  channel: 0 },
            Event::ControlChange { controller: 17, value: 9,  channel: 0 },
            Event::note_on(60, 0),
        ]);
        assert_eq!(rig.state, NoteState::Sounding(60));
    }

    #[test]
    fn untouched_slide_skips_bend_on_note_on() {
        let mut rig = Rig::new();
        let ev = rig.run(Frame { note: Some(60), volume: 80, bend: None, x: 0, y: 0 }, 0);
        assert!(!ev.iter().any(|e| matches!(e, Event::PitchBend { .. })));
        assert_eq!(ev.last(), Some(&Event::note_on(60, 0)));
    }

    #[test]
    fn breath_stop_releases_only_the_note() {
        let mut rig = Rig::new();
        rig.run(frame(Some(60), 80), 0);
        let ev = rig.run(Frame { note: Some(64), volume: 0, bend: Some(0), x: 100, y: 100 }, 100);
        assert_eq!(ev, vec![Event::note_off(60, 0)]);
        assert_eq!(rig.state, NoteState::Silent);
    }

    #[test]
    fn overtone_change_leads_with_note_off() {
        let mut rig = Rig::new();
        rig.run(frame(Some(60), 80), 0);
        let ev = rig.run(Frame { note: Some(64), volume: 90, bend: Some(4000), x: 0, y: 0 }, 1);
        assert_eq!(ev, vec![
            Event::note_off(60, 0),
            Event::PitchBend     { value: 4000, channel: 0 },
            Event::ControlChange { controller: 2, value: 90, channel: 0 },
            Event::note_on(64, 0),
        ]);
        assert_eq!(rig.state, NoteState::Sounding(64));
    }

    #[test]
    fn unassigned_chord_holds_sounding_note() {
        let mut rig = Rig::new();
        rig.run(frame(Some(60), 80), 0);
        let ev = rig.run(frame(None, 80), 50);
        assert!(!ev.iter().any(|e| matches!(e, Event::NoteOn { .. } | Event::NoteOff { .. })));
        assert_eq!(rig.state, NoteState::Sounding(60));
    }

    #[test]
    fn steady_state_respects_rate_limit() {
        let mut rig = Rig::new();
        rig.run(frame(Some(60), 80), 0);
        // First steady batch at 1 ms: no previous batch, so it runs.
        assert_eq!(rig.run(frame(Some(60), 90), 1),
                   vec![Event::ControlChange { controller: 2, value: 90, channel: 0 }]);
        // 5 ms later: held off even though the breath moved.
        assert!(rig.run(frame(Some(60), 100), 6).is_empty());
        // 12 ms after the last batch: allowed.
        assert_eq!(rig.run(frame(Some(60), 100), 13),
                   vec![Event::ControlChange { controller: 2, value: 100, channel: 0 }]);
    }

    #[test]
    fn note_change_bypasses_rate_limit() {
        let mut rig = Rig::new();
        rig.run(frame(Some(60), 80), 0);
        rig.run(frame(Some(60), 90), 1);
        let ev = rig.run(Frame { note: Some(67), volume: 110, bend: Some(8191), x: 0, y: 0 }, 2);
        assert!(ev.contains(&Event::ControlChange { controller: 2, value: 110, channel: 0 }));
    }
}
