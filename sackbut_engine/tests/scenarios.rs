//! End-to-end behaviour of the engine across many cycles.

use std::time::{Duration, Instant};

use sackbut_engine::{CycleInputs, Engine, EngineConfig, Event, NoteState};

const PERIOD: Duration = Duration::from_millis(50);

// ── helpers ───────────────────────────────────────────────────────────────

/// Drives an engine with evenly spaced cycles and collects every event.
struct Session {
    engine: Engine,
    t0:     Instant,
    cycle:  u32,
    period: Duration,
}

impl Session {
    fn new() -> Self {
        Self::with_period(PERIOD)
    }

    fn with_period(period: Duration) -> Self {
        Session {
            engine: Engine::new(EngineConfig::default()),
            t0:     Instant::now(),
            cycle:  0,
            period,
        }
    }

    fn now(&self) -> Instant {
        self.t0 + self.period * self.cycle
    }

    fn run(&mut self, inputs: CycleInputs) -> Vec<Event> {
        let ev = self.engine.process_cycle(&inputs, self.now());
        self.cycle += 1;
        ev
    }
}

fn playing(chord: u8, raw_breath: u16) -> CycleInputs {
    CycleInputs { chord, raw_breath, raw_slide: 144, raw_x: 512, raw_y: 256, ..CycleInputs::released() }
}

/// Tiny deterministic generator so the long-run tests are repeatable.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    fn below(&mut self, n: u32) -> u32 {
        self.next() % n
    }
}

fn random_inputs(rng: &mut Lcg) -> CycleInputs {
    CycleInputs {
        chord:         rng.below(16) as u8,
        meta_pressed:  rng.below(8) == 0,
        panic_pressed: false,
        raw_slide:     100 + rng.below(924) as u16,
        raw_breath:    if rng.below(4) == 0 { 0 } else { rng.below(600) as u16 },
        raw_x:         rng.below(1024) as u16,
        raw_y:         rng.below(1024) as u16,
    }
}

// ── scenario A ────────────────────────────────────────────────────────────

#[test]
fn breath_onset_sends_controllers_then_note() {
    let mut s = Session::new();
    assert!(s.run(CycleInputs { chord: 0b0011, ..CycleInputs::released() }).is_empty());

    // Lowest breath reading that maps to volume 80.
    let raw = (60..=500u16).find(|&r| (r - 60) * 127 / 440 == 80).unwrap();
    let ev = s.run(CycleInputs { chord: 0b0011, raw_breath: raw, raw_slide: 144, ..CycleInputs::released() });

    assert_eq!(ev, vec![
        Event::ControlChange { controller: 2,  value: 80, channel: 0 },
        Event::PitchBend     { value: 8191, channel: 0 },
        Event::ControlChange { controller: 16, value: 0,  channel: 0 },
        Event::ControlChange { controller: 17, value: 0,  channel: 0 },
        Event::note_on(60, 0),
    ]);
    assert_eq!(s.engine.state().note, NoteState::Sounding(60));
}

// ── scenario B ────────────────────────────────────────────────────────────

#[test]
fn chord_change_swaps_notes_without_overlap() {
    let mut s = Session::new();
    s.run(playing(0b0011, 300));
    assert_eq!(s.engine.state().current_note(), Some(60));

    let ev = s.run(CycleInputs { raw_x: 900, ..playing(0b1111, 320) });
    assert_eq!(ev.first(), Some(&Event::note_off(60, 0)));
    assert_eq!(ev.last(),  Some(&Event::note_on(67, 0)));
    assert!(ev[1..ev.len() - 1].iter().all(Event::is_continuous));
    assert!(ev.contains(&Event::ControlChange { controller: 16, value: 111, channel: 0 }));
    assert_eq!(s.engine.state().current_note(), Some(67));
}

#[test]
fn unassigned_chord_mid_note_is_not_silence() {
    let mut s = Session::new();
    s.run(playing(0b0011, 300));
    for _ in 0..5 {
        let ev = s.run(playing(0b0101, 300));
        assert!(ev.iter().all(Event::is_continuous));
    }
    assert_eq!(s.engine.state().current_note(), Some(60));
}

// ── scenario C ────────────────────────────────────────────────────────────

#[test]
fn breath_release_sends_only_note_off() {
    let mut s = Session::new();
    s.run(playing(0b0111, 400));
    let ev = s.run(CycleInputs { raw_slide: 300, raw_x: 0, ..playing(0b1000, 0) });
    assert_eq!(ev, vec![Event::note_off(64, 0)]);
    assert_eq!(s.engine.state().note, NoteState::Silent);
}

// ── meta round trip ───────────────────────────────────────────────────────

#[test]
fn meta_round_trip_emits_one_command() {
    for k in [0u32, 1, 3, 20] {
        let mut s = Session::new();
        let pattern = 0b1010;
        let mut metas = Vec::new();
        for _ in 0..=k {
            metas.extend(s.run(CycleInputs { chord: pattern, meta_pressed: true, ..CycleInputs::released() }));
        }
        metas.extend(s.run(CycleInputs { chord: pattern, ..CycleInputs::released() }));
        metas.extend(s.run(CycleInputs::released()));
        let metas: Vec<_> = metas.into_iter().filter(|e| matches!(e, Event::Meta { .. })).collect();
        assert_eq!(metas, vec![Event::Meta { value: pattern, channel: 1 }], "held {} cycles", k);
    }
}

#[test]
fn meta_while_playing_leaves_note_alone() {
    let mut s = Session::new();
    s.run(playing(0b0011, 300));
    s.run(CycleInputs { meta_pressed: true, ..playing(0b0011, 300) });
    let ev = s.run(playing(0b0011, 300));
    assert!(ev.contains(&Event::Meta { value: 0b0011, channel: 1 }));
    assert_eq!(s.engine.state().current_note(), Some(60));
}

// ── panic ─────────────────────────────────────────────────────────────────

#[test]
fn panic_repeats_every_held_cycle() {
    let mut s = Session::new();
    for _ in 0..3 {
        let ev = s.run(CycleInputs { panic_pressed: true, ..CycleInputs::released() });
        assert_eq!(ev.len(), 128);
    }
    assert!(s.run(CycleInputs::released()).is_empty());
}

// ── monophony ─────────────────────────────────────────────────────────────

#[test]
fn never_two_notes_at_once() {
    let mut s = Session::new();
    let mut rng = Lcg(0x5AC_B07);
    let mut ons  = 0i64;
    let mut offs = 0i64;
    let mut sounding: Option<u8> = None;

    for _ in 0..5_000 {
        for ev in s.run(random_inputs(&mut rng)) {
            match ev {
                Event::NoteOn { note, .. } => {
                    assert_eq!(sounding, None, "NoteOn {} while {:?} sounds", note, sounding);
                    sounding = Some(note);
                    ons += 1;
                }
                Event::NoteOff { note, .. } => {
                    assert_eq!(sounding, Some(note));
                    sounding = None;
                    offs += 1;
                }
                _ => {}
            }
            assert!(ons - offs <= 1 && ons >= offs);
        }
        assert_eq!(sounding, s.engine.state().current_note());
    }
    assert!(ons > 100, "generator should exercise many notes, got {}", ons);
}

// ── threshold gating ──────────────────────────────────────────────────────

#[test]
fn small_breath_wobble_is_filtered() {
    let mut s = Session::new();
    s.run(playing(0b0011, 300));
    // 300 → volume 69; 302/303 stay within ±1.
    let mut steady = Vec::new();
    for raw in [302, 303, 300, 302] {
        steady.extend(s.run(playing(0b0011, raw)));
    }
    assert!(steady.is_empty(), "{:?}", steady);

    let ev = s.run(playing(0b0011, 320));
    assert_eq!(ev, vec![Event::ControlChange { controller: 2, value: 75, channel: 0 }]);
}

#[test]
fn pitch_bend_needs_more_than_ten_steps() {
    let mut s = Session::new();
    s.run(playing(0b0011, 300)); // bend 8191 at raw 144
    // raw 144 → 8191, each raw step is ~39.8 bend, so raw 145 moves by 39.
    let ev = s.run(CycleInputs { raw_slide: 145, ..playing(0b0011, 300) });
    assert_eq!(ev, vec![Event::PitchBend { value: 8152, channel: 0 }]);

    let mut cfg = EngineConfig::default();
    cfg.gate.pitch_bend_threshold = 100;
    let mut engine = Engine::new(cfg);
    let t0 = Instant::now();
    engine.process_cycle(&playing(0b0011, 300), t0);
    let ev = engine.process_cycle(&CycleInputs { raw_slide: 146, ..playing(0b0011, 300) }, t0 + PERIOD);
    assert!(ev.is_empty());
}

#[test]
fn untouched_slide_emits_no_bend() {
    let mut s = Session::new();
    let ev = s.run(CycleInputs { raw_slide: 1020, ..playing(0b0011, 300) });
    assert!(!ev.iter().any(|e| matches!(e, Event::PitchBend { .. })));
    let ev = s.run(CycleInputs { raw_slide: 1023, ..playing(0b0011, 300) });
    assert!(ev.is_empty());
}

// ── rate limiting ─────────────────────────────────────────────────────────

#[test]
fn steady_batches_never_closer_than_min_interval() {
    // Cycle every 3 ms against a 10 ms limit.
    let mut s = Session::with_period(Duration::from_millis(3));
    s.run(playing(0b0011, 100));

    let mut batch_times = Vec::new();
    for i in 0..200u32 {
        let raw = 100 + (i % 3) * 150; // breath keeps jumping
        let at = s.now();
        let ev = s.run(playing(0b0011, raw as u16));
        assert!(ev.iter().all(Event::is_continuous));
        if !ev.is_empty() {
            batch_times.push(at);
        }
    }

    assert!(batch_times.len() > 10);
    for pair in batch_times.windows(2) {
        assert!(pair[1] - pair[0] > Duration::from_millis(10), "{:?}", pair[1] - pair[0]);
    }
}
