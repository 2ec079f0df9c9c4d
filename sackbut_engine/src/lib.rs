//! # sackbut_engine
//!
//! The control logic of a breath-and-slide performance controller: turns one
//! snapshot of raw gesture readings into a short, ordered list of MIDI-shaped
//! [`Event`]s.
//!
//! ## Gesture → Event mapping
//!
//! | Gesture | Component | Events |
//! |---|---|---|
//! | 4 finger switches (chord) | [`chord`] | selects the overtone for `NoteOn` |
//! | Slide (soft pot) | [`slide`] | `PitchBend`, bending *down* only |
//! | Breath pressure | [`breath`] | CC 2 (breath), and starts/stops the note |
//! | X / Y sensors | [`axis`] | CC 16 / CC 17 |
//! | Thumb (meta) switch | [`meta`] | one `Meta` command on release |
//! | Panic switch | [`panic`] | `NoteOff` for all 128 notes while held |
//!
//! Continuous data passes through the [`gate::ChangeGate`], and the
//! [`machine`] owns the single sounding note.
//!
//! ## Quick start
//!
//! ```rust
//! use std::time::Instant;
//! use sackbut_engine::{Engine, EngineConfig, CycleInputs, Event};
//!
//! let mut engine = Engine::new(EngineConfig::default());
//! let inputs = CycleInputs {
//!     chord:      0b0011,   // overtone 2 → C4
//!     raw_breath: 300,
//!     raw_slide:  144,      // first position
//!     ..CycleInputs::released()
//! };
//! let events = engine.process_cycle(&inputs, Instant::now());
//! assert!(matches!(events.last(), Some(Event::NoteOn { note: 60, .. })));
//! ```

pub mod axis;
pub mod breath;
pub mod chord;
pub mod config;
pub mod cycle;
pub mod event;
pub mod gate;
pub mod machine;
pub mod meta;
pub mod panic;
pub mod range;
pub mod slide;

pub use config::{
    BreathConfig, ChannelConfig, ControllerNumbers, EngineConfig, GateConfig,
    MetaCapture, MetaConfig, SlideConfig,
};
pub use cycle::{process_cycle, CycleInputs, Engine, PerformanceState};
pub use event::Event;
pub use machine::NoteState;
