//! # sackbut_midi
//!
//! Everything between a [`sackbut_engine::Event`] and the outside world:
//!
//! * [`encode`]: the three MIDI bytes for an event,
//! * [`render`]: a one-line debug rendering (`ON 60`, `BEND 8191`, …),
//! * [`Transport`]: the output capability, with a real-time `midir`
//!   backend, a debug text backend and a null backend.
//!
//! The transport is chosen once at startup; the engine never knows which one
//! it is talking to.
//!
//! ## Quick start
//!
//! ```rust
//! use sackbut_engine::Event;
//! use sackbut_midi::{encode, render};
//! use sackbut_engine::ControllerNumbers;
//!
//! let ev = Event::note_on(60, 0);
//! assert_eq!(encode(&ev), [0x90, 60, 127]);
//! assert_eq!(render(&ev, &ControllerNumbers::default()), "ON 60");
//! ```

use std::io::Write;

use sackbut_engine::{ControllerNumbers, Event};

// ════════════════════════════════════════════════════════════════════════════
// Wire encoding
// ════════════════════════════════════════════════════════════════════════════

const NOTE_OFF:       u8 = 0x80;
const NOTE_ON:        u8 = 0x90;
const CONTROL_CHANGE: u8 = 0xB0;
const PITCH_BEND:     u8 = 0xE0;

/// Velocity sent with a meta command.
pub const META_VELOCITY: u8 = 127;

/// Encode one event as a channel-voice message.
///
/// Data bytes are masked to 7 bits and channels to 4 bits. A meta command
/// goes out NoteOn-shaped, with the captured chord as the note number.
pub fn encode(event: &Event) -> [u8; 3] {
    match *event {
        Event::NoteOn { note, velocity, channel } =>
            [NOTE_ON | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
        Event::NoteOff { note, velocity, channel } =>
            [NOTE_OFF | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
        Event::PitchBend { value, channel } => {
            let value = value.min(0x3FFF);
            [
                PITCH_BEND | (channel & 0x0F),
                (value & 0x7F) as u8,
                ((value >> 7) & 0x7F) as u8,
            ]
        }
        Event::ControlChange { controller, value, channel } =>
            [CONTROL_CHANGE | (channel & 0x0F), controller & 0x7F, value & 0x7F],
        Event::Meta { value, channel } =>
            [NOTE_ON | (channel & 0x0F), value & 0x7F, META_VELOCITY],
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Debug rendering
// ════════════════════════════════════════════════════════════════════════════

/// Render an event as a short text line for the debug transport.
///
/// Breath, X and Y controllers get their own tags; any other controller is
/// rendered generically.
pub fn render(event: &Event, controllers: &ControllerNumbers) -> String {
    match *event {
        Event::NoteOn  { note, .. }      => format!("ON {}", note),
        Event::NoteOff { note, .. }      => format!("OFF {}", note),
        Event::PitchBend { value, .. }   => format!("BEND {}", value),
        Event::ControlChange { controller, value, .. } => {
            if controller == controllers.breath {
                format!("BC {}", value)
            } else if controller == controllers.x {
                format!("X {}", value)
            } else if controller == controllers.y {
                format!("Y {}", value)
            } else {
                format!("CC {} {}", controller, value)
            }
        }
        Event::Meta { value, .. }        => format!("META {:X}", value),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Transport: abstraction over midir / debug text / null
// ════════════════════════════════════════════════════════════════════════════

/// Where engine events go.
///
/// Sending never fails from the caller's point of view; backends log and drop
/// what they cannot deliver.
pub trait Transport {
    fn send(&mut self, event: &Event);

    fn send_all(&mut self, events: &[Event]) {
        for ev in events {
            self.send(ev);
        }
    }

    /// Short description for the startup log.
    fn describe(&self) -> String;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, event: &Event) {
        (**self).send(event)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

// ── midir backend ─────────────────────────────────────────────────────────

pub struct MidirTransport {
    conn: midir::MidiOutputConnection,
    port: String,
}

impl Transport for MidirTransport {
    fn send(&mut self, event: &Event) {
        if let Err(e) = self.conn.send(&encode(event)) {
            log::warn!(target: "midi", "send to {} failed: {}", self.port, e);
        }
    }

    fn describe(&self) -> String {
        format!("MIDI port \"{}\"", self.port)
    }
}

// ── debug text backend ────────────────────────────────────────────────────

/// Writes one rendered line per event.
pub struct DebugTransport<W: Write> {
    out:         W,
    controllers: ControllerNumbers,
}

impl<W: Write> DebugTransport<W> {
    pub fn new(out: W, controllers: ControllerNumbers) -> Self {
        DebugTransport { out, controllers }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Transport for DebugTransport<W> {
    fn send(&mut self, event: &Event) {
        let line = render(event, &self.controllers);
        if let Err(e) = writeln!(self.out, "{}", line) {
            log::warn!(target: "midi", "debug output failed: {}", e);
        }
    }

    fn describe(&self) -> String {
        "debug text".to_string()
    }
}

// ── null backend (used when no MIDI port is available) ────────────────────

pub struct NullTransport;

impl Transport for NullTransport {
    fn send(&mut self, _event: &Event) {}

    fn describe(&self) -> String {
        "null output".to_string()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Port discovery
// ════════════════════════════════════════════════════════════════════════════

/// Names of the MIDI output ports currently visible.
pub fn output_port_names(client_name: &str) -> Result<Vec<String>, String> {
    let midi_out = midir::MidiOutput::new(client_name).map_err(|e| e.to_string())?;
    Ok(midi_out
        .ports()
        .iter()
        .map(|p| midi_out.port_name(p).unwrap_or_else(|_| "Unknown".to_string()))
        .collect())
}

/// Index of the port to use: the first whose name contains `hint`
/// (case-insensitive), otherwise the first port.
pub fn pick_port(names: &[String], hint: Option<&str>) -> Option<usize> {
    if names.is_empty() {
        return None;
    }
    let Some(hint) = hint.map(str::to_lowercase) else { return Some(0) };
    let found = names.iter().position(|n| n.to_lowercase().contains(&hint));
    if found.is_none() {
        log::warn!(target: "midi", "no MIDI port matches \"{}\", using \"{}\"", hint, names[0]);
    }
    Some(found.unwrap_or(0))
}

/// Open a MIDI output port, falling back to [`NullTransport`] with a warning
/// if none can be opened.
pub fn open_midi_output(client_name: &str, port_hint: Option<&str>) -> Box<dyn Transport> {
    let midi_out = match midir::MidiOutput::new(client_name) {
        Ok(m)  => m,
        Err(e) => {
            log::warn!(target: "midi", "MIDI init error: {}, using null output", e);
            return Box::new(NullTransport);
        }
    };

    let ports = midi_out.ports();
    let names: Vec<String> = ports.iter()
        .map(|p| midi_out.port_name(p).unwrap_or_else(|_| "Unknown".to_string()))
        .collect();

    let Some(idx) = pick_port(&names, port_hint) else {
        log::warn!(target: "midi", "no MIDI output ports found, using null output");
        log::warn!(target: "midi", "start a synthesiser such as `fluidsynth` or `timidity -iA`");
        return Box::new(NullTransport);
    };

    let name = names[idx].clone();
    log::info!(target: "midi", "opening MIDI port: {}", name);

    match midi_out.connect(&ports[idx], "sackbut-out") {
        Ok(conn) => Box::new(MidirTransport { conn, port: name }),
        Err(e) => {
            log::warn!(target: "midi", "failed to connect to {}: {}, using null output", name, e);
            Box::new(NullTransport)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
