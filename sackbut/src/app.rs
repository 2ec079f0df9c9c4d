//! The fixed-period driver.
//!
//! [`Controller`] owns the input source, the engine and the transport, and
//! performs one cycle at a time: sample → process → send. [`run`] wires it to
//! the simulator window and paces it at the configured period.

use std::collections::VecDeque;
use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use sackbut_engine::panic::NOTE_COUNT;
use sackbut_engine::{CycleInputs, Engine, Event};
use sackbut_midi::{
    open_midi_output, output_port_names, render, DebugTransport, NullTransport, Transport,
};

use crate::config::{Config, TransportKind};
use crate::input::{InputSource, SimPanel};
use crate::visualizer::{PanelView, Visualizer};

/// Rendered events kept for the panel.
const RECENT_MAX: usize = 64;

// ════════════════════════════════════════════════════════════════════════════
// Controller
// ════════════════════════════════════════════════════════════════════════════

pub struct Controller<S: InputSource, T: Transport> {
    source:    S,
    engine:    Engine,
    transport: T,
    last:      CycleInputs,
    recent:    VecDeque<String>,
    cycles:    u64,
}

impl<S: InputSource, T: Transport> Controller<S, T> {
    pub fn new(source: S, engine: Engine, transport: T) -> Self {
        Controller {
            source,
            engine,
            transport,
            last:   CycleInputs::released(),
            recent: VecDeque::with_capacity(RECENT_MAX),
            cycles: 0,
        }
    }

    /// Run one control cycle at `now`. Returns false once the source has
    /// ended the session.
    pub fn cycle(&mut self, now: Instant) -> bool {
        let Some(sample) = self.source.sample() else {
            log::info!(target: "controller", "input closed after {} cycles", self.cycles);
            return false;
        };

        if sample.toggle_quantize {
            let on = !self.engine.quantize();
            self.engine.set_quantize(on);
        }

        let inputs = sample.levels.readings();
        let events = self.engine.process_cycle(&inputs, now);
        self.transport.send_all(&events);
        self.remember(&inputs, &events);

        self.last    = inputs;
        self.cycles += 1;
        true
    }

    /// Release whatever note the engine believes is sounding.
    pub fn finish(&mut self) {
        if let Some(note) = self.engine.state().current_note() {
            let channel = self.engine.config().channels.performance;
            log::info!(target: "controller", "releasing note {} on exit", note);
            self.transport.send(&Event::note_off(note, channel));
        }
    }

    fn remember(&mut self, inputs: &CycleInputs, events: &[Event]) {
        let controllers = self.engine.config().controllers;
        // A held panic switch would flood the log with 128 lines a cycle.
        let skip = if inputs.panic_pressed {
            self.recent.push_back("ALL OFF".to_string());
            NOTE_COUNT as usize
        } else {
            0
        };
        for ev in events.iter().skip(skip) {
            self.recent.push_back(render(ev, &controllers));
        }
        while self.recent.len() > RECENT_MAX {
            self.recent.pop_front();
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn engine(&self)      -> &Engine      { &self.engine }
    pub fn last_inputs(&self) -> &CycleInputs { &self.last }
    pub fn cycles(&self)      -> u64          { self.cycles }

    pub fn recent(&mut self) -> &[String] {
        self.recent.make_contiguous()
    }

    #[cfg(test)]
    fn transport(&self) -> &T { &self.transport }
}

// ════════════════════════════════════════════════════════════════════════════
// Transport selection
// ════════════════════════════════════════════════════════════════════════════

/// Open the configured transport; `force_debug` overrides the file.
pub fn open_transport(cfg: &Config, force_debug: bool) -> Box<dyn Transport> {
    let kind = if force_debug { TransportKind::Debug } else { cfg.output.transport };
    match kind {
        TransportKind::Midi  => open_midi_output(&cfg.output.client_name, cfg.port_hint()),
        TransportKind::Debug => Box::new(DebugTransport::new(io::stdout(), cfg.engine.controllers)),
        TransportKind::Null  => Box::new(NullTransport),
    }
}

/// Print the visible MIDI output ports.
pub fn list_ports(cfg: &Config) -> Result<(), String> {
    let names = output_port_names(&cfg.output.client_name)?;
    if names.is_empty() {
        println!("  (no MIDI output ports)");
    }
    for (i, name) in names.iter().enumerate() {
        println!("  {:>2}: {}", i, name);
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the controller with the simulator panel until the window closes or
/// the player quits.
pub fn run(cfg: &Config, force_debug: bool) -> Result<(), String> {
    let transport = open_transport(cfg, force_debug);
    let status = format!("output: {}", transport.describe());
    log::info!(target: "controller", "{}", status);

    // ── Sim input channel ─────────────────────────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel();
    let mut vis = Visualizer::new(sim_tx)?;

    let mut ctl = Controller::new(
        SimPanel::new(sim_rx),
        Engine::new(cfg.engine.clone()),
        transport,
    );

    let period = cfg.cycle_period();
    log::info!(target: "controller", "cycle period {:?}", period);
    let mut deadline = Instant::now();

    while vis.is_open() {
        if !vis.poll_input() { break; }
        if !ctl.cycle(Instant::now()) { break; }

        let inputs    = *ctl.last_inputs();
        let note      = ctl.engine().state().current_note();
        let quantize  = ctl.engine().quantize();
        let meta      = ctl.engine().state().meta;
        let meta_value = meta.is_held().then(|| meta.value());
        let engine_cfg = ctl.engine().config().clone();
        let view = PanelView {
            inputs:    &inputs,
            note,
            quantize,
            meta_value,
            slide:     &engine_cfg.slide,
            threshold: engine_cfg.breath.threshold,
            recent:    ctl.recent(),
            status:    &status,
        };
        vis.render(&view);

        // ── Pace to the cycle period ──────────────────────────────────────
        deadline += period;
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        } else {
            if now - deadline > period {
                log::debug!(target: "controller", "cycle overran by {:?}", now - deadline);
            }
            deadline = now;
        }
    }

    ctl.finish();
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
