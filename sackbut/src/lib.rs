//! # sackbut
//!
//! The breath-and-slide controller as a program: configuration, acquisition,
//! the fixed-period driver and a simulator panel standing in for the
//! instrument.
//!
//! ## Simulation controls
//!
//! | Input | Instrument |
//! |---|---|
//! | `J` `K` `L` `;` (hold) | Overtone switches 0–3 |
//! | `B` (hold) | Blow; pressure ramps up while held |
//! | Mouse drag on the slide strip | Slide |
//! | Arrow keys (hold) | X / Y sensors |
//! | `Space` (hold) | Meta switch |
//! | `Backspace` (hold) | Panic switch |
//! | `Tab` | Toggle slide quantization |
//! | `Q` | Quit |

pub mod config;
pub mod input;
pub mod visualizer;
pub mod app;
