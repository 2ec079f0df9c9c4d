//! Software-rendered simulator panel using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────┬──────────────┐
//! │  [J][K][L][;]   META  PANIC   QUANT o            │  EVENTS      │
//! │                                                  │              │
//! │  NOTE 60                                         │  BC 80       │
//! │                                                  │  BEND 8191   │
//! │  SLIDE [====|====|====|====|====|====|======]    │  ON 60       │
//! │  BREATH [=======:=========]                      │  ...         │
//! │  X [=====]    Y [=====]                          │              │
//! │  key legend                                      │              │
//! └──────────────────────────────────────────────────┴──────────────┘
//! ```
//!
//! The mouse on the slide strip plays the slide; keys are translated to
//! [`SimInput`] events and sent to the [`SimPanel`](crate::input::SimPanel).

use std::sync::mpsc::Sender;

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use sackbut_engine::slide::{SlidePosition, POSITIONS};
use sackbut_engine::{CycleInputs, SlideConfig};

use crate::input::{SimInput, SimKey, RAW_MAX};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:     usize = 900;
pub const WIN_H:     usize = 360;
const LOG_W:         usize = 200;
const PANEL_W:       usize = WIN_W - LOG_W;
const MARGIN:        usize = 20;
const SWITCH_Y:      usize = 20;
const SWITCH_SIZE:   usize = 36;
const NOTE_Y:        usize = 80;
const SLIDE_X:       usize = 80;
const SLIDE_Y:       usize = 150;
const SLIDE_W:       usize = PANEL_W - SLIDE_X - MARGIN;
const SLIDE_H:       usize = 40;
const BAR_X:         usize = 80;
const BAR_H:         usize = 14;
const BREATH_Y:      usize = 220;
const AXIS_Y:        usize = 250;
const AXIS_W:        usize = 240;
const LEGEND_Y:      usize = WIN_H - 20;
const BG_COLOR:      u32   = 0xFF1A1A2E;
const LOG_BG:        u32   = 0xFF16213E;
const OFF_COLOR:     u32   = 0xFF0F3460;
const ON_COLOR:      u32   = 0xFFFFD700;  // gold
const PANIC_COLOR:   u32   = 0xFFE94560;
const TEXT_COLOR:    u32   = 0xFFEEEEEE;
const DIM_COLOR:     u32   = 0xFF888888;

/// Switch keys in switch order.
const SWITCH_KEYS: [(Key, char); 4] = [
    (Key::J, 'J'), (Key::K, 'K'), (Key::L, 'L'), (Key::Semicolon, ';'),
];

/// Keys that are held, with the control they stand for.
const HELD_KEYS: [(Key, SimKey); 7] = [
    (Key::Space,     SimKey::Meta),
    (Key::Backspace, SimKey::Panic),
    (Key::B,         SimKey::Blow),
    (Key::Left,      SimKey::XDown),
    (Key::Right,     SimKey::XUp),
    (Key::Down,      SimKey::YDown),
    (Key::Up,        SimKey::YUp),
];

// ════════════════════════════════════════════════════════════════════════════
// PanelView: one frame's worth of state to draw
// ════════════════════════════════════════════════════════════════════════════

pub struct PanelView<'a> {
    pub inputs:    &'a CycleInputs,
    pub note:      Option<u8>,
    pub quantize:  bool,
    /// Chord captured by the meta latch while its switch is held.
    pub meta_value: Option<u8>,
    pub slide:     &'a SlideConfig,
    pub threshold: u16,
    /// Most recent rendered events, oldest first.
    pub recent:    &'a [String],
    pub status:    &'a str,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:   Window,
    buf:      Vec<u32>,
    sim_tx:   Sender<SimInput>,
    touching: bool,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>) -> Result<Self, String> {
        let window = Window::new(
            "Sackbut: breath & slide controller",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| e.to_string())?;

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
            touching: false,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse and translate to SimInput events.
    /// Returns false once the player has asked to quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        let pressed  = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let released = |k: Key| self.window.is_key_released(k);

        let mut inputs = Vec::new();

        if pressed(Key::Q) {
            inputs.push(SimInput::KeyDown(SimKey::Quit));
        }
        if pressed(Key::Tab) {
            inputs.push(SimInput::KeyDown(SimKey::Quantize));
        }
        for (i, &(key, _)) in SWITCH_KEYS.iter().enumerate() {
            if pressed(key)  { inputs.push(SimInput::KeyDown(SimKey::Switch(i as u8))); }
            if released(key) { inputs.push(SimInput::KeyUp(SimKey::Switch(i as u8))); }
        }
        for &(key, sim) in HELD_KEYS.iter() {
            if pressed(key)  { inputs.push(SimInput::KeyDown(sim)); }
            if released(key) { inputs.push(SimInput::KeyUp(sim)); }
        }

        // ── slide strip under the mouse ──────────────────────────────────
        let down = self.window.get_mouse_down(MouseButton::Left);
        let over = self.window.get_mouse_pos(MouseMode::Discard)
            .and_then(|(mx, my)| slide_reading(mx, my));
        match (down, over) {
            (true, Some(raw)) => {
                self.touching = true;
                inputs.push(SimInput::Slide(Some(raw)));
            }
            _ if self.touching => {
                self.touching = false;
                inputs.push(SimInput::Slide(None));
            }
            _ => {}
        }

        let quit = inputs.contains(&SimInput::KeyDown(SimKey::Quit));
        for input in inputs {
            if self.sim_tx.send(input).is_err() { return false; }
        }
        !quit
    }

    /// Render one frame.
    pub fn render(&mut self, view: &PanelView) {
        self.buf.fill(BG_COLOR);

        // ── Event log background ──────────────────────────────────────────
        self.fill_rect(PANEL_W, 0, LOG_W, WIN_H, LOG_BG);

        self.draw_switches(view);
        self.draw_note(view);
        self.draw_slide(view);

        // ── Breath / X / Y bars ───────────────────────────────────────────
        self.draw_label("BREATH", MARGIN, BREATH_Y + 4, TEXT_COLOR, 1);
        self.draw_bar(BAR_X, BREATH_Y, SLIDE_W, view.inputs.raw_breath, ON_COLOR);
        let tx = BAR_X + scale(view.threshold, SLIDE_W);
        self.fill_rect(tx, BREATH_Y - 3, 2, BAR_H + 6, PANIC_COLOR);

        self.draw_label("X", MARGIN, AXIS_Y + 4, TEXT_COLOR, 1);
        self.draw_bar(BAR_X, AXIS_Y, AXIS_W, view.inputs.raw_x, 0xFFAADDFF);
        let y_x = BAR_X + AXIS_W + 60;
        self.draw_label("Y", y_x - 20, AXIS_Y + 4, TEXT_COLOR, 1);
        self.draw_bar(y_x, AXIS_Y, AXIS_W, view.inputs.raw_y, 0xFFFFBBAA);

        self.draw_log(view.recent);

        // ── Status + key legend ───────────────────────────────────────────
        self.draw_label(view.status, MARGIN, LEGEND_Y - 20, DIM_COLOR, 1);
        self.draw_label(
            "J K L ;=switches  B=blow  mouse=slide  arrows=x/y  space=meta  bksp=panic  tab=quant  Q=quit",
            MARGIN, LEGEND_Y, DIM_COLOR, 1,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Switch row ────────────────────────────────────────────────────────

    fn draw_switches(&mut self, view: &PanelView) {
        for (i, &(_, label)) in SWITCH_KEYS.iter().enumerate() {
            let x  = MARGIN + i * (SWITCH_SIZE + 8);
            let on = view.inputs.chord & (1 << i) != 0;
            self.fill_rect(x, SWITCH_Y, SWITCH_SIZE, SWITCH_SIZE, if on { ON_COLOR } else { OFF_COLOR });
            self.draw_border(x, SWITCH_Y, SWITCH_SIZE, SWITCH_SIZE, 0xFF000000);
            self.draw_label(&label.to_string(), x + SWITCH_SIZE / 2 - 3, SWITCH_Y + 14, 0xFF000000, 2);
        }

        let mut x = MARGIN + 4 * (SWITCH_SIZE + 8) + 20;
        for (label, on, color) in [
            (meta_label(view.meta_value), view.meta_value.is_some(), ON_COLOR),
            ("PANIC".to_string(),         view.inputs.panic_pressed, PANIC_COLOR),
            ("QUANT".to_string(),         view.quantize,             0xFF4ECCA3),
        ] {
            self.fill_rect(x, SWITCH_Y + 8, 16, 16, if on { color } else { OFF_COLOR });
            self.draw_label(&label, x + 22, SWITCH_Y + 12, TEXT_COLOR, 2);
            x += 120;
        }
    }

    // ── Current note ──────────────────────────────────────────────────────

    fn draw_note(&mut self, view: &PanelView) {
        let text = match view.note {
            Some(n) => format!("NOTE {}", n),
            None    => "NOTE -".to_string(),
        };
        let color = if view.note.is_some() { ON_COLOR } else { DIM_COLOR };
        self.draw_label(&text, MARGIN, NOTE_Y, color, 5);

        let pos = touched_position(view.inputs.raw_slide, view.slide);
        let pos_color = if pos.is_some() { ON_COLOR } else { DIM_COLOR };
        self.draw_label(&position_label(pos), MARGIN + 260, NOTE_Y + 10, pos_color, 3);
    }

    // ── Slide strip with position markers ─────────────────────────────────

    fn draw_slide(&mut self, view: &PanelView) {
        self.draw_label("SLIDE", MARGIN, SLIDE_Y + SLIDE_H / 2 - 2, TEXT_COLOR, 1);
        self.fill_rect(SLIDE_X, SLIDE_Y, SLIDE_W, SLIDE_H, OFF_COLOR);

        // No-touch zone at the far end.
        let ceiling = SLIDE_X + scale(view.slide.no_touch_ceiling, SLIDE_W);
        self.fill_rect(ceiling, SLIDE_Y, SLIDE_X + SLIDE_W - ceiling, SLIDE_H, 0xFF2A2A3E);

        let current = touched_position(view.inputs.raw_slide, view.slide);
        for p in 1..=POSITIONS {
            let raw   = SlidePosition(p).raw(view.slide);
            let x     = SLIDE_X + scale(raw, SLIDE_W);
            let color = if current == Some(SlidePosition(p)) { ON_COLOR } else { DIM_COLOR };
            self.fill_rect(x, SLIDE_Y, 1, SLIDE_H, color);
            self.draw_label(&p.to_string(), x.saturating_sub(1), SLIDE_Y + SLIDE_H + 4, color, 1);
        }

        let raw = view.inputs.raw_slide;
        if raw <= view.slide.no_touch_ceiling {
            let x = SLIDE_X + scale(raw, SLIDE_W);
            self.fill_rect(x.saturating_sub(2), SLIDE_Y - 4, 5, SLIDE_H + 8, ON_COLOR);
        }
        self.draw_border(SLIDE_X, SLIDE_Y, SLIDE_W, SLIDE_H, 0xFF000000);
    }

    // ── Bars ──────────────────────────────────────────────────────────────

    fn draw_bar(&mut self, x: usize, y: usize, w: usize, raw: u16, color: u32) {
        self.fill_rect(x, y, w, BAR_H, OFF_COLOR);
        self.fill_rect(x, y, scale(raw, w), BAR_H, color);
        self.draw_border(x, y, w, BAR_H, 0xFF000000);
    }

    // ── Event log ─────────────────────────────────────────────────────────

    fn draw_log(&mut self, recent: &[String]) {
        self.draw_label("EVENTS", PANEL_W + 10, 10, ON_COLOR, 2);
        let rows = (WIN_H - 40) / 14;
        let skip = recent.len().saturating_sub(rows);
        for (i, line) in recent.iter().skip(skip).enumerate() {
            let age   = recent.len() - skip - 1 - i;
            let color = blend(TEXT_COLOR, LOG_BG, (age as f32 * 0.05).min(0.7));
            self.draw_label(line, PANEL_W + 10, 34 + i * 14, color, 2);
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        for col in x..(x+w).min(WIN_W) {
            if y < WIN_H           { self.buf[y           * WIN_W + col] = color; }
            if y+h-1 < WIN_H       { self.buf[(y+h-1)     * WIN_W + col] = color; }
        }
        for row in y..(y+h).min(WIN_H) {
            if x < WIN_W           { self.buf[row * WIN_W + x    ] = color; }
            if x+w-1 < WIN_W       { self.buf[row * WIN_W + x+w-1] = color; }
        }
    }

    /// 3×5 bitmap text, each pixel drawn as a `px`×`px` square.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32, px: usize) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * px, y + row * px, px, px, color);
                    }
                }
            }
            cx += 4 * px; // 3 wide + 1 gap
            if cx + 4 * px > WIN_W { break; }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Geometry
// ────────────────────────────────────────────────────────────────────────────

/// Pixel offset of a raw 0–1023 reading along a `w`-pixel bar.
fn scale(raw: u16, w: usize) -> usize {
    raw.min(RAW_MAX) as usize * w / (RAW_MAX as usize + 1)
}

/// Raw slide reading under a mouse position, if it is over the strip.
fn slide_reading(mx: f32, my: f32) -> Option<u16> {
    let (mx, my) = (mx as usize, my as usize);
    if mx < SLIDE_X || mx >= SLIDE_X + SLIDE_W || my < SLIDE_Y || my >= SLIDE_Y + SLIDE_H {
        return None;
    }
    Some(((mx - SLIDE_X) * (RAW_MAX as usize + 1) / SLIDE_W) as u16)
}

// ────────────────────────────────────────────────────────────────────────────
// Labels
// ────────────────────────────────────────────────────────────────────────────

/// Slide position nearest the reading, `None` when the slide is not touched.
fn touched_position(raw: u16, cfg: &SlideConfig) -> Option<SlidePosition> {
    SlidePosition::nearest(raw, cfg)
}

fn position_label(pos: Option<SlidePosition>) -> String {
    match pos {
        Some(SlidePosition(n)) => format!("POS {}", n),
        None                   => "POS -".to_string(),
    }
}

fn meta_label(value: Option<u8>) -> String {
    match value {
        Some(v) => format!("META {:X}", v),
        None    => "META".to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        ';' => [0b000, 0b010, 0b000, 0b010, 0b100],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}
