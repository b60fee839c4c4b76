//! Translates crossterm terminal events into keyer events.

use std::time::Instant;

use anyhow::Result;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use cwterm::{EventSource, KeyerEvent};

/// Which device drives the straight key after mode resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyingDevice {
    Mouse,
    SpaceBar,
}

impl KeyingDevice {
    pub fn label(self) -> &'static str {
        match self {
            KeyingDevice::Mouse => "mouse button",
            KeyingDevice::SpaceBar => "space bar",
        }
    }
}

/// Blocking reader over the terminal's event stream.
pub struct TerminalSource {
    device: KeyingDevice,
}

impl TerminalSource {
    pub fn new(device: KeyingDevice) -> Self {
        Self { device }
    }
}

impl EventSource for TerminalSource {
    fn next_event(&mut self) -> Result<KeyerEvent> {
        loop {
            let event = crossterm::event::read()?;
            if let Some(mapped) = map_event(&event, self.device, Instant::now()) {
                return Ok(mapped);
            }
        }
    }
}

/// Map one terminal event, or `None` when it is not ours.
fn map_event(event: &Event, device: KeyingDevice, at: Instant) -> Option<KeyerEvent> {
    match event {
        Event::Key(key) => map_key_event(key, device, at),
        Event::Mouse(mouse) if device == KeyingDevice::Mouse => map_mouse_event(mouse, at),
        _ => None,
    }
}

fn map_key_event(key: &KeyEvent, device: KeyingDevice, at: Instant) -> Option<KeyerEvent> {
    // Ctrl+C must win over the plain 'c' decode binding.
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') if key.kind != KeyEventKind::Release => Some(KeyerEvent::Quit),
            _ => None,
        };
    }
    match (key.code, key.kind) {
        (KeyCode::Char(' '), KeyEventKind::Press) if device == KeyingDevice::SpaceBar => {
            Some(KeyerEvent::Down(at))
        }
        (KeyCode::Char(' '), KeyEventKind::Release) if device == KeyingDevice::SpaceBar => {
            Some(KeyerEvent::Up(at))
        }
        (KeyCode::Char('c'), KeyEventKind::Press) => Some(KeyerEvent::Decode),
        (KeyCode::Char('q'), KeyEventKind::Press) | (KeyCode::Esc, KeyEventKind::Press) => {
            Some(KeyerEvent::Quit)
        }
        _ => None,
    }
}

fn map_mouse_event(mouse: &MouseEvent, at: Instant) -> Option<KeyerEvent> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(KeyerEvent::Down(at)),
        MouseEventKind::Up(MouseButton::Left) => Some(KeyerEvent::Up(at)),
        _ => None,
    }
}
