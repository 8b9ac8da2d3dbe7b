// Keyboard teleop: WASD move, Z/X rotate, 1/2/3 = A/X/Y buttons, Q quit
//
// Synthesizes controller events from key presses. Terminals only report
// presses, so buttons are released in a follow-up event and movement decays
// to zero when no movement key arrives for a while.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{error, info};

use super::InputError;
use crate::messages::{Buttons, ControllerEvent, ControllerStatus, Joystick, Mouse};

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const INPUT_TIMEOUT: Duration = Duration::from_millis(100); // Reset axes after this much time with no input

/// Axis values for a fully deflected stick
const AXIS_MAX: i32 = 32767;
const AXIS_MIN: i32 = -32768;

/// What a key press means for the feed
#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    /// Events to forward, in order
    Emit(Vec<ControllerEvent>),
    Quit,
    Ignore,
}

/// Persistent stick state between key presses
#[derive(Debug)]
pub struct KeyboardTeleop {
    joystick: Joystick,
    mouse: Mouse,
    last_movement_input: Instant,
}

impl Default for KeyboardTeleop {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardTeleop {
    pub fn new() -> Self {
        Self {
            joystick: Joystick::default(),
            mouse: Mouse::default(),
            last_movement_input: Instant::now(),
        }
    }

    fn event(&self, button: Buttons) -> ControllerEvent {
        ControllerEvent {
            status: ControllerStatus::Input,
            joystick: self.joystick,
            mouse: self.mouse,
            button,
        }
    }

    /// Map one key press to controller events
    pub fn on_key(&mut self, code: KeyCode, modifiers: KeyModifiers, now: Instant) -> KeyAction {
        if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        let mut press = Buttons::default();
        match code {
            // Movement
            KeyCode::Char('w') => self.joystick.x = AXIS_MAX,
            KeyCode::Char('s') => self.joystick.x = AXIS_MIN,
            KeyCode::Char('a') => self.joystick.y = AXIS_MAX,
            KeyCode::Char('d') => self.joystick.y = AXIS_MIN,

            // Rotation (pointer left turns counter-clockwise)
            KeyCode::Char('z') => self.mouse.x = AXIS_MIN,
            KeyCode::Char('x') => self.mouse.x = AXIS_MAX,

            // Speed scale buttons
            KeyCode::Char('1') => press.a = true,
            KeyCode::Char('2') => press.x = true,
            KeyCode::Char('3') => press.y = true,

            KeyCode::Char('q') | KeyCode::Esc => return KeyAction::Quit,
            _ => return KeyAction::Ignore,
        }

        if press == Buttons::default() {
            self.last_movement_input = now;
            KeyAction::Emit(vec![self.event(press)])
        } else {
            KeyAction::Emit(vec![self.event(press), self.event(Buttons::default())])
        }
    }

    /// Zero the axes once movement input has gone quiet
    pub fn on_idle(&mut self, now: Instant) -> Option<ControllerEvent> {
        let moving = self.joystick != Joystick::default() || self.mouse != Mouse::default();
        if moving && now.duration_since(self.last_movement_input) > INPUT_TIMEOUT {
            self.joystick = Joystick::default();
            self.mouse = Mouse::default();
            return Some(self.event(Buttons::default()));
        }
        None
    }
}

/// Raw terminal mode, restored when dropped
#[derive(Debug)]
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn enable() -> std::io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            error!("Failed to restore terminal: {}", e);
        }
    }
}

/// Start reading the terminal on its own thread
///
/// The terminal stays raw until the returned guard is dropped, however the runtime exits.
pub fn spawn(tx: mpsc::Sender<ControllerEvent>) -> Result<RawModeGuard, InputError> {
    let guard = RawModeGuard::enable()?;
    std::thread::Builder::new()
        .name("keyboard-teleop".into())
        .spawn(move || {
            if let Err(e) = run(&tx) {
                error!("Keyboard input failed: {}", e);
            }
            // Dropping tx closes the feed, which the runtime treats as an exit request
        })?;
    Ok(guard)
}

fn run(tx: &mpsc::Sender<ControllerEvent>) -> std::io::Result<()> {
    let mut teleop = KeyboardTeleop::new();

    loop {
        let mut pending = Vec::new();

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            {
                if kind == KeyEventKind::Press || kind == KeyEventKind::Repeat {
                    match teleop.on_key(code, modifiers, Instant::now()) {
                        KeyAction::Emit(events) => pending = events,
                        KeyAction::Quit => {
                            info!("Quit requested from keyboard");
                            return Ok(());
                        }
                        KeyAction::Ignore => {}
                    }
                }
            }
        } else if let Some(event) = teleop.on_idle(Instant::now()) {
            pending.push(event);
        }

        for event in pending {
            if tx.blocking_send(event).is_err() {
                return Ok(());
            }
        }
    }
}
