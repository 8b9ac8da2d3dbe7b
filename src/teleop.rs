// Controller events -> commanded body velocity
//
// A: reset the speed scale, X: halve it, Y: double it. Buttons act on the
// rising edge only, so holding one down changes the scale once.

use tracing::{debug, info, warn};

use crate::messages::{AXIS_FULL_SCALE, Buttons, ControllerEvent};
use crate::motor::CommandedVelocity;

/// Scale above which a warning is logged, as a multiple of the default
const SCALE_WARN_FACTOR: f32 = 8.0;

/// Range mapped from full-scale controller input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedScale {
    pub max_speed: f32,    // m/s
    pub max_rotation: f32, // rad/s
}

impl SpeedScale {
    fn scaled(self, factor: f32) -> Self {
        Self {
            max_speed: self.max_speed * factor,
            max_rotation: self.max_rotation * factor,
        }
    }
}

/// Scale change requested by a button press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleAction {
    Reset,
    Halve,
    Double,
}

/// Commanded state owned by the runtime: written by events, read by the tick
#[derive(Debug, Clone)]
pub struct TeleopState {
    default_scale: SpeedScale,
    scale: SpeedScale,
    velocity: CommandedVelocity,
    prev_buttons: Buttons,
}

impl TeleopState {
    pub fn new(default_scale: SpeedScale) -> Self {
        Self {
            default_scale,
            scale: default_scale,
            velocity: CommandedVelocity::default(),
            prev_buttons: Buttons::default(),
        }
    }

    /// Process incoming controller event
    pub fn on_event(&mut self, event: &ControllerEvent) {
        if !event.is_input() {
            return;
        }

        for action in rising_edges(&self.prev_buttons, &event.button) {
            self.apply(action);
        }
        self.prev_buttons = event.button;

        let x = event.joystick.x as f32 / AXIS_FULL_SCALE;
        let y = event.joystick.y as f32 / AXIS_FULL_SCALE;
        let turn = event.mouse.x as f32 / AXIS_FULL_SCALE;

        // Pointer right turns clockwise
        self.velocity = CommandedVelocity {
            x_speed: x * self.scale.max_speed,
            y_speed: y * self.scale.max_speed,
            rotation: -turn * self.scale.max_rotation,
        };
    }

    fn apply(&mut self, action: ScaleAction) {
        self.scale = match action {
            ScaleAction::Reset => self.default_scale,
            ScaleAction::Halve => self.scale.scaled(0.5),
            ScaleAction::Double => self.scale.scaled(2.0),
        };
        info!(
            "{:?}: max_speed={} m/s, max_rotation={} rad/s",
            action, self.scale.max_speed, self.scale.max_rotation
        );

        // Presses compound without limit
        if self.scale.max_speed > self.default_scale.max_speed * SCALE_WARN_FACTOR {
            warn!(
                "Speed scale is {}x the default, robot may move dangerously fast",
                self.scale.max_speed / self.default_scale.max_speed
            );
        }
    }

    /// Current body velocity command
    pub fn commanded(&self) -> CommandedVelocity {
        self.velocity
    }

    pub fn scale(&self) -> SpeedScale {
        self.scale
    }
}

/// Scale actions for buttons that went from released to pressed
fn rising_edges(prev: &Buttons, current: &Buttons) -> Vec<ScaleAction> {
    let mut actions = Vec::new();
    if !prev.a && current.a {
        actions.push(ScaleAction::Reset);
    }
    if !prev.x && current.x {
        actions.push(ScaleAction::Halve);
    }
    if !prev.y && current.y {
        actions.push(ScaleAction::Double);
    }
    if !actions.is_empty() {
        debug!("Button edges: {:?}", actions);
    }
    actions
}
