// Define message types for the runtime

use serde::{Deserialize, Serialize};

/// Full-scale value of the controller's signed axes
pub const AXIS_FULL_SCALE: f32 = 32768.0;

/// Controller state reported with each event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerStatus {
    /// Active control input
    Input,
    /// Controller connected but idle
    #[default]
    Idle,
    /// Anything else the controller reports (battery, pairing, ...)
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Joystick {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Mouse {
    pub x: i32,
}

/// Face buttons, true while held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Buttons {
    #[serde(rename = "A")]
    pub a: bool,
    #[serde(rename = "B")]
    pub b: bool,
    #[serde(rename = "X")]
    pub x: bool,
    #[serde(rename = "Y")]
    pub y: bool,
}

/// One event from the controller driver -> runtime
// Unknown fields are ignored and missing ones default, so partial payloads still parse
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerEvent {
    pub status: ControllerStatus,
    pub joystick: Joystick,
    pub mouse: Mouse,
    pub button: Buttons,
}

impl ControllerEvent {
    /// Whether this event carries active control input
    pub fn is_input(&self) -> bool {
        self.status == ControllerStatus::Input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_event() {
        let json = r#"{
            "status": "input",
            "joystick": {"x": 16384, "y": -32768},
            "mouse": {"x": 100},
            "button": {"A": false, "B": true, "X": true, "Y": false, "LB": true},
            "center": {"STEAM": false}
        }"#;
        let event: ControllerEvent = serde_json::from_str(json).unwrap();
        assert!(event.is_input());
        assert_eq!(event.joystick, Joystick { x: 16384, y: -32768 });
        assert_eq!(event.mouse.x, 100);
        assert!(event.button.b && event.button.x);
        assert!(!event.button.a && !event.button.y);
    }

    #[test]
    fn test_parse_partial_and_unknown_status() {
        let event: ControllerEvent = serde_json::from_str(r#"{"status": "battery"}"#).unwrap();
        assert_eq!(event.status, ControllerStatus::Other);
        assert!(!event.is_input());
        assert_eq!(event.joystick, Joystick::default());
    }
}
