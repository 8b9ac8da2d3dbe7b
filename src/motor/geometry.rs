// Robot geometry for the three-wheel omni base
// Holds the physical constants and the derived metric -> controller unit scale.

use std::f32::consts::PI;

/// Default physical constants for the base
pub const ROBOT_RADIUS: f32 = 0.1; // meters
pub const WHEEL_RADIUS: f32 = 0.025; // meters
pub const WHEEL_FROM_CENTER: f32 = 0.1; // meters (distance from center to wheel)

/// Wheel mounting angles (degrees), in wheel index order
pub const WHEEL_ANGLES_DEG: [f32; 3] = [240.0, 120.0, 0.0];

/// Encoder counts per motor revolution
pub const ENCODER_CPR: f32 = 64.0;
/// Gearbox reduction between motor and wheel
pub const GEARBOX_REDUCTION: f32 = 18.75;
/// Motor controller PID loop frequency (Hz)
pub const CONTROL_FREQUENCY: f32 = 100.0;

/// Static description of the base. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotGeometry {
    pub robot_radius: f32,
    pub wheel_radius: f32,
    pub wheel_from_center: f32,
    pub wheel_angles_deg: [f32; 3],
    pub encoder_cpr: f32,
    pub gearbox_reduction: f32,
    pub control_frequency: f32,
    metric_to_robot: f32,
}

impl RobotGeometry {
    /// Build a geometry and derive the metric -> controller scale
    ///
    /// A non-positive wheel radius or control frequency gives a scale of zero,
    /// so every command collapses to zero instead of dividing by zero.
    pub fn new(
        robot_radius: f32,
        wheel_radius: f32,
        wheel_from_center: f32,
        wheel_angles_deg: [f32; 3],
        encoder_cpr: f32,
        gearbox_reduction: f32,
        control_frequency: f32,
    ) -> Self {
        let wheel_circumference = wheel_radius * 2.0 * PI;
        let metric_to_robot = if wheel_circumference > 0.0 && control_frequency > 0.0 {
            let counts_per_revolution = encoder_cpr * gearbox_reduction;
            let counts_per_period = counts_per_revolution / control_frequency;
            counts_per_period / wheel_circumference
        } else {
            0.0
        };

        Self {
            robot_radius,
            wheel_radius,
            wheel_from_center,
            wheel_angles_deg,
            encoder_cpr,
            gearbox_reduction,
            control_frequency,
            metric_to_robot,
        }
    }

    /// Geometry with an explicit scale factor, bypassing the derivation.
    /// Useful for checking the kinematics in metric units (`metric_to_robot = 1`).
    pub fn with_metric_to_robot(mut self, metric_to_robot: f32) -> Self {
        self.metric_to_robot = metric_to_robot;
        self
    }

    /// Controller speed units per m/s
    pub fn metric_to_robot(&self) -> f32 {
        self.metric_to_robot
    }

    /// Wheel mounting angles in radians
    pub fn wheel_angles_rad(&self) -> [f32; 3] {
        self.wheel_angles_deg.map(|deg| deg / 180.0 * PI)
    }

    /// Convert m/s to controller speed units
    pub fn speed_metric_to_robot(&self, meters_per_second: f32) -> f32 {
        meters_per_second * self.metric_to_robot
    }

    /// Convert controller speed units back to m/s (0 when the scale is degenerate)
    pub fn speed_robot_to_metric(&self, wheel_speed: f32) -> f32 {
        if self.metric_to_robot == 0.0 {
            return 0.0;
        }
        wheel_speed / self.metric_to_robot
    }

    /// Linear speed at the wheel circle produced by an angular rate (rad/s -> m/s)
    pub fn rotation_to_metric(&self, radians_per_second: f32) -> f32 {
        radians_per_second * self.wheel_from_center
    }
}

impl Default for RobotGeometry {
    fn default() -> Self {
        Self::new(
            ROBOT_RADIUS,
            WHEEL_RADIUS,
            WHEEL_FROM_CENTER,
            WHEEL_ANGLES_DEG,
            ENCODER_CPR,
            GEARBOX_REDUCTION,
            CONTROL_FREQUENCY,
        )
    }
}
