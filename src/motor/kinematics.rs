// Omniwheel inverse kinematics for the three-wheel base
// Converts body-frame velocities (x, y, rotation) to individual wheel speeds.

use super::geometry::RobotGeometry;

/// Wheel speed commands for the three motors, in controller units.
/// Real-valued; rounding and clamping happen in the framer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelSpeeds(pub [f32; 3]);

impl WheelSpeeds {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Returns speeds as array, wheel index order
    pub fn as_array(&self) -> [f32; 3] {
        self.0
    }
}

/// Project a translation onto each wheel's rolling direction (m/s, before unit conversion)
///
/// # Arguments
/// * `x_speed` - Velocity along body x in m/s
/// * `y_speed` - Velocity along body y in m/s
pub fn wheel_linear_speeds(x_speed: f32, y_speed: f32, geometry: &RobotGeometry) -> [f32; 3] {
    // Polar form of the translation vector. atan2(0, 0) is 0, and the speed is 0 there anyway.
    let speed = x_speed.hypot(y_speed);
    let angle = y_speed.atan2(x_speed);

    geometry
        .wheel_angles_rad()
        .map(|wheel_angle| speed * (wheel_angle - angle).cos())
}

/// Convert body-frame velocities to wheel speeds in controller units
///
/// # Arguments
/// * `x_speed` - Velocity along body x in m/s
/// * `y_speed` - Velocity along body y in m/s
/// * `rotation` - Angular rate in rad/s
///
/// # Returns
/// One speed per wheel, in the order of `geometry.wheel_angles_deg`
pub fn compute_wheel_speeds(
    x_speed: f32,
    y_speed: f32,
    rotation: f32,
    geometry: &RobotGeometry,
) -> WheelSpeeds {
    // All wheels sit at the same distance from center, so rotation adds the same term to each
    let rotational =
        geometry.speed_metric_to_robot(geometry.rotation_to_metric(rotation));

    let linear = wheel_linear_speeds(x_speed, y_speed, geometry);
    WheelSpeeds(linear.map(|speed| geometry.speed_metric_to_robot(speed) + rotational))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_geometry() -> RobotGeometry {
        RobotGeometry::default().with_metric_to_robot(1.0)
    }

    fn assert_close(actual: [f32; 3], expected: [f32; 3]) {
        for i in 0..3 {
            assert!(
                (actual[i] - expected[i]).abs() < 1e-5,
                "wheel {}: expected {}, got {}",
                i,
                expected[i],
                actual[i]
            );
        }
    }

    #[test]
    fn test_zero_velocity() {
        let wheels = compute_wheel_speeds(0.0, 0.0, 0.0, &RobotGeometry::default());
        assert_eq!(wheels.as_array(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_forward_motion_unit_scale() {
        // cos(240°) = -0.5, cos(120°) = -0.5, cos(0°) = 1
        let wheels = compute_wheel_speeds(1.0, 0.0, 0.0, &unit_geometry());
        assert_close(wheels.as_array(), [-0.5, -0.5, 1.0]);
    }

    #[test]
    fn test_lateral_motion_unit_scale() {
        // angle = 90°: cos(150°), cos(30°), cos(-90°)
        let wheels = compute_wheel_speeds(0.0, 1.0, 0.0, &unit_geometry());
        let half_sqrt3 = 3.0f32.sqrt() / 2.0;
        assert_close(wheels.as_array(), [-half_sqrt3, half_sqrt3, 0.0]);
    }

    #[test]
    fn test_rotation_only() {
        // Pure rotation should give the same speed on every wheel
        let geometry = RobotGeometry::default();
        for &rotation in &[-2.0f32, -0.5, 0.3, 1.0] {
            let wheels = compute_wheel_speeds(0.0, 0.0, rotation, &geometry).as_array();
            assert_eq!(wheels[0], wheels[1]);
            assert_eq!(wheels[1], wheels[2]);

            let expected = rotation * geometry.wheel_from_center * geometry.metric_to_robot();
            assert!((wheels[0] - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn test_rotation_adds_to_translation() {
        let geometry = unit_geometry();
        let translated = compute_wheel_speeds(0.3, -0.2, 0.0, &geometry).as_array();
        let combined = compute_wheel_speeds(0.3, -0.2, 2.0, &geometry).as_array();
        let rotational = 2.0 * geometry.wheel_from_center;
        assert_close(combined, translated.map(|w| w + rotational));
    }

    #[test]
    fn test_controller_units_scale_linearly() {
        let geometry = RobotGeometry::default();
        let metric = wheel_linear_speeds(0.1, 0.05, &geometry);
        let wheels = compute_wheel_speeds(0.1, 0.05, 0.0, &geometry).as_array();
        for i in 0..3 {
            assert!((wheels[i] - metric[i] * geometry.metric_to_robot()).abs() < 1e-4);
        }
    }

    #[test]
    fn test_continuity_near_origin_and_branch_cut() {
        // Small input changes must give small output changes, including across
        // the atan2 branch at +/-180° and around the origin
        let geometry = unit_geometry();
        let eps = 1e-4;
        let probes = [
            (0.0, 0.0, 0.0),
            (-1.0, 0.0, 0.5),
            (-1.0, 1e-6, 0.0),
            (0.5, -0.5, -1.0),
        ];

        for &(x, y, r) in &probes {
            let base = compute_wheel_speeds(x, y, r, &geometry).as_array();
            for &(dx, dy, dr) in &[(eps, 0.0, 0.0), (0.0, eps, 0.0), (0.0, -eps, 0.0), (0.0, 0.0, eps)] {
                let moved = compute_wheel_speeds(x + dx, y + dy, r + dr, &geometry).as_array();
                for i in 0..3 {
                    assert!(
                        (moved[i] - base[i]).abs() < 10.0 * eps,
                        "jump at ({}, {}, {}) wheel {}",
                        x,
                        y,
                        r,
                        i
                    );
                }
            }
        }
    }

    #[test]
    fn test_degenerate_geometry_collapses_to_zero() {
        let geometry = RobotGeometry::default().with_metric_to_robot(0.0);
        let wheels = compute_wheel_speeds(1.0, -1.0, 3.0, &geometry);
        assert_eq!(wheels.as_array(), [0.0, 0.0, 0.0]);
    }
}
