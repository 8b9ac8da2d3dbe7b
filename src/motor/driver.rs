// High-level wheel driver for the omni base
//
// Combines kinematics, framing and the transport to provide a simple API
// for commanding the base.

use tracing::{debug, info, warn};

use super::frame::WheelCommandFrame;
use super::geometry::RobotGeometry;
use super::kinematics::compute_wheel_speeds;
use super::transport::{Transport, TransportError, WriteOutcome};

/// Body-frame velocity command
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CommandedVelocity {
    pub x_speed: f32,  // m/s
    pub y_speed: f32,  // m/s
    pub rotation: f32, // rad/s
}

/// High-level driver for the three-wheel base
pub struct WheelDriver<T: Transport> {
    transport: T,
    geometry: RobotGeometry,
}

impl<T: Transport> WheelDriver<T> {
    pub fn new(transport: T, geometry: RobotGeometry) -> Self {
        info!(
            "Wheel driver ready: metric_to_robot={:.3}, wheel angles {:?}",
            geometry.metric_to_robot(),
            geometry.wheel_angles_deg
        );
        Self { transport, geometry }
    }

    /// Build the frame for a body velocity command
    pub fn frame_for(&self, velocity: &CommandedVelocity) -> WheelCommandFrame {
        let speeds = compute_wheel_speeds(
            velocity.x_speed,
            velocity.y_speed,
            velocity.rotation,
            &self.geometry,
        );
        debug!("Wheel speeds: {:?}", speeds.as_array());
        WheelCommandFrame::encode(&speeds)
    }

    /// Send body velocity command to the base
    pub fn set_body_velocity(
        &mut self,
        velocity: &CommandedVelocity,
    ) -> Result<WriteOutcome, TransportError> {
        let frame = self.frame_for(velocity);
        self.send(&frame)
    }

    /// Write a frame, skipping it if the transport is not open
    pub fn send(&mut self, frame: &WheelCommandFrame) -> Result<WriteOutcome, TransportError> {
        if !self.transport.is_open() {
            debug!("Transport not open, skipping frame {:02X?}", frame.as_bytes());
            return Ok(WriteOutcome::Skipped);
        }
        self.transport.write_frame(frame.as_bytes())
    }

    /// Stop all wheels
    pub fn stop(&mut self) -> Result<WriteOutcome, TransportError> {
        info!("Stopping all wheels");
        let outcome = self.send(&WheelCommandFrame::zero())?;
        if outcome == WriteOutcome::Skipped {
            warn!("Transport not open, stop frame not sent");
        }
        Ok(outcome)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
