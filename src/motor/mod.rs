// Motor control module for the three-wheel omni base
//
// Provides:
// - Robot geometry and the metric -> controller unit scale
// - Omniwheel inverse kinematics (body velocity -> wheel speeds)
// - 4-byte wheel command frame with CRC-8 trailer
// - Serial transport and the high-level wheel driver

mod driver;
pub mod frame;
pub mod geometry;
pub mod kinematics;
pub mod transport;

pub use driver::{CommandedVelocity, WheelDriver};
pub use frame::{FRAME_LEN, FrameError, WheelCommandFrame};
pub use geometry::RobotGeometry;
pub use kinematics::{WheelSpeeds, compute_wheel_speeds};
pub use transport::{SerialTransport, Transport, TransportError, WriteOutcome};

#[cfg(test)]
pub use transport::RecordingTransport;
