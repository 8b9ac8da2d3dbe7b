// Wheel command frame for the base motor controller
//
// Frame format: [wheel0_i8, wheel1_i8, wheel2_i8, crc8]
// CRC-8 over the first three bytes: poly 0x07, init 0x00, no reflection, no final xor.

use crc::{CRC_8_SMBUS, Crc};

use super::kinematics::WheelSpeeds;

/// Total frame size on the wire
pub const FRAME_LEN: usize = 4;

/// Number of wheel bytes preceding the checksum
const PAYLOAD_LEN: usize = 3;

/// CRC-8 with the conventional default profile
const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);

/// Error types for frame decoding
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FrameError {
    #[error("Invalid frame length: expected 4 bytes, got {0}")]
    Length(usize),

    #[error("Checksum mismatch: expected 0x{expected:02X}, got 0x{received:02X}")]
    ChecksumMismatch { expected: u8, received: u8 },
}

/// One encoded wheel command. Built fresh every tick, never mutated after encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelCommandFrame([u8; FRAME_LEN]);

impl WheelCommandFrame {
    /// Encode three wheel speeds into a frame
    ///
    /// Total over any input: speeds are rounded, saturated to the i8 range, NaN becomes 0.
    pub fn encode(speeds: &WheelSpeeds) -> Self {
        let mut bytes = [0u8; FRAME_LEN];
        for (i, &speed) in speeds.as_array().iter().enumerate() {
            bytes[i] = speed_to_i8(speed) as u8;
        }
        bytes[PAYLOAD_LEN] = checksum(&bytes[..PAYLOAD_LEN]);
        Self(bytes)
    }

    /// Frame commanding every wheel to stop
    pub fn zero() -> Self {
        Self::encode(&WheelSpeeds::zero())
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// Wheel speeds carried by this frame
    pub fn wheels(&self) -> [i8; 3] {
        [self.0[0] as i8, self.0[1] as i8, self.0[2] as i8]
    }

    /// Parse and verify a frame read back from a capture or a loopback
    pub fn decode(bytes: &[u8]) -> Result<[i8; 3], FrameError> {
        if bytes.len() != FRAME_LEN {
            return Err(FrameError::Length(bytes.len()));
        }

        let expected = checksum(&bytes[..PAYLOAD_LEN]);
        let received = bytes[PAYLOAD_LEN];
        if expected != received {
            return Err(FrameError::ChecksumMismatch { expected, received });
        }

        Ok([bytes[0] as i8, bytes[1] as i8, bytes[2] as i8])
    }
}

/// CRC-8 over the wheel bytes
pub fn checksum(data: &[u8]) -> u8 {
    CRC8.checksum(data)
}

/// Round to nearest (ties toward +inf) and saturate to the signed 8-bit range
fn speed_to_i8(speed: f32) -> i8 {
    if speed.is_nan() {
        return 0;
    }
    let rounded = (speed + 0.5).floor();

    // Clamp rather than wrap: a wrapped value would drive the wheel backwards
    rounded.clamp(i8::MIN as f32, i8::MAX as f32) as i8
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bitwise CRC-8 reference (poly 0x07, init 0, no reflection)
    fn reference_crc8(data: &[u8]) -> u8 {
        let mut crc = 0u8;
        for &byte in data {
            crc ^= byte;
            for _ in 0..8 {
                crc = if crc & 0x80 != 0 {
                    (crc << 1) ^ 0x07
                } else {
                    crc << 1
                };
            }
        }
        crc
    }

    #[test]
    fn test_checksum_check_value() {
        // Standard check value for CRC-8 over "123456789"
        assert_eq!(checksum(b"123456789"), 0xF4);
    }

    #[test]
    fn test_zero_frame() {
        let frame = WheelCommandFrame::zero();
        assert_eq!(frame.as_bytes(), &[0, 0, 0, 0]);
        assert_eq!(frame.as_bytes()[3], reference_crc8(&[0, 0, 0]));
    }

    #[test]
    fn test_trailer_matches_independent_crc() {
        let inputs = [
            [1.0, -1.0, 0.0],
            [12.4, -37.6, 99.5],
            [-0.5, 0.49, 127.0],
            [-128.0, 64.2, -3.3],
        ];
        for speeds in inputs {
            let frame = WheelCommandFrame::encode(&WheelSpeeds(speeds));
            let bytes = frame.as_bytes();
            assert_eq!(bytes.len(), FRAME_LEN);
            assert_eq!(bytes[3], reference_crc8(&bytes[..3]), "input {:?}", speeds);
        }
    }

    #[test]
    fn test_rounding() {
        let frame = WheelCommandFrame::encode(&WheelSpeeds([12.4, -37.6, 99.5]));
        assert_eq!(frame.wheels(), [12, -38, 100]);

        // Ties go toward +inf
        let frame = WheelCommandFrame::encode(&WheelSpeeds([-0.5, 0.5, -2.5]));
        assert_eq!(frame.wheels(), [0, 1, -2]);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let frame = WheelCommandFrame::encode(&WheelSpeeds([1000.0, -1000.0, 200.0]));
        assert_eq!(frame.wheels(), [127, -128, 127]);

        let frame = WheelCommandFrame::encode(&WheelSpeeds([127.6, -128.6, f32::INFINITY]));
        assert_eq!(frame.wheels(), [127, -128, 127]);
    }

    #[test]
    fn test_nan_encodes_zero() {
        let frame = WheelCommandFrame::encode(&WheelSpeeds([f32::NAN, 5.0, f32::NEG_INFINITY]));
        assert_eq!(frame.wheels(), [0, 5, -128]);
    }

    #[test]
    fn test_decode() {
        let frame = WheelCommandFrame::encode(&WheelSpeeds([-20.0, 7.0, 55.0]));
        assert_eq!(WheelCommandFrame::decode(frame.as_bytes()), Ok([-20, 7, 55]));

        let mut corrupted = *frame.as_bytes();
        corrupted[1] ^= 0x01;
        assert!(matches!(
            WheelCommandFrame::decode(&corrupted),
            Err(FrameError::ChecksumMismatch { .. })
        ));

        assert_eq!(WheelCommandFrame::decode(&[1, 2, 3]), Err(FrameError::Length(3)));
    }
}
