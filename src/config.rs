// Timing, topics, serial and teleop configuration
use clap::{Parser, ValueEnum};
use std::time::Duration;

use crate::motor::RobotGeometry;
use crate::retry::RetryPolicy;
use crate::teleop::SpeedScale;

// Frame transmission period
pub const SEND_PERIOD_MS: u64 = 50;

// Zenoh topic carrying controller events
pub const TOPIC_INPUT_CONTROLLER: &str = "omni/input/controller";

// Serial port for the motor controller
pub const MOTOR_PORT: &str = "/dev/ttyUSB0";
pub const MOTOR_BAUDRATE: u32 = 9600;

// Range mapped from full-scale stick input
pub const DEFAULT_MAX_SPEED: f32 = 0.2; // m/s
pub const DEFAULT_MAX_ROTATION: f32 = 0.5; // rad/s

/// Where controller events come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputSource {
    /// JSON controller events published on a zenoh topic
    Zenoh,
    /// Keyboard teleop in this terminal
    Keyboard,
}

/// Drive a three-wheel omni base from a handheld controller over serial
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Serial port of the motor controller
    #[arg(long, default_value = MOTOR_PORT)]
    pub port: String,

    /// Serial baud rate
    #[arg(long, default_value_t = MOTOR_BAUDRATE)]
    pub baud: u32,

    /// Frame transmission period in milliseconds
    #[arg(long, default_value_t = SEND_PERIOD_MS, value_parser = clap::value_parser!(u64).range(1..))]
    pub period_ms: u64,

    /// Max translation speed at full stick (m/s)
    #[arg(long, default_value_t = DEFAULT_MAX_SPEED)]
    pub max_speed: f32,

    /// Max rotation rate at full pointer deflection (rad/s)
    #[arg(long, default_value_t = DEFAULT_MAX_ROTATION)]
    pub max_rotation: f32,

    /// Controller event source
    #[arg(long, value_enum, default_value_t = InputSource::Zenoh)]
    pub input: InputSource,

    /// Zenoh topic for controller events
    #[arg(long, default_value = TOPIC_INPUT_CONTROLLER)]
    pub topic: String,

    /// Connection attempts before giving up
    #[arg(long, default_value_t = 5)]
    pub connect_attempts: u32,

    /// Initial delay between connection attempts in milliseconds (doubles each retry)
    #[arg(long, default_value_t = 200)]
    pub connect_backoff_ms: u64,
}

/// Startup configuration, immutable once built
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub port: String,
    pub baud: u32,
    pub send_period: Duration,
    pub default_scale: SpeedScale,
    pub geometry: RobotGeometry,
    pub input: InputSource,
    pub topic: String,
    pub retry: RetryPolicy,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        let retry = RetryPolicy {
            max_attempts: cli.connect_attempts,
            initial_backoff: Duration::from_millis(cli.connect_backoff_ms),
            ..RetryPolicy::default()
        };
        Self {
            port: cli.port,
            baud: cli.baud,
            send_period: Duration::from_millis(cli.period_ms),
            default_scale: SpeedScale {
                max_speed: cli.max_speed,
                max_rotation: cli.max_rotation,
            },
            geometry: RobotGeometry::default(),
            input: cli.input,
            topic: cli.topic,
            retry,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Cli::parse_from(["omni-teleop-runtime"]).into()
    }
}
