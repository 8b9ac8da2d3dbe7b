pub mod config;
pub mod input;
pub mod messages;
pub mod motor;
pub mod retry;
pub mod runtime;
pub mod teleop;
