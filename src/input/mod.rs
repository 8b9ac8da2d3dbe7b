// Controller event feeds
//
// The controller driver lives outside this crate. Events reach the runtime
// through a channel, fed either from a zenoh topic or from the keyboard.

pub mod keyboard;
pub mod topic;

use tokio::sync::mpsc;
use tracing::info;

use crate::config::{InputSource, RuntimeConfig};
use crate::messages::ControllerEvent;
use crate::retry::RetryError;

/// Events buffered between a feed and the runtime
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Error types for bringing up an input feed
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Could not connect input feed: {0}")]
    Connect(#[from] RetryError),

    #[error("Zenoh error: {0}")]
    Zenoh(String),

    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// A running feed
pub struct InputFeed {
    /// Closes when the feed ends
    pub events: mpsc::Receiver<ControllerEvent>,
    /// Keeps the terminal in raw mode for the keyboard feed; restores it on drop
    pub terminal: Option<keyboard::RawModeGuard>,
}

/// Start the configured feed
pub async fn start(config: &RuntimeConfig) -> Result<InputFeed, InputError> {
    let (tx, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

    let terminal = match config.input {
        InputSource::Zenoh => {
            topic::spawn(&config.topic, &config.retry, tx).await?;
            info!("Listening for controller events on {}", config.topic);
            None
        }
        InputSource::Keyboard => {
            let guard = keyboard::spawn(tx)?;
            info!("Controls: WASD=move, Z/X=rotate, 1=reset 2=halve 3=double speed, Q=quit");
            Some(guard)
        }
    };

    Ok(InputFeed { events, terminal })
}
