// Controller events over zenoh
// Payloads are JSON-encoded `ControllerEvent`s.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::InputError;
use crate::messages::ControllerEvent;
use crate::retry::{RetryPolicy, with_backoff};

/// Open a zenoh session, subscribe to `topic` and forward parsed events into `tx`
///
/// The session lives in a task on the runtime's timeline and ends when the
/// runtime drops its receiver.
pub async fn spawn(
    topic: &str,
    policy: &RetryPolicy,
    tx: mpsc::Sender<ControllerEvent>,
) -> Result<(), InputError> {
    info!("Opening Zenoh session...");
    let session = with_backoff(policy, "Zenoh session", || async {
        zenoh::open(zenoh::Config::default()).await
    })
    .await?;

    let subscriber = session
        .declare_subscriber(topic.to_string())
        .await
        .map_err(|e| InputError::Zenoh(e.to_string()))?;

    tokio::spawn(async move {
        while let Ok(sample) = subscriber.recv_async().await {
            let payload = sample.payload().to_bytes();
            let Some(event) = parse_event(&payload) else {
                continue;
            };
            if tx.send(event).await.is_err() {
                debug!("Runtime stopped listening, closing zenoh feed");
                break;
            }
        }
        // Keep the session open for as long as the subscriber runs
        drop(session);
    });

    Ok(())
}

/// Parse one payload, logging and dropping malformed ones
pub fn parse_event(payload: &[u8]) -> Option<ControllerEvent> {
    match serde_json::from_slice::<ControllerEvent>(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!("Failed to parse controller event: {}", e);
            None
        }
    }
}
