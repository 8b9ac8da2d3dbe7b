// Fixed-rate frame transmission with a guaranteed stop on shutdown
// Note: every exit path (signal, closed input feed, error, panic unwinding) funnels into
// `Runtime::terminate`, which sends one zero-speed frame and never runs twice.

use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval}; // tokio is an async runtime for Rust
use tracing::{error, info, warn};

// local imports
use crate::config::RuntimeConfig;
use crate::input::{self, InputError, InputFeed};
use crate::messages::ControllerEvent;
use crate::motor::{SerialTransport, Transport, WheelDriver, WriteOutcome};
use crate::retry::with_backoff;
use crate::teleop::{SpeedScale, TeleopState};

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Built, no ticks yet
    Idle,
    /// Sending a frame every period
    Running,
    /// Stop frame being sent
    Terminating,
    Terminated,
}

/// Why the runtime is shutting down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Interrupt,
    Terminate,
    UserSignal,
    /// Input feed ended (quit key, feed task finished or panicked)
    InputClosed,
    /// Runtime dropped without an explicit shutdown (panic unwinding, early return)
    Dropped,
}

/// Error types for the runtime
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Input feed error: {0}")]
    Input(#[from] InputError),

    #[error("Failed to register signal handlers: {0}")]
    Signal(std::io::Error),
}

pub struct Runtime<T: Transport> {
    driver: WheelDriver<T>,
    teleop: TeleopState,
    state: SchedulerState,
}

impl<T: Transport> Runtime<T> {
    pub fn new(driver: WheelDriver<T>, default_scale: SpeedScale) -> Self {
        Self {
            driver,
            teleop: TeleopState::new(default_scale),
            state: SchedulerState::Idle,
        }
    }

    /// Arm the scheduler. Only the first call has an effect.
    pub fn start(&mut self) {
        if self.state == SchedulerState::Idle {
            self.state = SchedulerState::Running;
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn teleop(&self) -> &TeleopState {
        &self.teleop
    }

    /// Process incoming controller event
    pub fn on_event(&mut self, event: &ControllerEvent) {
        self.teleop.on_event(event);
    }

    /// Send the frame for the current command. Does nothing unless running.
    ///
    /// Write failures are logged and the schedule carries on.
    pub fn on_tick(&mut self) -> Option<WriteOutcome> {
        if self.state != SchedulerState::Running {
            return None;
        }

        let velocity = self.teleop.commanded();
        match self.driver.set_body_velocity(&velocity) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!("Failed to write wheel frame: {}", e);
                None
            }
        }
    }

    /// Stop the robot and end the schedule
    ///
    /// Returns false if shutdown already happened.
    pub fn terminate(&mut self, reason: ShutdownReason) -> bool {
        match self.state {
            SchedulerState::Terminating | SchedulerState::Terminated => return false,
            SchedulerState::Idle | SchedulerState::Running => {}
        }

        info!("Shutting down ({:?})", reason);
        self.state = SchedulerState::Terminating;
        if let Err(e) = self.driver.stop() {
            error!("Failed to send stop frame: {}", e);
        }
        self.state = SchedulerState::Terminated;
        true
    }
}

impl<T: Transport> Drop for Runtime<T> {
    fn drop(&mut self) {
        // Covers panics and early returns; a no-op after a normal shutdown
        self.terminate(ShutdownReason::Dropped);
    }
}

/// Run the scheduler until `shutdown` resolves or the input feed closes, then stop the robot
pub async fn drive<T: Transport>(
    runtime: &mut Runtime<T>,
    period: Duration,
    mut events: mpsc::Receiver<ControllerEvent>,
    shutdown: impl Future<Output = ShutdownReason>,
) -> ShutdownReason {
    runtime.start();

    let mut tick = interval(period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let reason = loop {
        tokio::select! {
            biased;

            reason = &mut shutdown => break reason,

            event = events.recv() => match event {
                Some(event) => runtime.on_event(&event),
                None => break ShutdownReason::InputClosed,
            },

            _ = tick.tick() => {
                runtime.on_tick();
            }
        }
    };

    // Leaving the loop drops the interval, so no tick can follow the stop frame
    runtime.terminate(reason);
    reason
}

/// Process signals that end the runtime
///
/// Handlers are installed by `register`, so a signal arriving during bring-up is
/// held until `recv` instead of killing the process.
pub struct ShutdownSignals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    user1: tokio::signal::unix::Signal,
    #[cfg(unix)]
    user2: tokio::signal::unix::Signal,
}

impl ShutdownSignals {
    pub fn register() -> std::io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            Ok(Self {
                interrupt: signal(SignalKind::interrupt())?,
                terminate: signal(SignalKind::terminate())?,
                user1: signal(SignalKind::user_defined1())?,
                user2: signal(SignalKind::user_defined2())?,
            })
        }
        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// Wait for the first shutdown signal
    pub async fn recv(&mut self) -> ShutdownReason {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = self.interrupt.recv() => ShutdownReason::Interrupt,
                _ = self.terminate.recv() => ShutdownReason::Terminate,
                _ = self.user1.recv() => ShutdownReason::UserSignal,
                _ = self.user2.recv() => ShutdownReason::UserSignal,
            }
        }
        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Ctrl-C handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
            ShutdownReason::Interrupt
        }
    }
}

/// Wait for a bring-up step unless a shutdown signal arrives first
pub async fn until_shutdown<F: Future>(
    signals: &mut ShutdownSignals,
    bring_up: F,
) -> Result<F::Output, ShutdownReason> {
    tokio::select! {
        biased;

        reason = signals.recv() => Err(reason),
        output = bring_up => Ok(output),
    }
}

/// Bring up the serial port, falling back to a closed transport
async fn open_transport(config: &RuntimeConfig) -> SerialTransport {
    info!("Opening motor controller on {} @ {} baud", config.port, config.baud);
    let opened = with_backoff(&config.retry, "Motor serial port", || async move {
        SerialTransport::open(&config.port, config.baud)
    })
    .await;

    match opened {
        Ok(transport) => transport,
        Err(e) => {
            error!("{}; frames will be skipped", e);
            SerialTransport::closed(&config.port)
        }
    }
}

pub async fn run(config: RuntimeConfig) -> Result<(), RuntimeError> {
    let mut signals = ShutdownSignals::register().map_err(RuntimeError::Signal)?;

    let transport = match until_shutdown(&mut signals, open_transport(&config)).await {
        Ok(transport) => transport,
        Err(reason) => {
            info!("Shutting down ({:?}) before the motor controller was opened", reason);
            return Ok(());
        }
    };
    let driver = WheelDriver::new(transport, config.geometry);
    let mut runtime = Runtime::new(driver, config.default_scale);

    // An error here drops the runtime, which still sends the stop frame
    let feed = match until_shutdown(&mut signals, input::start(&config)).await {
        Ok(feed) => feed?,
        Err(reason) => {
            runtime.terminate(reason);
            return Ok(());
        }
    };
    // The terminal guard lives until after the stop frame is sent
    let InputFeed {
        events,
        terminal: _terminal,
    } = feed;

    info!(
        "Runtime started: sending every {}ms, max speed {} m/s, max rotation {} rad/s",
        config.send_period.as_millis(),
        config.default_scale.max_speed,
        config.default_scale.max_rotation
    );

    let reason = drive(&mut runtime, config.send_period, events, signals.recv()).await;
    info!("Runtime stopped ({:?})", reason);
    Ok(())
}
