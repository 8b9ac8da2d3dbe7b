use clap::Parser;
use tracing_subscriber::EnvFilter;

use omni_teleop_runtime::config::{Cli, RuntimeConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(
            "info".parse().expect("static directive"),
        ))
        .init(); // installs the subscriber globally

    // Faults are logged here; unwinding then drops the runtime, which stops the robot
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        tracing::error!("Uncaught fault: {}", panic_info);
        default_hook(panic_info);
    }));

    let config = RuntimeConfig::from(Cli::parse());

    if let Err(e) = omni_teleop_runtime::runtime::run(config).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
