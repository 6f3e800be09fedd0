mod app;

use std::process::ExitCode;

use overworld_engine::run_app;
use tracing::{error, info};

use app::{build_app, init_tracing};

fn main() -> ExitCode {
    init_tracing();
    info!("=== Overworld Startup ===");

    let wiring = build_app();
    if let Err(err) = run_app(
        wiring.config,
        wiring.engine_config,
        Box::new(wiring.session),
    ) {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
