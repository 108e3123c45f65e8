use std::process::ExitCode;

use tracing::error;

mod arcade;
mod bootstrap;
mod loop_runner;

pub(crate) fn run() -> ExitCode {
    bootstrap::init_tracing();
    match bootstrap::build_app() {
        Ok(app) => loop_runner::run(app),
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}
