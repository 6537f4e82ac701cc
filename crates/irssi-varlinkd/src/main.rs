use std::process::ExitCode;

use irssi_varlinkd::LaunchError;

fn main() -> ExitCode {
    match irssi_varlinkd::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        // No subscriber is installed yet.
        Err(error @ (LaunchError::Config { .. } | LaunchError::Telemetry { .. })) => {
            eprintln!("irssi-varlinkd: {error}");
            ExitCode::FAILURE
        }
        Err(error) => {
            tracing::error!(
                target: concat!(env!("CARGO_PKG_NAME"), "::process"),
                error = %error,
                "irssi-varlinkd failed"
            );
            ExitCode::FAILURE
        }
    }
}
