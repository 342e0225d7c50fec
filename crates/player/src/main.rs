mod args;
mod playback;

use std::process::ExitCode;

use util::stop_signals;

use args::Args;

const GENERIC_ERROR_MSG: &str = "Something went wrong.";

fn main() -> ExitCode {
    let args = Args::default();

    #[cfg(debug_assertions)]
    {
        use util::debug_log;
        if args.no_debug_logging {
            debug_log::disable();
        } else if !args.debug_error_log_panics {
            debug_log::panic_on_errors::disable();
        }
    }

    if let Err(e) = stop_signals::enable() {
        util::debug_log_error!("Failed enable stop signal polling: {e}");
        eprintln!("{GENERIC_ERROR_MSG}");
        return ExitCode::FAILURE;
    }

    let config = match playback::load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            util::debug_log_error!("{e}");
            eprintln!("Couldn't read the config file.");
            return ExitCode::FAILURE;
        }
    };

    match playback::play(&args, config) {
        Ok(report) => {
            println!(
                "Presented {} frames ({} played{}).",
                report.frames_presented,
                report.position,
                if report.interrupted { ", interrupted" } else { "" },
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            util::debug_log_error!("Playback failed: {e}");
            eprintln!("{GENERIC_ERROR_MSG}");
            ExitCode::FAILURE
        }
    }
}
