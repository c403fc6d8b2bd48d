//! The binary entry point for the orrery.

use clap::Parser;
use orrery_app::{AppError, PlatformDirs};
use orrery_config::{CliArgs, Config};

/// Process exit status for any failure before the first frame.
const SETUP_FAILURE_EXIT_CODE: i32 = -1;

fn main() {
    let args = CliArgs::parse();

    if let Err(err) = try_main(&args) {
        tracing::error!("{err}");
        eprintln!("orrery: {err}");
        std::process::exit(SETUP_FAILURE_EXIT_CODE);
    }
}

fn try_main(args: &CliArgs) -> Result<(), AppError> {
    let dirs = PlatformDirs::resolve(args.config.as_deref())?;
    if let Err(err) = dirs.create_dirs() {
        eprintln!("orrery: {err}; continuing without a log file");
    }

    let (mut config, config_err) = Config::load_or_default(&dirs.config_dir);
    config.apply_cli_overrides(args);

    if let Err(err) = orrery_log::init_logging(
        Some(&dirs.log_dir),
        cfg!(debug_assertions),
        Some(&config),
    ) {
        eprintln!("orrery: logging unavailable: {err}");
    }
    if let Some(err) = config_err {
        tracing::warn!("Using default config: {err}");
    }

    tracing::info!(
        config_dir = %dirs.config_dir.display(),
        assets = %config.assets.root.display(),
        "Starting orrery"
    );

    orrery_app::run(config)
}
