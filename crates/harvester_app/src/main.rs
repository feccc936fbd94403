use std::process::ExitCode;

use anyhow::Context;
use harvest_logging::{harvest_error, harvest_info, LogDestination};
use harvester_app::{run, AppConfig};
use harvester_engine::ensure_dir;
use log::LevelFilter;

fn main() -> ExitCode {
    harvest_logging::initialize(LogDestination::terminal_and_default_file(), LevelFilter::Info);

    match try_main() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            harvest_error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// `Ok(false)` when some listing could not be harvested or exported.
fn try_main() -> anyhow::Result<bool> {
    let config = AppConfig::default();
    ensure_dir(&config.output_dir)
        .with_context(|| format!("cannot use output directory {:?}", config.output_dir))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let report = runtime.block_on(run(&config));

    harvest_info!(
        "Finished: {} workbook(s) written, {} listing(s) failed",
        report.exported.len(),
        report.failed.len()
    );
    Ok(report.is_success())
}
