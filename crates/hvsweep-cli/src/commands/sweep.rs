use crate::cli::SweepArgs;
use crate::config::builder::build_sweep_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use hvsweep::{
    core::io::sac::SacLoader, engine::progress::ProgressReporter, workflows::parameter_sweep,
};
use tracing::{info, warn};

pub fn run(args: SweepArgs) -> Result<()> {
    info!("Building sweep configuration...");
    let app = build_sweep_config(&args)?;
    info!(
        "Pipeline command: {} {}",
        app.pipeline.program(),
        app.pipeline.args().join(" ")
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Sweeping {} combination(s) over {}...",
        app.sweep.grid.len(),
        args.input.display()
    );
    let report = parameter_sweep::run(&app.job, &app.sweep, &SacLoader, &app.pipeline, &reporter)?;

    let failures = report.failure_count();
    if failures > 0 {
        warn!("{} of {} combination(s) failed.", failures, report.len());
    }
    println!(
        "✓ {} row(s) written to {} ({} failed).",
        report.len(),
        app.job.output_path.display(),
        failures
    );
    Ok(())
}
