use crate::cli::DurationArgs;
use crate::config::builder::build_duration_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use hvsweep::{
    core::io::sac::SacLoader, engine::progress::ProgressReporter, workflows::duration_sweep,
};
use tracing::info;

pub fn run(args: DurationArgs) -> Result<()> {
    info!("Building duration sweep configuration...");
    let app = build_duration_config(&args)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Evaluating {} record duration(s) per recording in {}...",
        app.sweep.grid.len(),
        args.input.display()
    );
    let summary =
        duration_sweep::run(&app.job, &app.sweep, &SacLoader, &app.pipeline, &reporter)?;

    for path in &summary.exported {
        println!("  {}", path.display());
    }
    for (prefix, reason) in &summary.skipped {
        println!("  Skipped '{}': {}", prefix, reason);
    }
    println!(
        "✓ {} report(s) written to {}.",
        summary.exported.len(),
        app.job.output_dir.display()
    );
    Ok(())
}
