use crate::cli::MapeArgs;
use crate::error::Result;
use hvsweep::workflows::post_process;
use tracing::info;

pub fn run(args: MapeArgs) -> Result<()> {
    info!(
        "Computing relative errors for reports in {:?}",
        &args.input
    );
    let summary = post_process::compute_relative_errors(&args.input, &args.output)?;

    for (path, reason) in &summary.skipped {
        println!("  Skipped {}: {}", path.display(), reason);
    }
    println!(
        "✓ {} relative-error report(s) written to {}.",
        summary.written.len(),
        args.output.display()
    );
    Ok(())
}
