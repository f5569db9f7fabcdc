use crate::cli::MergeArgs;
use crate::error::Result;
use hvsweep::workflows::post_process;
use tracing::info;

pub fn run(args: MergeArgs) -> Result<()> {
    info!("Merging relative-error reports from {:?}", &args.input);
    let summary = post_process::merge_relative_errors(&args.input, &args.output)?;

    for (path, reason) in &summary.skipped {
        println!("  Skipped {}: {}", path.display(), reason);
    }
    println!(
        "✓ Merged {} report(s) into {} ({} row(s)).",
        summary.columns,
        summary.merged_path.display(),
        summary.rows
    );
    println!("✓ Summary written to {}.", summary.summary_path.display());
    Ok(())
}
