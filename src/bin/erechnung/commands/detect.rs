//! Detect command - report the dialect of each input file.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use tracing::warn;

use erechnung::detect;

/// Arguments for the detect command.
#[derive(Args)]
pub struct DetectArgs {
    /// Files to inspect
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

/// Prints one `<file>\t<dialect>` line per input. Fails when any file is
/// unreadable or of unknown dialect.
pub fn run(args: DetectArgs) -> anyhow::Result<ExitCode> {
    let mut all_known = true;

    for file in &args.files {
        let bytes = match fs::read(file) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(file = %file.display(), error = %err, "cannot read file");
                all_known = false;
                continue;
            }
        };
        let dialect = detect(&bytes);
        all_known &= dialect.is_known();
        println!("{}\t{dialect}", file.display());
    }

    Ok(if all_known {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
