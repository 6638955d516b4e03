//! Canonical re-serialization.

use std::path::PathBuf;

use clap::Args;
use pdkit_core::serialize;
use pdkit_io::read_patch;

use super::common::emit;

/// Rewrite a patch in canonical form.
#[derive(Args)]
pub struct FmtArgs {
    /// Patch file
    pub file: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Exit with an error if the file is not already canonical
    #[arg(long, conflicts_with = "output")]
    pub check: bool,
}

/// Run the fmt command.
pub fn run(args: FmtArgs) -> anyhow::Result<()> {
    let patch = read_patch(&args.file)?;

    if args.check {
        let original = std::fs::read_to_string(&args.file)?;
        if serialize(&patch) != original {
            anyhow::bail!("{} is not in canonical form", args.file.display());
        }
        return Ok(());
    }

    emit(&patch, args.output.as_deref())
}
