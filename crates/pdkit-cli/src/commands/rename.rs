//! Send/receive symbol renaming.

use std::path::PathBuf;

use clap::Args;
use pdkit_core::escape;
use pdkit_io::read_patch;

use super::common::emit;

/// Rename a send/receive symbol throughout a patch.
#[derive(Args)]
pub struct RenameArgs {
    /// Patch file
    pub file: PathBuf,

    /// Current symbol
    #[arg(long)]
    pub from: String,

    /// New symbol
    #[arg(long)]
    pub to: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Run the rename command.
pub fn run(args: RenameArgs) -> anyhow::Result<()> {
    if args.to.is_empty() || args.to.chars().any(char::is_whitespace) {
        anyhow::bail!("new symbol must be a single non-empty word");
    }
    let patch = read_patch(&args.file)?;
    let renamed = patch.rename_send_receive(&escape(&args.from), &escape(&args.to));
    if renamed == patch {
        tracing::warn!("symbol '{}' not found", args.from);
    }
    emit(&renamed, args.output.as_deref())
}
