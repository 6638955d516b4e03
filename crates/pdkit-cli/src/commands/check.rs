//! Object support check against an allow list.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;
use pdkit_core::Element;
use pdkit_io::{read_class_list, read_patch};

/// Report object classes missing from an allow list.
#[derive(Args)]
pub struct CheckArgs {
    /// Patch file
    pub file: PathBuf,

    /// File listing supported classes, one per line
    #[arg(long)]
    pub allow: PathBuf,
}

/// Run the check command.
pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let allowed = read_class_list(&args.allow)?;
    let patch = read_patch(&args.file)?;

    let mut unsupported: BTreeMap<&str, usize> = BTreeMap::new();
    for element in patch.find(|e| matches!(e, Element::Obj(_) | Element::Gui(_))) {
        if let Some(class) = element.class_name() {
            if !allowed.contains(class) {
                *unsupported.entry(class).or_insert(0) += 1;
            }
        }
    }

    if unsupported.is_empty() {
        println!("{}: all objects supported", args.file.display());
        return Ok(());
    }

    for (class, count) in &unsupported {
        println!("unsupported: {class} ({count}x)");
    }
    anyhow::bail!(
        "{}: {} unsupported class(es)",
        args.file.display(),
        unsupported.len()
    )
}
