//! Externals discovery.
//!
//! Scans directories for abstraction `.pd` files, whose port counts are read
//! from their top-level `inlet`/`outlet` objects, and for compiled externals,
//! whose port counts cannot be known.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use pdkit_core::{ObjectRegistry, ast};

use crate::{Result, read_patch};

/// External name to `(inlets, outlets)`. Binaries have `(None, None)`.
pub type ExternalsRegistry = BTreeMap<String, (Option<usize>, Option<usize>)>;

/// File extensions of compiled externals on the current platform.
pub fn binary_extensions() -> &'static [&'static str] {
    #[cfg(target_os = "macos")]
    {
        &[".pd_darwin", ".d_fat", ".d_amd64", ".d_arm64"]
    }
    #[cfg(target_os = "linux")]
    {
        &[".pd_linux", ".l_amd64", ".l_arm64", ".l_arm"]
    }
    #[cfg(target_os = "windows")]
    {
        &[".dll", ".m_amd64", ".m_i386"]
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        &[]
    }
}

/// Standard externals directories for the current platform that exist.
///
/// # Platform Paths
///
/// - Linux: `~/.local/lib/pd/extra`, `/usr/lib/pd/extra`, `/usr/local/lib/pd/extra`
/// - macOS: `~/Library/Pd`, `~/Library/Pd/externals`, `/usr/local/lib/pd/extra`,
///   and `Contents/Resources/extra` of every `/Applications/Pd*.app`
/// - Windows: `%APPDATA%\Pd\extra`, `C:\Program Files\Pd\extra`
pub fn default_search_paths() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join("Library/Pd"));
            candidates.push(home.join("Library/Pd/externals"));
        }
        candidates.push(PathBuf::from("/usr/local/lib/pd/extra"));
        if let Ok(entries) = std::fs::read_dir("/Applications") {
            let mut apps: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| {
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with("Pd") && n.ends_with(".app"))
                })
                .collect();
            apps.sort();
            candidates.extend(apps.into_iter().map(|app| app.join("Contents/Resources/extra")));
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".local/lib/pd/extra"));
        }
        candidates.push(PathBuf::from("/usr/lib/pd/extra"));
        candidates.push(PathBuf::from("/usr/local/lib/pd/extra"));
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = dirs::config_dir() {
            candidates.push(appdata.join("Pd").join("extra"));
        }
        candidates.push(PathBuf::from("C:\\Program Files\\Pd\\extra"));
    }

    candidates.retain(|path| path.is_dir());
    candidates
}

/// Port counts of the abstraction stored at `path`.
///
/// Only top-level boundary objects count; those inside subpatches belong to
/// the subpatch.
pub fn abstraction_arity<P: AsRef<Path>>(path: P) -> Result<(usize, usize)> {
    let patch = read_patch(path)?;
    Ok(ast::infer_arity(&patch.elements))
}

/// Scans `paths`, then the platform defaults if `include_defaults`.
///
/// Entries are visited in name order within each directory and the first
/// directory that provides a name wins. Missing or unreadable directories
/// and abstractions that fail to parse are skipped with a warning.
pub fn discover_externals<I>(paths: I, include_defaults: bool) -> ExternalsRegistry
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    let mut search: Vec<PathBuf> = paths
        .into_iter()
        .map(|p| p.as_ref().to_path_buf())
        .collect();
    if include_defaults {
        search.extend(default_search_paths());
    }

    let mut registry = ExternalsRegistry::new();
    for dir in &search {
        scan_dir(dir, &mut registry);
    }
    tracing::debug!(
        "discover_externals: {} name(s) from {} dir(s)",
        registry.len(),
        search.len()
    );
    registry
}

fn scan_dir(dir: &Path, registry: &mut ExternalsRegistry) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("skipping {}: {e}", dir.display());
            return;
        }
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    for path in files {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if let Some(name) = file_name.strip_suffix(".pd") {
            if name.is_empty() || registry.contains_key(name) {
                continue;
            }
            match abstraction_arity(&path) {
                Ok((inlets, outlets)) => {
                    registry.insert(name.to_string(), (Some(inlets), Some(outlets)));
                }
                Err(e) => tracing::warn!("skipping abstraction: {e}"),
            }
            continue;
        }

        if let Some(name) = binary_extensions()
            .iter()
            .find_map(|ext| file_name.strip_suffix(ext))
        {
            if !name.is_empty() {
                registry.entry(name.to_string()).or_insert((None, None));
            }
        }
    }
}

/// Vanilla registry extended with discovered externals.
pub fn registry_with_externals(externals: &ExternalsRegistry) -> ObjectRegistry {
    let mut registry = ObjectRegistry::new();
    registry.extend(
        externals
            .iter()
            .map(|(name, &(inlets, outlets))| (name.as_str(), inlets, outlets)),
    );
    registry
}
