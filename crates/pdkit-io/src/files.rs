//! Patch file reading and writing.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use pdkit_core::{Graph, ObjectRegistry, Patch, parse, serialize, to_graph_with, to_tree};
use tempfile::NamedTempFile;

use crate::{Error, Result};

/// Read and parse a patch file.
pub fn read_patch<P: AsRef<Path>>(path: P) -> Result<Patch> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let patch = parse(&text).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        "read_patch: {} ({} top-level elements)",
        path.display(),
        patch.elements.len()
    );
    Ok(patch)
}

/// Serialize a patch and write it to `path`.
///
/// The text goes to a temporary file next to `path` which then replaces it,
/// so an interrupted write never leaves a truncated patch behind.
pub fn write_patch<P: AsRef<Path>>(path: P, patch: &Patch) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    file.write_all(serialize(patch).as_bytes())
        .map_err(|e| Error::io(file.path(), e))?;
    file.persist(path).map_err(|e| Error::io(path, e.error))?;

    tracing::debug!("write_patch: {}", path.display());
    Ok(())
}

/// Read a patch file into a graph with vanilla port counts.
pub fn read_graph<P: AsRef<Path>>(path: P) -> Result<Graph> {
    read_graph_with(path, &ObjectRegistry::default())
}

/// Read a patch file into a graph, resolving classes through `registry`.
pub fn read_graph_with<P: AsRef<Path>>(path: P, registry: &ObjectRegistry) -> Result<Graph> {
    let patch = read_patch(path)?;
    Ok(to_graph_with(&patch, registry)?)
}

/// Write a graph as a patch file.
pub fn write_graph<P: AsRef<Path>>(path: P, graph: &Graph) -> Result<()> {
    write_patch(path, &to_tree(graph))
}

/// Write a patch to a fresh `.pd` file in the system temp directory.
///
/// The file is deleted when the returned handle is dropped. Runtimes and
/// compilers that only accept paths can be pointed at
/// [`NamedTempFile::path`].
pub fn export_temp(patch: &Patch) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("pdkit-")
        .suffix(".pd")
        .tempfile()
        .map_err(|e| Error::io(std::env::temp_dir(), e))?;
    file.write_all(serialize(patch).as_bytes())
        .map_err(|e| Error::io(file.path(), e))?;
    file.flush().map_err(|e| Error::io(file.path(), e))?;
    tracing::debug!("export_temp: {}", file.path().display());
    Ok(file)
}

/// Read a list of object class names, one per line.
///
/// Blank lines and lines starting with `#` are skipped; surrounding
/// whitespace is trimmed.
pub fn read_class_list<P: AsRef<Path>>(path: P) -> Result<BTreeSet<String>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PATCH: &str = "#N canvas 0 50 450 300 12;\n#X obj 10 10 osc~ 440;\n#X obj 10 40 dac~;\n#X connect 0 0 1 0;\n";

    #[test]
    fn write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.pd");
        let patch = parse(PATCH).unwrap();
        write_patch(&path, &patch).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), PATCH);
        assert_eq!(read_patch(&path).unwrap(), patch);
    }

    #[test]
    fn parse_error_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.pd");
        std::fs::write(&path, "#N canvas 0 50 450 300 12;\n#X connect a 0 1 0;\n").unwrap();
        let err = read_patch(&path).unwrap_err();
        let Error::Parse { path: reported, source } = &err else {
            panic!("expected parse error, got {err:?}");
        };
        assert_eq!(reported, &path);
        assert_eq!(source.line, 2);
    }

    #[test]
    fn export_temp_is_removed_on_drop() {
        let patch = parse(PATCH).unwrap();
        let file = export_temp(&patch).unwrap();
        let path = file.path().to_path_buf();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("pd"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), PATCH);
        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn class_list_skips_comments() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("allow.txt");
        std::fs::write(&path, "# heavy subset\nosc~\n\n  dac~  \n").unwrap();
        let classes = read_class_list(&path).unwrap();
        assert_eq!(classes.into_iter().collect::<Vec<_>>(), vec!["dac~", "osc~"]);
    }
}
