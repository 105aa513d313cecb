//! Safety utilities to prevent clobbering chord charts with catalog output.
//!
//! The importer reads a plain-text chart file and writes a JSON catalog.
//! These checks make sure the catalog path can't point at the chart source.

use anyhow::{bail, Result};
use std::path::Path;

/// Whether two paths name the same file. Paths that exist are compared after
/// resolving `.`/`..` and symlinks.
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Validates that a catalog path is safe to overwrite.
///
/// Checks:
/// - Catalog must have a `.json` extension
/// - Catalog cannot be the same as any of the provided source paths
pub fn validate_catalog_path(catalog: &Path, source_paths: &[&Path]) -> Result<()> {
    let is_json = catalog
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if !is_json {
        bail!(
            "Safety check failed: catalog file '{}' must have a .json extension",
            catalog.display()
        );
    }

    for source in source_paths {
        if same_file(catalog, source) {
            bail!(
                "Safety check failed: catalog '{}' cannot be the same as source '{}'",
                catalog.display(),
                source.display()
            );
        }
    }

    Ok(())
}
