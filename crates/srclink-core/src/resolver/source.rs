//! Source path resolution for a single workspace package.
//!
//! Given a package directory, its manifest and the (already alias-rewritten)
//! import path, find the file in the package's source tree that the built
//! entry was compiled from:
//! 1. An existing regular file is returned as is.
//! 2. A sub-path request with an exports entry is mapped back through it
//!    (see [`super::exports`]).
//! 3. The source-directory search probes `<srcDir>/` then the package root,
//!    for each of `.ts`, `.tsx`, `.jsx`, `.mjs`, first hit wins.
//!
//! Nothing here fails for "not found": the best-effort path comes back and
//! the bundler reports the unresolved module. Only probe I/O errors propagate.

use super::exports::rewrite_export_subpath;
use crate::error::{Error, Result};
use crate::fs::SourceFs;
use crate::manifest::Manifest;
use srclink_util::path::subpath_of;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// Source file extensions, in probe priority order.
pub const SOURCE_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".jsx", ".mjs"];

/// Resolve the source file for an import of a workspace package.
///
/// `specifier` is the absolute path the importer asked for: `package_dir`
/// itself for the package root, or `package_dir` plus an exports sub-path.
/// `None` means the package root.
pub async fn resolve_source_path<F: SourceFs>(
    fs: &F,
    package_dir: &Path,
    manifest: &Manifest,
    specifier: Option<&Path>,
) -> Result<PathBuf> {
    let probe = specifier.unwrap_or(package_dir);

    if is_regular_file(fs, probe).await? {
        trace!(path = %probe.display(), "specifier is an existing file");
        return Ok(probe.to_path_buf());
    }

    let Some(subpath) = subpath_of(probe, package_dir) else {
        debug!(
            specifier = %probe.display(),
            package_dir = %package_dir.display(),
            "specifier outside package directory, left unchanged"
        );
        return Ok(probe.to_path_buf());
    };

    let candidate = if subpath.as_os_str().is_empty() {
        if let Some(entry) = manifest.entry_path() {
            trace!(package = %manifest.name, entry, "nominal built entry");
        }
        probe.to_path_buf()
    } else {
        match rewrite_export_subpath(package_dir, manifest, subpath) {
            Some(rewrite) => {
                debug!(
                    package = %manifest.name,
                    key = %rewrite.key,
                    condition = ?rewrite.condition,
                    path = %rewrite.path.display(),
                    "rewrote exports sub-path"
                );
                if rewrite.path != probe && is_regular_file(fs, &rewrite.path).await? {
                    return Ok(rewrite.path);
                }
                rewrite.path
            }
            None => probe.to_path_buf(),
        }
    };

    find_source_path(fs, package_dir, manifest, &candidate).await
}

/// Search the package's source tree for `probe`.
///
/// The remainder of `probe` below `package_dir` (or `index<ext>` when there
/// is none) is tried under `<package_dir>/<srcDir>` and then directly under
/// `<package_dir>`, for each source extension in order. The first existing
/// candidate is returned; if none exists `probe` comes back unchanged.
pub async fn find_source_path<F: SourceFs>(
    fs: &F,
    package_dir: &Path,
    manifest: &Manifest,
    probe: &Path,
) -> Result<PathBuf> {
    let suffix = subpath_of(probe, package_dir)
        .filter(|rest| !rest.as_os_str().is_empty())
        .map(Path::to_path_buf);
    let src_root = package_dir.join(manifest.src_dir());

    for ext in SOURCE_EXTENSIONS {
        let leaf = suffix
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("index{ext}")));

        for candidate in [src_root.join(&leaf), package_dir.join(&leaf)] {
            let found = fs
                .exists(&candidate)
                .await
                .map_err(|source| Error::io(&candidate, source))?;
            trace!(path = %candidate.display(), found, "probe");
            if found {
                debug!(
                    package = %manifest.name,
                    path = %candidate.display(),
                    "resolved source path"
                );
                return Ok(candidate);
            }
        }

        // A fixed suffix yields the same candidates for every extension.
        if suffix.is_some() {
            break;
        }
    }

    debug!(
        package = %manifest.name,
        path = %probe.display(),
        "no source candidate found, falling back"
    );
    Ok(probe.to_path_buf())
}

async fn is_regular_file<F: SourceFs>(fs: &F, path: &Path) -> Result<bool> {
    let exists = fs
        .exists(path)
        .await
        .map_err(|source| Error::io(path, source))?;
    Ok(exists && !fs.is_dir(path))
}

/// A package's resolver with its directory and manifest captured by value.
///
/// Built once per alias; later workspace scans do not affect it.
#[derive(Debug, Clone)]
pub struct SourceResolver {
    package_dir: PathBuf,
    manifest: Arc<Manifest>,
}

impl SourceResolver {
    #[must_use]
    pub fn new(package_dir: PathBuf, manifest: Manifest) -> Self {
        Self {
            package_dir,
            manifest: Arc::new(manifest),
        }
    }

    #[must_use]
    pub fn package_dir(&self) -> &Path {
        &self.package_dir
    }

    #[must_use]
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Resolve an import of this package to its source file.
    pub async fn resolve<F: SourceFs>(&self, fs: &F, specifier: Option<&Path>) -> Result<PathBuf> {
        resolve_source_path(fs, &self.package_dir, &self.manifest, specifier).await
    }
}
