//! Workspace scanning for monorepos.
//!
//! Walks the workspace root recursively and records the manifest of every
//! directory that has one. Vendored dependency trees (`node_modules`) are
//! never entered. The walk is sequential and depth-first: a directory's
//! children are scanned before its own manifest is read.
//!
//! [`find_workspace_root`] locates the root from inside a package.

use crate::error::{Error, Result};
use crate::fs::SourceFs;
use crate::manifest::{read_manifest, Manifest, MANIFEST_FILE};
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory name marking vendored dependencies.
pub const VENDOR_DIR: &str = "node_modules";

/// pnpm's workspace definition file.
pub const PNPM_WORKSPACE_FILE: &str = "pnpm-workspace.yaml";

/// Package directory -> manifest, one entry per directory holding a manifest.
pub type WorkspaceMap = BTreeMap<PathBuf, Manifest>;

/// Find the workspace root by walking up the directory tree from `start`.
///
/// Returns the first directory containing `pnpm-workspace.yaml` or a
/// package.json with a "workspaces" field. Unreadable or malformed
/// package.json files on the way up are not errors; they just don't match.
pub async fn find_workspace_root<F: SourceFs>(fs: &F, start: &Path) -> Result<Option<PathBuf>> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let pnpm = dir.join(PNPM_WORKSPACE_FILE);
        if fs.exists(&pnpm).await.map_err(|source| Error::io(&pnpm, source))? {
            return Ok(Some(dir.to_path_buf()));
        }

        let package_json = dir.join(MANIFEST_FILE);
        if let Ok(content) = fs.read_to_string(&package_json).await {
            if let Ok(package) = serde_json::from_str::<Value>(&content) {
                if package.get("workspaces").is_some() {
                    return Ok(Some(dir.to_path_buf()));
                }
            }
        }

        current = dir.parent();
    }

    Ok(None)
}

/// Scan `root` and collect every package manifest below it (including its own).
///
/// A malformed manifest aborts the whole scan; no partial map is returned.
pub async fn scan_workspace<F: SourceFs>(fs: &F, root: &Path) -> Result<WorkspaceMap> {
    let mut packages = WorkspaceMap::new();
    scan_dir(fs, root.to_path_buf(), &mut packages).await?;
    debug!(root = %root.display(), count = packages.len(), "workspace scanned");
    Ok(packages)
}

fn scan_dir<'a, F: SourceFs>(
    fs: &'a F,
    dir: PathBuf,
    packages: &'a mut WorkspaceMap,
) -> BoxFuture<'a, Result<()>> {
    async move {
        let entries = fs
            .read_dir(&dir)
            .await
            .map_err(|source| Error::io(&dir, source))?;

        for name in &entries {
            if name.contains(VENDOR_DIR) {
                continue;
            }
            let child = dir.join(name);
            if fs.is_dir(&child) {
                scan_dir(fs, child, packages).await?;
            }
        }

        let mut candidates = entries
            .iter()
            .filter(|name| name.ends_with(MANIFEST_FILE))
            .filter(|name| !fs.is_dir(&dir.join(name.as_str())));

        if let Some(first) = candidates.next() {
            let ignored: Vec<&String> = candidates.collect();
            if !ignored.is_empty() {
                warn!(
                    dir = %dir.display(),
                    using = %first,
                    ?ignored,
                    "multiple manifest files in one directory, using the first"
                );
            }
            let manifest = read_manifest(fs, &dir.join(first)).await?;
            debug!(dir = %dir.display(), name = %manifest.name, "found package");
            packages.insert(dir, manifest);
        }

        Ok(())
    }
    .boxed()
}
