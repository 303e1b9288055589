//! Include/exclude globs separating a package's source from its build output.

use crate::manifest::Manifest;
use crate::workspace::VENDOR_DIR;
use srclink_util::path::{first_directory, has_extension};

/// Directory names commonly holding build output.
pub const OUTPUT_DIR_CANDIDATES: &[&str] = &["dist", "build", "output", "umd", "cjs", "esm"];

/// Directory names that may hold a package's source and must never be excluded.
pub const SOURCE_DIR_CANDIDATES: &[&str] = &["src", "source", "lib", "packages"];

/// Extensions of files that are source rather than output.
const SOURCE_FILE_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".jsx"];

/// Markers of minified or bundled artifacts.
const BUNDLED_MARKERS: &[&str] = &[".min.", ".bundle."];

/// Whether `path` points at a source file (not a minified/bundled artifact).
#[must_use]
pub fn is_source_file(path: &str) -> bool {
    has_extension(path, SOURCE_FILE_EXTENSIONS)
        && !BUNDLED_MARKERS.iter().any(|marker| path.contains(marker))
}

/// Whether `dir` is the package's source directory or a conventional one.
#[must_use]
pub fn is_source_dir(dir: &str, src_dir: &str) -> bool {
    dir == src_dir || SOURCE_DIR_CANDIDATES.contains(&dir)
}

/// Globs for one package at `relative_dir` (relative to the invoking package,
/// `/`-separated, non-empty).
///
/// The inclusion comes first so the exclusions that follow can veto it:
/// `node_modules`, the conventional output directories, and any output
/// directory the manifest's `main`/`module`/`exports` point into.
#[must_use]
pub fn package_globs(relative_dir: &str, manifest: &Manifest) -> Vec<String> {
    let mut globs = vec![format!("{relative_dir}/**/*")];
    let mut exclude = |dir: &str| {
        let glob = format!("!{relative_dir}/{dir}/**/*");
        if !globs.contains(&glob) {
            globs.push(glob);
        }
    };

    exclude(VENDOR_DIR);

    for &dir in OUTPUT_DIR_CANDIDATES {
        if !SOURCE_DIR_CANDIDATES.contains(&dir) {
            exclude(dir);
        }
    }

    let src_dir = manifest.src_dir();
    for output_path in manifest.output_paths() {
        let Some(dir) = first_directory(output_path) else {
            continue;
        };
        if !is_source_dir(dir, src_dir) && !is_source_file(output_path) {
            exclude(dir);
        }
    }

    globs
}
