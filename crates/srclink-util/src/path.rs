use std::path::{Component, Path, PathBuf};

/// Render a path with `/` separators, regardless of platform.
///
/// Root and prefix components are kept so absolute paths stay absolute.
#[must_use]
pub fn to_slash(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
            Component::RootDir => out.push('/'),
            Component::CurDir => {}
            Component::ParentDir => push_segment(&mut out, ".."),
            Component::Normal(name) => push_segment(&mut out, &name.to_string_lossy()),
        }
    }
    out
}

fn push_segment(out: &mut String, segment: &str) {
    if !out.is_empty() && !out.ends_with('/') {
        out.push('/');
    }
    out.push_str(segment);
}

/// Compute `path` relative to `base`.
///
/// Returns an empty path when both are equal and `None` when no relative
/// form exists (e.g. one is absolute and the other is not).
#[must_use]
pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    pathdiff::diff_paths(path, base)
}

/// The remainder of `path` below `base`, or `None` if `path` is not inside `base`.
///
/// Unlike substring removal this only matches whole components, so
/// `/w/lib-extra` is not considered to be inside `/w/lib`.
#[must_use]
pub fn subpath_of<'a>(path: &'a Path, base: &Path) -> Option<&'a Path> {
    path.strip_prefix(base).ok()
}

/// Split a `/`-separated package path into its meaningful segments.
///
/// Empty and `.` segments are dropped: `./dist//index.js` gives `["dist", "index.js"]`.
#[must_use]
pub fn segments(path: &str) -> Vec<&str> {
    path.split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

/// The first directory of a package-relative path.
///
/// `./dist/index.js` gives `Some("dist")`. A bare file name such as
/// `index.js` has no directory and gives `None`, as does a path that
/// starts by leaving the package (`../x.js`).
#[must_use]
pub fn first_directory(path: &str) -> Option<&str> {
    let trimmed = path
        .strip_prefix("./")
        .or_else(|| path.strip_prefix('/'))
        .unwrap_or(path);
    let (first, _) = trimmed.split_once('/')?;
    if first.is_empty() || first == "." || first == ".." {
        return None;
    }
    Some(first)
}

/// Whether any component of `path` contains `marker`.
#[must_use]
pub fn has_component_containing(path: &Path, marker: &str) -> bool {
    path.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().contains(marker),
        _ => false,
    })
}

/// Whether `path` ends with one of `extensions` (each given with its leading dot).
#[must_use]
pub fn has_extension(path: &str, extensions: &[&str]) -> bool {
    extensions.iter().any(|ext| path.ends_with(ext))
}
