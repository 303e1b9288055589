//! Mapping an exports sub-path request back to a source-tree path.
//!
//! The exports map points at built output (`./dist/inner/index.js`). To get
//! the unbuilt equivalent the output directory prefix is dropped at the point
//! where the requested sub-path starts, and `.js`/`.mjs` become `.ts`.

use crate::manifest::{Condition, Manifest};
use srclink_util::path::segments;
use std::path::{Component, Path, PathBuf};

/// Normalize a sub-path remainder (`inner`, `a/../b`) into segments.
///
/// `..` pops the previous segment but never escapes the package root.
#[must_use]
pub fn subpath_segments(subpath: &Path) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for component in subpath.components() {
        match component {
            Component::Normal(name) => out.push(name.to_string_lossy().into_owned()),
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    out
}

/// The exports key for a set of sub-path segments: `["inner"]` gives `./inner`.
#[must_use]
pub fn export_key(segments: &[String]) -> String {
    if segments.is_empty() {
        ".".to_string()
    } else {
        format!("./{}", segments.join("/"))
    }
}

/// Drop the output-directory prefix from an export target.
///
/// The kept remainder starts at the first position where the requested
/// segments appear in the target; the last requested segment may also match
/// a file stem (`colors` matches `colors.mjs`). If the request never appears
/// the whole target is kept.
#[must_use]
pub fn strip_output_prefix(target: &str, request: &[String]) -> String {
    let target_segments = segments(target);
    let n = request.len();
    if n == 0 || target_segments.len() < n {
        return target_segments.join("/");
    }

    let matches_at = |start: usize| {
        request.iter().enumerate().all(|(offset, wanted)| {
            let seg = target_segments[start + offset];
            seg == wanted.as_str()
                || (offset == n - 1
                    && seg
                        .strip_prefix(wanted.as_str())
                        .is_some_and(|rest| rest.starts_with('.')))
        })
    };

    let start = (0..=target_segments.len() - n)
        .find(|&i| matches_at(i))
        .unwrap_or(0);
    target_segments[start..].join("/")
}

/// Rewrite a trailing `.js`/`.mjs` extension to `.ts`.
#[must_use]
pub fn rewrite_js_extension(path: PathBuf) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some("js" | "mjs") => path.with_extension("ts"),
        _ => path,
    }
}

/// Join a package-relative path (`./a/b`, `a/b`) onto the package directory.
#[must_use]
pub fn join_package_path(package_dir: &Path, relative: &str) -> PathBuf {
    segments(relative)
        .into_iter()
        .fold(package_dir.to_path_buf(), |acc, seg| acc.join(seg))
}

/// Outcome of looking a sub-path up in the exports map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRewrite {
    /// The exports key that matched.
    pub key: String,
    /// The condition used, `None` when no condition matched.
    pub condition: Option<Condition>,
    /// The derived path.
    pub path: PathBuf,
}

/// Rewrite a sub-path request through the manifest's exports map.
///
/// Returns `None` when the exports map has no entry for the sub-path.
/// A `source` condition names the source file directly and is used as is.
/// Otherwise the output target selected by the package's condition precedence
/// is mapped back: prefix dropped, joined to the package dir, `.js` to `.ts`.
/// An entry with no usable condition maps to the package dir itself.
#[must_use]
pub fn rewrite_export_subpath(
    package_dir: &Path,
    manifest: &Manifest,
    subpath: &Path,
) -> Option<ExportRewrite> {
    let request = subpath_segments(subpath);
    let key = export_key(&request);
    let conditions = manifest.export_entry(&key)?;

    if let Some(source) = conditions.get(Condition::Source) {
        return Some(ExportRewrite {
            key,
            condition: Some(Condition::Source),
            path: join_package_path(package_dir, source),
        });
    }

    let (condition, target) = match conditions.select(manifest.export_conditions()) {
        Some((condition, target)) => (Some(condition), target),
        None => (None, ""),
    };
    let kept = strip_output_prefix(target, &request);
    let path = rewrite_js_extension(join_package_path(package_dir, &kept));

    Some(ExportRewrite {
        key,
        condition,
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest(value: serde_json::Value) -> Manifest {
        serde_json::from_value(value).unwrap()
    }

    fn strs(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_subpath_segments() {
        assert_eq!(subpath_segments(Path::new("inner")), strs(&["inner"]));
        assert_eq!(subpath_segments(Path::new("a/./b/../c")), strs(&["a", "c"]));
        assert_eq!(subpath_segments(Path::new("../x")), strs(&["x"]));
        assert!(subpath_segments(Path::new("")).is_empty());
    }

    #[test]
    fn test_export_key() {
        assert_eq!(export_key(&[]), ".");
        assert_eq!(export_key(&strs(&["inner", "deep"])), "./inner/deep");
    }

    #[test]
    fn test_strip_output_prefix_directory() {
        assert_eq!(
            strip_output_prefix("./dist/inner/index.js", &strs(&["inner"])),
            "inner/index.js"
        );
    }

    #[test]
    fn test_strip_output_prefix_file_stem() {
        assert_eq!(
            strip_output_prefix("./esm/colors.mjs", &strs(&["colors"])),
            "colors.mjs"
        );
    }

    #[test]
    fn test_strip_output_prefix_multi_segment() {
        assert_eq!(
            strip_output_prefix("./dist/a/b/index.js", &strs(&["a", "b"])),
            "a/b/index.js"
        );
    }

    #[test]
    fn test_strip_output_prefix_whole_component_only() {
        // "inner-utils" must not count as a match for "inner".
        assert_eq!(
            strip_output_prefix("./dist/inner-utils/index.js", &strs(&["inner"])),
            "dist/inner-utils/index.js"
        );
    }

    #[test]
    fn test_strip_output_prefix_no_match_keeps_target() {
        assert_eq!(
            strip_output_prefix("./dist/other.js", &strs(&["inner"])),
            "dist/other.js"
        );
        assert_eq!(strip_output_prefix("", &strs(&["inner"])), "");
    }

    #[test]
    fn test_rewrite_js_extension() {
        assert_eq!(
            rewrite_js_extension(PathBuf::from("/w/lib/inner/index.js")),
            PathBuf::from("/w/lib/inner/index.ts")
        );
        assert_eq!(
            rewrite_js_extension(PathBuf::from("/w/lib/colors.mjs")),
            PathBuf::from("/w/lib/colors.ts")
        );
        assert_eq!(
            rewrite_js_extension(PathBuf::from("/w/lib/style.css")),
            PathBuf::from("/w/lib/style.css")
        );
        // Only a trailing extension is rewritten.
        assert_eq!(
            rewrite_js_extension(PathBuf::from("/w/lib.js/index.tsx")),
            PathBuf::from("/w/lib.js/index.tsx")
        );
    }

    #[test]
    fn test_rewrite_export_subpath_esm_import() {
        let m = manifest(json!({
            "name": "@wendraw/lib",
            "type": "module",
            "exports": {
                ".": { "default": "./dist/index.js" },
                "./inner": { "import": "./dist/inner/index.js" }
            }
        }));
        let rewrite = rewrite_export_subpath(Path::new("/w/lib"), &m, Path::new("inner")).unwrap();
        assert_eq!(rewrite.key, "./inner");
        assert_eq!(rewrite.condition, Some(Condition::Import));
        assert_eq!(rewrite.path, PathBuf::from("/w/lib/inner/index.ts"));
    }

    #[test]
    fn test_rewrite_export_subpath_esm_default_fallback() {
        let m = manifest(json!({
            "name": "x",
            "type": "module",
            "exports": { "./colors": { "default": "./dist/colors.mjs" } }
        }));
        let rewrite =
            rewrite_export_subpath(Path::new("/w/styles"), &m, Path::new("colors")).unwrap();
        assert_eq!(rewrite.condition, Some(Condition::Default));
        assert_eq!(rewrite.path, PathBuf::from("/w/styles/colors.ts"));
    }

    #[test]
    fn test_rewrite_export_subpath_cjs_uses_require() {
        let m = manifest(json!({
            "name": "x",
            "exports": {
                "./inner": { "import": "./esm/inner.js", "require": "./cjs/inner.js" }
            }
        }));
        let rewrite = rewrite_export_subpath(Path::new("/w/x"), &m, Path::new("inner")).unwrap();
        assert_eq!(rewrite.condition, Some(Condition::Require));
        assert_eq!(rewrite.path, PathBuf::from("/w/x/inner.ts"));
    }

    #[test]
    fn test_rewrite_export_subpath_missing_condition_collapses() {
        let m = manifest(json!({
            "name": "x",
            "exports": { "./inner": { "import": "./dist/inner/index.js" } }
        }));
        let rewrite = rewrite_export_subpath(Path::new("/w/x"), &m, Path::new("inner")).unwrap();
        assert_eq!(rewrite.condition, None);
        assert_eq!(rewrite.path, PathBuf::from("/w/x"));
    }

    #[test]
    fn test_rewrite_export_subpath_source_condition_wins() {
        let m = manifest(json!({
            "name": "x",
            "type": "module",
            "exports": {
                "./inner": { "import": "./dist/inner/index.js", "source": "./lib/inner/main.ts" }
            }
        }));
        let rewrite = rewrite_export_subpath(Path::new("/w/x"), &m, Path::new("inner")).unwrap();
        assert_eq!(rewrite.condition, Some(Condition::Source));
        assert_eq!(rewrite.path, PathBuf::from("/w/x/lib/inner/main.ts"));
    }

    #[test]
    fn test_rewrite_export_subpath_unknown_key() {
        let m = manifest(json!({
            "name": "x",
            "exports": { "./inner": "./dist/inner.js" }
        }));
        assert!(rewrite_export_subpath(Path::new("/w/x"), &m, Path::new("other")).is_none());
        let bare = manifest(json!({ "name": "y" }));
        assert!(rewrite_export_subpath(Path::new("/w/x"), &bare, Path::new("inner")).is_none());
    }
}
