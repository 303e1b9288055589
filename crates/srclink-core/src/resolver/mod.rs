//! Source path resolver for workspace packages.
//!
//! Maps an import of a package's published entry (built output under `dist/`
//! and friends) back to the file in the package's source tree.

mod exports;
mod source;

pub use exports::{
    export_key, join_package_path, rewrite_export_subpath, rewrite_js_extension,
    strip_output_prefix, subpath_segments, ExportRewrite,
};
pub use source::{find_source_path, resolve_source_path, SourceResolver, SOURCE_EXTENSIONS};
