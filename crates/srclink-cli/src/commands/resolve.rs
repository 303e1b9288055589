//! `srclink resolve` command implementation.

use super::fail;
use miette::Result;
use srclink_core::manifest::MANIFEST_FILE;
use srclink_core::{read_manifest, SourceResolver, TokioFs};
use std::path::Path;

/// Resolve `specifier` (or the package root) within `package_dir` to a source path.
pub async fn run(
    cwd: &Path,
    package_dir: &Path,
    specifier: Option<&Path>,
    json: bool,
) -> Result<()> {
    let package_dir = cwd.join(package_dir);
    let package_dir = dunce::canonicalize(&package_dir).unwrap_or(package_dir);

    let manifest = match read_manifest(&TokioFs, &package_dir.join(MANIFEST_FILE)).await {
        Ok(manifest) => manifest,
        Err(e) => fail(&e, json),
    };

    // Relative specifiers are taken from the package, not the shell.
    let specifier = specifier.map(|s| package_dir.join(s));

    let resolver = SourceResolver::new(package_dir.clone(), manifest);
    let resolved = match resolver.resolve(&TokioFs, specifier.as_deref()).await {
        Ok(path) => path,
        Err(e) => fail(&e, json),
    };

    if json {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "package": resolver.manifest().name,
                "package_dir": package_dir.to_string_lossy(),
                "resolved": resolved.to_string_lossy()
            })
        );
    } else {
        println!("{}", resolved.display());
    }

    Ok(())
}
