//! `srclink scan` command implementation.

use super::fail;
use miette::Result;
use srclink_core::{scan_workspace, TokioFs};
use std::path::Path;

/// List every package under `root`, ordered by directory.
pub async fn run(root: &Path, json: bool) -> Result<()> {
    let packages = match scan_workspace(&TokioFs, root).await {
        Ok(packages) => packages,
        Err(e) => fail(&e, json),
    };

    if json {
        let list: Vec<_> = packages
            .iter()
            .map(|(dir, manifest)| {
                serde_json::json!({
                    "name": manifest.name,
                    "dir": dir.to_string_lossy()
                })
            })
            .collect();

        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "root": root.to_string_lossy(),
                "packages": list
            })
        );
    } else {
        println!("Workspace root: {}", root.display());
        println!();
        println!("Packages ({}):", packages.len());
        for (dir, manifest) in &packages {
            let name = if manifest.name.is_empty() {
                "<unnamed>"
            } else {
                manifest.name.as_str()
            };
            println!("  {name}");
            println!("    {}", dir.display());
        }
    }

    Ok(())
}
