//! `srclink info` command implementation.
//!
//! Prints the aliases and source globs the invoking package would get.

use super::fail;
use miette::Result;
use srclink_core::{generate, Config, TokioFs};
use std::path::PathBuf;

/// Run the info command.
pub async fn run(
    root: PathBuf,
    cwd: PathBuf,
    prefix: Option<String>,
    reserved: Vec<String>,
    json: bool,
) -> Result<()> {
    let mut config = Config::new(root, cwd).with_name_prefix(prefix);
    if !reserved.is_empty() {
        config = config.with_reserved_namespaces(reserved);
    }

    let info = match generate(&TokioFs, &config).await {
        Ok(info) => info,
        Err(e) => fail(&e, json),
    };

    if json {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "root": config.root.to_string_lossy(),
                "cwd": config.cwd.to_string_lossy(),
                "aliases": info.aliases,
                "excluded_deps": info.excluded_deps(),
                "globs": info.globs
            })
        );
    } else {
        println!("Aliases ({}):", info.aliases.len());
        for alias in &info.aliases {
            println!("  {} -> {}", alias.find, alias.replacement.display());
        }
        println!();
        println!("Globs ({}):", info.globs.len());
        for glob in &info.globs {
            println!("  {glob}");
        }
    }

    Ok(())
}
