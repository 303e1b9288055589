pub mod info;
pub mod resolve;
pub mod scan;
pub mod version;

use srclink_core::{find_workspace_root, Error, TokioFs};
use std::path::{Path, PathBuf};

/// Pick the workspace root: the explicit flag, else the nearest ancestor of
/// `cwd` declaring a workspace, else `cwd` itself.
///
/// A relative `--root` is taken from the shell's working directory, like
/// `--cwd`, not from `--cwd`.
pub async fn resolve_root(explicit: Option<PathBuf>, cwd: &Path) -> PathBuf {
    if let Some(root) = explicit {
        let root = match std::env::current_dir() {
            Ok(shell_dir) if root.is_relative() => shell_dir.join(root),
            _ => root,
        };
        return dunce::canonicalize(&root).unwrap_or(root);
    }

    match find_workspace_root(&TokioFs, cwd).await {
        Ok(Some(root)) => root,
        Ok(None) => cwd.to_path_buf(),
        Err(e) => {
            tracing::debug!(error = %e, "workspace root lookup failed, using cwd");
            cwd.to_path_buf()
        }
    }
}

/// Report a failure and exit non-zero.
///
/// In JSON mode the error goes to stdout with a stable code; otherwise to stderr.
pub fn fail(err: &Error, json: bool) -> ! {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "ok": false,
                "error": {
                    "code": err.code(),
                    "message": err.to_string()
                }
            })
        );
    } else {
        eprintln!("error: {err}");
    }
    std::process::exit(1);
}
