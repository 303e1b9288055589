//! Alias and glob synthesis for the invoking package.
//!
//! Turns a scanned workspace into what a bundler's dev server consumes:
//! - one alias per workspace-linked sibling package, redirecting its name to
//!   the package directory and resolving imports into the source tree;
//! - include/exclude globs that point a file-scanning subsystem (auto-import
//!   discovery) at those packages' sources and away from their build output.

mod globs;

pub use globs::{
    is_source_dir, is_source_file, package_globs, OUTPUT_DIR_CANDIDATES, SOURCE_DIR_CANDIDATES,
};

use crate::config::Config;
use crate::error::Result;
use crate::fs::SourceFs;
use crate::manifest::{read_manifest, Manifest, MANIFEST_FILE};
use crate::resolver::SourceResolver;
use crate::workspace::{scan_workspace, WorkspaceMap, VENDOR_DIR};
use serde::Serialize;
use srclink_util::path::{has_component_containing, relative_to, to_slash};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Why a scanned package gets neither alias nor globs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Lives inside a vendored dependency tree.
    Vendored,
    /// Is the invoking package itself.
    InvokingPackage,
    /// Not a workspace-linked dependency of the invoking package.
    NotWorkspaceDependency,
    /// Declared `buildOptions.isLib`; consumed as built output.
    Library,
    /// Name falls in a reserved namespace.
    ReservedNamespace,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Vendored => "VENDORED",
            Self::InvokingPackage => "INVOKING_PACKAGE",
            Self::NotWorkspaceDependency => "NOT_WORKSPACE_DEPENDENCY",
            Self::Library => "LIBRARY",
            Self::ReservedNamespace => "RESERVED_NAMESPACE",
        };
        write!(f, "{s}")
    }
}

/// Apply the eligibility filters, in order, to one scanned package.
#[must_use]
pub fn skip_reason(
    config: &Config,
    invoking: &Manifest,
    dir: &Path,
    manifest: &Manifest,
) -> Option<SkipReason> {
    if has_component_containing(dir, VENDOR_DIR) {
        return Some(SkipReason::Vendored);
    }
    if dir == config.cwd {
        return Some(SkipReason::InvokingPackage);
    }
    if !invoking.has_workspace_dependency(&manifest.name, &config.workspace_protocol) {
        return Some(SkipReason::NotWorkspaceDependency);
    }
    if manifest.is_lib() {
        return Some(SkipReason::Library);
    }
    if config.is_reserved(&manifest.name) {
        return Some(SkipReason::ReservedNamespace);
    }
    None
}

/// A package name redirected to its directory, with its source resolver.
#[derive(Debug, Clone, Serialize)]
pub struct AliasEntry {
    /// Package name to match in import specifiers.
    pub find: String,
    /// Directory the name is replaced with.
    pub replacement: PathBuf,
    #[serde(skip)]
    resolver: SourceResolver,
}

impl AliasEntry {
    #[must_use]
    pub fn new(dir: PathBuf, manifest: Manifest) -> Self {
        Self {
            find: manifest.name.clone(),
            replacement: dir.clone(),
            resolver: SourceResolver::new(dir, manifest),
        }
    }

    /// Resolve an alias-rewritten import (`replacement` plus optional sub-path).
    pub async fn resolve<F: SourceFs>(&self, fs: &F, specifier: Option<&Path>) -> Result<PathBuf> {
        self.resolver.resolve(fs, specifier).await
    }

    /// The manifest captured when the alias was created.
    #[must_use]
    pub fn manifest(&self) -> &Manifest {
        self.resolver.manifest()
    }
}

/// Aliases and globs for the invoking package.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MonorepoInfo {
    pub aliases: Vec<AliasEntry>,
    /// Inclusion globs and `!`-prefixed exclusions, relative to `cwd`.
    pub globs: Vec<String>,
}

impl MonorepoInfo {
    /// Aliased package names, for a bundler's dependency pre-bundling exclude list.
    #[must_use]
    pub fn excluded_deps(&self) -> Vec<&str> {
        self.aliases.iter().map(|a| a.find.as_str()).collect()
    }

    /// The alias for a package name, if any.
    #[must_use]
    pub fn alias(&self, name: &str) -> Option<&AliasEntry> {
        self.aliases.iter().find(|a| a.find == name)
    }
}

/// Build aliases and globs from a scanned workspace.
///
/// `invoking` is the manifest of the package at `config.cwd`; only its
/// workspace-linked dependencies are considered.
#[must_use]
pub fn synthesize(config: &Config, invoking: &Manifest, packages: &WorkspaceMap) -> MonorepoInfo {
    let mut info = MonorepoInfo::default();

    for (dir, manifest) in packages {
        if let Some(reason) = skip_reason(config, invoking, dir, manifest) {
            debug!(dir = %dir.display(), name = %manifest.name, %reason, "package skipped");
            continue;
        }

        if config.matches_prefix(&manifest.name) {
            debug!(name = %manifest.name, dir = %dir.display(), "alias");
            info.aliases.push(AliasEntry::new(dir.clone(), manifest.clone()));
        }

        if dir == &config.root {
            continue;
        }
        let Some(relative_dir) = relative_to(dir, &config.cwd) else {
            continue;
        };
        if relative_dir.as_os_str().is_empty() {
            continue;
        }
        info.globs
            .extend(package_globs(&to_slash(&relative_dir), manifest));
    }

    info
}

/// Scan the workspace, read the invoking package's manifest and synthesize.
pub async fn generate<F: SourceFs>(fs: &F, config: &Config) -> Result<MonorepoInfo> {
    let packages = scan_workspace(fs, &config.root).await?;
    let invoking = read_manifest(fs, &config.cwd.join(MANIFEST_FILE)).await?;
    let info = synthesize(config, &invoking, &packages);
    debug!(
        aliases = info.aliases.len(),
        globs = info.globs.len(),
        "monorepo info generated"
    );
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::TokioFs;
    use serde_json::json;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn manifest(value: serde_json::Value) -> Manifest {
        serde_json::from_value(value).unwrap()
    }

    fn named(name: &str) -> Manifest {
        manifest(json!({ "name": name }))
    }

    fn write(path: &Path, body: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    /// A workspace with an app depending on two linked packages.
    fn workspace() -> (TempDir, Config) {
        let root = tempdir().unwrap();
        let r = root.path();
        write(&r.join("package.json"), r#"{"name": "monorepo", "private": true}"#);
        write(
            &r.join("apps/site/package.json"),
            &json!({
                "name": "@wendraw/site",
                "dependencies": {
                    "@wendraw/lib": "workspace:*",
                    "@wendraw/styles": "workspace:^",
                    "@wendraw/core": "workspace:*",
                    "@wendraw/starry-cli": "workspace:*",
                    "vue": "^3.4.0"
                },
                "devDependencies": { "@wendraw/utils": "^1.0.0" }
            })
            .to_string(),
        );
        write(
            &r.join("packages/lib/package.json"),
            r#"{"name": "@wendraw/lib", "type": "module", "main": "./build/index.js"}"#,
        );
        write(&r.join("packages/lib/src/index.ts"), "export {}");
        write(
            &r.join("packages/styles/package.json"),
            &json!({
                "name": "@wendraw/styles",
                "type": "module",
                "exports": {
                    ".": { "import": "./dist/index.js" },
                    "./colors": { "import": "./dist/colors/index.js" }
                }
            })
            .to_string(),
        );
        write(&r.join("packages/styles/src/colors/index.ts"), "export {}");
        write(
            &r.join("packages/core/package.json"),
            r#"{"name": "@wendraw/core", "buildOptions": {"isLib": true}}"#,
        );
        write(
            &r.join("packages/starry-cli/package.json"),
            r#"{"name": "@wendraw/starry-cli"}"#,
        );
        write(
            &r.join("packages/utils/package.json"),
            r#"{"name": "@wendraw/utils"}"#,
        );
        write(
            &r.join("apps/site/node_modules/@wendraw/lib/package.json"),
            r#"{"name": "@wendraw/lib"}"#,
        );

        let config = Config::new(r.to_path_buf(), r.join("apps/site"));
        (root, config)
    }

    #[tokio::test]
    async fn test_generate_aliases_eligible_packages_only() {
        let (root, config) = workspace();
        let info = generate(&TokioFs, &config).await.unwrap();

        let names = info.excluded_deps();
        assert_eq!(names, vec!["@wendraw/lib", "@wendraw/styles"]);
        assert_eq!(
            info.alias("@wendraw/lib").unwrap().replacement,
            root.path().join("packages/lib")
        );
    }

    #[tokio::test]
    async fn test_alias_resolves_into_source() {
        let (root, config) = workspace();
        let info = generate(&TokioFs, &config).await.unwrap();

        let lib = info.alias("@wendraw/lib").unwrap();
        let resolved = lib.resolve(&TokioFs, Some(lib.replacement.as_path())).await.unwrap();
        assert_eq!(resolved, root.path().join("packages/lib/src/index.ts"));

        let styles = info.alias("@wendraw/styles").unwrap();
        let colors = styles.replacement.join("colors");
        let resolved = styles.resolve(&TokioFs, Some(colors.as_path())).await.unwrap();
        assert_eq!(
            resolved,
            root.path().join("packages/styles/src/colors/index.ts")
        );
    }

    #[tokio::test]
    async fn test_generate_globs() {
        let (_root, config) = workspace();
        let info = generate(&TokioFs, &config).await.unwrap();

        assert_eq!(info.globs[0], "../../packages/lib/**/*");
        assert!(info
            .globs
            .contains(&"!../../packages/lib/build/**/*".to_string()));
        assert!(info
            .globs
            .contains(&"!../../packages/styles/dist/**/*".to_string()));
        assert!(!info.globs.iter().any(|g| g.contains("packages/core")));
        assert!(!info.globs.iter().any(|g| g.contains("packages/utils")));
        assert!(!info.globs.iter().any(|g| g.contains("starry-cli")));
        assert!(!info.globs.iter().any(|g| g.contains("node_modules/@wendraw")));

        let styles_include = info
            .globs
            .iter()
            .position(|g| g == "../../packages/styles/**/*")
            .unwrap();
        let styles_dist = info
            .globs
            .iter()
            .position(|g| g == "!../../packages/styles/dist/**/*")
            .unwrap();
        assert!(styles_include < styles_dist);
    }

    #[tokio::test]
    async fn test_prefix_limits_aliases_not_globs() {
        let (_root, config) = workspace();
        let config = config.with_name_prefix(Some("@wendraw/sty".to_string()));
        let info = generate(&TokioFs, &config).await.unwrap();

        assert_eq!(info.excluded_deps(), vec!["@wendraw/styles"]);
        assert!(info.globs.contains(&"../../packages/lib/**/*".to_string()));
    }

    #[tokio::test]
    async fn test_generate_missing_invoking_manifest() {
        let (root, _config) = workspace();
        let config = Config::new(root.path().to_path_buf(), root.path().join("apps/none"));
        let err = generate(&TokioFs, &config).await.unwrap_err();
        assert!(matches!(err, crate::Error::ManifestNotFound { .. }));
    }

    #[test]
    fn test_skip_reasons_in_order() {
        let config = Config::new(PathBuf::from("/w"), PathBuf::from("/w/app"));
        let invoking = manifest(json!({
            "name": "app",
            "dependencies": {
                "lib": "workspace:*",
                "core": "workspace:*",
                "@wendraw/starry": "workspace:*",
                "app": "workspace:*"
            }
        }));

        let lib = manifest(json!({ "name": "lib" }));
        assert_eq!(
            skip_reason(&config, &invoking, Path::new("/w/node_modules/lib"), &lib),
            Some(SkipReason::Vendored)
        );
        assert_eq!(
            skip_reason(&config, &invoking, Path::new("/w/app"), &named("app")),
            Some(SkipReason::InvokingPackage)
        );
        assert_eq!(
            skip_reason(&config, &invoking, Path::new("/w/other"), &named("other")),
            Some(SkipReason::NotWorkspaceDependency)
        );
        assert_eq!(
            skip_reason(
                &config,
                &invoking,
                Path::new("/w/core"),
                &manifest(json!({ "name": "core", "buildOptions": { "isLib": true } }))
            ),
            Some(SkipReason::Library)
        );
        assert_eq!(
            skip_reason(&config, &invoking, Path::new("/w/starry"), &named("@wendraw/starry")),
            Some(SkipReason::ReservedNamespace)
        );
        assert_eq!(skip_reason(&config, &invoking, Path::new("/w/lib"), &lib), None);
    }

    #[test]
    fn test_synthesize_root_package_gets_alias_but_no_globs() {
        let config = Config::new(PathBuf::from("/w"), PathBuf::from("/w/app"));
        let invoking = manifest(json!({
            "name": "app",
            "dependencies": { "monorepo": "workspace:*" }
        }));
        let mut packages = WorkspaceMap::new();
        packages.insert(PathBuf::from("/w"), manifest(json!({ "name": "monorepo" })));

        let info = synthesize(&config, &invoking, &packages);
        assert_eq!(info.excluded_deps(), vec!["monorepo"]);
        assert!(info.globs.is_empty());
    }

    #[test]
    fn test_alias_captures_manifest_by_value() {
        let config = Config::new(PathBuf::from("/w"), PathBuf::from("/w/app"));
        let invoking = manifest(json!({
            "name": "app",
            "dependencies": { "lib": "workspace:*" }
        }));
        let mut packages = WorkspaceMap::new();
        packages.insert(
            PathBuf::from("/w/lib"),
            manifest(json!({ "name": "lib", "main": "./dist/index.js" })),
        );

        let info = synthesize(&config, &invoking, &packages);
        packages.get_mut(Path::new("/w/lib")).unwrap().main = Some("./other.js".to_string());

        let alias = info.alias("lib").unwrap();
        assert_eq!(alias.manifest().main.as_deref(), Some("./dist/index.js"));
        assert_eq!(alias.replacement, PathBuf::from("/w/lib"));
    }

    #[test]
    fn test_serialized_shape() {
        let config = Config::new(PathBuf::from("/w"), PathBuf::from("/w/app"));
        let invoking = manifest(json!({
            "name": "app",
            "dependencies": { "lib": "workspace:*" }
        }));
        let mut packages = WorkspaceMap::new();
        packages.insert(PathBuf::from("/w/lib"), manifest(json!({ "name": "lib" })));

        let value = serde_json::to_value(synthesize(&config, &invoking, &packages)).unwrap();
        assert_eq!(value["aliases"][0]["find"], "lib");
        assert_eq!(value["aliases"][0]["replacement"], "/w/lib");
        assert_eq!(value["globs"][0], "../lib/**/*");
    }
}
