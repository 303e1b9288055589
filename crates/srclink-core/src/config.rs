use std::path::PathBuf;

/// Dependency range prefix marking a sibling package linked from the workspace.
pub const DEFAULT_WORKSPACE_PROTOCOL: &str = "workspace:";

/// Namespace of the tooling's own packages; these are never live-aliased.
pub const DEFAULT_RESERVED_NAMESPACE: &str = "@wendraw/starry";

/// Configuration for alias and glob synthesis.
///
/// Both directories should be absolute and normalized the same way
/// (the CLI canonicalizes them), since package directories are compared
/// against `cwd` and `root` by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Workspace root directory, the starting point of the scan.
    pub root: PathBuf,

    /// Directory of the invoking package.
    pub cwd: PathBuf,

    /// Only packages whose name starts with this prefix get an alias.
    pub name_prefix: Option<String>,

    /// Packages whose name contains any of these are skipped.
    pub reserved_namespaces: Vec<String>,

    /// Version range prefix identifying workspace-linked dependencies.
    pub workspace_protocol: String,
}

impl Default for Config {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            root: cwd.clone(),
            cwd,
            name_prefix: None,
            reserved_namespaces: vec![DEFAULT_RESERVED_NAMESPACE.to_string()],
            workspace_protocol: DEFAULT_WORKSPACE_PROTOCOL.to_string(),
        }
    }
}

impl Config {
    /// Create a new config for the given workspace root and invoking package.
    #[must_use]
    pub fn new(root: PathBuf, cwd: PathBuf) -> Self {
        Self {
            root,
            cwd,
            ..Default::default()
        }
    }

    /// Set the package name prefix filter.
    #[must_use]
    pub fn with_name_prefix(mut self, prefix: Option<String>) -> Self {
        self.name_prefix = prefix;
        self
    }

    /// Replace the reserved namespaces.
    #[must_use]
    pub fn with_reserved_namespaces(mut self, namespaces: Vec<String>) -> Self {
        self.reserved_namespaces = namespaces;
        self
    }

    /// Set the workspace protocol prefix.
    #[must_use]
    pub fn with_workspace_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.workspace_protocol = protocol.into();
        self
    }

    /// Whether `name` falls in one of the reserved namespaces.
    #[must_use]
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_namespaces
            .iter()
            .any(|ns| !ns.is_empty() && name.contains(ns.as_str()))
    }

    /// Whether `name` passes the alias prefix filter.
    #[must_use]
    pub fn matches_prefix(&self, name: &str) -> bool {
        match self.name_prefix.as_deref() {
            Some(prefix) => name.starts_with(prefix),
            None => true,
        }
    }
}
