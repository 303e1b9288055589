//! Package manifest (package.json) model.
//!
//! Only the fields that matter for source aliasing are modeled. `exports`
//! is normalized on read into a map from sub-path key (`.` or `./...`) to a
//! condition set, whatever shape the file used:
//! - `exports: "./dist/index.js"` - string shorthand for the `.` key
//! - `exports: { "./feature": "./dist/feature.js" }` - bare string targets (`default`)
//! - `exports: { ".": { "import": ..., "require": ..., "default": ... } }`
//! - `exports: { "import": ..., "require": ... }` - root conditions without `.`

use crate::error::{Error, Result};
use crate::fs::SourceFs;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// File name suffix identifying a manifest during workspace scans.
pub const MANIFEST_FILE: &str = "package.json";

/// Default source directory when `buildOptions.srcDir` is not set.
pub const DEFAULT_SRC_DIR: &str = "src";

/// Module system declared by the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    Module,
    Commonjs,
    Unknown,
}

impl ModuleType {
    fn from_field(value: &str) -> Self {
        match value {
            "module" => Self::Module,
            "commonjs" => Self::Commonjs,
            _ => Self::Unknown,
        }
    }
}

/// A single export condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Import,
    Default,
    Require,
    Source,
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Import => write!(f, "import"),
            Self::Default => write!(f, "default"),
            Self::Require => write!(f, "require"),
            Self::Source => write!(f, "source"),
        }
    }
}

/// Condition precedence for ESM packages.
const ESM_CONDITIONS: &[Condition] = &[Condition::Import, Condition::Default];

/// Condition precedence for CommonJS packages (and packages without `type`).
const CJS_CONDITIONS: &[Condition] = &[Condition::Require];

/// Target paths for one `exports` key, each relative to the package root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require: Option<String>,
    /// Source file path, when the package declares it explicitly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ExportConditions {
    /// The target for a single condition. Empty strings count as absent.
    #[must_use]
    pub fn get(&self, condition: Condition) -> Option<&str> {
        let value = match condition {
            Condition::Import => self.import.as_deref(),
            Condition::Default => self.default.as_deref(),
            Condition::Require => self.require.as_deref(),
            Condition::Source => self.source.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }

    /// The first target present in `order`, with the condition that matched.
    #[must_use]
    pub fn select(&self, order: &[Condition]) -> Option<(Condition, &str)> {
        order
            .iter()
            .find_map(|&condition| self.get(condition).map(|target| (condition, target)))
    }

    /// Built-output targets in `import`, `default`, `require` order.
    pub fn output_targets(&self) -> impl Iterator<Item = &str> {
        [Condition::Import, Condition::Default, Condition::Require]
            .into_iter()
            .filter_map(move |condition| self.get(condition))
    }
}

/// Normalized `exports` map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExportsMap(BTreeMap<String, ExportConditions>);

impl ExportsMap {
    /// Look up an exact sub-path key such as `.` or `./inner`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ExportConditions> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExportConditions)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, ExportConditions)> for ExportsMap {
    fn from_iter<I: IntoIterator<Item = (String, ExportConditions)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .filter(|(key, _)| is_export_key(key))
                .collect(),
        )
    }
}

/// Every exports key is either `.` or starts with `./`.
fn is_export_key(key: &str) -> bool {
    key == "." || key.starts_with("./")
}

/// `exports` as written in the file, before normalization.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawExports {
    Path(String),
    Map(BTreeMap<String, RawTarget>),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTarget {
    Path(String),
    Nested(BTreeMap<String, RawTarget>),
    Other(IgnoredAny),
}

impl RawTarget {
    /// Flatten a target to a single path, descending into nested conditions.
    fn into_path(self) -> Option<String> {
        match self {
            Self::Path(s) => Some(s),
            Self::Nested(mut map) => ["import", "default", "require"]
                .into_iter()
                .find_map(|key| map.remove(key).and_then(Self::into_path)),
            Self::Other(_) => None,
        }
    }

    fn into_conditions(self) -> ExportConditions {
        match self {
            Self::Path(s) => ExportConditions {
                default: Some(s),
                ..Default::default()
            },
            Self::Nested(mut map) => {
                let mut take = |key: &str| map.remove(key).and_then(Self::into_path);
                ExportConditions {
                    import: take("import"),
                    default: take("default"),
                    require: take("require"),
                    source: take("source"),
                }
            }
            Self::Other(_) => ExportConditions::default(),
        }
    }
}

impl From<RawExports> for ExportsMap {
    fn from(raw: RawExports) -> Self {
        match raw {
            RawExports::Path(s) => {
                std::iter::once((".".to_string(), RawTarget::Path(s).into_conditions())).collect()
            }
            RawExports::Map(map) if map.keys().all(|k| k.starts_with('.')) => map
                .into_iter()
                .map(|(key, target)| (key, target.into_conditions()))
                .collect(),
            RawExports::Map(map) => {
                std::iter::once((".".to_string(), RawTarget::Nested(map).into_conditions()))
                    .collect()
            }
            RawExports::Other(_) => Self::default(),
        }
    }
}

impl<'de> Deserialize<'de> for ExportsMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        RawExports::deserialize(deserializer).map(Self::from)
    }
}

/// Build options read by the workspace tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
    /// Library packages are consumed as built output and never aliased.
    #[serde(default, deserialize_with = "lenient::truthy")]
    pub is_lib: bool,
    /// Source directory, relative to the package root.
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub src_dir: Option<String>,
}

/// A parsed package manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Package name. Missing names deserialize as empty and never match a dependency.
    #[serde(default, deserialize_with = "lenient::name")]
    pub name: String,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::module_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub module_type: Option<ModuleType>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exports: Option<ExportsMap>,
    #[serde(
        default,
        deserialize_with = "lenient::build_options",
        skip_serializing_if = "Option::is_none"
    )]
    pub build_options: Option<BuildOptions>,
    #[serde(
        default,
        deserialize_with = "lenient::ranges",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub dependencies: BTreeMap<String, String>,
    #[serde(
        default,
        deserialize_with = "lenient::ranges",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub dev_dependencies: BTreeMap<String, String>,
}

impl Manifest {
    /// Parse a manifest from JSON text.
    pub fn from_json_str(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Whether the package declares itself as an ES module.
    #[must_use]
    pub fn is_esm(&self) -> bool {
        self.module_type == Some(ModuleType::Module)
    }

    /// Export condition precedence for this package.
    #[must_use]
    pub fn export_conditions(&self) -> &'static [Condition] {
        if self.is_esm() {
            ESM_CONDITIONS
        } else {
            CJS_CONDITIONS
        }
    }

    /// The condition set for an exact exports key.
    #[must_use]
    pub fn export_entry(&self, key: &str) -> Option<&ExportConditions> {
        self.exports.as_ref()?.get(key)
    }

    /// The nominal built entry point: `exports["."]`, else `module`/`main`.
    #[must_use]
    pub fn entry_path(&self) -> Option<&str> {
        if let Some(conditions) = self.export_entry(".") {
            return conditions
                .select(self.export_conditions())
                .map(|(_, target)| target);
        }
        let preferred = if self.is_esm() {
            self.module.as_deref()
        } else {
            self.main.as_deref()
        };
        preferred.or(self.main.as_deref())
    }

    /// Source directory, defaulting to `src`.
    #[must_use]
    pub fn src_dir(&self) -> &str {
        self.build_options
            .as_ref()
            .and_then(|o| o.src_dir.as_deref())
            .filter(|dir| !dir.is_empty())
            .unwrap_or(DEFAULT_SRC_DIR)
    }

    #[must_use]
    pub fn is_lib(&self) -> bool {
        self.build_options.as_ref().is_some_and(|o| o.is_lib)
    }

    /// Every built-output path the manifest points at: `main`, `module`,
    /// then each exports entry's `import`/`default`/`require` targets.
    pub fn output_paths(&self) -> impl Iterator<Item = &str> {
        let fields = [self.main.as_deref(), self.module.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty());
        let exports = self
            .exports
            .iter()
            .flat_map(ExportsMap::iter)
            .flat_map(|(_, conditions)| conditions.output_targets());
        fields.chain(exports)
    }

    /// The declared range for a dependency; `devDependencies` wins over
    /// `dependencies` when both list the name.
    #[must_use]
    pub fn dependency_range(&self, name: &str) -> Option<&str> {
        self.dev_dependencies
            .get(name)
            .or_else(|| self.dependencies.get(name))
            .map(String::as_str)
    }

    /// Whether `name` is a dependency linked from the workspace via `protocol`.
    #[must_use]
    pub fn has_workspace_dependency(&self, name: &str, protocol: &str) -> bool {
        !name.is_empty()
            && self
                .dependency_range(name)
                .is_some_and(|range| range.starts_with(protocol))
    }
}

/// Field readers that accept any JSON value.
///
/// Manifests are hand-edited; a field of the wrong type reads as absent
/// instead of failing the whole workspace scan.
mod lenient {
    use super::{BuildOptions, ModuleType};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::collections::BTreeMap;

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    pub fn name<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        string(d).map(Option::unwrap_or_default)
    }

    pub fn module_type<'de, D: Deserializer<'de>>(d: D) -> Result<Option<ModuleType>, D::Error> {
        string(d).map(|value| value.as_deref().map(ModuleType::from_field))
    }

    /// JavaScript truthiness.
    pub fn truthy<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => false,
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        })
    }

    pub fn build_options<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<BuildOptions>, D::Error> {
        Ok(match Value::deserialize(d)? {
            value @ Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        })
    }

    /// Dependency ranges; a non-string range reads as empty so it still
    /// shadows the same name in `dependencies`.
    pub fn ranges<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<String, String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Object(map) => map
                .into_iter()
                .map(|(name, range)| match range {
                    Value::String(range) => (name, range),
                    _ => (name, String::new()),
                })
                .collect(),
            _ => BTreeMap::new(),
        })
    }
}

/// Read and parse a manifest file.
///
/// A missing file is reported as [`Error::ManifestNotFound`] for its directory.
pub async fn read_manifest<F: SourceFs>(fs: &F, path: &Path) -> Result<Manifest> {
    let content = fs.read_to_string(path).await.map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::ManifestNotFound {
                dir: path.parent().unwrap_or(path).to_path_buf(),
            }
        } else {
            Error::ManifestRead {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    Manifest::from_json_str(&content).map_err(|source| Error::ManifestParse {
        path: path.to_path_buf(),
        source,
    })
}
