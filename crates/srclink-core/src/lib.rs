#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

//! Redirect imports of workspace packages from their built output to their source.
//!
//! The pipeline is [`scan_workspace`] -> [`synthesize`] (or [`generate`] for
//! both), producing aliases whose resolvers call [`resolve_source_path`].

pub mod alias;
pub mod config;
pub mod error;
pub mod fs;
pub mod manifest;
pub mod resolver;
pub mod version;
pub mod workspace;

pub use alias::{generate, synthesize, AliasEntry, MonorepoInfo, SkipReason};
pub use config::Config;
pub use error::{Error, Result};
pub use fs::{SourceFs, TokioFs};
pub use manifest::{read_manifest, Manifest};
pub use resolver::{find_source_path, resolve_source_path, SourceResolver};
pub use version::VERSION;
pub use workspace::{find_workspace_root, scan_workspace, WorkspaceMap};
