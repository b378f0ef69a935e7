//! Project layer: where Kconfig text comes from.
//!
//! - [`FileAccess`] is the injected collaborator for reading files
//! - [`IncludeResolver`] maps `source` arguments to candidate paths
//! - [`FileSet`] assigns stable [`FileId`](crate::base::FileId)s
//! - [`ProjectConfig`] holds workspace settings

mod config;
mod file_access;
mod file_set;
mod include;

pub use config::{ConfigError, DEFAULT_CONFIG_PREFIX, DEFAULT_MAX_CYCLE_ITERATIONS, ProjectConfig};
pub use file_access::{FileAccess, MemoryFileAccess, OsFileAccess};
pub use file_set::FileSet;
pub use include::{ExpandedPath, IncludeResolver, expand_variables, normalize_path};
