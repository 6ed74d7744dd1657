// Copyright 2018-2025 the Deno authors. MIT license.

use std::path::PathBuf;

use thiserror::Error;

/// Classified resolution failures.
///
/// Everything a caller can hit is listed here; conditions that are
/// survivable (an exports entry pointing at a missing file, a package
/// that does not exist) are expressed as `Ok(None)` at the call sites
/// instead.
#[derive(Debug, Error)]
pub enum ResolveError {
  #[error("absolute require '{require}' is not supported")]
  AbsolutePath { require: String },

  #[error(
    "import '{require}' is not declared in the imports of '{}'",
    package_dir.display()
  )]
  NoImport { require: String, package_dir: PathBuf },

  #[error("require '{require}' has no requiring file")]
  NoRequireFrom { require: String },

  #[error("require '{require}' came from a file without a package")]
  NoPackageRequireFrom { require: String },

  #[error(
    "relative require '{require}' from '{}' left all enclosing packages",
    file.display()
  )]
  RelativeOutsidePackage { require: String, file: PathBuf },

  #[error(
    "package '{package_name}' at '{}' does not export '{rel_require}'",
    package_dir.display()
  )]
  ExportsResolutionFailed {
    package_name: String,
    package_dir: PathBuf,
    rel_require: String,
  },

  #[error(
    "package at '{}' has entries {entries:?} but none of them resolved",
    package_dir.display()
  )]
  MissingEntries {
    package_dir: PathBuf,
    entries: Vec<String>,
  },

  #[error(
    "file '{}' is outside the project and all package roots",
    file.display()
  )]
  FilesOutsideProject { file: PathBuf },

  #[error(
    "invalid override {override_value} for '{rel_path}' in package '{package_name}'"
  )]
  InvalidOverride {
    package_name: String,
    rel_path: String,
    override_value: serde_json::Value,
  },

  #[error("errors in '{}': {}", file.display(), messages.join("; "))]
  FileInfoErrors {
    file: PathBuf,
    messages: Vec<String>,
  },

  #[error("failed extracting file info for '{}'", file.display())]
  FileInfoFailed {
    file: PathBuf,
    #[source]
    source: anyhow::Error,
  },

  #[error("failed reading '{}'", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("malformed package.json '{}'", path.display())]
  PackageJsonDeserialize {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}
