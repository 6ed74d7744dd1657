// Copyright 2018-2025 the Deno authors. MIT license.

//! Node package resolution and file metadata indexing for JavaScript
//! bundling.
//!
//! Given a requesting source file and a require string, the resolver
//! finds the on-disk file satisfying the require the way Node.js and
//! common bundlers do: layered package.json entry keys, the three
//! `exports` match modes with condition maps, `imports` subpath
//! imports, nested installs, `browser` overrides and user overrides.
//! For every resolved file it extracts the metadata a downstream
//! module compiler needs: a stable namespace, the declared requires
//! and a content-addressed cache key.

#![deny(clippy::print_stderr)]
#![deny(clippy::print_stdout)]
#![deny(clippy::unused_async)]

use std::collections::HashMap;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde_json::Value;

mod cache;
mod env;
mod errors;
mod exports;
mod file_info;
mod names;
mod package_json;
mod path;
mod resolution;

pub use cache::PackageJsonCacheEntry;
pub use cache::ResolverIndex;
pub use env::RealEnv;
pub use env::ResolverEnv;
pub use env::ResolverFsStat;
pub use errors::ResolveError;
pub use exports::find_exports_replacement;
pub use file_info::collect_js_deps;
pub use file_info::shadow_js_require;
pub use file_info::FileInspection;
pub use file_info::InspectorIssue;
pub use file_info::JsInspector;
pub use file_info::Resource;
pub use file_info::ResourceId;
pub use file_info::ResourceKind;
pub use file_info::ResourceRc;
pub use file_info::ResourceType;
pub use file_info::EMPTY_RC;
pub use file_info::NPM_CACHE_KEY;
pub use names::disambiguate_module_name;
pub use names::flat_filename;
pub use names::module_name_for_resource;
pub use names::resource_name_for_file;
pub use package_json::ExportsPrefixEntry;
pub use package_json::ExportsWildcardEntry;
pub use package_json::PackageExports;
pub use package_json::PackageRecord;
pub use package_json::PackageRecordRc;
pub use path::absolute_file;
pub use path::is_absolute_require;
pub use path::is_relative_require;
pub use resolution::NpmResolver;

/// Build mode, consumed only when picking between a configured file
/// and its minified variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
  Release,
  #[default]
  Dev,
}

/// Resolution target. Reserved for callers that configure conditions
/// and entry keys per target themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
  #[default]
  Browser,
  Node,
}

#[derive(Debug, Clone)]
pub struct JsOptions {
  /// Extensions tried during file search, in order.
  pub extensions: Vec<String>,
  pub allow_nested_packages: bool,
  pub target: Target,
  pub use_browser_overrides: bool,
  /// package.json keys tried, in order, for the package root.
  pub entry_keys: Vec<String>,
  /// Condition names used to pick a branch of a condition map, in
  /// order.
  pub export_conditions: Vec<String>,
  /// Skip `exports` entirely and resolve classically.
  pub ignore_exports: bool,
  /// Let requests that fail the exports tables of a closed package
  /// fall through to classical resolution instead of failing.
  pub exports_bypass: bool,
  /// User overrides: package name to a map of package-relative paths
  /// (`"./lib/a.js"`) to `false` or a replacement string.
  pub package_overrides: HashMap<String, IndexMap<String, Value>>,
  pub mode: Mode,
}

impl Default for JsOptions {
  fn default() -> Self {
    Self {
      extensions: vec![
        ".js".to_string(),
        ".mjs".to_string(),
        ".json".to_string(),
      ],
      allow_nested_packages: true,
      target: Target::Browser,
      use_browser_overrides: true,
      entry_keys: vec![
        "browser".to_string(),
        "main".to_string(),
        "module".to_string(),
      ],
      export_conditions: vec![
        "browser".to_string(),
        "require".to_string(),
        "default".to_string(),
        "module".to_string(),
        "import".to_string(),
      ],
      ignore_exports: false,
      exports_bypass: false,
      package_overrides: HashMap::new(),
      mode: Mode::Dev,
    }
  }
}

#[derive(Debug, Clone)]
pub struct NpmConfig {
  /// Process working directory at service start; normalized to
  /// absolute at construction.
  pub project_dir: PathBuf,
  /// Optional single package root.
  pub node_modules_dir: Option<PathBuf>,
  /// Optional explicit package roots. When neither this nor
  /// `node_modules_dir` is set, `<project_dir>/node_modules` is used.
  pub js_package_dirs: Option<Vec<PathBuf>>,
  /// Manifest files declaring npm deps; aggregated into the flat set
  /// behind [NpmResolver::is_npm_dep]. Never affects resolution.
  pub deps_manifests: Vec<PathBuf>,
  pub js_options: JsOptions,
}

impl Default for NpmConfig {
  fn default() -> Self {
    Self {
      project_dir: PathBuf::from("."),
      node_modules_dir: None,
      js_package_dirs: None,
      deps_manifests: Vec::new(),
      js_options: JsOptions::default(),
    }
  }
}
