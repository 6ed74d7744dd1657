// Copyright 2018-2025 the Deno authors. MIT license.

use std::collections::BTreeSet;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use once_cell::sync::Lazy;
use serde::Deserialize;
use serde::Serialize;
use sha1::Digest;

use crate::env::ResolverEnv;
use crate::errors::ResolveError;
use crate::names::flat_filename;
use crate::names::global_name;
use crate::names::module_name_for_resource;
use crate::names::output_name_for;
use crate::names::resource_name_for_file;
use crate::package_json::PackageRecordRc;
use crate::path::absolute_file;
use crate::resolution::NpmResolver;
use crate::Mode;

/// Participates in every JS cache key so a resolver upgrade invalidates
/// previously extracted file info.
pub const NPM_CACHE_KEY: &str =
  concat!("npm_resolver/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
  Resource,
  Asset,
  Empty,
  Global,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
  pub kind: ResourceKind,
  pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
  Js,
  ShadowJs,
}

#[allow(clippy::disallowed_types)]
pub type ResourceRc = Arc<Resource>;

/// A single resolved file, ready for the downstream compiler.
#[derive(Debug, Clone)]
pub struct Resource {
  pub resource_id: ResourceId,
  pub resource_name: String,
  pub output_name: String,
  pub ns: String,
  pub typ: ResourceType,
  pub file: Option<PathBuf>,
  pub last_modified: Option<SystemTime>,
  pub source: String,
  pub cache_key: Vec<String>,
  pub provides: BTreeSet<String>,
  pub requires: BTreeSet<String>,
  /// Raw require strings in discovery order, plus synthetic
  /// `"buffer"` / `"process"` when the inspector flagged global usage.
  pub deps: Vec<String>,
  pub js_deps: Vec<String>,
  pub json: bool,
  pub package: Option<PackageRecordRc>,
}

/// Returned whenever resolution is deliberately disabled by an
/// override.
pub static EMPTY_RC: Lazy<ResourceRc> = Lazy::new(|| {
  Arc::new(Resource {
    resource_id: ResourceId {
      kind: ResourceKind::Empty,
      name: "shadow$empty.js".to_string(),
    },
    resource_name: "shadow$empty.js".to_string(),
    output_name: "shadow$empty.js".to_string(),
    ns: "shadow$empty".to_string(),
    typ: ResourceType::Js,
    file: None,
    last_modified: None,
    source: String::new(),
    cache_key: Vec::new(),
    provides: BTreeSet::from(["shadow$empty".to_string()]),
    requires: BTreeSet::new(),
    deps: Vec::new(),
    js_deps: Vec::new(),
    json: false,
    package: None,
  })
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectorIssue {
  pub line: u32,
  pub column: u32,
  pub message: String,
}

/// What the external JS inspector reports for one source file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileInspection {
  pub js_requires: Vec<String>,
  pub js_imports: Vec<String>,
  pub js_dynamic_imports: Vec<String>,
  /// Computed require calls the inspector could not resolve to a
  /// string; reported, never fatal.
  pub js_invalid_requires: Vec<InspectorIssue>,
  pub js_errors: Vec<InspectorIssue>,
  pub js_warnings: Vec<InspectorIssue>,
  pub js_language: String,
  pub uses_global_buffer: bool,
  pub uses_global_process: bool,
}

/// The external JavaScript parser. Opaque to the resolver; its
/// identity key contributes to every JS cache key so a tool upgrade
/// invalidates all caches.
pub trait JsInspector: std::fmt::Debug + Send + Sync {
  fn inspect(
    &self,
    resource_name: &str,
    source: &str,
  ) -> Result<FileInspection, anyhow::Error>;

  fn cache_key(&self) -> String;
}

/// Combined dependency list: requires, imports and dynamic imports in
/// discovery order, deduplicated, `goog:X` rewritten to the bare `X`,
/// with synthetic `buffer`/`process` appended for flagged global use.
pub fn collect_js_deps(inspection: &FileInspection) -> Vec<String> {
  let mut seen = HashSet::new();
  let mut deps = Vec::new();
  let mut add = |dep: &str| {
    let dep = dep.strip_prefix("goog:").unwrap_or(dep);
    if seen.insert(dep.to_string()) {
      deps.push(dep.to_string());
    }
  };

  for dep in inspection
    .js_requires
    .iter()
    .chain(inspection.js_imports.iter())
    .chain(inspection.js_dynamic_imports.iter())
  {
    add(dep);
  }
  if inspection.uses_global_buffer {
    add("buffer");
  }
  if inspection.uses_global_process {
    add("process");
  }
  deps
}

/// Textual require call used by emitters, e.g.
/// `shadow.js.require("module$node_modules$react$index", {"globals":[]})`.
pub fn shadow_js_require(resource: &Resource, semicolon: bool) -> String {
  let globals = resource
    .package
    .as_ref()
    .and_then(|package| package.package_json.get("export-globals"))
    .and_then(|value| value.as_array())
    .map(|items| {
      items
        .iter()
        .filter_map(|item| item.as_str())
        .collect::<Vec<_>>()
    })
    .unwrap_or_default();
  // serializing a list of strings cannot fail
  let globals_json = serde_json::to_string(&globals).unwrap();
  let mut text = format!(
    "shadow.js.require(\"{}\", {{\"globals\":{}}})",
    resource.ns, globals_json
  );
  if semicolon {
    text.push(';');
  }
  text
}

fn mtime_millis(last_modified: Option<SystemTime>) -> u128 {
  last_modified
    .and_then(|t| t.duration_since(SystemTime::UNIX_EPOCH).ok())
    .map(|d| d.as_millis())
    .unwrap_or(0)
}

impl<TEnv: ResolverEnv, TInspector: JsInspector>
  NpmResolver<TEnv, TInspector>
{
  /// Extracts the resource record for a resolved file, caching by the
  /// absolute file path.
  pub fn get_file_info(
    &self,
    package: Option<&PackageRecordRc>,
    file: &Path,
  ) -> Result<ResourceRc, ResolveError> {
    if let Some(resource) = self.index().files.lock().get(file) {
      return Ok(resource.clone());
    }
    let resource = Arc::new(self.extract_file_info(package, file)?);
    self
      .index()
      .files
      .lock()
      .insert(file.to_path_buf(), resource.clone());
    Ok(resource)
  }

  /// Drops a cached file record, forcing re-extraction on next use.
  /// Callers do their own mtime checks and call this when stale.
  pub fn invalidate_file(&self, file: &Path) {
    self.index().files.lock().remove(file);
  }

  fn extract_file_info(
    &self,
    package: Option<&PackageRecordRc>,
    file: &Path,
  ) -> Result<Resource, ResolveError> {
    let resource_name = resource_name_for_file(
      self.js_package_dirs(),
      self.project_dir(),
      file,
    )?;
    let last_modified = self
      .env()
      .stat_sync(file)
      .ok()
      .and_then(|stat| stat.last_modified);

    let extension = file
      .extension()
      .map(|ext| format!(".{}", ext.to_string_lossy()))
      .unwrap_or_default();
    if extension != ".json"
      && !self.js_options().extensions.contains(&extension)
    {
      return Ok(self.asset_resource(
        package,
        file,
        resource_name,
        last_modified,
      ));
    }

    let source =
      self
        .env()
        .read_to_string(file)
        .map_err(|source| ResolveError::Io {
          path: file.to_path_buf(),
          source,
        })?;
    let ns = module_name_for_resource(&resource_name);
    let output_name = output_name_for(&ns, &resource_name);
    let cache_key = vec![
      NPM_CACHE_KEY.to_string(),
      self.inspector().cache_key(),
      faster_hex::hex_string(&sha1::Sha1::digest(source.as_bytes())),
    ];

    let (deps, json) = if extension == ".json" {
      (Vec::new(), true)
    } else {
      let inspection = self
        .inspector()
        .inspect(&resource_name, &source)
        .map_err(|source| ResolveError::FileInfoFailed {
          file: file.to_path_buf(),
          source,
        })?;
      if !inspection.js_errors.is_empty() {
        return Err(ResolveError::FileInfoErrors {
          file: file.to_path_buf(),
          messages: inspection
            .js_errors
            .iter()
            .map(|issue| {
              format!("{}:{} {}", issue.line, issue.column, issue.message)
            })
            .collect(),
        });
      }
      for invalid in &inspection.js_invalid_requires {
        log::info!(
          "invalid require in {} at {}:{}",
          resource_name,
          invalid.line,
          invalid.column
        );
      }
      (collect_js_deps(&inspection), false)
    };

    Ok(Resource {
      resource_id: ResourceId {
        kind: ResourceKind::Resource,
        name: resource_name.clone(),
      },
      resource_name: resource_name.clone(),
      output_name,
      provides: BTreeSet::from([ns.clone()]),
      ns,
      typ: ResourceType::Js,
      file: Some(file.to_path_buf()),
      last_modified,
      source,
      cache_key,
      requires: BTreeSet::new(),
      deps: deps.clone(),
      js_deps: deps,
      json,
      package: package.cloned(),
    })
  }

  fn asset_resource(
    &self,
    package: Option<&PackageRecordRc>,
    file: &Path,
    resource_name: String,
    last_modified: Option<SystemTime>,
  ) -> Resource {
    let ns = module_name_for_resource(&resource_name);
    Resource {
      resource_id: ResourceId {
        kind: ResourceKind::Asset,
        name: resource_name.clone(),
      },
      output_name: flat_filename(&resource_name),
      resource_name: resource_name.clone(),
      provides: BTreeSet::from([ns.clone()]),
      ns,
      typ: ResourceType::ShadowJs,
      file: Some(file.to_path_buf()),
      last_modified,
      source: String::new(),
      cache_key: vec![
        file.display().to_string(),
        mtime_millis(last_modified).to_string(),
      ],
      requires: BTreeSet::new(),
      deps: Vec::new(),
      js_deps: Vec::new(),
      json: false,
      package: package.cloned(),
    }
  }

  /// Wires a require string to an existing browser global, e.g.
  /// `require("jquery")` to `window.jQuery`.
  pub fn js_resource_for_global(
    &self,
    _require: &str,
    global: &str,
  ) -> ResourceRc {
    let ns = global_name(global);
    let resource_name = format!("global${ns}.js");
    Arc::new(Resource {
      resource_id: ResourceId {
        kind: ResourceKind::Global,
        name: resource_name.clone(),
      },
      output_name: resource_name.clone(),
      resource_name,
      provides: BTreeSet::from([ns.clone()]),
      ns,
      typ: ResourceType::Js,
      file: None,
      last_modified: None,
      source: format!("module.exports=({global});"),
      cache_key: vec![
        NPM_CACHE_KEY.to_string(),
        self.inspector().cache_key(),
      ],
      requires: BTreeSet::new(),
      deps: Vec::new(),
      js_deps: Vec::new(),
      json: false,
      package: None,
    })
  }

  /// File replacement configured by the user; `file_min` wins in
  /// release mode.
  pub fn js_resource_for_file(
    &self,
    _require: &str,
    file: &Path,
    file_min: Option<&Path>,
  ) -> Result<ResourceRc, ResolveError> {
    let chosen = match (self.js_options().mode, file_min) {
      (Mode::Release, Some(min)) => min,
      _ => file,
    };
    self.get_file_info(None, &absolute_file(chosen))
  }
}
