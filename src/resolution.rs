// Copyright 2018-2025 the Deno authors. MIT license.

use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use crate::cache::PackageJsonCacheEntry;
use crate::cache::ResolverIndex;
use crate::env::ResolverEnv;
use crate::errors::ResolveError;
use crate::exports::find_exports_replacement;
use crate::exports::match_exports;
use crate::file_info::JsInspector;
use crate::file_info::Resource;
use crate::file_info::ResourceRc;
use crate::file_info::EMPTY_RC;
use crate::package_json::parse_package_record;
use crate::package_json::PackageRecord;
use crate::package_json::PackageRecordRc;
use crate::path::absolute_file;
use crate::path::is_absolute_require;
use crate::path::is_relative_require;
use crate::path::relativize;
use crate::path::to_forward_slashes;
use crate::path::PathClean;
use crate::JsOptions;
use crate::NpmConfig;

/// The resolver service. One instance is shared across all build
/// threads; every cache lives behind a lock on [ResolverIndex].
#[derive(Debug)]
pub struct NpmResolver<TEnv: ResolverEnv, TInspector: JsInspector> {
  env: TEnv,
  inspector: TInspector,
  project_dir: PathBuf,
  js_package_dirs: Vec<PathBuf>,
  js_options: JsOptions,
  index_deps: HashSet<String>,
  index: ResolverIndex,
}

impl<TEnv: ResolverEnv, TInspector: JsInspector>
  NpmResolver<TEnv, TInspector>
{
  pub fn new(env: TEnv, inspector: TInspector, config: NpmConfig) -> Self {
    let project_dir = absolute_file(&config.project_dir);
    let js_package_dirs = match (
      &config.node_modules_dir,
      &config.js_package_dirs,
    ) {
      (None, None) => vec![project_dir.join("node_modules")],
      (node_modules_dir, package_dirs) => node_modules_dir
        .iter()
        .chain(package_dirs.iter().flatten())
        .map(absolute_file)
        .collect(),
    };
    let index_deps =
      load_deps_manifests(&env, &config.deps_manifests);
    Self {
      env,
      inspector,
      project_dir,
      js_package_dirs,
      js_options: config.js_options,
      index_deps,
      index: ResolverIndex::default(),
    }
  }

  pub fn project_dir(&self) -> &Path {
    &self.project_dir
  }

  pub fn js_package_dirs(&self) -> &[PathBuf] {
    &self.js_package_dirs
  }

  pub fn js_options(&self) -> &JsOptions {
    &self.js_options
  }

  /// Whether `name` was declared as an npm dependency by any of the
  /// configured dependency manifests.
  pub fn is_npm_dep(&self, name: &str) -> bool {
    self.index_deps.contains(name)
  }

  pub(crate) fn env(&self) -> &TEnv {
    &self.env
  }

  pub(crate) fn inspector(&self) -> &TInspector {
    &self.inspector
  }

  pub(crate) fn index(&self) -> &ResolverIndex {
    &self.index
  }

  /// Reserved for caller use; the resolver itself never touches it.
  pub fn require_cache(
    &self,
  ) -> &parking_lot::Mutex<HashMap<String, ResourceRc>> {
    &self.index.require_cache
  }

  /// Reads a package.json into a shared record, keyed on the file and
  /// validated against its mtime. `Ok(None)` when the file does not
  /// exist.
  pub fn read_package_json(
    &self,
    path: &Path,
  ) -> Result<Option<PackageRecordRc>, ResolveError> {
    let last_modified = match self.env.stat_sync(path) {
      Ok(stat) if stat.is_file => stat.last_modified,
      _ => return Ok(None),
    };
    {
      let cache = self.index.package_json_cache.lock();
      if let Some(entry) = cache.get(path) {
        if entry.last_modified == last_modified {
          return Ok(Some(entry.record.clone()));
        }
      }
    }

    let source =
      self
        .env
        .read_to_string(path)
        .map_err(|source| ResolveError::Io {
          path: path.to_path_buf(),
          source,
        })?;
    let record = Arc::new(parse_package_record(path, &source)?);
    self.index.package_json_cache.lock().insert(
      path.to_path_buf(),
      PackageJsonCacheEntry {
        record: record.clone(),
        last_modified,
      },
    );
    Ok(Some(record))
  }

  /// Record for a package.json found while traversing inside
  /// `parent`; keeps the chain walkable and inherits the root the
  /// traversal started under.
  fn nested_record(
    &self,
    parent: &PackageRecordRc,
    package_json_path: &Path,
  ) -> Result<Option<PackageRecordRc>, ResolveError> {
    let Some(base) = self.read_package_json(package_json_path)? else {
      return Ok(None);
    };
    let mut record = (*base).clone();
    record.js_package_dir = parent.js_package_dir.clone();
    record.parent = Some(parent.clone());
    Ok(Some(Arc::new(record)))
  }

  /// Looks a bare package name up in the configured roots, first hit
  /// wins. Results, including known-absent ones, are cached by name.
  pub fn find_package(
    &self,
    name: &str,
  ) -> Result<Option<PackageRecordRc>, ResolveError> {
    if let Some(cached) = self.index.packages.lock().get(name) {
      return Ok(cached.clone());
    }
    let result = self.find_package_uncached(name)?;
    self
      .index
      .packages
      .lock()
      .insert(name.to_string(), result.clone());
    Ok(result)
  }

  fn find_package_uncached(
    &self,
    name: &str,
  ) -> Result<Option<PackageRecordRc>, ResolveError> {
    for root in &self.js_package_dirs {
      let package_json_path = root.join(name).join("package.json");
      let Some(base) = self.read_package_json(&package_json_path)? else {
        continue;
      };
      let mut record = (*base).clone();
      record.js_package_dir = root.clone();
      return Ok(Some(Arc::new(record)));
    }
    Ok(None)
  }

  /// Resolves the owning package for a bare require. Package names may
  /// contain `/` (scoped names always do), so successively longer
  /// `/`-prefixes are tried until one resolves; the winning prefix is
  /// stamped as `match_name`.
  fn find_package_for_require(
    &self,
    require_from: Option<&Resource>,
    require: &str,
  ) -> Result<Option<PackageRecordRc>, ResolveError> {
    let mut search_from = 0;
    loop {
      let next_slash =
        require[search_from..].find('/').map(|i| search_from + i);
      let prefix = match next_slash {
        Some(i) => &require[..i],
        None => require,
      };
      if !prefix.is_empty() {
        if let Some(package) = self.locate_package(require_from, prefix)? {
          let mut record = (*package).clone();
          record.match_name = Some(prefix.to_string());
          return Ok(Some(Arc::new(record)));
        }
      }
      match next_slash {
        Some(i) => search_from = i + 1,
        None => return Ok(None),
      }
    }
  }

  /// Nested installs first: walk upward from the requesting package
  /// testing `<dir>/node_modules/<name>`, skipping literal
  /// `node_modules` segments and stopping at the root the requesting
  /// package came from. Falls back to the global lookup.
  fn locate_package(
    &self,
    require_from: Option<&Resource>,
    name: &str,
  ) -> Result<Option<PackageRecordRc>, ResolveError> {
    if self.js_options.allow_nested_packages {
      if let Some(from_package) =
        require_from.and_then(|rf| rf.package.as_ref())
      {
        let stop_dir = &from_package.js_package_dir;
        let mut dir = from_package.package_dir.clone();
        loop {
          if dir == *stop_dir {
            break;
          }
          if dir.file_name().map(|n| n == "node_modules").unwrap_or(false) {
            match dir.parent() {
              Some(parent) => {
                dir = parent.to_path_buf();
                continue;
              }
              None => break,
            }
          }
          let package_json_path =
            dir.join("node_modules").join(name).join("package.json");
          if let Some(base) = self.read_package_json(&package_json_path)? {
            let mut record = (*base).clone();
            // nested packages stay associated with the root their
            // requester started under
            record.js_package_dir = from_package.js_package_dir.clone();
            return Ok(Some(Arc::new(record)));
          }
          match dir.parent() {
            Some(parent) => dir = parent.to_path_buf(),
            None => break,
          }
        }
      }
    }
    self.find_package(name)
  }

  /// Resolves a package-relative require (always `./…`) inside
  /// `package`.
  ///
  /// A package with `exports` is closed to external callers: when the
  /// request is not internal and no bypass is configured, failing to
  /// match the exports tables is fatal. Internal requests use the
  /// exports tables as a shortcut and fall back to classical
  /// resolution.
  pub fn find_resource_in_package(
    &self,
    package: &PackageRecordRc,
    require_from: Option<&Resource>,
    rel_require: &str,
  ) -> Result<Option<ResourceRc>, ResolveError> {
    debug_assert!(rel_require.starts_with("./"));

    let use_exports =
      package.has_exports() && !self.js_options.ignore_exports;
    if use_exports {
      if let Some(file) = match_exports(
        &self.env,
        package,
        rel_require,
        &self.js_options.export_conditions,
      ) {
        return self.get_file_info(Some(package), &file).map(Some);
      }
      let internal = require_from
        .and_then(|rf| rf.package.as_ref())
        .map(|from_package| from_package.same_package(package))
        .unwrap_or(false);
      if !internal && !self.js_options.exports_bypass {
        return Err(ResolveError::ExportsResolutionFailed {
          package_name: package.package_name.clone(),
          package_dir: package.package_dir.clone(),
          rel_require: rel_require.to_string(),
        });
      }
    }

    match self.find_match_in_package(package, rel_require)? {
      Some((package, file)) => {
        self.apply_overrides(&package, require_from, file)
      }
      None => Ok(None),
    }
  }

  /// Classical (pre-`exports`) in-package matching: entry keys at the
  /// package root, exact file, extension search, directory handling
  /// with nested package.json recursion and `index` probing.
  fn find_match_in_package(
    &self,
    package: &PackageRecordRc,
    rel_require: &str,
  ) -> Result<Option<(PackageRecordRc, PathBuf)>, ResolveError> {
    if rel_require == "./" {
      let entries = self
        .js_options
        .entry_keys
        .iter()
        .filter_map(|key| {
          package
            .package_json
            .get(key)
            .and_then(|value| value.as_str())
            .map(|entry| (key.clone(), entry.to_string()))
        })
        .collect::<Vec<_>>();

      if entries.is_empty() {
        let index_file = package.package_dir.join("index.js");
        if self.env.is_file_sync(&index_file) {
          return Ok(Some((package.clone(), index_file)));
        }
        return Ok(None);
      }

      for (_, entry) in &entries {
        let entry_rel = if entry.starts_with("./") {
          entry.clone()
        } else {
          format!("./{entry}")
        };
        if let Some(found) =
          self.find_match_in_package(package, &entry_rel)?
        {
          return Ok(Some(found));
        }
      }
      return Err(ResolveError::MissingEntries {
        package_dir: package.package_dir.clone(),
        entries: entries.into_iter().map(|(key, _)| key).collect(),
      });
    }

    let path = package
      .package_dir
      .join(rel_require.strip_prefix("./").unwrap_or(rel_require))
      .clean();
    let stat = self.env.stat_sync(&path).ok();
    let is_file = stat.as_ref().map(|s| s.is_file).unwrap_or(false);
    let is_dir = stat.as_ref().map(|s| s.is_dir).unwrap_or(false);

    if is_file {
      return Ok(Some((package.clone(), path)));
    }
    if let Some(found) = self.extension_search(&path) {
      return Ok(Some((package.clone(), found)));
    }
    if is_dir {
      let nested_path = path.join("package.json");
      if let Some(nested) = self.nested_record(package, &nested_path)? {
        return self.find_match_in_package(&nested, "./");
      }
      if let Some(found) = self.extension_search(&path.join("index")) {
        return Ok(Some((package.clone(), found)));
      }
    }
    Ok(None)
  }

  fn extension_search(&self, path: &Path) -> Option<PathBuf> {
    let base = path.to_string_lossy();
    for extension in &self.js_options.extensions {
      let candidate = PathBuf::from(format!("{base}{extension}"));
      if self.env.is_file_sync(&candidate) {
        return Some(candidate);
      }
    }
    None
  }

  /// Override lookup for a classically matched file: user-configured
  /// package overrides first, then the package's own `browser` object,
  /// each retried with the `.js` suffix trimmed.
  fn lookup_override(
    &self,
    package: &PackageRecord,
    rel_path: &str,
  ) -> Option<Value> {
    if let Some(value) = self
      .js_options
      .package_overrides
      .get(&package.package_name)
      .and_then(|overrides| overrides.get(rel_path))
    {
      return Some(value.clone());
    }
    if self.js_options.use_browser_overrides {
      if let Some(value) = package
        .browser_overrides
        .as_ref()
        .and_then(|overrides| overrides.get(rel_path))
      {
        return Some(value.clone());
      }
    }
    None
  }

  fn apply_overrides(
    &self,
    package: &PackageRecordRc,
    require_from: Option<&Resource>,
    file: PathBuf,
  ) -> Result<Option<ResourceRc>, ResolveError> {
    let rel_path = format!(
      "./{}",
      to_forward_slashes(&relativize(&package.package_dir, &file))
    );

    let matched = self
      .lookup_override(package, &rel_path)
      .map(|value| (rel_path.clone(), value))
      .or_else(|| {
        let trimmed = rel_path.strip_suffix(".js")?;
        self
          .lookup_override(package, trimmed)
          .map(|value| (trimmed.to_string(), value))
      });

    let Some((matched_key, value)) = matched else {
      return self.get_file_info(Some(package), &file).map(Some);
    };
    match value {
      Value::Bool(false) => Ok(Some(EMPTY_RC.clone())),
      // a self-referential override means no override; this prevents
      // an endless loop for packages declaring "./x.js": "./x.js"
      Value::String(text) if text == matched_key => {
        self.get_file_info(Some(package), &file).map(Some)
      }
      Value::String(text) if is_relative_require(&text) => {
        self.find_resource_in_package(package, require_from, &text)
      }
      Value::String(text) => self.find_resource(require_from, &text),
      other => Err(ResolveError::InvalidOverride {
        package_name: package.package_name.clone(),
        rel_path,
        override_value: other,
      }),
    }
  }

  /// The resolver entry point: classifies `require` and dispatches.
  ///
  /// `Ok(None)` means "not found, not fatal"; deliberate disabling
  /// through an override yields the shared empty resource.
  pub fn find_resource(
    &self,
    require_from: Option<&Resource>,
    require: &str,
  ) -> Result<Option<ResourceRc>, ResolveError> {
    if is_absolute_require(require) {
      return Err(ResolveError::AbsolutePath {
        require: require.to_string(),
      });
    }
    if require.starts_with('#') {
      return self.find_import_resource(require_from, require);
    }
    if is_relative_require(require) {
      return self.find_relative_resource(require_from, require);
    }
    self.find_bare_resource(require_from, require)
  }

  /// `#name` subpath imports, resolved through the requesting
  /// package's `imports` map.
  fn find_import_resource(
    &self,
    require_from: Option<&Resource>,
    require: &str,
  ) -> Result<Option<ResourceRc>, ResolveError> {
    let Some(from) = require_from else {
      return Err(ResolveError::NoRequireFrom {
        require: require.to_string(),
      });
    };
    let Some(package) = from.package.as_ref() else {
      return Err(ResolveError::NoPackageRequireFrom {
        require: require.to_string(),
      });
    };

    let target = package
      .package_json
      .get("imports")
      .and_then(|imports| imports.as_object())
      .and_then(|imports| imports.get(require));
    let replacement = target.and_then(|target| {
      find_exports_replacement(target, &self.js_options.export_conditions)
    });
    let Some(replacement) = replacement else {
      return Err(ResolveError::NoImport {
        require: require.to_string(),
        package_dir: package.package_dir.clone(),
      });
    };

    if is_relative_require(&replacement) {
      self.find_resource_in_package(package, require_from, &replacement)
    } else {
      // an import may point at another package entirely
      self.find_resource(require_from, &replacement)
    }
  }

  /// `./` and `../` requires, resolved against the requesting file and
  /// walked up the nested-package chain until the target falls inside
  /// a package dir.
  fn find_relative_resource(
    &self,
    require_from: Option<&Resource>,
    require: &str,
  ) -> Result<Option<ResourceRc>, ResolveError> {
    let Some(from) = require_from else {
      return Err(ResolveError::NoRequireFrom {
        require: require.to_string(),
      });
    };
    let Some(from_file) = from.file.as_ref() else {
      return Err(ResolveError::NoRequireFrom {
        require: require.to_string(),
      });
    };
    let Some(mut package) = from.package.clone() else {
      return Err(ResolveError::NoPackageRequireFrom {
        require: require.to_string(),
      });
    };

    // resolved resource files are absolute, so a parent dir exists
    let target = from_file.parent().unwrap().join(require).clean();
    loop {
      let rel =
        to_forward_slashes(&relativize(&package.package_dir, &target));
      if !rel.starts_with("../") {
        let rel_require = format!("./{rel}");
        return self.find_resource_in_package(
          &package,
          require_from,
          &rel_require,
        );
      }
      match package.parent.clone() {
        Some(parent) => package = parent,
        None => {
          return Err(ResolveError::RelativeOutsidePackage {
            require: require.to_string(),
            file: from_file.clone(),
          });
        }
      }
    }
  }

  fn find_bare_resource(
    &self,
    require_from: Option<&Resource>,
    require: &str,
  ) -> Result<Option<ResourceRc>, ResolveError> {
    // the requesting package may remap or disable a bare require
    // outright through its browser object
    if self.js_options.use_browser_overrides {
      if let Some(from_package) =
        require_from.and_then(|rf| rf.package.as_ref())
      {
        let override_value = from_package
          .browser_overrides
          .as_ref()
          .and_then(|overrides| overrides.get(require));
        match override_value {
          None => {}
          Some(Value::Bool(false)) => return Ok(Some(EMPTY_RC.clone())),
          Some(Value::String(text)) if is_relative_require(text) => {
            return self.find_resource_in_package(
              from_package,
              require_from,
              text,
            );
          }
          Some(Value::String(text)) if text != require => {
            return self.find_resource(require_from, text);
          }
          Some(Value::String(_)) => {}
          Some(other) => {
            return Err(ResolveError::InvalidOverride {
              package_name: from_package.package_name.clone(),
              rel_path: require.to_string(),
              override_value: other.clone(),
            });
          }
        }
      }
    }

    let Some(package) =
      self.find_package_for_require(require_from, require)?
    else {
      return Ok(None);
    };
    // find_package_for_require always stamps the matched prefix
    let match_name = package.match_name.clone().unwrap();
    let rel_require = if require == match_name {
      "./".to_string()
    } else {
      format!(".{}", &require[match_name.len()..])
    };
    self.find_resource_in_package(&package, require_from, &rel_require)
  }
}

fn load_deps_manifests<TEnv: ResolverEnv>(
  env: &TEnv,
  manifests: &[PathBuf],
) -> HashSet<String> {
  let mut deps = HashSet::new();
  for manifest in manifests {
    let source = match env.read_to_string(manifest) {
      Ok(source) => source,
      Err(err) => {
        log::warn!(
          "could not read deps manifest '{}': {}",
          manifest.display(),
          err
        );
        continue;
      }
    };
    let value: Value = match serde_json::from_str(&source) {
      Ok(value) => value,
      Err(err) => {
        log::warn!(
          "could not parse deps manifest '{}': {}",
          manifest.display(),
          err
        );
        continue;
      }
    };
    match value.get("npm-deps") {
      Some(Value::Object(map)) => {
        deps.extend(map.keys().cloned());
      }
      Some(Value::Array(names)) => {
        deps.extend(
          names.iter().filter_map(|n| n.as_str().map(ToOwned::to_owned)),
        );
      }
      _ => {}
    }
  }
  deps
}
