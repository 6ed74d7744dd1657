// Copyright 2018-2025 the Deno authors. MIT license.

use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Map;
use serde_json::Value;

use crate::errors::ResolveError;

#[allow(clippy::disallowed_types)]
pub type PackageRecordRc = Arc<PackageRecord>;

#[derive(Debug, Clone)]
pub struct ExportsPrefixEntry {
  /// Always ends with `/`.
  pub prefix: String,
  pub target: Value,
}

#[derive(Debug, Clone)]
pub struct ExportsWildcardEntry {
  /// Key text before the `*`.
  pub prefix: String,
  /// Key text after the `*`; `None` when the `*` was the final character.
  pub suffix: Option<String>,
  pub target: Value,
}

/// Normalized view of a package.json `exports` value, split into the
/// three match modes. Prefix and wildcard entries are kept sorted by
/// descending prefix length so iteration is longest-match-first.
#[derive(Debug, Clone, Default)]
pub struct PackageExports {
  pub exact: IndexMap<String, Value>,
  pub prefix: Vec<ExportsPrefixEntry>,
  pub wildcard: Vec<ExportsWildcardEntry>,
}

impl PackageExports {
  pub fn is_empty(&self) -> bool {
    self.exact.is_empty() && self.prefix.is_empty() && self.wildcard.is_empty()
  }
}

/// Normalized in-memory view of a package.json and its location.
///
/// Records are immutable once constructed; the locator stamps
/// contextual fields (`js_package_dir`, `parent`, `match_name`) onto
/// clones before handing them out.
#[derive(Debug, Clone)]
pub struct PackageRecord {
  pub package_name: String,
  /// `"{absolute-package-dir}@{version}"`; unique across nested
  /// installs and the only reliable equality key.
  pub package_id: String,
  pub package_dir: PathBuf,
  /// The full parsed object, order-preserving. When `browser` was an
  /// object it has been stripped from here so it is never used as a
  /// main entry.
  pub package_json: Map<String, Value>,
  pub version: String,
  /// Declared dependency names, from the `dependencies` keys only.
  pub dependencies: HashSet<String>,
  /// `browser` when it was a string (a main override).
  pub browser: Option<String>,
  /// `browser` when it was an object: `rel-path → (string | false)`.
  pub browser_overrides: Option<Map<String, Value>>,
  pub exports: PackageExports,
  /// The configured root this package was discovered under; inherited
  /// by nested packages.
  pub js_package_dir: PathBuf,
  /// Enclosing package when this record was reached through in-package
  /// traversal of a nested package.json.
  pub parent: Option<PackageRecordRc>,
  /// The require prefix that located this package, stamped by the
  /// locator.
  pub match_name: Option<String>,
}

impl PackageRecord {
  pub fn has_exports(&self) -> bool {
    !self.exports.is_empty()
  }

  pub fn same_package(&self, other: &PackageRecord) -> bool {
    self.package_id == other.package_id
  }
}

/// Parses a package.json source into a [PackageRecord]. Pure except for
/// logging; the mtime-validated cache lives on the resolver.
pub fn parse_package_record(
  path: &Path,
  source: &str,
) -> Result<PackageRecord, ResolveError> {
  let value: Value = serde_json::from_str(source).map_err(|source| {
    ResolveError::PackageJsonDeserialize {
      path: path.to_path_buf(),
      source,
    }
  })?;
  let mut package_json = match value {
    Value::Object(map) => map,
    _ => Map::new(),
  };

  // package.json always lives inside a directory
  let package_dir = path.parent().unwrap().to_path_buf();

  let package_name = package_json
    .get("name")
    .and_then(|v| v.as_str())
    .map(ToOwned::to_owned)
    .unwrap_or_else(|| {
      package_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
    });
  let version = package_json
    .get("version")
    .and_then(|v| v.as_str())
    .unwrap_or("0.0.0")
    .to_string();
  let package_id = format!("{}@{}", package_dir.display(), version);

  let dependencies = package_json
    .get("dependencies")
    .and_then(|v| v.as_object())
    .map(|deps| deps.keys().cloned().collect::<HashSet<_>>())
    .unwrap_or_default();

  let mut browser = None;
  let mut browser_overrides = None;
  match package_json.get("browser") {
    Some(Value::String(main)) => {
      browser = Some(main.clone());
    }
    Some(Value::Object(overrides)) => {
      browser_overrides = Some(overrides.clone());
      // an object must never be picked up as a main entry
      package_json.remove("browser");
    }
    _ => {}
  }

  let exports = package_json
    .get("exports")
    .map(|value| merge_package_exports(path, value))
    .unwrap_or_default();

  Ok(PackageRecord {
    package_name,
    package_id,
    js_package_dir: package_dir.clone(),
    package_dir,
    package_json,
    version,
    dependencies,
    browser,
    browser_overrides,
    exports,
    parent: None,
    match_name: None,
  })
}

/// Splits an `exports` value into the exact/prefix/wildcard tables.
///
/// A string or array is the value for `"."`. An object whose first key
/// starts with `.` is a path map; any other object is a root-level
/// condition map placed at `"."`. Invalid shapes are logged and
/// ignored.
fn merge_package_exports(path: &Path, value: &Value) -> PackageExports {
  let mut exports = PackageExports::default();
  match value {
    Value::String(_) | Value::Array(_) => {
      exports.exact.insert(".".to_string(), value.clone());
    }
    Value::Object(map) if !map.is_empty() => {
      let is_path_map = map
        .keys()
        .next()
        .map(|key| key.starts_with('.'))
        .unwrap_or(false);
      if is_path_map {
        for (key, target) in map {
          if !key.starts_with('.') {
            log::warn!(
              "ignoring exports key '{}' mixed into the path map of '{}'",
              key,
              path.display()
            );
            continue;
          }
          if key.ends_with('/') {
            exports.prefix.push(ExportsPrefixEntry {
              prefix: key.clone(),
              target: target.clone(),
            });
          } else if let Some(star) = key.find('*') {
            let suffix = if star + 1 == key.len() {
              None
            } else {
              Some(key[star + 1..].to_string())
            };
            exports.wildcard.push(ExportsWildcardEntry {
              prefix: key[..star].to_string(),
              suffix,
              target: target.clone(),
            });
          } else {
            exports.exact.insert(key.clone(), target.clone());
          }
        }
      } else {
        // root-level condition map, the value for "."
        exports.exact.insert(".".to_string(), value.clone());
      }
    }
    _ => {
      log::warn!(
        "ignoring invalid exports shape in '{}': {}",
        path.display(),
        value
      );
    }
  }

  // longest-match-first; stable sort keeps authored order for ties
  exports
    .prefix
    .sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
  exports
    .wildcard
    .sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
  exports
}
