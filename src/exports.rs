// Copyright 2018-2025 the Deno authors. MIT license.

use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;

use crate::env::ResolverEnv;
use crate::package_json::PackageRecord;
use crate::path::PathClean;

/// Picks the replacement string out of an exports/imports match value.
///
/// A string is returned as-is. An array yields the first element whose
/// recursive replacement is a string; existence of the referenced file
/// is not verified here. A condition map is walked in the configured
/// condition order; the first condition present decides.
pub fn find_exports_replacement(
  target: &Value,
  conditions: &[String],
) -> Option<String> {
  match target {
    Value::String(text) => Some(text.clone()),
    Value::Array(items) => items
      .iter()
      .find_map(|item| find_exports_replacement(item, conditions)),
    Value::Object(map) => conditions
      .iter()
      .find(|condition| map.contains_key(condition.as_str()))
      .and_then(|condition| {
        find_exports_replacement(&map[condition.as_str()], conditions)
      }),
    _ => None,
  }
}

/// Tries the three exports match modes in order: exact, prefix,
/// wildcard. Entries whose resolved file is missing or a directory are
/// skipped so later entries or classical resolution get a chance.
pub fn match_exports<TEnv: ResolverEnv>(
  env: &TEnv,
  package: &PackageRecord,
  rel_require: &str,
  conditions: &[String],
) -> Option<PathBuf> {
  match_exports_exact(env, package, rel_require, conditions)
    .or_else(|| match_exports_prefix(env, package, rel_require, conditions))
    .or_else(|| match_exports_wildcard(env, package, rel_require, conditions))
}

fn match_exports_exact<TEnv: ResolverEnv>(
  env: &TEnv,
  package: &PackageRecord,
  rel_require: &str,
  conditions: &[String],
) -> Option<PathBuf> {
  let key = if rel_require == "./" {
    "."
  } else {
    rel_require
  };
  let target = package.exports.exact.get(key)?;
  let replacement = find_exports_replacement(target, conditions)?;
  existing_file(env, &package.package_dir, &replacement)
}

fn match_exports_prefix<TEnv: ResolverEnv>(
  env: &TEnv,
  package: &PackageRecord,
  rel_require: &str,
  conditions: &[String],
) -> Option<PathBuf> {
  for entry in &package.exports.prefix {
    if !rel_require.starts_with(&entry.prefix) {
      continue;
    }
    let suffix = &rel_require[entry.prefix.len()..];
    let Some(replacement) = find_exports_replacement(&entry.target, conditions)
    else {
      continue;
    };
    let candidate = format!("{replacement}{suffix}");
    if let Some(file) = existing_file(env, &package.package_dir, &candidate) {
      return Some(file);
    }
  }
  None
}

fn match_exports_wildcard<TEnv: ResolverEnv>(
  env: &TEnv,
  package: &PackageRecord,
  rel_require: &str,
  conditions: &[String],
) -> Option<PathBuf> {
  for entry in &package.exports.wildcard {
    if !rel_require.starts_with(&entry.prefix) {
      continue;
    }
    let rest = &rel_require[entry.prefix.len()..];
    let fill = match &entry.suffix {
      Some(suffix) => {
        if rest.len() < suffix.len() || !rest.ends_with(suffix.as_str()) {
          continue;
        }
        &rest[..rest.len() - suffix.len()]
      }
      None => rest,
    };
    let Some(replacement) = find_exports_replacement(&entry.target, conditions)
    else {
      continue;
    };
    let candidate = replacement.replacen('*', fill, 1);
    if let Some(file) = existing_file(env, &package.package_dir, &candidate) {
      return Some(file);
    }
  }
  None
}

fn existing_file<TEnv: ResolverEnv>(
  env: &TEnv,
  package_dir: &Path,
  rel: &str,
) -> Option<PathBuf> {
  let rel = rel.strip_prefix("./").unwrap_or(rel);
  let file = package_dir.join(rel).clean();
  match env.stat_sync(&file) {
    Ok(stat) if stat.is_file => Some(file),
    _ => None,
  }
}
