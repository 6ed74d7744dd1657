// Copyright 2018-2025 the Deno authors. MIT license.

use std::path::Path;
use std::path::PathBuf;

use md5::Digest;

use crate::errors::ResolveError;
use crate::path::to_forward_slashes;

/// In the first path segment, every `.` is rewritten to `_DOT_` so that
/// `object.assign/index.js` and `object-assign/index.js` keep distinct
/// resource names after munging.
pub fn disambiguate_module_name(name: &str) -> String {
  match name.split_once('/') {
    Some((first, rest)) => {
      format!("{}/{}", first.replace('.', "_DOT_"), rest)
    }
    None => name.replace('.', "_DOT_"),
  }
}

/// Resource name for a resolved file: `node_modules/<relative>` under
/// the longest matching package root, project-relative otherwise.
pub fn resource_name_for_file(
  js_package_dirs: &[PathBuf],
  project_dir: &Path,
  file: &Path,
) -> Result<String, ResolveError> {
  let mut best_root: Option<&Path> = None;
  for root in js_package_dirs {
    if file.starts_with(root) {
      let longer = best_root
        .map(|best| root.as_os_str().len() > best.as_os_str().len())
        .unwrap_or(true);
      if longer {
        best_root = Some(root);
      }
    }
  }

  if let Some(root) = best_root {
    // strip_prefix cannot fail, starts_with was checked above
    let rel = file.strip_prefix(root).unwrap();
    let name = to_forward_slashes(rel);
    Ok(format!("node_modules/{}", disambiguate_module_name(&name)))
  } else if file.starts_with(project_dir) {
    let rel = file.strip_prefix(project_dir).unwrap();
    Ok(to_forward_slashes(rel))
  } else {
    Err(ResolveError::FilesOutsideProject {
      file: file.to_path_buf(),
    })
  }
}

/// Canonical file-to-module-name munge: the `.js` extension is dropped,
/// `/` becomes `$`, `#` becomes `_HASH_` and everything else outside
/// `[A-Za-z0-9$_]` becomes `_`. The result is prefixed with `module$`.
pub fn module_name_for_resource(resource_name: &str) -> String {
  let trimmed = resource_name
    .strip_suffix(".js")
    .unwrap_or(resource_name)
    .replace('#', "_HASH_");
  let mut name = String::with_capacity(trimmed.len() + 8);
  name.push_str("module$");
  for c in trimmed.chars() {
    match c {
      '/' | '\\' => name.push('$'),
      c if c.is_ascii_alphanumeric() || c == '$' || c == '_' => name.push(c),
      _ => name.push('_'),
    }
  }
  name
}

/// Identifier munge for synthesized globals, without the `module$`
/// resource prefix.
pub fn global_name(global: &str) -> String {
  global
    .chars()
    .map(|c| {
      if c.is_ascii_alphanumeric() || c == '$' || c == '_' {
        c
      } else {
        '_'
      }
    })
    .collect()
}

/// Output name for a resource. Names derived from over-long resource
/// names are replaced with a digest form so downstream filenames stay
/// within common filesystem limits.
pub fn output_name_for(ns: &str, resource_name: &str) -> String {
  let output_name = format!("{ns}.js");
  if resource_name.len() > 127 || output_name.len() > 127 {
    let digest = md5::Md5::digest(resource_name.as_bytes());
    format!("module$too_long_{}.js", faster_hex::hex_string(&digest))
  } else {
    output_name
  }
}

/// Flattened filename used for asset output names.
pub fn flat_filename(resource_name: &str) -> String {
  resource_name.replace('/', ".")
}
