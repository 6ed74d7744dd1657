// Copyright 2018-2025 the Deno authors. MIT license.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Extension to path_clean::PathClean
pub trait PathClean<T> {
  fn clean(&self) -> T;
}

impl PathClean<PathBuf> for PathBuf {
  fn clean(&self) -> PathBuf {
    let path = path_clean::PathClean::clean(self);
    if cfg!(windows) && path.to_string_lossy().contains("..\\") {
      // temporary workaround because path_clean::PathClean::clean is
      // not good enough on windows
      let mut components = Vec::new();

      for component in path.components() {
        match component {
          Component::CurDir => {
            // skip
          }
          Component::ParentDir => {
            let maybe_last_component = components.pop();
            if !matches!(maybe_last_component, Some(Component::Normal(_))) {
              panic!("Error normalizing: {}", path.display());
            }
          }
          Component::Normal(_) | Component::RootDir | Component::Prefix(_) => {
            components.push(component);
          }
        }
      }
      components.into_iter().collect::<PathBuf>()
    } else {
      path
    }
  }
}

/// Syntactic absolute normalization. `.` and `..` segments are
/// eliminated textually; symbolic links are not dereferenced.
pub fn absolute_file(path: impl AsRef<Path>) -> PathBuf {
  let path = path.as_ref();
  let absolute = if path.is_absolute() {
    path.to_path_buf()
  } else {
    match std::env::current_dir() {
      Ok(cwd) => cwd.join(path),
      Err(_) => path.to_path_buf(),
    }
  };
  absolute.clean()
}

pub fn is_absolute_require(require: &str) -> bool {
  require.starts_with('/') || Path::new(require).is_absolute()
}

pub fn is_relative_require(require: &str) -> bool {
  require.starts_with("./") || require.starts_with("../")
}

/// Forward-slash rendering of a path, as used in resource names and
/// override keys.
pub fn to_forward_slashes(path: &Path) -> String {
  let text = path.to_string_lossy();
  if cfg!(windows) {
    text.replace('\\', "/")
  } else {
    text.into_owned()
  }
}

/// Relative path from `base` to `target`, ascending with `..` segments
/// where needed. Both sides are expected to be absolute and cleaned.
pub fn relativize(base: &Path, target: &Path) -> PathBuf {
  let base_components = base.components().collect::<Vec<_>>();
  let target_components = target.components().collect::<Vec<_>>();
  let common = base_components
    .iter()
    .zip(target_components.iter())
    .take_while(|(a, b)| a == b)
    .count();

  let mut result = PathBuf::new();
  for _ in common..base_components.len() {
    result.push("..");
  }
  for component in &target_components[common..] {
    result.push(component);
  }
  result
}
