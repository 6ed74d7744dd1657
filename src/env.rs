// Copyright 2018-2025 the Deno authors. MIT license.

use std::path::Path;
use std::time::SystemTime;

pub struct ResolverFsStat {
  pub is_file: bool,
  pub is_dir: bool,
  pub last_modified: Option<SystemTime>,
}

/// Filesystem seam for the resolver. The resolver only ever reads.
pub trait ResolverEnv: std::fmt::Debug + Send + Sync {
  fn stat_sync(&self, path: &Path) -> std::io::Result<ResolverFsStat>;

  fn read_to_string(&self, path: &Path) -> std::io::Result<String>;

  fn is_file_sync(&self, path: &Path) -> bool {
    self
      .stat_sync(path)
      .map(|stat| stat.is_file)
      .unwrap_or(false)
  }

  fn is_dir_sync(&self, path: &Path) -> bool {
    self
      .stat_sync(path)
      .map(|stat| stat.is_dir)
      .unwrap_or(false)
  }

  fn exists_sync(&self, path: &Path) -> bool {
    self.stat_sync(path).is_ok()
  }
}

#[derive(Debug, Default, Clone)]
pub struct RealEnv;

impl ResolverEnv for RealEnv {
  fn stat_sync(&self, path: &Path) -> std::io::Result<ResolverFsStat> {
    let metadata = std::fs::metadata(path)?;
    Ok(ResolverFsStat {
      is_file: metadata.is_file(),
      is_dir: metadata.is_dir(),
      last_modified: metadata.modified().ok(),
    })
  }

  fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
    std::fs::read_to_string(path)
  }
}
