// Copyright 2018-2025 the Deno authors. MIT license.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;

use parking_lot::Mutex;

use crate::file_info::ResourceRc;
use crate::package_json::PackageRecordRc;

#[derive(Debug)]
pub struct PackageJsonCacheEntry {
  pub record: PackageRecordRc,
  pub last_modified: Option<SystemTime>,
}

/// The process-wide mutable index shared by all build threads.
///
/// Fills are idempotent: two concurrent misses for the same key may
/// both populate an entry, but both observe the same final value.
/// Negative package lookups are cached as `None` and behave like any
/// other entry.
#[derive(Debug, Default)]
pub struct ResolverIndex {
  /// Absolute file to its extracted resource. No explicit
  /// invalidation; callers discard entries themselves when an mtime
  /// check says so.
  pub files: Mutex<HashMap<PathBuf, ResourceRc>>,
  /// package.json file to its parsed record, validated against mtime
  /// on every read.
  pub package_json_cache: Mutex<HashMap<PathBuf, PackageJsonCacheEntry>>,
  /// Bare package name to record; `None` means known-absent.
  pub packages: Mutex<HashMap<String, Option<PackageRecordRc>>>,
  /// Reserved for caller use.
  pub require_cache: Mutex<HashMap<String, ResourceRc>>,
}
