// Copyright 2018-2025 the Deno authors. MIT license.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use npm_resolver::shadow_js_require;
use npm_resolver::FileInspection;
use npm_resolver::InspectorIssue;
use npm_resolver::JsInspector;
use npm_resolver::JsOptions;
use npm_resolver::Mode;
use npm_resolver::NpmConfig;
use npm_resolver::NpmResolver;
use npm_resolver::RealEnv;
use npm_resolver::ResolveError;
use npm_resolver::ResourceKind;
use npm_resolver::ResourceType;
use npm_resolver::NPM_CACHE_KEY;
use pretty_assertions::assert_eq;

/// Minimal stand-in for the external parser: collects
/// `require("...")` occurrences textually.
#[derive(Debug)]
struct ScanInspector;

impl JsInspector for ScanInspector {
  fn inspect(
    &self,
    _resource_name: &str,
    source: &str,
  ) -> Result<FileInspection, anyhow::Error> {
    if source.contains("@@broken@@") {
      return Ok(FileInspection {
        js_errors: vec![InspectorIssue {
          line: 1,
          column: 0,
          message: "unexpected token".to_string(),
        }],
        ..Default::default()
      });
    }
    let mut js_requires = Vec::new();
    for part in source.split("require(\"").skip(1) {
      if let Some(end) = part.find('"') {
        js_requires.push(part[..end].to_string());
      }
    }
    Ok(FileInspection {
      js_requires,
      js_language: "ECMASCRIPT_NEXT".to_string(),
      ..Default::default()
    })
  }

  fn cache_key(&self) -> String {
    "scan-inspector/1".to_string()
  }
}

fn write_file(root: &Path, rel: &str, contents: &str) {
  let path = root.join(rel);
  std::fs::create_dir_all(path.parent().unwrap()).unwrap();
  std::fs::write(path, contents).unwrap();
}

fn npm_at(root: &Path) -> NpmResolver<RealEnv, ScanInspector> {
  npm_with_options(root, JsOptions::default())
}

fn npm_with_options(
  root: &Path,
  js_options: JsOptions,
) -> NpmResolver<RealEnv, ScanInspector> {
  NpmResolver::new(
    RealEnv,
    ScanInspector,
    NpmConfig {
      project_dir: root.to_path_buf(),
      js_options,
      ..Default::default()
    },
  )
}

fn project() -> (tempfile::TempDir, PathBuf) {
  let dir = tempfile::tempdir().unwrap();
  let root = dir.path().canonicalize().unwrap();
  (dir, root)
}

#[test]
fn bare_main_resolution() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/pkg-a/package.json",
    r#"{"name":"pkg-a","version":"1.0.0","main":"lib/index.js"}"#,
  );
  write_file(
    &root,
    "node_modules/pkg-a/lib/index.js",
    "module.exports = require(\"./codec\");\n",
  );
  write_file(&root, "node_modules/pkg-a/lib/codec.js", "");

  let npm = npm_at(&root);
  let resource = npm.find_resource(None, "pkg-a").unwrap().unwrap();

  assert_eq!(resource.resource_name, "node_modules/pkg-a/lib/index.js");
  assert_eq!(resource.ns, "module$node_modules$pkg_a$lib$index");
  assert_eq!(
    resource.output_name,
    "module$node_modules$pkg_a$lib$index.js"
  );
  assert!(resource.provides.contains(&resource.ns));
  assert_eq!(resource.provides.len(), 1);
  assert!(resource.requires.is_empty());
  assert_eq!(resource.deps, vec!["./codec".to_string()]);
  assert_eq!(resource.resource_id.kind, ResourceKind::Resource);
  assert_eq!(resource.typ, ResourceType::Js);

  assert_eq!(resource.cache_key.len(), 3);
  assert_eq!(resource.cache_key[0], NPM_CACHE_KEY);
  assert_eq!(resource.cache_key[1], "scan-inspector/1");
  assert_eq!(resource.cache_key[2].len(), 40);

  let package = resource.package.as_ref().unwrap();
  assert_eq!(package.package_name, "pkg-a");
  assert_eq!(package.match_name.as_deref(), Some("pkg-a"));
}

#[test]
fn subpath_with_extension_search() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/pkg-a/package.json",
    r#"{"name":"pkg-a","version":"1.0.0","main":"lib/index.js"}"#,
  );
  write_file(&root, "node_modules/pkg-a/lib/index.js", "");
  write_file(&root, "node_modules/pkg-a/util.js", "");

  let npm = npm_at(&root);
  let resource = npm.find_resource(None, "pkg-a/util").unwrap().unwrap();
  assert_eq!(resource.resource_name, "node_modules/pkg-a/util.js");
  assert_eq!(
    resource.file.as_deref(),
    Some(root.join("node_modules/pkg-a/util.js").as_path())
  );
}

#[test]
fn module_name_disambiguation() {
  let (_dir, root) = project();
  for name in ["object.assign", "object-assign"] {
    write_file(
      &root,
      &format!("node_modules/{name}/package.json"),
      &format!(r#"{{"name":"{name}","version":"1.0.0","main":"index.js"}}"#),
    );
    write_file(&root, &format!("node_modules/{name}/index.js"), "");
  }

  let npm = npm_at(&root);
  let dotted = npm.find_resource(None, "object.assign").unwrap().unwrap();
  let dashed = npm.find_resource(None, "object-assign").unwrap().unwrap();

  assert_eq!(
    dotted.resource_name,
    "node_modules/object_DOT_assign/index.js"
  );
  assert_eq!(dashed.resource_name, "node_modules/object-assign/index.js");
  assert_ne!(dotted.ns, dashed.ns);
}

#[test]
fn exports_wildcard_and_closed_package() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/p/package.json",
    r#"{"name":"p","version":"1.0.0","exports":{"./feat/*.js":"./src/feat/*.js"}}"#,
  );
  write_file(&root, "node_modules/p/src/feat/alpha.js", "");

  let npm = npm_at(&root);
  let resource = npm.find_resource(None, "p/feat/alpha.js").unwrap().unwrap();
  assert_eq!(
    resource.resource_name,
    "node_modules/p/src/feat/alpha.js"
  );

  // no `.js` suffix: the wildcard does not match, and the package is
  // closed to external requests
  let err = npm.find_resource(None, "p/feat/alpha").unwrap_err();
  assert!(matches!(
    err,
    ResolveError::ExportsResolutionFailed { .. }
  ));
}

#[test]
fn closed_package_exports_bypass() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/p/package.json",
    r#"{"name":"p","version":"1.0.0","exports":{"./feat/*.js":"./src/feat/*.js"}}"#,
  );
  write_file(&root, "node_modules/p/src/feat/alpha.js", "");

  let npm = npm_with_options(
    &root,
    JsOptions {
      exports_bypass: true,
      ..Default::default()
    },
  );
  let resource = npm
    .find_resource(None, "p/src/feat/alpha")
    .unwrap()
    .unwrap();
  assert_eq!(
    resource.resource_name,
    "node_modules/p/src/feat/alpha.js"
  );
}

#[test]
fn closed_package_allows_internal_requests() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/p/package.json",
    r#"{"name":"p","version":"1.0.0","exports":{"./feat/*.js":"./src/feat/*.js"}}"#,
  );
  write_file(&root, "node_modules/p/src/feat/alpha.js", "");
  write_file(&root, "node_modules/p/src/extra.js", "");

  let npm = npm_at(&root);
  let alpha = npm.find_resource(None, "p/feat/alpha.js").unwrap().unwrap();

  // not exported, but the request originates inside the package
  let extra = npm
    .find_resource(Some(&alpha), "../extra.js")
    .unwrap()
    .unwrap();
  assert_eq!(extra.resource_name, "node_modules/p/src/extra.js");
}

#[test]
fn exports_exact_with_condition_map() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/pkg/package.json",
    r#"{"name":"pkg","version":"1.0.0","exports":{".":{"browser":"./b.js","require":"./c.js"}}}"#,
  );
  write_file(&root, "node_modules/pkg/b.js", "");
  write_file(&root, "node_modules/pkg/c.js", "");

  let npm = npm_at(&root);
  let resource = npm.find_resource(None, "pkg").unwrap().unwrap();
  assert_eq!(resource.resource_name, "node_modules/pkg/b.js");
}

#[test]
fn exports_prefix_entry() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/pkg/package.json",
    r#"{"name":"pkg","version":"1.0.0","exports":{"./lib/":"./src/"}}"#,
  );
  write_file(&root, "node_modules/pkg/src/a.js", "");

  let npm = npm_at(&root);
  let resource = npm.find_resource(None, "pkg/lib/a.js").unwrap().unwrap();
  assert_eq!(resource.resource_name, "node_modules/pkg/src/a.js");
}

#[test]
fn browser_override_redirects_to_another_package() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/consumer/package.json",
    r#"{"name":"consumer","version":"1.0.0","main":"index.js","browser":{"fs":"memfs"}}"#,
  );
  write_file(
    &root,
    "node_modules/consumer/index.js",
    "module.exports = require(\"fs\");\n",
  );
  write_file(
    &root,
    "node_modules/memfs/package.json",
    r#"{"name":"memfs","version":"4.0.0","main":"lib/index.js"}"#,
  );
  write_file(&root, "node_modules/memfs/lib/index.js", "");

  let npm = npm_at(&root);
  let consumer = npm.find_resource(None, "consumer").unwrap().unwrap();
  assert_eq!(consumer.deps, vec!["fs".to_string()]);

  let fs = npm.find_resource(Some(&consumer), "fs").unwrap().unwrap();
  assert_eq!(fs.resource_name, "node_modules/memfs/lib/index.js");
}

#[test]
fn browser_override_disables_require() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/consumer/package.json",
    r#"{"name":"consumer","version":"1.0.0","main":"index.js","browser":{"net":false}}"#,
  );
  write_file(&root, "node_modules/consumer/index.js", "");

  let npm = npm_at(&root);
  let consumer = npm.find_resource(None, "consumer").unwrap().unwrap();
  let net = npm.find_resource(Some(&consumer), "net").unwrap().unwrap();
  assert_eq!(net.resource_id.kind, ResourceKind::Empty);
  assert_eq!(net.ns, "shadow$empty");
  assert!(net.cache_key.is_empty());
  assert_eq!(
    shadow_js_require(&net, true),
    "shadow.js.require(\"shadow$empty\", {\"globals\":[]});"
  );
}

#[test]
fn browser_override_redirects_file() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/pkg/package.json",
    r#"{"name":"pkg","version":"1.0.0","main":"server.js","browser":{"./server.js":"./client.js"}}"#,
  );
  write_file(&root, "node_modules/pkg/server.js", "");
  write_file(&root, "node_modules/pkg/client.js", "");

  let npm = npm_at(&root);
  let via_override = npm.find_resource(None, "pkg").unwrap().unwrap();
  let direct = npm.find_resource(None, "pkg/client.js").unwrap().unwrap();
  // overriding ./server.js to ./client.js is the same as requesting
  // ./client.js directly
  assert_eq!(via_override.resource_name, direct.resource_name);
  assert!(Arc::ptr_eq(&via_override, &direct));
}

#[test]
fn browser_override_equal_string_is_noop() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/pkg/package.json",
    r#"{"name":"pkg","version":"1.0.0","main":"x.js","browser":{"./x.js":"./x.js"}}"#,
  );
  write_file(&root, "node_modules/pkg/x.js", "");

  let npm = npm_at(&root);
  let resource = npm.find_resource(None, "pkg").unwrap().unwrap();
  assert_eq!(resource.resource_name, "node_modules/pkg/x.js");
}

#[test]
fn user_package_overrides() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/pkg/package.json",
    r#"{"name":"pkg","version":"1.0.0","main":"a.js"}"#,
  );
  write_file(&root, "node_modules/pkg/a.js", "");
  write_file(&root, "node_modules/pkg/b.js", "");

  let mut js_options = JsOptions::default();
  js_options.package_overrides.insert(
    "pkg".to_string(),
    [("./a.js".to_string(), serde_json::json!("./b.js"))]
      .into_iter()
      .collect(),
  );
  let npm = npm_with_options(&root, js_options);
  let resource = npm.find_resource(None, "pkg").unwrap().unwrap();
  assert_eq!(resource.resource_name, "node_modules/pkg/b.js");
}

#[test]
fn invalid_override_value_fails() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/pkg/package.json",
    r#"{"name":"pkg","version":"1.0.0","main":"a.js"}"#,
  );
  write_file(&root, "node_modules/pkg/a.js", "");

  let mut js_options = JsOptions::default();
  js_options.package_overrides.insert(
    "pkg".to_string(),
    [("./a.js".to_string(), serde_json::json!(42))]
      .into_iter()
      .collect(),
  );
  let npm = npm_with_options(&root, js_options);
  assert!(matches!(
    npm.find_resource(None, "pkg"),
    Err(ResolveError::InvalidOverride { .. })
  ));
}

#[test]
fn subpath_imports() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/pkg/package.json",
    r##"{"name":"pkg","version":"1.0.0","main":"index.js","imports":{"#internal":"./lib/internal.js","#dep":{"browser":"memfs"}}}"##,
  );
  write_file(&root, "node_modules/pkg/index.js", "");
  write_file(&root, "node_modules/pkg/lib/internal.js", "");
  write_file(
    &root,
    "node_modules/memfs/package.json",
    r#"{"name":"memfs","version":"4.0.0","main":"index.js"}"#,
  );
  write_file(&root, "node_modules/memfs/index.js", "");

  let npm = npm_at(&root);
  let index = npm.find_resource(None, "pkg").unwrap().unwrap();

  let internal = npm
    .find_resource(Some(&index), "#internal")
    .unwrap()
    .unwrap();
  assert_eq!(
    internal.resource_name,
    "node_modules/pkg/lib/internal.js"
  );

  // condition maps may redirect an import to another package
  let dep = npm.find_resource(Some(&index), "#dep").unwrap().unwrap();
  assert_eq!(dep.resource_name, "node_modules/memfs/index.js");

  assert!(matches!(
    npm.find_resource(Some(&index), "#missing"),
    Err(ResolveError::NoImport { .. })
  ));
}

#[test]
fn relative_requires_walk_parent_packages() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/outer/package.json",
    r#"{"name":"outer","version":"1.0.0","main":"index.js"}"#,
  );
  write_file(&root, "node_modules/outer/index.js", "");
  write_file(&root, "node_modules/outer/shared.js", "");
  write_file(
    &root,
    "node_modules/outer/inner/package.json",
    r#"{"name":"inner","version":"1.0.0","main":"main.js"}"#,
  );
  write_file(&root, "node_modules/outer/inner/main.js", "");

  let npm = npm_at(&root);
  let outer = npm.find_resource(None, "outer").unwrap().unwrap();

  // ./inner is a directory with its own package.json
  let inner = npm.find_resource(Some(&outer), "./inner").unwrap().unwrap();
  assert_eq!(
    inner.resource_name,
    "node_modules/outer/inner/main.js"
  );
  let inner_package = inner.package.as_ref().unwrap();
  assert_eq!(inner_package.package_name, "inner");
  assert_eq!(
    inner_package.parent.as_ref().unwrap().package_name,
    "outer"
  );

  // ../shared.js leaves the nested package and lands in the parent
  let shared = npm
    .find_resource(Some(&inner), "../shared.js")
    .unwrap()
    .unwrap();
  assert_eq!(shared.resource_name, "node_modules/outer/shared.js");

  // walking above the outermost package is fatal
  assert!(matches!(
    npm.find_resource(Some(&outer), "../../outside.js"),
    Err(ResolveError::RelativeOutsidePackage { .. })
  ));
}

#[test]
fn nested_installs_prefer_nearest() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/outer/package.json",
    r#"{"name":"outer","version":"1.0.0","main":"index.js"}"#,
  );
  write_file(
    &root,
    "node_modules/outer/index.js",
    "module.exports = require(\"dep\");\n",
  );
  write_file(
    &root,
    "node_modules/outer/node_modules/dep/package.json",
    r#"{"name":"dep","version":"2.0.0","main":"index.js"}"#,
  );
  write_file(&root, "node_modules/outer/node_modules/dep/index.js", "");
  // decoy at the root; the nested install must win
  write_file(
    &root,
    "node_modules/dep/package.json",
    r#"{"name":"dep","version":"1.0.0","main":"index.js"}"#,
  );
  write_file(&root, "node_modules/dep/index.js", "");

  let npm = npm_at(&root);
  let outer = npm.find_resource(None, "outer").unwrap().unwrap();
  let dep = npm.find_resource(Some(&outer), "dep").unwrap().unwrap();
  assert_eq!(
    dep.resource_name,
    "node_modules/outer/node_modules/dep/index.js"
  );
  assert_eq!(dep.package.as_ref().unwrap().version, "2.0.0");

  // without a requester the global root wins
  let global_dep = npm.find_resource(None, "dep").unwrap().unwrap();
  assert_eq!(global_dep.resource_name, "node_modules/dep/index.js");
}

#[test]
fn entry_keys_and_fallbacks() {
  let (_dir, root) = project();
  // browser entry wins over main
  write_file(
    &root,
    "node_modules/with-browser/package.json",
    r#"{"name":"with-browser","version":"1.0.0","main":"m.js","browser":"b.js"}"#,
  );
  write_file(&root, "node_modules/with-browser/m.js", "");
  write_file(&root, "node_modules/with-browser/b.js", "");
  // no entry keys at all: index.js fallback
  write_file(
    &root,
    "node_modules/plain/package.json",
    r#"{"name":"plain","version":"1.0.0"}"#,
  );
  write_file(&root, "node_modules/plain/index.js", "");
  // entry keys present but none resolves
  write_file(
    &root,
    "node_modules/broken/package.json",
    r#"{"name":"broken","version":"1.0.0","main":"missing.js"}"#,
  );

  let npm = npm_at(&root);
  assert_eq!(
    npm
      .find_resource(None, "with-browser")
      .unwrap()
      .unwrap()
      .resource_name,
    "node_modules/with-browser/b.js"
  );
  assert_eq!(
    npm
      .find_resource(None, "plain")
      .unwrap()
      .unwrap()
      .resource_name,
    "node_modules/plain/index.js"
  );
  assert!(matches!(
    npm.find_resource(None, "broken"),
    Err(ResolveError::MissingEntries { .. })
  ));
}

#[test]
fn unknown_package_is_not_fatal() {
  let (_dir, root) = project();
  let npm = npm_at(&root);
  assert!(npm.find_resource(None, "left-pad").unwrap().is_none());
}

#[test]
fn json_files_get_minimal_records() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/pkg/package.json",
    r#"{"name":"pkg","version":"1.0.0","main":"index.js"}"#,
  );
  write_file(&root, "node_modules/pkg/index.js", "");
  write_file(&root, "node_modules/pkg/data.json", r#"{"answer":42}"#);

  let npm = npm_at(&root);
  let index = npm.find_resource(None, "pkg").unwrap().unwrap();
  let data = npm
    .find_resource(Some(&index), "./data.json")
    .unwrap()
    .unwrap();
  assert!(data.json);
  assert!(data.deps.is_empty());
  assert!(data.requires.is_empty());
  assert_eq!(data.typ, ResourceType::Js);
}

#[test]
fn asset_files() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/pkg/package.json",
    r#"{"name":"pkg","version":"1.0.0","main":"index.js"}"#,
  );
  write_file(&root, "node_modules/pkg/index.js", "");
  write_file(&root, "node_modules/pkg/images/logo.png", "png-bytes");

  let npm = npm_at(&root);
  let index = npm.find_resource(None, "pkg").unwrap().unwrap();
  let logo = npm
    .find_resource(Some(&index), "./images/logo.png")
    .unwrap()
    .unwrap();
  assert_eq!(logo.resource_id.kind, ResourceKind::Asset);
  assert_eq!(logo.typ, ResourceType::ShadowJs);
  assert_eq!(logo.output_name, "node_modules.pkg.images.logo.png");
  // [canonical path, mtime]
  assert_eq!(logo.cache_key.len(), 2);
}

#[test]
fn inspector_errors_are_fatal() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/pkg/package.json",
    r#"{"name":"pkg","version":"1.0.0","main":"index.js"}"#,
  );
  write_file(&root, "node_modules/pkg/index.js", "@@broken@@");

  let npm = npm_at(&root);
  assert!(matches!(
    npm.find_resource(None, "pkg"),
    Err(ResolveError::FileInfoErrors { .. })
  ));
}

#[test]
fn file_info_is_cached_and_invalidated_on_demand() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/pkg/package.json",
    r#"{"name":"pkg","version":"1.0.0","main":"index.js"}"#,
  );
  write_file(&root, "node_modules/pkg/index.js", "");

  let npm = npm_at(&root);
  let first = npm.find_resource(None, "pkg").unwrap().unwrap();
  let second = npm.find_resource(None, "pkg").unwrap().unwrap();
  assert!(Arc::ptr_eq(&first, &second));

  npm.invalidate_file(first.file.as_ref().unwrap());
  let third = npm.find_resource(None, "pkg").unwrap().unwrap();
  assert!(!Arc::ptr_eq(&first, &third));
  // same content, same cache key
  assert_eq!(first.cache_key, third.cache_key);
}

#[test]
fn package_json_cache_revalidates_on_mtime_change() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/pkg/package.json",
    r#"{"name":"pkg","version":"1.0.0","main":"index.js"}"#,
  );
  write_file(&root, "node_modules/pkg/index.js", "");

  let npm = npm_at(&root);
  let path = root.join("node_modules/pkg/package.json");
  let first = npm.read_package_json(&path).unwrap().unwrap();
  let second = npm.read_package_json(&path).unwrap().unwrap();
  assert!(Arc::ptr_eq(&first, &second));

  std::thread::sleep(std::time::Duration::from_millis(25));
  write_file(
    &root,
    "node_modules/pkg/package.json",
    r#"{"name":"pkg","version":"1.0.1","main":"index.js"}"#,
  );
  let third = npm.read_package_json(&path).unwrap().unwrap();
  assert_eq!(third.version, "1.0.1");
}

#[test]
fn project_files_resolve_relative_to_project() {
  let (_dir, root) = project();
  write_file(
    &root,
    "node_modules/pkg/package.json",
    r#"{"name":"pkg","version":"1.0.0","main":"index.js"}"#,
  );
  write_file(&root, "node_modules/pkg/index.js", "");
  write_file(&root, "src/app.js", "module.exports = require(\"pkg\");\n");

  let npm = npm_at(&root);
  let app = npm
    .get_file_info(None, &root.join("src/app.js"))
    .unwrap();
  assert_eq!(app.resource_name, "src/app.js");
  assert_eq!(app.ns, "module$src$app");
  assert_eq!(app.deps, vec!["pkg".to_string()]);
}

#[test]
fn global_resources() {
  let (_dir, root) = project();
  let npm = npm_at(&root);
  let jquery = npm.js_resource_for_global("jquery", "window.jQuery");
  assert_eq!(jquery.resource_id.kind, ResourceKind::Global);
  assert_eq!(jquery.resource_id.name, jquery.resource_name);
  assert_eq!(jquery.source, "module.exports=(window.jQuery);");
  assert_eq!(jquery.ns, "window_jQuery");
  assert_eq!(jquery.cache_key.len(), 2);
  assert!(jquery.provides.contains(&jquery.ns));

  // two requires wired to the same global collapse to one id
  let zepto = npm.js_resource_for_global("zepto", "window.jQuery");
  assert_eq!(zepto.resource_id, jquery.resource_id);
}

#[test]
fn file_replacements_pick_min_in_release_mode() {
  let (_dir, root) = project();
  write_file(&root, "vendor/widget.js", "");
  write_file(&root, "vendor/widget.min.js", "");

  let release = npm_with_options(
    &root,
    JsOptions {
      mode: Mode::Release,
      ..Default::default()
    },
  );
  let resource = release
    .js_resource_for_file(
      "widget",
      &root.join("vendor/widget.js"),
      Some(&root.join("vendor/widget.min.js")),
    )
    .unwrap();
  assert_eq!(resource.resource_name, "vendor/widget.min.js");

  // dev mode ignores the minified variant
  let dev = npm_at(&root);
  let resource = dev
    .js_resource_for_file(
      "widget",
      &root.join("vendor/widget.js"),
      Some(&root.join("vendor/widget.min.js")),
    )
    .unwrap();
  assert_eq!(resource.resource_name, "vendor/widget.js");

  // release mode without a minified variant falls back to the file
  let resource = release
    .js_resource_for_file("widget", &root.join("vendor/widget.js"), None)
    .unwrap();
  assert_eq!(resource.resource_name, "vendor/widget.js");
}
