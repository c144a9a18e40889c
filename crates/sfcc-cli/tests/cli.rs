use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn fixture(root: &Path) {
    write(
        root,
        "src/cartridges/app_custom/cartridge/controllers/Home.js",
        "var server = require('server');\nserver.append('Show', function (req, res, next) { next(); });\n",
    );
    write(
        root,
        "src/cartridges/app_storefront_base/cartridge/controllers/Home.js",
        "var server = require('server');\nserver.get('Show', function (req, res, next) { next(); });\n",
    );
    write(
        root,
        "src/cartridges/app_storefront_base/cartridge/controllers/Cart.js",
        "",
    );
}

fn cli(cache: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sfcc-overrides").unwrap();
    cmd.env("SFCC_OVERRIDES_CACHE_DIR", cache);
    cmd
}

#[test]
fn tree_renders_counts() {
    let tmp = tempfile::tempdir().unwrap();
    let ws = tmp.path().join("ws");
    fixture(&ws);

    cli(&tmp.path().join("cache"))
        .args(["tree"])
        .arg(&ws)
        .args(["--cartridge-path", "app_custom:app_storefront_base"])
        .assert()
        .success()
        .stdout(predicate::str::contains("app_custom"))
        .stdout(predicate::str::contains("Home.js  ↓ 1"))
        .stdout(predicate::str::contains("Cart.js"));
}

#[test]
fn tree_overrides_only_prunes() {
    let tmp = tempfile::tempdir().unwrap();
    let ws = tmp.path().join("ws");
    fixture(&ws);

    cli(&tmp.path().join("cache"))
        .args(["tree"])
        .arg(&ws)
        .args([
            "--cartridge-path",
            "app_custom:app_storefront_base",
            "--overrides-only",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Home.js"))
        .stdout(predicate::str::contains("Cart.js").not());
}

#[test]
fn tree_json_is_parseable() {
    let tmp = tempfile::tempdir().unwrap();
    let ws = tmp.path().join("ws");
    fixture(&ws);

    let output = cli(&tmp.path().join("cache"))
        .args(["tree"])
        .arg(&ws)
        .args(["--cartridge-path", "app_custom:app_storefront_base", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let roots = tree.as_array().unwrap();
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[0]["name"], "app_custom");
    assert_eq!(roots[0]["counts"]["below"], 1);
}

#[test]
fn reversing_the_cartridge_path_between_runs_flips_the_counts() {
    let tmp = tempfile::tempdir().unwrap();
    let ws = tmp.path().join("ws");
    fixture(&ws);
    let cache = tmp.path().join("cache");

    let output = cli(&cache)
        .args(["tree"])
        .arg(&ws)
        .args(["--cartridge-path", "app_custom:app_storefront_base", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tree[0]["name"], "app_custom");
    assert_eq!(tree[0]["counts"]["above"], 0);
    assert_eq!(tree[0]["counts"]["below"], 1);

    // Same cache, reversed priority: app_custom is now overridden, not
    // overriding, and stale persisted counts must not leak through.
    let output = cli(&cache)
        .args(["tree"])
        .arg(&ws)
        .args(["--cartridge-path", "app_storefront_base:app_custom", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tree[0]["name"], "app_storefront_base");
    assert_eq!(tree[0]["counts"]["above"], 0);
    assert_eq!(tree[0]["counts"]["below"], 1);
    assert_eq!(tree[1]["name"], "app_custom");
    assert_eq!(tree[1]["counts"]["above"], 1);
    assert_eq!(tree[1]["counts"]["below"], 0);
}

#[test]
fn overrides_lists_the_stack_with_routes() {
    let tmp = tempfile::tempdir().unwrap();
    let ws = tmp.path().join("ws");
    fixture(&ws);

    cli(&tmp.path().join("cache"))
        .args(["overrides"])
        .arg(&ws)
        .args([
            "src/cartridges/app_custom/cartridge/controllers/Home.js",
            "--cartridge-path",
            "app_custom:app_storefront_base",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Home (app_custom) *"))
        .stdout(predicate::str::contains("Show  append  line 2"))
        .stdout(predicate::str::contains("Home (app_storefront_base)"));
}

#[test]
fn overrides_rejects_untracked_files() {
    let tmp = tempfile::tempdir().unwrap();
    let ws = tmp.path().join("ws");
    fixture(&ws);

    cli(&tmp.path().join("cache"))
        .args(["overrides"])
        .arg(&ws)
        .args([
            "src/lib/helpers.js",
            "--cartridge-path",
            "app_custom:app_storefront_base",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a tracked cartridge file"));
}

#[test]
fn cartridge_path_defaults_to_dw_json() {
    let tmp = tempfile::tempdir().unwrap();
    let ws = tmp.path().join("ws");
    fixture(&ws);
    write(
        &ws,
        "dw.json",
        r#"{"cartridgesPath": "app_custom:app_storefront_base"}"#,
    );

    cli(&tmp.path().join("cache"))
        .args(["tree"])
        .arg(&ws)
        .assert()
        .success()
        .stdout(predicate::str::contains("app_storefront_base"));
}

#[test]
fn missing_cartridge_path_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let ws = tmp.path().join("ws");
    fixture(&ws);

    cli(&tmp.path().join("cache"))
        .args(["tree"])
        .arg(&ws)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no cartridge path"));
}

#[test]
fn refresh_reports_totals_and_cache_status_reflects_it() {
    let tmp = tempfile::tempdir().unwrap();
    let ws = tmp.path().join("ws");
    fixture(&ws);
    let cache = tmp.path().join("cache");

    cli(&cache)
        .args(["refresh"])
        .arg(&ws)
        .args(["--cartridge-path", "app_custom:app_storefront_base"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "refreshed: 3 files across 2 cartridges",
        ));

    let output = cli(&cache)
        .args(["cache", "--json", "--path"])
        .arg(&ws)
        .arg("status")
        .output()
        .unwrap();
    assert!(output.status.success());
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["files_entries"], 1);

    cli(&cache)
        .args(["cache", "--path"])
        .arg(&ws)
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("cache: cleaned"));

    let output = cli(&cache)
        .args(["cache", "--json", "--path"])
        .arg(&ws)
        .arg("status")
        .output()
        .unwrap();
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["files_entries"], 0);
    assert_eq!(status["overrides_entries"], 0);
}
