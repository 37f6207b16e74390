//! Layered settings: defaults, explicit file, environment overrides

use std::collections::HashMap;
use std::fs;

use tempfile::TempDir;

use atomtree::config::{IdStrategy, Settings};

#[ctor::ctor]
fn init() {
    atomtree::util::testing::init_test_setup();
}

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn given_explicit_file_when_loading_then_values_override_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("atomtree.toml");
    fs::write(
        &path,
        r#"
[json]
indent = 4

[binary]
max_bytes = 1024
"#,
    )
    .unwrap();

    let settings = Settings::load_with_env(Some(&path), HashMap::new()).expect("load");

    assert_eq!(settings.json.indent, 4);
    assert_eq!(settings.binary.max_bytes, 1024);
    assert_eq!(settings.binary_codec().max_bytes(), 1024);
    assert_eq!(settings.ids.strategy, IdStrategy::Human);
}

#[test]
fn given_env_overrides_when_loading_then_env_wins_over_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("atomtree.toml");
    fs::write(&path, "[json]\nindent = 4\n").unwrap();

    let vars = env(&[
        ("ATOMTREE_JSON__INDENT", "8"),
        ("ATOMTREE_IDS__STRATEGY", "uuid"),
        ("ATOMTREE_BINARY__MAX_DEPTH", "16"),
    ]);
    let settings = Settings::load_with_env(Some(&path), vars).expect("load");

    assert_eq!(settings.json.indent, 8);
    assert_eq!(settings.ids.strategy, IdStrategy::Uuid);
    assert_eq!(settings.binary_codec().max_depth(), 16);
}

#[test]
fn given_missing_explicit_file_when_loading_then_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope.toml");
    assert!(Settings::load_with_env(Some(&path), HashMap::new()).is_err());
}

#[test]
fn given_unknown_strategy_when_loading_then_error() {
    let vars = env(&[("ATOMTREE_IDS__STRATEGY", "sequential")]);
    assert!(Settings::load_with_env(None, vars).is_err());
}

#[test]
fn given_uuid_strategy_when_generating_then_uuid_shaped_ids() {
    let vars = env(&[("ATOMTREE_IDS__STRATEGY", "uuid")]);
    let settings = Settings::load_with_env(None, vars).expect("load");

    let id = settings.id_generator().generate();
    assert_eq!(id.len(), 36);
    assert_eq!(id.matches('-').count(), 4);
}
