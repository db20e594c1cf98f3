//! Shared JSON fixtures for tests and benches.
//!
//! Fixtures live under the workspace `fixtures/` directory and are indexed by
//! `fixtures/manifest.json`, one map of name -> relative path per kind.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    motions: HashMap<String, String>,
    #[serde(default)]
    models: HashMap<String, String>,
    #[serde(default)]
    expressions: HashMap<String, String>,
    #[serde(default)]
    poses: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a>(map: &'a HashMap<String, String>, kind: &str, name: &str) -> Result<&'a str> {
    map.get(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

macro_rules! fixture_kind {
    ($module:ident, $field:ident, $kind:literal) => {
        pub mod $module {
            use super::*;

            pub fn keys() -> Vec<String> {
                let mut keys: Vec<String> = MANIFEST.$field.keys().cloned().collect();
                keys.sort();
                keys
            }

            pub fn json(name: &str) -> Result<String> {
                read_to_string(lookup(&MANIFEST.$field, $kind, name)?)
            }

            pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
                load_json(lookup(&MANIFEST.$field, $kind, name)?)
            }

            pub fn path(name: &str) -> Result<PathBuf> {
                Ok(resolve_path(lookup(&MANIFEST.$field, $kind, name)?))
            }
        }
    };
}

fixture_kind!(motions, motions, "motion");
fixture_kind!(models, models, "model");
fixture_kind!(expressions, expressions, "expression");
fixture_kind!(poses, poses, "pose");
