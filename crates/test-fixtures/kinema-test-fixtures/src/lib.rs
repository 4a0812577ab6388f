//! JSON fixtures shared by the kinema test suites.
//!
//! `fixtures/manifest.json` names every fixture, grouped by section, and maps
//! it to a file under `fixtures/`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../../../fixtures/manifest.json"))
        .expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    /// Lists of animation snapshots (info + keyframes).
    animations: HashMap<String, String>,
    /// Property/slide worlds for authoring tests.
    scenes: HashMap<String, String>,
}

fn load_entry<T: DeserializeOwned>(
    section: &HashMap<String, String>,
    kind: &str,
    name: &str,
) -> Result<T> {
    let rel = section
        .get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))?;
    let path: PathBuf = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../../fixtures")
        .join(rel);
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {kind} fixture at {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {kind} fixture '{name}'"))
}

pub mod animations {
    use super::*;

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        load_entry(&MANIFEST.animations, "animation", name)
    }
}

pub mod scenes {
    use super::*;

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        load_entry(&MANIFEST.scenes, "scene", name)
    }
}
