//! Named JSON fixtures shared by the scroll crates' tests and benches.
//!
//! `fixtures/manifest.json` at the workspace root maps each name to a file,
//! either as a bare relative path or as `{ "path": ... }`.

use std::collections::BTreeMap;
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
    scenes: BTreeMap<String, Entry>,
    controllers: BTreeMap<String, Entry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entry {
    Bare(String),
    Table { path: String },
}

impl Entry {
    fn rel(&self) -> &str {
        match self {
            Entry::Bare(rel) | Entry::Table { path: rel } => rel,
        }
    }
}

#[derive(Clone, Copy)]
enum Group {
    Scenes,
    Controllers,
}

impl Group {
    fn label(self) -> &'static str {
        match self {
            Group::Scenes => "scene",
            Group::Controllers => "controller",
        }
    }

    fn entries(self) -> &'static BTreeMap<String, Entry> {
        match self {
            Group::Scenes => &MANIFEST.scenes,
            Group::Controllers => &MANIFEST.controllers,
        }
    }

    fn names(self) -> Vec<String> {
        self.entries().keys().cloned().collect()
    }

    fn path(self, name: &str) -> Result<PathBuf> {
        let entry = self
            .entries()
            .get(name)
            .ok_or_else(|| anyhow!("no {} fixture named '{name}'", self.label()))?;
        Ok(Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(entry.rel()))
    }

    fn json(self, name: &str) -> Result<String> {
        let path = self.path(name)?;
        std::fs::read_to_string(&path)
            .with_context(|| format!("reading {} fixture {}", self.label(), path.display()))
    }

    fn load<T: DeserializeOwned>(self, name: &str) -> Result<T> {
        let text = self.json(name)?;
        serde_json::from_str(&text)
            .with_context(|| format!("decoding {} fixture '{name}'", self.label()))
    }
}

/// Scene descriptors.
pub mod scenes {
    use super::*;

    /// Fixture names in sorted order.
    pub fn keys() -> Vec<String> {
        Group::Scenes.names()
    }

    pub fn json(name: &str) -> Result<String> {
        Group::Scenes.json(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        Group::Scenes.load(name)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Group::Scenes.path(name)
    }
}

/// Controller option sets.
pub mod controllers {
    use super::*;

    pub fn keys() -> Vec<String> {
        Group::Controllers.names()
    }

    pub fn json(name: &str) -> Result<String> {
        Group::Controllers.json(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        Group::Controllers.load(name)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Group::Controllers.path(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_manifest_entry_exists() {
        for name in scenes::keys() {
            assert!(scenes::path(&name).unwrap().is_file(), "scene {name}");
        }
        for name in controllers::keys() {
            assert!(controllers::path(&name).unwrap().is_file(), "controller {name}");
        }
    }

    #[test]
    fn unknown_names_error() {
        assert!(scenes::json("nope").is_err());
        assert!(controllers::load::<serde_json::Value>("nope").is_err());
    }

    #[test]
    fn table_entries_resolve_like_bare_ones() {
        let path = controllers::path("element-container").unwrap();
        assert!(path.ends_with("controllers/element-container.json"));
    }
}
