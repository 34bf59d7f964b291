//! Shared JSON fixtures for segue tests and benches.
//!
//! `fixtures/manifest.json` at the workspace root maps fixture names to files.
//! Clip tables describe the clips wired into a mixer; playlists describe a
//! clip table, the requests appended to it and the expected state after a
//! number of frames.

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
    #[serde(rename = "clip-tables")]
    clip_tables: HashMap<String, String>,
    playlists: HashMap<String, String>,
}

/// Clips wired into a mixer, by input index.
#[derive(Debug, Clone, Deserialize)]
pub struct ClipTable {
    #[serde(default)]
    pub description: Option<String>,
    /// Clip lengths in seconds.
    pub durations: Vec<f32>,
    /// Number of audio mixer inputs (0 for none).
    #[serde(default)]
    pub audio_inputs: usize,
}

/// One append call of a playlist scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct AppendStep {
    pub animations: Vec<usize>,
    #[serde(default)]
    pub audios: Option<Vec<i32>>,
    #[serde(default = "default_queued")]
    pub queued: bool,
}

fn default_queued() -> bool {
    true
}

/// Expected scheduler state after a frame.
#[derive(Debug, Clone, Deserialize)]
pub struct Expectation {
    /// Frame number (1-based tick count) the expectation applies to.
    pub after_ticks: usize,
    /// Animation indices of the queued units, head first.
    #[serde(default)]
    pub queue: Option<Vec<usize>>,
    /// Expected mixer weight per animation input.
    #[serde(default)]
    pub weights: HashMap<usize, f32>,
}

/// A full playlist scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct Playlist {
    #[serde(default)]
    pub description: Option<String>,
    pub clips: String,
    pub delta: f32,
    pub appends: Vec<AppendStep>,
    #[serde(default)]
    pub expect: Vec<Expectation>,
}

impl Playlist {
    /// Resolve the clip table this playlist plays against.
    pub fn clip_table(&self) -> Result<ClipTable> {
        clip_tables::load(&self.clips)
    }

    /// Largest frame number any expectation refers to.
    pub fn frames(&self) -> usize {
        self.expect.iter().map(|e| e.after_ticks).max().unwrap_or(0)
    }
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

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod clip_tables {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.clip_tables.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.clip_tables, "clip table", name)?;
        read_to_string(rel)
    }

    pub fn load(name: &str) -> Result<ClipTable> {
        let rel = lookup(&MANIFEST.clip_tables, "clip table", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.clip_tables, "clip table", name)?;
        Ok(resolve_path(rel))
    }
}

pub mod playlists {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.playlists.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.playlists, "playlist", name)?;
        read_to_string(rel)
    }

    pub fn load(name: &str) -> Result<Playlist> {
        let rel = lookup(&MANIFEST.playlists, "playlist", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.playlists, "playlist", name)?;
        Ok(resolve_path(rel))
    }
}
