use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use serde::Deserialize;
use shared::types::Destination;

/// On-disk layout of the destinations file
#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    destinations: Vec<Destination>,
}

/// Source of the destinations to probe.
#[derive(Debug, Clone)]
pub struct Registry {
    path: PathBuf,
}

impl Registry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the destinations in file order. The file is re-read on every call
    /// so edits take effect on the next probe pass.
    pub async fn load(&self) -> Result<Vec<Destination>> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read destinations file: {}", self.path.display()))?;

        parse(&contents)
            .with_context(|| format!("Failed to parse destinations file: {}", self.path.display()))
    }
}

fn parse(contents: &str) -> Result<Vec<Destination>> {
    let file: RegistryFile = serde_json::from_str(contents)?;
    Ok(file.destinations)
}
