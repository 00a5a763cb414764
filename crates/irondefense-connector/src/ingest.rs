//! Container and artifact persistence.
//!
//! The hosting platform owns incident storage; the connector only sees
//! the [`IngestSink`] seam. Both sinks here de-duplicate the way the
//! platform does: a container is keyed by its `source_data_identifier`
//! and saving it again returns the existing id, an artifact is keyed by
//! `(container_id, source_data_identifier)`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Containers file inside a [`JsonlSink`] directory.
pub const CONTAINERS_FILE: &str = "containers.jsonl";
/// Artifacts file inside a [`JsonlSink`] directory.
pub const ARTIFACTS_FILE: &str = "artifacts.jsonl";

/// An incident container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kill_chain: Option<String>,
    pub source_data_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Evidence attached to a container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub container_id: u64,
    pub source_data_identifier: String,
    pub start_time: String,
    pub data: Value,
}

/// Which record a sink failed to save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Container,
    Artifact,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container => f.write_str("container"),
            Self::Artifact => f.write_str("artifact"),
        }
    }
}

/// Sink errors. The message is shown after `... creation failed: `.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

/// Id of a saved record and whether the save created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedRecord {
    pub id: u64,
    pub created: bool,
}

/// Destination for polled records.
pub trait IngestSink {
    /// Save a container, or return the id of the one with the same
    /// `source_data_identifier`.
    fn save_container(&mut self, container: &Container) -> Result<SavedRecord, IngestError>;

    /// Save an artifact, or return the id of the identical one already
    /// attached to the same container.
    fn save_artifact(&mut self, artifact: &Artifact) -> Result<SavedRecord, IngestError>;
}

/// Id allocation and de-duplication shared by the sinks.
#[derive(Debug, Default)]
struct RecordIndex {
    containers: HashMap<String, u64>,
    artifacts: HashMap<(u64, String), u64>,
    next_container: u64,
    next_artifact: u64,
}

impl RecordIndex {
    fn container(&mut self, sdi: &str) -> SavedRecord {
        if let Some(&id) = self.containers.get(sdi) {
            return SavedRecord { id, created: false };
        }
        self.next_container += 1;
        let id = self.next_container;
        self.containers.insert(sdi.to_string(), id);
        SavedRecord { id, created: true }
    }

    fn artifact(&mut self, container_id: u64, sdi: &str) -> SavedRecord {
        let key = (container_id, sdi.to_string());
        if let Some(&id) = self.artifacts.get(&key) {
            return SavedRecord { id, created: false };
        }
        self.next_artifact += 1;
        let id = self.next_artifact;
        self.artifacts.insert(key, id);
        SavedRecord { id, created: true }
    }

    fn restore_container(&mut self, id: u64, sdi: String) {
        self.next_container = self.next_container.max(id);
        self.containers.insert(sdi, id);
    }

    fn restore_artifact(&mut self, id: u64, container_id: u64, sdi: String) {
        self.next_artifact = self.next_artifact.max(id);
        self.artifacts.insert((container_id, sdi), id);
    }
}

/// In-memory sink. Records stay in insertion order.
#[derive(Debug, Default)]
pub struct MemorySink {
    index: RecordIndex,
    pub containers: Vec<(u64, Container)>,
    pub artifacts: Vec<(u64, Artifact)>,
    reject: Option<(RecordKind, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that refuses every record of `kind` with `message`.
    pub fn rejecting(kind: RecordKind, message: impl Into<String>) -> Self {
        Self {
            reject: Some((kind, message.into())),
            ..Self::default()
        }
    }

    fn check(&self, kind: RecordKind) -> Result<(), IngestError> {
        match &self.reject {
            Some((rejected, message)) if *rejected == kind => {
                Err(IngestError::Rejected(message.clone()))
            }
            _ => Ok(()),
        }
    }

    /// Container saved under `sdi`, if any.
    pub fn container(&self, sdi: &str) -> Option<&Container> {
        self.containers
            .iter()
            .map(|(_, c)| c)
            .find(|c| c.source_data_identifier == sdi)
    }
}

impl IngestSink for MemorySink {
    fn save_container(&mut self, container: &Container) -> Result<SavedRecord, IngestError> {
        self.check(RecordKind::Container)?;
        let saved = self.index.container(&container.source_data_identifier);
        if saved.created {
            self.containers.push((saved.id, container.clone()));
        }
        Ok(saved)
    }

    fn save_artifact(&mut self, artifact: &Artifact) -> Result<SavedRecord, IngestError> {
        self.check(RecordKind::Artifact)?;
        let saved = self
            .index
            .artifact(artifact.container_id, &artifact.source_data_identifier);
        if saved.created {
            self.artifacts.push((saved.id, artifact.clone()));
        }
        Ok(saved)
    }
}

#[derive(Serialize, Deserialize)]
struct Stored<T> {
    id: u64,
    #[serde(flatten)]
    record: T,
}

/// Sink appending records to `containers.jsonl` and `artifacts.jsonl`.
///
/// Existing files are read on open so repeated polls into the same
/// directory keep de-duplicating.
#[derive(Debug)]
pub struct JsonlSink {
    dir: PathBuf,
    index: RecordIndex,
}

impl JsonlSink {
    /// Open (creating if needed) a sink directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, IngestError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let mut index = RecordIndex::default();
        for stored in read_lines::<Container>(&dir.join(CONTAINERS_FILE))? {
            index.restore_container(stored.id, stored.record.source_data_identifier);
        }
        for stored in read_lines::<Artifact>(&dir.join(ARTIFACTS_FILE))? {
            index.restore_artifact(
                stored.id,
                stored.record.container_id,
                stored.record.source_data_identifier,
            );
        }

        tracing::debug!(
            dir = %dir.display(),
            containers = index.containers.len(),
            artifacts = index.artifacts.len(),
            "Opened ingest directory"
        );
        Ok(Self { dir, index })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn append<T: Serialize>(&self, file: &str, id: u64, record: &T) -> Result<(), IngestError> {
        let mut out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(file))?;
        let line = serde_json::to_string(&Stored { id, record })?;
        writeln!(out, "{line}")?;
        Ok(())
    }
}

fn read_lines<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<Stored<T>>, IngestError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

impl IngestSink for JsonlSink {
    fn save_container(&mut self, container: &Container) -> Result<SavedRecord, IngestError> {
        let saved = self.index.container(&container.source_data_identifier);
        if saved.created {
            self.append(CONTAINERS_FILE, saved.id, container)?;
        }
        Ok(saved)
    }

    fn save_artifact(&mut self, artifact: &Artifact) -> Result<SavedRecord, IngestError> {
        let saved = self
            .index
            .artifact(artifact.container_id, &artifact.source_data_identifier);
        if saved.created {
            self.append(ARTIFACTS_FILE, saved.id, artifact)?;
        }
        Ok(saved)
    }
}
