//! Per-user document store.
//!
//! Every document (roadmap, test bank, score log, adaptation log) is owned
//! by exactly one user id and lives in its own JSON file, replaced wholesale
//! on every write. Writes go to a temp sibling and are renamed into place so
//! a crash mid-write never leaves a torn file behind. There is no locking:
//! two concurrent writers for the same user race and the last rename wins.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::adaptation::{AdaptationEvent, AdaptationLog};
use crate::models::questions::TestDocument;
use crate::models::roadmap::RoadmapDocument;
use crate::models::scores::ScoreLog;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Filesystem-backed store rooted at one data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStore { root: root.into() }
    }

    pub fn roadmap_path(&self, user_id: i32) -> PathBuf {
        self.root.join("roadmaps").join(format!("{user_id}.json"))
    }

    fn tests_path(&self, user_id: i32) -> PathBuf {
        self.root.join("tests").join(format!("{user_id}_tests.json"))
    }

    fn scores_path(&self, user_id: i32) -> PathBuf {
        self.root.join("scores").join(format!("{user_id}_scores.json"))
    }

    fn adaptations_path(&self, user_id: i32) -> PathBuf {
        self.root
            .join("adaptations")
            .join(format!("{user_id}_adapt.json"))
    }

    // ── Roadmaps ────────────────────────────────────────────────────────

    pub fn roadmap_exists(&self, user_id: i32) -> bool {
        self.roadmap_path(user_id).exists()
    }

    pub fn load_roadmap(&self, user_id: i32) -> Result<Option<RoadmapDocument>, StoreError> {
        read_json(&self.roadmap_path(user_id))
    }

    pub fn save_roadmap(&self, user_id: i32, roadmap: &RoadmapDocument) -> Result<(), StoreError> {
        write_json(&self.roadmap_path(user_id), roadmap)
    }

    // ── Test documents ──────────────────────────────────────────────────

    pub fn load_tests(&self, user_id: i32) -> Result<Option<TestDocument>, StoreError> {
        read_json(&self.tests_path(user_id))
    }

    pub fn save_tests(&self, user_id: i32, tests: &TestDocument) -> Result<(), StoreError> {
        write_json(&self.tests_path(user_id), tests)
    }

    // ── Score logs ──────────────────────────────────────────────────────

    pub fn load_scores(&self, user_id: i32) -> Result<ScoreLog, StoreError> {
        Ok(read_json(&self.scores_path(user_id))?.unwrap_or_default())
    }

    pub fn save_scores(&self, user_id: i32, scores: &ScoreLog) -> Result<(), StoreError> {
        write_json(&self.scores_path(user_id), scores)
    }

    // ── Adaptation logs ─────────────────────────────────────────────────

    pub fn load_adaptations(&self, user_id: i32) -> Result<AdaptationLog, StoreError> {
        Ok(read_json(&self.adaptations_path(user_id))?
            .unwrap_or_else(|| AdaptationLog::new(user_id)))
    }

    pub fn append_adaptations(
        &self,
        user_id: i32,
        events: impl IntoIterator<Item = AdaptationEvent>,
    ) -> Result<(), StoreError> {
        let mut log = self.load_adaptations(user_id)?;
        log.adaptations.extend(events);
        write_json(&self.adaptations_path(user_id), &log)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Serializes to a temp sibling, then renames over the target.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let json = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &json).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;

    debug!("Wrote {} bytes to {}", json.len(), path.display());
    Ok(())
}
