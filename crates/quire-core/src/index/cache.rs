//! Per-project index snapshots
//!
//! Each project is persisted to its own `<index_dir>/<project>.json`, shaped
//! `{ "<chapterId>": [Chunk, ...] }`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::types::ChapterChunks;
use crate::error::{QuireError, Result};
use crate::store::validate_id;

const SNAPSHOT_EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SnapshotStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, project_id: &str) -> Result<PathBuf> {
        validate_id("project id", project_id)?;
        Ok(self
            .dir
            .join(format!("{project_id}.{SNAPSHOT_EXTENSION}")))
    }

    /// Load a project snapshot. `Ok(None)` when none has been written yet.
    pub fn load(&self, project_id: &str) -> Result<Option<ChapterChunks>> {
        let path = self.path_for(project_id)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(QuireError::io_operation("read snapshot", path.display(), e)),
        };
        let chunks: ChapterChunks = serde_json::from_str(&content)?;
        Ok(Some(chunks))
    }

    /// Overwrite a project snapshot with the full chapter map
    pub fn save(&self, project_id: &str, chunks: &ChapterChunks) -> Result<()> {
        let path = self.path_for(project_id)?;
        fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(chunks)?;
        write_if_changed(&path, &content)
    }
}

pub(crate) fn write_if_changed(path: &Path, new_content: &str) -> Result<()> {
    let unchanged = fs::read_to_string(path).is_ok_and(|existing| existing == new_content);
    if unchanged {
        return Ok(());
    }
    fs::write(path, new_content)
        .map_err(|e| QuireError::io_operation("write snapshot", path.display(), e))
}
