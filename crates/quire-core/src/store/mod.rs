//! Project sources on disk
//!
//! Layout under a workspace root:
//!
//! ```text
//! <root>/
//!   .quire/config.toml
//!   .quire/index/<project>.json
//!   projects/<project>/project.md
//!   projects/<project>/glossary.md
//!   projects/<project>/outline.md
//!   projects/<project>/chapters/*.md
//! ```
//!
//! Project, chapter and outline CRUD live outside this crate; the pipeline
//! only reads through [`ProjectSource`].

pub mod chapter;
pub mod paths;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::QuireConfig;
use crate::error::{QuireError, Result};

pub use chapter::{ChapterSource, StructuredSummary};
use paths::{
    CHAPTERS_DIR, CHAPTER_EXTENSIONS, CONFIG_FILE, GLOSSARY_FILE, INDEX_DIR, OUTLINE_FILE,
    PROJECTS_DIR, PROJECT_FILE, QUIRE_DIR,
};

/// Read access to a project's writing artifacts.
///
/// Missing artifacts are not errors: implementations return an empty string
/// or an empty chapter list. `Err` is reserved for artifacts that exist but
/// cannot be read.
pub trait ProjectSource {
    /// Project background / metadata text
    fn project_metadata(&self, project_id: &str) -> Result<String>;

    fn glossary(&self, project_id: &str) -> Result<String>;

    fn outline(&self, project_id: &str) -> Result<String>;

    /// All chapter sources of a project, in a stable order
    fn list_chapters(&self, project_id: &str) -> Result<Vec<ChapterSource>>;

    /// Look up one chapter by id
    fn chapter(&self, project_id: &str, chapter_id: &str) -> Result<Option<ChapterSource>> {
        Ok(self
            .list_chapters(project_id)?
            .into_iter()
            .find(|c| c.id == chapter_id))
    }
}

/// Reject ids that would escape their directory
pub fn validate_id(kind: &str, id: &str) -> Result<()> {
    let bad = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(['/', '\\'])
        || id.chars().any(char::is_control);
    if bad {
        crate::bail_invalid!(kind, format!("{id:?}"));
    }
    Ok(())
}

/// Filesystem-backed project source rooted at a workspace directory
#[derive(Debug, Clone)]
pub struct ProjectStore {
    root: PathBuf,
}

impl ProjectStore {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        ProjectStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for derived state
    pub fn quire_dir(&self) -> PathBuf {
        self.root.join(QUIRE_DIR)
    }

    /// Directory holding per-project index snapshots
    pub fn index_dir(&self) -> PathBuf {
        self.quire_dir().join(INDEX_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.quire_dir().join(CONFIG_FILE)
    }

    /// Load `.quire/config.toml`, or defaults if absent
    pub fn load_config(&self) -> Result<QuireConfig> {
        QuireConfig::load_or_default(&self.config_path())
    }

    pub fn project_dir(&self, project_id: &str) -> PathBuf {
        self.root.join(PROJECTS_DIR).join(project_id)
    }

    pub fn chapters_dir(&self, project_id: &str) -> PathBuf {
        self.project_dir(project_id).join(CHAPTERS_DIR)
    }

    fn read_artifact(&self, project_id: &str, file: &str) -> Result<String> {
        validate_id("project id", project_id)?;
        let path = self.project_dir(project_id).join(file);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "artifact missing, using empty text");
                Ok(String::new())
            }
            Err(e) => Err(QuireError::io_operation("read", path.display(), e)),
        }
    }

    /// Chapter source files, sorted by path
    pub fn chapter_files(&self, project_id: &str) -> Result<Vec<PathBuf>> {
        validate_id("project id", project_id)?;
        let dir = self.chapters_dir(project_id);
        if !dir.exists() {
            tracing::debug!(dir = %dir.display(), "no chapter directory");
            return Ok(Vec::new());
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| CHAPTER_EXTENSIONS.contains(&e))
            })
            .collect();
        files.sort();
        Ok(files)
    }
}

impl ProjectSource for ProjectStore {
    fn project_metadata(&self, project_id: &str) -> Result<String> {
        self.read_artifact(project_id, PROJECT_FILE)
    }

    fn glossary(&self, project_id: &str) -> Result<String> {
        self.read_artifact(project_id, GLOSSARY_FILE)
    }

    fn outline(&self, project_id: &str) -> Result<String> {
        self.read_artifact(project_id, OUTLINE_FILE)
    }

    #[tracing::instrument(skip(self))]
    fn list_chapters(&self, project_id: &str) -> Result<Vec<ChapterSource>> {
        let mut chapters = Vec::new();
        for path in self.chapter_files(project_id)? {
            match fs::read_to_string(&path) {
                Ok(content) => chapters.push(ChapterSource::parse_file(&content, &path)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read chapter");
                }
            }
        }
        Ok(chapters)
    }
}
