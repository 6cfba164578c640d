//! Workspace path constants

/// Hidden directory holding derived state
pub const QUIRE_DIR: &str = ".quire";

/// Config file inside [`QUIRE_DIR`]
pub const CONFIG_FILE: &str = "config.toml";

/// Index snapshot directory inside [`QUIRE_DIR`]
pub const INDEX_DIR: &str = "index";

/// Directory holding one subdirectory per project
pub const PROJECTS_DIR: &str = "projects";

/// Chapter sources inside a project directory
pub const CHAPTERS_DIR: &str = "chapters";

/// Project background / metadata
pub const PROJECT_FILE: &str = "project.md";

pub const GLOSSARY_FILE: &str = "glossary.md";

pub const OUTLINE_FILE: &str = "outline.md";

/// File extensions treated as chapter sources
pub const CHAPTER_EXTENSIONS: [&str; 2] = ["md", "txt"];
