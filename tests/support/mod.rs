use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a Command for quire rooted at `dir`
pub fn quire(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("quire");
    cmd.arg("--root").arg(dir);
    cmd
}

/// Write a file, creating parent directories
pub fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Workspace with project `novel`: metadata, glossary, outline and two
/// chapters. `ch1` is long enough to span several chunks.
pub fn setup_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("projects").join("novel");

    write(
        &project.join("project.md"),
        "# The Harbor\nsome chatter\nTarget: finish the first draft\nAudience: young adults\n",
    );
    write(&project.join("glossary.md"), "Quay: a stone landing\nnoise line\n");
    write(&project.join("outline.md"), "1. Arrival\n2. Storm\n");

    let mut ch1 = String::from("---\nid: ch1\nsummary:\n  main_point: The harbor is dying\n---\n# Arrival\n\n");
    for i in 0..30 {
        ch1.push_str(&format!(
            "Paragraph {i} tells of the budget for the harbor. The ferry came late again.\n\n"
        ));
    }
    write(&project.join("chapters").join("01-arrival.md"), &ch1);
    write(
        &project.join("chapters").join("02-storm.md"),
        "# Storm\n\nThe storm broke over the quay.\n",
    );

    dir
}

/// Small chunks so the long chapter splits
#[allow(dead_code)]
pub fn write_small_chunk_config(dir: &Path) {
    write(
        &dir.join(".quire").join("config.toml"),
        "[index]\nchunk_size = 300\nchunk_overlap = 30\n",
    );
}

/// Parse stdout as JSON
pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}
