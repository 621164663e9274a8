mod local;
mod organize;

pub use local::LocalFileTools;
pub use organize::category_for;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One file-search match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileHit {
    pub path: String,
    pub size: u64,
    pub modified: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirListing {
    pub path: String,
    pub entries: Vec<DirEntryInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpStatus {
    Success,
    Failure,
}

/// Outcome of a folder organization. `moved` maps category name to the files
/// placed (or, in preview mode, that would be placed) under it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeOutcome {
    pub status: OpStatus,
    pub moved: BTreeMap<String, Vec<String>>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub status: OpStatus,
    pub message: String,
}

/// Filesystem capabilities consumed by the orchestration layer.
///
/// `search_files`, `find_by_name`, `list_directory` and `read_file_content`
/// are pure reads. `organize_folder` with `execute` and `move_file` mutate
/// the filesystem; partial failures are reported in the outcome message and
/// never rolled back.
#[async_trait]
pub trait FileTools: Send + Sync {
    /// Case-insensitive substring search for files under `root` (or all
    /// configured search roots when `None`). `pattern` may carry `*` glob
    /// padding, which is ignored.
    async fn search_files(&self, pattern: &str, root: Option<&Path>) -> anyhow::Result<Vec<FileHit>>;

    /// All files and directories whose name matches `name` exactly
    /// (case-insensitive).
    async fn find_by_name(&self, name: &str) -> anyhow::Result<Vec<PathBuf>>;

    /// Fails with not-found when `path` is missing or not a directory.
    async fn list_directory(&self, path: &Path) -> anyhow::Result<DirListing>;

    /// Group loose files in `path` into per-category subfolders. With
    /// `execute` false, returns the plan without touching anything.
    async fn organize_folder(&self, path: &Path, execute: bool) -> anyhow::Result<OrganizeOutcome>;

    async fn move_file(&self, src: &Path, dest: &Path) -> anyhow::Result<MoveOutcome>;

    /// Fails when the file is missing, unreadable, or not valid UTF-8.
    async fn read_file_content(&self, path: &Path) -> anyhow::Result<String>;
}
