use crate::tools::{
    DirEntryInfo, DirListing, FileHit, FileTools, MoveOutcome, OpStatus, OrganizeOutcome,
    organize::category_for,
};
use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Directories skipped during full-disk walks. Hidden directories are skipped
/// separately.
const SKIP_DIRS: &[&str] = &[
    "node_modules",
    "target",
    "__pycache__",
    "AppData",
    "Windows",
    "Program Files",
    "Program Files (x86)",
];

const MAX_WALK_DEPTH: usize = 8;
const MAX_MATCHES: usize = 200;

/// Local-filesystem implementation of [`FileTools`] over std::fs and walkdir.
pub struct LocalFileTools {
    search_roots: Vec<PathBuf>,
}

impl LocalFileTools {
    pub fn new(search_roots: Vec<PathBuf>) -> Self {
        Self { search_roots }
    }

    fn walk_matching(&self, root: &Path, matcher: impl Fn(&str) -> bool) -> Vec<PathBuf> {
        let mut matches = Vec::new();
        let walker = WalkDir::new(root)
            .max_depth(MAX_WALK_DEPTH)
            .into_iter()
            .filter_entry(|e| {
                // The root itself always passes; a hidden root is still walkable
                if e.depth() == 0 {
                    return true;
                }
                let name = e.file_name().to_string_lossy();
                !(name.starts_with('.') || SKIP_DIRS.contains(&name.as_ref()))
            });
        for entry in walker.filter_map(std::result::Result::ok) {
            if matches.len() >= MAX_MATCHES {
                break;
            }
            let name = entry.file_name().to_string_lossy();
            if matcher(&name) {
                matches.push(entry.path().to_path_buf());
            }
        }
        matches
    }

    fn roots_for(&self, root: Option<&Path>) -> Vec<PathBuf> {
        match root {
            Some(r) => vec![r.to_path_buf()],
            None => self.search_roots.clone(),
        }
    }
}

fn file_hit(path: &Path) -> FileHit {
    let meta = std::fs::metadata(path).ok();
    FileHit {
        path: path.display().to_string(),
        size: meta.as_ref().map_or(0, std::fs::Metadata::len),
        modified: meta
            .and_then(|m| m.modified().ok())
            .map(|t| DateTime::<Utc>::from(t).to_rfc3339()),
    }
}

#[async_trait]
impl FileTools for LocalFileTools {
    async fn search_files(&self, pattern: &str, root: Option<&Path>) -> Result<Vec<FileHit>> {
        let needle = pattern.trim_matches('*').to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits = Vec::new();
        for root in self.roots_for(root) {
            if !root.is_dir() {
                continue;
            }
            for path in self.walk_matching(&root, |name| name.to_lowercase().contains(&needle)) {
                if path.is_file() {
                    hits.push(file_hit(&path));
                }
            }
        }
        debug!("file search: pattern='{}', hits={}", needle, hits.len());
        Ok(hits)
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<PathBuf>> {
        let target = name.to_lowercase();
        if target.is_empty() {
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        for root in &self.search_roots {
            if !root.is_dir() {
                continue;
            }
            found.extend(self.walk_matching(root, |entry_name| {
                let lower = entry_name.to_lowercase();
                // Exact name, or exact stem for files ("budget" matches budget.xlsx)
                lower == target
                    || lower
                        .rsplit_once('.')
                        .is_some_and(|(stem, _ext)| stem == target)
            }));
        }
        Ok(found)
    }

    async fn list_directory(&self, path: &Path) -> Result<DirListing> {
        if !path.exists() {
            bail!("Directory not found: {}", path.display());
        }
        if !path.is_dir() {
            bail!("Not a directory: {}", path.display());
        }

        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)?.flatten() {
            let meta = entry.metadata().ok();
            entries.push(DirEntryInfo {
                name: entry.file_name().to_string_lossy().to_string(),
                is_dir: entry.path().is_dir(),
                size: meta.map_or(0, |m| if m.is_file() { m.len() } else { 0 }),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(DirListing {
            path: path.display().to_string(),
            entries,
        })
    }

    async fn organize_folder(&self, path: &Path, execute: bool) -> Result<OrganizeOutcome> {
        if !path.is_dir() {
            return Ok(OrganizeOutcome {
                status: OpStatus::Failure,
                moved: BTreeMap::new(),
                message: format!("Directory not found: {}", path.display()),
            });
        }

        // Plan: loose files grouped by extension category
        let mut plan: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        for entry in std::fs::read_dir(path)?.flatten() {
            let entry_path = entry.path();
            if !entry_path.is_file() {
                continue;
            }
            let ext = entry_path
                .extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default();
            plan.entry(category_for(&ext).to_string())
                .or_default()
                .push(entry_path);
        }

        if plan.is_empty() {
            return Ok(OrganizeOutcome {
                status: OpStatus::Success,
                moved: BTreeMap::new(),
                message: format!("Nothing to organize in {}", path.display()),
            });
        }

        let mut moved: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut failures = Vec::new();

        for (category, files) in &plan {
            let dest_dir = path.join(category);
            if execute {
                if let Err(e) = std::fs::create_dir_all(&dest_dir) {
                    failures.push(format!("{}: {}", dest_dir.display(), e));
                    continue;
                }
            }
            for file in files {
                let file_name = file.file_name().unwrap_or_default();
                let dest = dest_dir.join(file_name);
                if execute {
                    if let Err(e) = std::fs::rename(file, &dest) {
                        warn!("organize: failed to move {}: {}", file.display(), e);
                        failures.push(format!("{}: {}", file.display(), e));
                        continue;
                    }
                }
                moved
                    .entry(category.clone())
                    .or_default()
                    .push(dest.display().to_string());
            }
        }

        let total: usize = moved.values().map(Vec::len).sum();
        let message = if failures.is_empty() {
            if execute {
                format!("Moved {} files in {}", total, path.display())
            } else {
                format!("Would move {} files in {}", total, path.display())
            }
        } else {
            format!(
                "Moved {} files in {}; {} failed: {}",
                total,
                path.display(),
                failures.len(),
                failures.join("; ")
            )
        };

        Ok(OrganizeOutcome {
            status: OpStatus::Success,
            moved,
            message,
        })
    }

    async fn move_file(&self, src: &Path, dest: &Path) -> Result<MoveOutcome> {
        if !src.exists() {
            return Ok(MoveOutcome {
                status: OpStatus::Failure,
                message: format!("Source not found: {}", src.display()),
            });
        }

        // Moving into an existing directory keeps the file name
        let target = if dest.is_dir() {
            match src.file_name() {
                Some(name) => dest.join(name),
                None => dest.to_path_buf(),
            }
        } else {
            dest.to_path_buf()
        };

        if let Some(parent) = target.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return Ok(MoveOutcome {
                    status: OpStatus::Failure,
                    message: format!("Cannot create {}: {}", parent.display(), e),
                });
            }
        }

        match std::fs::rename(src, &target) {
            Ok(()) => Ok(MoveOutcome {
                status: OpStatus::Success,
                message: format!("Moved {} to {}", src.display(), target.display()),
            }),
            Err(e) => Ok(MoveOutcome {
                status: OpStatus::Failure,
                message: format!("Failed to move {}: {}", src.display(), e),
            }),
        }
    }

    async fn read_file_content(&self, path: &Path) -> Result<String> {
        if !path.is_file() {
            bail!("File not found: {}", path.display());
        }
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(content),
            Err(e) => bail!("Cannot read {}: {}", path.display(), e),
        }
    }
}
