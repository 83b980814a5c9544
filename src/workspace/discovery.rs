//! Shader file discovery.
//!
//! The discovery collaborator supplies (path, tier) pairs; the bundled
//! [`DirectoryScanner`] walks configured roots recursively. Unreadable
//! directories are logged and skipped — a single bad mount never aborts
//! a workspace scan.

use std::path::{Path, PathBuf};

use crate::base::{SourceTier, constants::SOURCE_EXTENSIONS};

/// The discovery collaborator interface.
pub trait ShaderDiscovery: Send + Sync {
    fn discover(&self) -> Vec<(PathBuf, SourceTier)>;
}

/// Recursive directory scanner over tiered roots.
#[derive(Debug, Default)]
pub struct DirectoryScanner {
    roots: Vec<(PathBuf, SourceTier)>,
}

impl DirectoryScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, path: impl Into<PathBuf>, tier: SourceTier) -> &mut Self {
        self.roots.push((path.into(), tier));
        self
    }
}

impl ShaderDiscovery for DirectoryScanner {
    fn discover(&self) -> Vec<(PathBuf, SourceTier)> {
        let mut results = Vec::new();
        for (root, tier) in &self.roots {
            let paths = collect_shader_paths(root);
            tracing::debug!(root = %root.display(), tier = tier.label(), count = paths.len(), "discovered shader files");
            results.extend(paths.into_iter().map(|p| (p, *tier)));
        }
        results
    }
}

/// Collect every shader source file under `dir`, recursively.
///
/// Unreadable directories and entries are skipped with a log line.
pub fn collect_shader_paths(dir: &Path) -> Vec<PathBuf> {
    let mut results = Vec::new();
    collect_recursive(dir, &mut results);
    results.sort();
    results
}

fn collect_recursive(dir: &Path, results: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
            return;
        }
    };

    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if path.is_dir() {
            collect_recursive(&path, results);
        } else if is_shader_source(&path) {
            results.push(path);
        }
    }
}

fn is_shader_source(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SOURCE_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_collects_only_shader_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A.sdsl"), "shader A {}").unwrap();
        std::fs::write(dir.path().join("B.sdfx"), "shader B {}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("C.sdsl"), "shader C {}").unwrap();

        let paths = collect_shader_paths(dir.path());
        assert_eq!(paths.len(), 3);
        assert!(paths.iter().all(|p| is_shader_source(p)));
    }

    #[test]
    fn test_missing_root_yields_empty() {
        let paths = collect_shader_paths(Path::new("/definitely/not/here"));
        assert!(paths.is_empty());
    }

    #[test]
    fn test_scanner_tags_tiers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A.sdsl"), "shader A {}").unwrap();

        let mut scanner = DirectoryScanner::new();
        scanner.add_root(dir.path(), SourceTier::Package);
        let found = scanner.discover();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1, SourceTier::Package);
    }
}
