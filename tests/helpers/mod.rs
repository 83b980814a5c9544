//! Shared setup for integration tests.

use std::path::PathBuf;

use sdsl::SourceTier;
use sdsl::ide::LanguageService;
use sdsl::workspace::DirectoryScanner;
use tempfile::TempDir;

/// Write the given (file name, source) pairs into a temp workspace root,
/// index it, and return the service plus the written paths.
///
/// The TempDir must stay alive as long as the service reads from disk.
pub fn service_with_files(files: &[(&str, &str)]) -> (TempDir, LanguageService, Vec<PathBuf>) {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = Vec::new();
    for (file_name, source) in files {
        let path = dir.path().join(file_name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, source).unwrap();
        paths.push(path);
    }

    let mut scanner = DirectoryScanner::new();
    scanner.add_root(dir.path(), SourceTier::Workspace);

    let service = LanguageService::with_default_parser();
    service.reindex(&scanner);
    // Prime the parse cache the way a real host does: run the pre-parse
    // pass after indexing completes so every workspace unit has a cached
    // full parse before any edit.
    let cancel = service.begin_preparse();
    service.run_preparse(&cancel);
    (dir, service, paths)
}
