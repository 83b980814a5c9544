//! Background indexing orchestration.
//!
//! Hosts run [`WorkspaceIndexer::reindex`] and
//! [`WorkspaceIndexer::run_preparse`] on their own background threads.
//! Starting a new indexing pass cancels any in-flight pre-parse pass, and
//! the pre-parse loop checks its token between units so a superseded pass
//! stops promptly instead of racing its successor.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rayon::prelude::*;
use tokio_util::sync::CancellationToken;

use crate::base::SourceTier;
use crate::workspace::{ShaderIndex, WorkspaceError, collect_shader_paths};

pub struct WorkspaceIndexer {
    index: Arc<ShaderIndex>,
    preparse_cancel: Mutex<Option<CancellationToken>>,
}

impl WorkspaceIndexer {
    pub fn new(index: Arc<ShaderIndex>) -> Self {
        Self {
            index,
            preparse_cancel: Mutex::new(None),
        }
    }

    /// Register everything the discovery collaborator reports.
    ///
    /// Cancels any in-flight pre-parse pass first. The caller is
    /// responsible for invalidating resolver caches once this returns —
    /// that is the indexing-complete signal.
    pub fn reindex(&self, discovery: &dyn crate::workspace::ShaderDiscovery) -> usize {
        self.cancel_preparse();
        let found = discovery.discover();
        let count = found.len();
        for (path, tier) in found {
            self.index.register(path, tier);
        }
        tracing::debug!(units = count, "workspace reindex complete");
        count
    }

    /// Create and store the token a new pre-parse pass will run under,
    /// cancelling the previous pass.
    pub fn begin_preparse(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let previous = self.preparse_cancel.lock().replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }
        token
    }

    /// Parse every workspace-tier unit so unopened files get diagnostics.
    ///
    /// Checks `cancel` between units. Returns the number of units parsed
    /// before completion or cancellation.
    pub fn run_preparse(&self, cancel: &CancellationToken) -> usize {
        let mut parsed = 0;
        for unit in self.index.workspace_units() {
            if cancel.is_cancelled() {
                tracing::debug!(parsed, "pre-parse pass cancelled");
                return parsed;
            }
            if self.index.get_parsed(&unit.name).is_some() {
                parsed += 1;
            }
        }
        tracing::debug!(parsed, "pre-parse pass complete");
        parsed
    }

    pub fn cancel_preparse(&self) {
        if let Some(token) = self.preparse_cancel.lock().take() {
            token.cancel();
        }
    }

    /// Bulk-load a shader library root (engine or package tier): collect
    /// paths, parse in parallel outside the catalog lock, then register
    /// and prime the cache.
    pub fn load_library(&self, root: &Path, tier: SourceTier) -> Result<usize, WorkspaceError> {
        if !root.is_dir() {
            return Err(WorkspaceError::DirectoryNotFound(root.to_path_buf()));
        }
        let paths = collect_shader_paths(root);
        let parser = self.index.parser();

        let parses: Vec<_> = paths
            .par_iter()
            .filter_map(|path| {
                let name = path.file_stem()?.to_str()?.to_string();
                let text = std::fs::read_to_string(path).ok()?;
                Some((path.clone(), name.clone(), parser.parse(&name, &text)))
            })
            .collect();

        let count = parses.len();
        for (path, name, outcome) in parses {
            self.index.register(path, tier);
            self.index.apply_parse(&name, outcome);
        }
        tracing::debug!(root = %root.display(), tier = tier.label(), count, "library load complete");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::StructuralParser;
    use crate::workspace::DirectoryScanner;

    fn indexer() -> WorkspaceIndexer {
        WorkspaceIndexer::new(Arc::new(ShaderIndex::new(Arc::new(StructuralParser))))
    }

    #[test]
    fn test_reindex_registers_discovered_units() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A.sdsl"), "shader A {}").unwrap();
        std::fs::write(dir.path().join("B.sdsl"), "shader B {}").unwrap();

        let indexer = indexer();
        let mut scanner = DirectoryScanner::new();
        scanner.add_root(dir.path(), SourceTier::Workspace);
        assert_eq!(indexer.reindex(&scanner), 2);
        assert!(indexer.index.lookup_by_name("A").is_some());
    }

    #[test]
    fn test_new_pass_cancels_previous_token() {
        let indexer = indexer();
        let first = indexer.begin_preparse();
        assert!(!first.is_cancelled());
        let second = indexer.begin_preparse();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[test]
    fn test_preparse_stops_on_cancelled_token() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A.sdsl"), "shader A {}").unwrap();

        let indexer = indexer();
        let mut scanner = DirectoryScanner::new();
        scanner.add_root(dir.path(), SourceTier::Workspace);
        indexer.reindex(&scanner);

        let token = indexer.begin_preparse();
        token.cancel();
        assert_eq!(indexer.run_preparse(&token), 0);
    }

    #[test]
    fn test_preparse_parses_workspace_units() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("A.sdsl"), "shader A { float X; }").unwrap();

        let indexer = indexer();
        let mut scanner = DirectoryScanner::new();
        scanner.add_root(dir.path(), SourceTier::Workspace);
        indexer.reindex(&scanner);

        let token = indexer.begin_preparse();
        assert_eq!(indexer.run_preparse(&token), 1);
        assert!(indexer.index.get_parsed("A").is_some());
    }

    #[test]
    fn test_load_library_parses_in_bulk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("M.sdsl"), "shader M { float F; }").unwrap();
        std::fs::write(dir.path().join("N.sdsl"), "shader N {}").unwrap();

        let indexer = indexer();
        assert_eq!(indexer.load_library(dir.path(), SourceTier::Engine).unwrap(), 2);
        let decl = indexer.index.get_parsed("M").unwrap();
        assert_eq!(decl.variables.len(), 1);
    }

    #[test]
    fn test_load_library_missing_root_errors() {
        let indexer = indexer();
        assert!(matches!(
            indexer.load_library(Path::new("/nope"), SourceTier::Engine),
            Err(WorkspaceError::DirectoryNotFound(_))
        ));
    }
}
