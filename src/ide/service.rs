//! The language service facade.

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::hover::{HoverResult, hover};
use super::members::{MemberGroup, members};
use super::tree::{InheritanceNode, inheritance_tree};
use crate::base::{Position, SourceTier};
use crate::completion::{CompletionItem, completions};
use crate::parser::{ShaderParser, StructuralParser};
use crate::resolver::InheritanceResolver;
use crate::syntax::Diagnostic;
use crate::validator::Validator;
use crate::workspace::{ShaderDiscovery, ShaderIndex, WorkspaceError, WorkspaceIndexer};

/// Owns the shared index, the resolver, and the background indexer, and
/// answers every editor-facing request.
///
/// One service instance is shared between the foreground request path and
/// background indexing; synchronization lives inside the index and the
/// resolver caches, not here.
pub struct LanguageService {
    index: Arc<ShaderIndex>,
    resolver: Arc<InheritanceResolver>,
    indexer: WorkspaceIndexer,
}

impl LanguageService {
    pub fn new(parser: Arc<dyn ShaderParser>) -> Self {
        let index = Arc::new(ShaderIndex::new(parser));
        let resolver = Arc::new(InheritanceResolver::new(index.clone()));
        let indexer = WorkspaceIndexer::new(index.clone());
        Self {
            index,
            resolver,
            indexer,
        }
    }

    /// A service over the bundled structural parser.
    pub fn with_default_parser() -> Self {
        Self::new(Arc::new(StructuralParser))
    }

    pub fn index(&self) -> &Arc<ShaderIndex> {
        &self.index
    }

    pub fn resolver(&self) -> &Arc<InheritanceResolver> {
        &self.resolver
    }

    // =========================================================================
    // Indexing
    // =========================================================================

    /// Full workspace reindex. Cancels any in-flight pre-parse pass, then
    /// invalidates the resolver caches wholesale — the indexing-complete
    /// signal.
    pub fn reindex(&self, discovery: &dyn ShaderDiscovery) -> usize {
        let count = self.indexer.reindex(discovery);
        self.resolver.invalidate();
        count
    }

    /// Bulk-load an engine or package shader library.
    pub fn load_library(&self, root: &Path, tier: SourceTier) -> Result<usize, WorkspaceError> {
        let count = self.indexer.load_library(root, tier)?;
        self.resolver.invalidate();
        Ok(count)
    }

    /// Token for a new pre-parse pass (cancels the previous one). Run the
    /// pass itself with [`LanguageService::run_preparse`] on a background
    /// thread.
    pub fn begin_preparse(&self) -> CancellationToken {
        self.indexer.begin_preparse()
    }

    pub fn run_preparse(&self, cancel: &CancellationToken) -> usize {
        self.indexer.run_preparse(cancel)
    }

    // =========================================================================
    // Editor requests
    // =========================================================================

    /// Push edited buffer content and get the file's full diagnostics.
    pub fn update_content(&self, path: &Path, text: &str) -> Vec<Diagnostic> {
        self.index.update_content(path, text);
        // A reparse can change inheritance structure; stale chains are
        // worse than recomputation.
        self.resolver.invalidate();
        self.diagnostics(path)
    }

    /// Parse diagnostics plus semantic validation for one file.
    pub fn diagnostics(&self, path: &Path) -> Vec<Diagnostic> {
        let Some(unit) = self.index.lookup_by_path(path) else {
            return Vec::new();
        };
        // Make sure the newest content is parsed before validating.
        let _ = self.index.get_parsed(&unit.name);
        let mut diags = self.index.parse_diagnostics(&unit.name);
        let validator = Validator::new(&self.index, &self.resolver);
        diags.extend(validator.validate_unit(&unit));
        diags
    }

    pub fn hover(&self, path: &Path, position: Position) -> Option<HoverResult> {
        let unit = self.index.lookup_by_path(path)?;
        contained("hover", || {
            hover(&self.index, &self.resolver, &unit, position)
        })
        .flatten()
    }

    /// Ranked completion candidates. The caller must already have pushed
    /// buffer edits via `update_content`.
    pub fn completions(
        &self,
        path: &Path,
        buffer: &str,
        position: Position,
    ) -> Vec<CompletionItem> {
        contained("completions", || {
            completions(&self.resolver, path, buffer, position)
        })
        .unwrap_or_default()
    }

    pub fn inheritance_tree(&self, path: &Path) -> Option<InheritanceNode> {
        let unit = self.index.lookup_by_path(path)?;
        contained("inheritance_tree", || inheritance_tree(&self.index, &unit))
    }

    /// Streams/variables/methods/compositions grouped by definer, local
    /// group first.
    pub fn members(&self, path: &Path) -> Vec<MemberGroup> {
        let Some(unit) = self.index.lookup_by_path(path) else {
            return Vec::new();
        };
        contained("members", || members(&self.index, &self.resolver, &unit))
            .unwrap_or_default()
    }
}

/// Contain an internal failure at the operation boundary: the one call
/// degrades to an empty result, the shared state stays intact.
fn contained<T>(operation: &str, f: impl FnOnce() -> T) -> Option<T> {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(operation, "request failed internally, returning empty result");
            None
        }
    }
}

impl Default for LanguageService {
    fn default() -> Self {
        Self::with_default_parser()
    }
}
