//! The shader catalog and lazy parse cache.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::{SourceTier, Span};
use crate::parser::ShaderParser;
use crate::syntax::{Diagnostic, ParseOutcome, ShaderDecl, codes};
use crate::workspace::ShaderUnit;

/// Cached parse state for one shader name.
///
/// `decl` is the structure for the newest content; `last_good` is the most
/// recent full (non-partial) parse and survives failed reparses, so a
/// broken edit never blanks out inheritance or completion.
#[derive(Default)]
struct ParseState {
    decl: Option<Arc<ShaderDecl>>,
    last_good: Option<Arc<ShaderDecl>>,
    diagnostics: Vec<Diagnostic>,
    dirty: bool,
}

impl ParseState {
    fn fresh() -> Self {
        Self {
            dirty: true,
            ..Default::default()
        }
    }

    fn served(&self) -> Option<Arc<ShaderDecl>> {
        self.decl.clone().or_else(|| self.last_good.clone())
    }

    /// Apply a parse outcome under the cache rules: a result replaces the
    /// cache only if it is a full parse or no full parse exists yet.
    fn apply(&mut self, outcome: ParseOutcome) {
        self.diagnostics = outcome.diagnostics;
        self.dirty = false;
        match outcome.decl {
            Some(decl) if !decl.is_partial => {
                let decl = Arc::new(decl);
                self.decl = Some(decl.clone());
                self.last_good = Some(decl);
            }
            Some(partial) => {
                if self.last_good.is_none() {
                    self.decl = Some(Arc::new(partial));
                } else {
                    // Keep serving the last full parse.
                    self.decl = None;
                }
            }
            None => {
                self.decl = None;
            }
        }
    }
}

#[derive(Default)]
struct Catalog {
    /// All units per name, in registration order. The per-name default is
    /// derived: first workspace-tier unit, else first registered.
    units: IndexMap<SmolStr, Vec<ShaderUnit>>,
    by_path: FxHashMap<PathBuf, ShaderUnit>,
    parses: FxHashMap<SmolStr, ParseState>,
}

impl Catalog {
    fn default_unit<'a>(units: &'a [ShaderUnit]) -> Option<&'a ShaderUnit> {
        units
            .iter()
            .find(|u| u.tier == SourceTier::Workspace)
            .or_else(|| units.first())
    }
}

/// The workspace-wide shader catalog with its lazy parse cache.
///
/// Internally synchronized: one mutex guards the catalog maps, shared by
/// interactive requests and background indexing. Derived inheritance
/// caches live in the resolver layer behind their own guard.
pub struct ShaderIndex {
    parser: Arc<dyn ShaderParser>,
    catalog: Mutex<Catalog>,
}

impl ShaderIndex {
    pub fn new(parser: Arc<dyn ShaderParser>) -> Self {
        Self {
            parser,
            catalog: Mutex::new(Catalog::default()),
        }
    }

    /// The parser collaborator, for bulk loaders that parse outside the
    /// catalog lock.
    pub fn parser(&self) -> Arc<dyn ShaderParser> {
        self.parser.clone()
    }

    // =========================================================================
    // Registration and lookup
    // =========================================================================

    /// Insert or update a unit.
    ///
    /// A later non-workspace registration never becomes the default over
    /// an existing workspace unit of the same name; two workspace units
    /// sharing a name are both retained.
    pub fn register(&self, path: impl Into<PathBuf>, tier: SourceTier) -> ShaderUnit {
        let unit = ShaderUnit::new(path, tier);
        let mut catalog = self.catalog.lock();

        // A re-registered path replaces its previous entry in place.
        if let Some(previous) = catalog.by_path.get(&unit.path).cloned() {
            if previous.name != unit.name {
                if let Some(units) = catalog.units.get_mut(&previous.name) {
                    units.retain(|u| u.path != unit.path);
                }
            }
        }
        catalog.by_path.insert(unit.path.clone(), unit.clone());

        let units = catalog.units.entry(unit.name.clone()).or_default();
        match units.iter_mut().find(|u| u.path == unit.path) {
            Some(existing) => *existing = unit.clone(),
            None => units.push(unit.clone()),
        }
        catalog
            .parses
            .entry(unit.name.clone())
            .or_insert_with(ParseState::fresh);
        unit
    }

    /// The default unit for a name (workspace tier shadows the others).
    pub fn lookup_by_name(&self, name: &str) -> Option<ShaderUnit> {
        let catalog = self.catalog.lock();
        catalog
            .units
            .get(name)
            .and_then(|units| Catalog::default_unit(units))
            .cloned()
    }

    pub fn lookup_by_path(&self, path: &Path) -> Option<ShaderUnit> {
        self.catalog.lock().by_path.get(path).cloned()
    }

    /// Every unit registered under a name, in registration order.
    pub fn units_of(&self, name: &str) -> Vec<ShaderUnit> {
        self.catalog
            .lock()
            .units
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// True when two or more workspace-tier units share this name.
    pub fn has_duplicates(&self, name: &str) -> bool {
        self.catalog
            .lock()
            .units
            .get(name)
            .map(|units| {
                units
                    .iter()
                    .filter(|u| u.tier == SourceTier::Workspace)
                    .count()
                    >= 2
            })
            .unwrap_or(false)
    }

    /// All registered names, in registration order.
    pub fn unit_names(&self) -> Vec<SmolStr> {
        self.catalog.lock().units.keys().cloned().collect()
    }

    /// Default unit per name, in registration order.
    pub fn units_snapshot(&self) -> Vec<ShaderUnit> {
        let catalog = self.catalog.lock();
        catalog
            .units
            .values()
            .filter_map(|units| Catalog::default_unit(units))
            .cloned()
            .collect()
    }

    /// All workspace-tier units (pre-parse targets).
    pub fn workspace_units(&self) -> Vec<ShaderUnit> {
        let catalog = self.catalog.lock();
        catalog
            .units
            .values()
            .flatten()
            .filter(|u| u.tier == SourceTier::Workspace)
            .cloned()
            .collect()
    }

    /// Disambiguate a duplicated name from the asking file's location:
    /// the candidate whose directory shares the longest path-segment
    /// prefix with `context_path`'s directory wins, ties break by
    /// registration order.
    pub fn closest_to(&self, name: &str, context_path: Option<&Path>) -> Option<ShaderUnit> {
        let catalog = self.catalog.lock();
        let units = catalog.units.get(name)?;
        let Some(context) = context_path else {
            return Catalog::default_unit(units).cloned();
        };
        if units.len() == 1 {
            return units.first().cloned();
        }

        let context_dir: Vec<_> = context.parent().map(path_segments).unwrap_or_default();
        // Strictly-greater comparison keeps the first-registered candidate
        // on ties.
        let mut best: Option<(usize, &ShaderUnit)> = None;
        for unit in units {
            let dir: Vec<_> = unit.path.parent().map(path_segments).unwrap_or_default();
            let score = shared_prefix_len(&context_dir, &dir);
            if best.map(|(s, _)| score > s).unwrap_or(true) {
                best = Some((score, unit));
            }
        }
        best.map(|(_, unit)| unit.clone())
    }

    // =========================================================================
    // Parse cache
    // =========================================================================

    /// The cached structure for a name, parsing on demand.
    ///
    /// Serves the newest parse when one exists, else the last full parse.
    /// Repeated failures keep returning the last full parse rather than
    /// nothing.
    pub fn get_parsed(&self, name: &str) -> Option<Arc<ShaderDecl>> {
        let mut catalog = self.catalog.lock();
        let unit = catalog
            .units
            .get(name)
            .and_then(|units| Catalog::default_unit(units))
            .cloned()?;

        let state = catalog
            .parses
            .entry(unit.name.clone())
            .or_insert_with(ParseState::fresh);
        if !state.dirty {
            return state.served();
        }

        tracing::debug!(shader = name, path = %unit.path.display(), "parse cache miss");
        let outcome = match std::fs::read_to_string(&unit.path) {
            Ok(text) => run_parser(self.parser.as_ref(), name, &text),
            Err(e) => {
                tracing::debug!(shader = name, error = %e, "source unreadable, serving last good parse");
                state.dirty = false;
                return state.served();
            }
        };
        let state = catalog
            .parses
            .entry(unit.name.clone())
            .or_insert_with(ParseState::fresh);
        state.apply(outcome);
        state.served()
    }

    /// Push new buffer content for a path: invalidate that shader name's
    /// cache entry, reparse synchronously, and return the parse
    /// diagnostics. Unknown paths are registered as workspace units.
    pub fn update_content(&self, path: &Path, text: &str) -> Vec<Diagnostic> {
        let unit = match self.lookup_by_path(path) {
            Some(unit) => unit,
            None => self.register(path, SourceTier::Workspace),
        };

        let outcome = run_parser(self.parser.as_ref(), &unit.name, text);
        let mut catalog = self.catalog.lock();
        let state = catalog
            .parses
            .entry(unit.name.clone())
            .or_insert_with(ParseState::fresh);
        state.apply(outcome);
        state.diagnostics.clone()
    }

    /// Apply an externally computed parse outcome (bulk loaders parse in
    /// parallel outside the catalog lock).
    pub fn apply_parse(&self, name: &str, outcome: ParseOutcome) {
        let mut catalog = self.catalog.lock();
        let state = catalog
            .parses
            .entry(SmolStr::new(name))
            .or_insert_with(ParseState::fresh);
        state.apply(outcome);
    }

    /// Stored parse diagnostics for a name.
    pub fn parse_diagnostics(&self, name: &str) -> Vec<Diagnostic> {
        self.catalog
            .lock()
            .parses
            .get(name)
            .map(|s| s.diagnostics.clone())
            .unwrap_or_default()
    }
}

/// Run the parser collaborator, containing panics at the index boundary.
fn run_parser(parser: &dyn ShaderParser, name: &str, text: &str) -> ParseOutcome {
    match catch_unwind(AssertUnwindSafe(|| parser.parse(name, text))) {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::warn!(shader = name, "parser panicked, degrading to empty outcome");
            ParseOutcome {
                decl: None,
                diagnostics: vec![
                    Diagnostic::error(Span::default(), "internal parser failure")
                        .with_code(codes::SYNTAX_ERROR),
                ],
            }
        }
    }
}

fn path_segments(path: &Path) -> Vec<std::ffi::OsString> {
    path.components().map(|c| c.as_os_str().to_owned()).collect()
}

fn shared_prefix_len(a: &[std::ffi::OsString], b: &[std::ffi::OsString]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::StructuralParser;

    fn index() -> ShaderIndex {
        ShaderIndex::new(Arc::new(StructuralParser))
    }

    #[test]
    fn test_workspace_shadows_engine_for_default_lookup() {
        let idx = index();
        idx.register("/engine/Base.sdsl", SourceTier::Engine);
        idx.register("/proj/Base.sdsl", SourceTier::Workspace);
        let unit = idx.lookup_by_name("Base").unwrap();
        assert_eq!(unit.tier, SourceTier::Workspace);

        // And registration order does not matter.
        let idx = index();
        idx.register("/proj/Base.sdsl", SourceTier::Workspace);
        idx.register("/engine/Base.sdsl", SourceTier::Engine);
        assert_eq!(
            idx.lookup_by_name("Base").unwrap().tier,
            SourceTier::Workspace
        );
    }

    #[test]
    fn test_duplicate_workspace_units_both_retained() {
        let idx = index();
        idx.register("/proj/a/Base.sdsl", SourceTier::Workspace);
        idx.register("/proj/b/Base.sdsl", SourceTier::Workspace);
        assert!(idx.has_duplicates("Base"));
        assert_eq!(idx.units_of("Base").len(), 2);
        // First registered stays the default.
        assert_eq!(
            idx.lookup_by_name("Base").unwrap().path,
            PathBuf::from("/proj/a/Base.sdsl")
        );
        // Both remain addressable by path.
        assert!(idx.lookup_by_path(Path::new("/proj/b/Base.sdsl")).is_some());
    }

    #[test]
    fn test_engine_duplicate_is_not_flagged() {
        let idx = index();
        idx.register("/engine/Base.sdsl", SourceTier::Engine);
        idx.register("/proj/Base.sdsl", SourceTier::Workspace);
        assert!(!idx.has_duplicates("Base"));
    }

    #[test]
    fn test_closest_to_prefers_nearest_directory() {
        let idx = index();
        idx.register("/proj/terrain/Base.sdsl", SourceTier::Workspace);
        idx.register("/proj/water/Base.sdsl", SourceTier::Workspace);

        let picked = idx
            .closest_to("Base", Some(Path::new("/proj/water/Ocean.sdsl")))
            .unwrap();
        assert_eq!(picked.path, PathBuf::from("/proj/water/Base.sdsl"));

        // Without context, falls back to the tier-preferred default.
        let picked = idx.closest_to("Base", None).unwrap();
        assert_eq!(picked.path, PathBuf::from("/proj/terrain/Base.sdsl"));
    }

    #[test]
    fn test_closest_to_tie_breaks_by_registration_order() {
        let idx = index();
        idx.register("/proj/x/Base.sdsl", SourceTier::Workspace);
        idx.register("/proj/y/Base.sdsl", SourceTier::Workspace);
        let picked = idx
            .closest_to("Base", Some(Path::new("/elsewhere/Ctx.sdsl")))
            .unwrap();
        assert_eq!(picked.path, PathBuf::from("/proj/x/Base.sdsl"));
    }

    #[test]
    fn test_update_content_parses_and_caches() {
        let idx = index();
        let path = Path::new("/proj/Base.sdsl");
        let diags = idx.update_content(path, "shader Base { stage float4 Color; }");
        assert!(diags.is_empty());
        let decl = idx.get_parsed("Base").unwrap();
        assert_eq!(decl.name, "Base");
        assert_eq!(decl.variables.len(), 1);
    }

    #[test]
    fn test_last_good_parse_survives_broken_edit() {
        let idx = index();
        let path = Path::new("/proj/Base.sdsl");
        idx.update_content(path, "shader Base { stage float4 Color; }");

        // A completely unparseable edit...
        let diags = idx.update_content(path, "sha sha sha");
        assert!(!diags.is_empty());

        // ...still serves the last full structure.
        let decl = idx.get_parsed("Base").unwrap();
        assert!(!decl.is_partial);
        assert!(decl.variable("Color").is_some());
    }

    #[test]
    fn test_partial_parse_replaces_only_when_nothing_cached() {
        let idx = index();
        let path = Path::new("/proj/Base.sdsl");
        // First content is broken: partial structure is better than nothing.
        idx.update_content(path, "shader Base { float4 @@ ; float Good; }");
        let decl = idx.get_parsed("Base").unwrap();
        assert!(decl.is_partial);

        // A full parse takes over...
        idx.update_content(path, "shader Base { float Good; }");
        assert!(!idx.get_parsed("Base").unwrap().is_partial);

        // ...and a later partial parse no longer replaces it.
        idx.update_content(path, "shader Base { float4 @@ ; float Other; }");
        let decl = idx.get_parsed("Base").unwrap();
        assert!(!decl.is_partial);
        assert!(decl.variable("Good").is_some());
    }
}
