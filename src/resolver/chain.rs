//! Chain resolution with cycle protection.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use crate::workspace::ShaderIndex;

/// A flattened inheritance chain, in distance order: a unit's own bases
/// precede what those bases bring in, depth-first, so first occurrence is
/// always the closest definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedChain {
    /// Base shader names, closest first. Never contains the queried unit
    /// itself, and never a name twice.
    pub order: Vec<SmolStr>,
    /// A recurrence point was hit while flattening.
    pub cyclic: bool,
}

impl ResolvedChain {
    pub fn contains(&self, name: &str) -> bool {
        self.order.iter().any(|n| n == name)
    }
}

/// Resolves inheritance over the shader catalog.
///
/// Chain structure is workspace-global (keyed by shader name, not file),
/// so one memoized chain serves every consumer until the next
/// invalidation.
pub struct InheritanceResolver {
    pub(super) index: Arc<ShaderIndex>,
    pub(super) chains: RwLock<FxHashMap<SmolStr, Arc<ResolvedChain>>>,
    pub(super) child_counts: RwLock<Option<Arc<FxHashMap<SmolStr, usize>>>>,
}

impl InheritanceResolver {
    pub fn new(index: Arc<ShaderIndex>) -> Self {
        Self {
            index,
            chains: RwLock::new(FxHashMap::default()),
            child_counts: RwLock::new(None),
        }
    }

    pub fn index(&self) -> &ShaderIndex {
        &self.index
    }

    /// Drop every memoized chain and count. Called on the
    /// indexing-complete signal; never patched incrementally.
    pub fn invalidate(&self) {
        self.chains.write().clear();
        *self.child_counts.write() = None;
        tracing::debug!("resolver caches invalidated");
    }

    /// The flattened chain for a shader name, memoized.
    pub fn resolve_chain(&self, name: &str) -> Arc<ResolvedChain> {
        if let Some(chain) = self.chains.read().get(name) {
            return chain.clone();
        }
        let chain = Arc::new(self.compute_chain(name));
        self.chains
            .write()
            .insert(SmolStr::new(name), chain.clone());
        chain
    }

    /// Iterative preorder walk over the ordered direct-base lists.
    ///
    /// The visited bookkeeping is scoped to this one query: `path` tracks
    /// the active descent for cycle detection (a recurrence yields an
    /// empty continuation), `emitted` deduplicates diamonds so only the
    /// first (closest) occurrence survives.
    fn compute_chain(&self, name: &str) -> ResolvedChain {
        struct Frame {
            node: SmolStr,
            bases: Vec<SmolStr>,
            next: usize,
        }

        let mut order = Vec::new();
        let mut cyclic = false;
        let mut emitted: FxHashSet<SmolStr> = FxHashSet::default();
        let mut path: FxHashSet<SmolStr> = FxHashSet::default();
        emitted.insert(SmolStr::new(name));
        path.insert(SmolStr::new(name));

        let mut frames = vec![Frame {
            node: SmolStr::new(name),
            bases: self.direct_bases(name),
            next: 0,
        }];

        while let Some(frame) = frames.last_mut() {
            if frame.next >= frame.bases.len() {
                path.remove(&frame.node);
                frames.pop();
                continue;
            }
            let base = frame.bases[frame.next].clone();
            frame.next += 1;

            if path.contains(&base) {
                cyclic = true;
                continue;
            }
            if !emitted.insert(base.clone()) {
                // Diamond: already flattened from a closer occurrence.
                continue;
            }
            order.push(base.clone());
            path.insert(base.clone());
            frames.push(Frame {
                bases: self.direct_bases(&base),
                node: base,
                next: 0,
            });
        }

        if cyclic {
            tracing::debug!(shader = name, "cyclic inheritance detected");
        }
        ResolvedChain { order, cyclic }
    }

    /// Direct base names of a unit, template arguments stripped. Unknown
    /// units contribute nothing.
    pub(super) fn direct_bases(&self, name: &str) -> Vec<SmolStr> {
        self.index
            .get_parsed(name)
            .map(|decl| decl.bases.iter().map(|b| b.base_name.clone()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use crate::resolver::testutil::resolver_with;
    use std::path::Path;

    #[test]
    fn test_chain_distance_order() {
        let r = resolver_with(&[
            ("D", "shader D {}"),
            ("B", "shader B : D {}"),
            ("C", "shader C {}"),
            ("A", "shader A : B, C {}"),
        ]);
        let chain = r.resolve_chain("A");
        assert!(!chain.cyclic);
        assert_eq!(chain.order, vec!["B", "D", "C"]);
    }

    #[test]
    fn test_chain_is_deterministic() {
        let r = resolver_with(&[
            ("Base", "shader Base {}"),
            ("Mid", "shader Mid : Base {}"),
            ("Top", "shader Top : Mid, Base {}"),
        ]);
        let first = r.resolve_chain("Top");
        r.invalidate();
        let second = r.resolve_chain("Top");
        assert_eq!(first.order, second.order);
        assert_eq!(first.order, vec!["Mid", "Base"]);
    }

    #[test]
    fn test_cycle_terminates_without_repeating_start() {
        let r = resolver_with(&[("A", "shader A : B {}"), ("B", "shader B : A {}")]);
        let chain = r.resolve_chain("A");
        assert!(chain.cyclic);
        assert_eq!(chain.order, vec!["B"]);
        assert!(!chain.contains("A"));
    }

    #[test]
    fn test_self_cycle() {
        let r = resolver_with(&[("A", "shader A : A {}")]);
        let chain = r.resolve_chain("A");
        assert!(chain.cyclic);
        assert!(chain.order.is_empty());
    }

    #[test]
    fn test_diamond_is_not_cyclic() {
        let r = resolver_with(&[
            ("D", "shader D {}"),
            ("B", "shader B : D {}"),
            ("C", "shader C : D {}"),
            ("A", "shader A : B, C {}"),
        ]);
        let chain = r.resolve_chain("A");
        assert!(!chain.cyclic);
        assert_eq!(chain.order, vec!["B", "D", "C"]);
    }

    #[test]
    fn test_template_args_stripped_for_lookup() {
        let r = resolver_with(&[
            ("Lights", "shader Lights {}"),
            ("A", "shader A : Lights<4> {}"),
        ]);
        let chain = r.resolve_chain("A");
        assert_eq!(chain.order, vec!["Lights"]);
    }

    #[test]
    fn test_unknown_base_kept_in_chain() {
        let r = resolver_with(&[("A", "shader A : Missing {}")]);
        let chain = r.resolve_chain("A");
        assert_eq!(chain.order, vec!["Missing"]);
        assert!(!chain.cyclic);
    }

    #[test]
    fn test_invalidate_clears_memoized_chains() {
        let r = resolver_with(&[("A", "shader A : B {}"), ("B", "shader B {}")]);
        let before = r.resolve_chain("A");
        assert_eq!(before.order, vec!["B"]);

        // Edit A to drop its base, then invalidate: the chain recomputes.
        r.index
            .update_content(Path::new("/proj/A.sdsl"), "shader A {}");
        r.invalidate();
        let after = r.resolve_chain("A");
        assert!(after.order.is_empty());
    }
}
