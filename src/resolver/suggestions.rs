//! Definer scans, child counts, and base suggestions.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::chain::InheritanceResolver;
use crate::syntax::{MixinRef, ShaderDecl};

impl InheritanceResolver {
    /// Every unit that locally declares a member with this name,
    /// case-insensitive.
    pub fn direct_definers_of(&self, member: &str) -> Vec<SmolStr> {
        let mut out = Vec::new();
        for name in self.index.unit_names() {
            if let Some(decl) = self.index.get_parsed(&name) {
                if decl.declares_member_ignore_case(member) {
                    out.push(name);
                }
            }
        }
        out
    }

    /// How many units list this shader as a direct base (template
    /// arguments stripped). Popular bases rank higher in suggestions.
    pub fn child_count_of(&self, name: &str) -> usize {
        self.child_counts()
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    fn child_counts(&self) -> Arc<FxHashMap<SmolStr, usize>> {
        if let Some(counts) = self.child_counts.read().as_ref() {
            return counts.clone();
        }
        let mut counts: FxHashMap<SmolStr, usize> = FxHashMap::default();
        for unit in self.index.units_snapshot() {
            if let Some(decl) = self.index.get_parsed(&unit.name) {
                for base in &decl.bases {
                    *counts.entry(base.base_name.clone()).or_default() += 1;
                }
            }
        }
        let counts = Arc::new(counts);
        *self.child_counts.write() = Some(counts.clone());
        counts
    }

    /// Units worth adding to `current`'s base list to gain `member`:
    /// direct definers, plus workspace or popular units whose chain
    /// transitively grants it. Anything `current` already inherits is
    /// excluded.
    pub fn smart_suggestions(&self, member: &str, current: &str) -> Vec<SmolStr> {
        let mut excluded: FxHashSet<SmolStr> = FxHashSet::default();
        excluded.insert(SmolStr::new(current));
        for base in &self.resolve_chain(current).order {
            excluded.insert(base.clone());
        }

        let definers = self.direct_definers_of(member);
        let definer_set: FxHashSet<&SmolStr> = definers.iter().collect();

        let mut out: Vec<SmolStr> = Vec::new();
        let mut seen: FxHashSet<SmolStr> = FxHashSet::default();
        for name in &definers {
            if !excluded.contains(name) && seen.insert(name.clone()) {
                out.push(name.clone());
            }
        }

        for unit in self.index.units_snapshot() {
            let name = &unit.name;
            if excluded.contains(name) || seen.contains(name) {
                continue;
            }
            let favored = unit.tier == crate::base::SourceTier::Workspace
                || self.child_count_of(name) > 0;
            if !favored {
                continue;
            }
            let grants = self
                .resolve_chain(name)
                .order
                .iter()
                .any(|base| definer_set.contains(base));
            if grants && seen.insert(name.clone()) {
                out.push(name.clone());
            }
        }
        out
    }

    /// Bases already granted transitively by another listed base.
    ///
    /// For `shader S : A, B` where B's chain contains A, A is redundant.
    /// Each redundant base is reported once, even when several other
    /// bases transitively contain it.
    pub fn redundant_bases<'a>(&self, decl: &'a ShaderDecl) -> Vec<&'a MixinRef> {
        let mut out = Vec::new();
        for (i, candidate) in decl.bases.iter().enumerate() {
            let redundant = decl.bases.iter().enumerate().any(|(j, other)| {
                i != j
                    && self
                        .resolve_chain(&other.base_name)
                        .contains(&candidate.base_name)
            });
            if redundant {
                out.push(candidate);
            }
        }
        out
    }
}
