//! Inheritance resolver.
//!
//! Flattens multi-base mixin chains, aggregates members with closest-wins
//! shadowing, detects cycles and redundant bases, and ranks candidate
//! bases for suggestions. All derived state (chains, child counts) is
//! memoized behind its own guard and invalidated wholesale on every
//! reindex — serving a stale chain is strictly worse than recomputing.

mod chain;
mod members;
mod suggestions;

pub use chain::{InheritanceResolver, ResolvedChain};

#[cfg(test)]
pub(crate) mod testutil {
    use std::path::Path;
    use std::sync::Arc;

    use super::InheritanceResolver;
    use crate::base::SourceTier;
    use crate::parser::StructuralParser;
    use crate::workspace::ShaderIndex;

    /// Build a resolver over an in-memory set of (name, source) units.
    pub(crate) fn resolver_with(sources: &[(&str, &str)]) -> InheritanceResolver {
        let index = Arc::new(ShaderIndex::new(Arc::new(StructuralParser)));
        for (name, source) in sources {
            let path = format!("/proj/{name}.sdsl");
            index.register(&path, SourceTier::Workspace);
            index.update_content(Path::new(&path), source);
        }
        InheritanceResolver::new(index)
    }
}
