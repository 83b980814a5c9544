//! IDE layer — the editor-facing surface of the analyzer.
//!
//! [`LanguageService`] owns the index, resolver, and background indexer,
//! and answers the requests editor handlers forward: hover, completions,
//! diagnostics, inheritance trees, and grouped member listings. Every
//! entry point returns a (possibly empty) value; internal failures are
//! contained below this layer.

mod hover;
mod members;
mod service;
mod tree;

pub use hover::HoverResult;
pub use members::MemberGroup;
pub use service::LanguageService;
pub use tree::InheritanceNode;
