//! Completion engine.
//!
//! A pure query over the current index and the supplied buffer text: the
//! caller must already have pushed buffer edits into the workspace index.
//! Classification decides what kind of candidates the cursor wants
//! ([`classify_context`]); resolution walks dotted member chains through
//! declared types; ranking orders candidate classes by ascending
//! priority, lowest shown first.

mod chain;
mod context;
mod engine;
mod item;

pub use chain::resolve_member_chain;
pub use context::{CompletionContext, classify_context};
pub use engine::completions;
pub use item::{CompletionItem, CompletionKind, priority};
