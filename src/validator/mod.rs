//! Semantic validator.
//!
//! Produces the diagnostics syntax alone cannot: undefined identifiers,
//! incompatible initializations and assignments, override-without-base,
//! duplicate shader names, filename mismatches, redundant and ambiguous
//! bases, cyclic inheritance.
//!
//! The walk builds a layered scope (built-ins → template parameters →
//! local members → inherited members) and descends into every method
//! body, delegating all vector/scalar reasoning to the type system. A
//! failure inside one shader's validation is caught at the operation
//! boundary and degrades that shader's diagnostics to "possibly
//! incomplete" — it never aborts the whole pass.

mod infer;
mod scope;
mod validate;

pub use scope::{Binding, BindingKind, Scope};
pub use validate::Validator;
