//! Syntax layer — declaration tree, method-body trees, diagnostics.
//!
//! These are the structures the parser collaborator produces and every
//! analysis layer above consumes. The declaration tree is deliberately
//! shallow: one [`ShaderDecl`] per shader with flat member lists, plus a
//! small statement/expression tree for method bodies.

mod ast;
mod diagnostics;
mod expr;

pub use ast::{
    Composition, Method, MethodQualifiers, MixinRef, Param, ShaderDecl, StructDef, StructField,
    TemplateParam, VarQualifiers, Variable,
};
pub use diagnostics::{Diagnostic, ParseOutcome, Severity, codes};
pub use expr::{BinaryOp, Expr, LiteralKind, Stmt, UnaryOp};
