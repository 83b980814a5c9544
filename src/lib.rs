//! # sdsl-base
//!
//! Core library for SDSL shader indexing, mixin inheritance resolution,
//! and semantic analysis.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide        → LanguageService facade (hover, completions, diagnostics,
//!   ↓          inheritance tree, member listings)
//! completion → context classification, member-chain resolution, ranking
//! validator  → layered scopes, expression inference, diagnostics
//!   ↓
//! resolver   → inheritance chain flattening, member aggregation
//!   ↓
//! workspace  → shader catalog, parse cache, discovery, background index
//!   ↓
//! typesys    → conversion/swizzle/binary-result rules, built-ins
//! parser     → collaborator trait, logos lexer, structural parser
//!   ↓
//! syntax     → declaration tree, body statements/expressions, diagnostics
//!   ↓
//! base       → primitives (Position, Span, SourceTier, constants)
//! ```

// ============================================================================
// MODULES (dependency order: base → syntax → parser → typesys → workspace
// → resolver → validator → completion → ide)
// ============================================================================

/// Foundation types: Position, Span, SourceTier
pub mod base;

/// Syntax: declaration tree, statement/expression trees, diagnostics
pub mod syntax;

/// Parser: collaborator boundary, logos lexer, structural parser
pub mod parser;

/// Type system: conversion, swizzle, and binary-result rules
pub mod typesys;

/// Workspace: shader catalog, parse cache, discovery, background indexing
pub mod workspace;

/// Resolver: inheritance chains, member aggregation, base suggestions
pub mod resolver;

/// Validator: scope-aware semantic diagnostics
pub mod validator;

/// Completion: context classification and ranked candidates
pub mod completion;

/// IDE features: the editor-facing LanguageService facade
pub mod ide;

// Re-export foundation types
pub use base::{Position, SourceTier, Span};
pub use syntax::{Diagnostic, Severity};
