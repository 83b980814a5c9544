//! Diagnostics — error reporting across the parser and semantic layers.
//!
//! Everything the analyzer has to say about a file is a [`Diagnostic`]
//! value. Nothing at this layer is thrown; parse failures and semantic
//! findings alike cross module boundaries as tagged data.

use std::sync::Arc;

use crate::base::Span;
use crate::syntax::ShaderDecl;

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// A diagnostic message with location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub span: Span,
    pub severity: Severity,
    /// Stable string code (see [`codes`]).
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(span: Span, message: impl Into<Arc<str>>) -> Self {
        Self {
            span,
            severity: Severity::Error,
            code: None,
            message: message.into(),
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(span: Span, message: impl Into<Arc<str>>) -> Self {
        Self {
            span,
            severity: Severity::Warning,
            code: None,
            message: message.into(),
        }
    }

    /// Create a new info diagnostic.
    pub fn info(span: Span, message: impl Into<Arc<str>>) -> Self {
        Self {
            span,
            severity: Severity::Info,
            code: None,
            message: message.into(),
        }
    }

    /// Set the diagnostic code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// The tagged result crossing the parser collaborator boundary.
///
/// `decl` is absent only when the input was too broken to extract even a
/// partial structure; diagnostics are always populated on failure.
#[derive(Clone, Debug, Default)]
pub struct ParseOutcome {
    pub decl: Option<ShaderDecl>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutcome {
    pub fn new(decl: ShaderDecl, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            decl: Some(decl),
            diagnostics,
        }
    }

    /// True when a full (non-partial) declaration was extracted.
    pub fn is_full(&self) -> bool {
        matches!(&self.decl, Some(d) if !d.is_partial)
    }
}

/// Stable diagnostic codes for semantic and parse findings.
///
/// ## Code Ranges
///
/// - **S0xxx**: syntax-level findings from the parser
/// - **E0xxx**: semantic errors
/// - **W0xxx**: semantic warnings
pub mod codes {
    /// Unparseable construct, recovered by skipping.
    pub const SYNTAX_ERROR: &str = "S0001";

    /// Identifier not found in any scope layer.
    pub const UNDEFINED_IDENTIFIER: &str = "E0001";
    /// Initialization or assignment between incompatible types.
    pub const TYPE_MISMATCH: &str = "E0002";
    /// `override` method with no matching method anywhere in the chain.
    pub const OVERRIDE_WITHOUT_BASE: &str = "E0003";
    /// Cycle in the inheritance graph.
    pub const CYCLIC_INHERITANCE: &str = "E0004";

    /// Two units in the workspace declare the same shader name.
    pub const DUPLICATE_SHADER: &str = "W0001";
    /// File name does not match the declared shader name.
    pub const FILENAME_MISMATCH: &str = "W0002";
    /// Base already granted transitively by another listed base.
    pub const REDUNDANT_BASE: &str = "W0003";
    /// Base name resolves to more than one unit.
    pub const AMBIGUOUS_BASE: &str = "W0004";
    /// Conversion allowed but lossy (precision, signedness, truncation).
    pub const LOSSY_CONVERSION: &str = "W0005";
    /// Analysis of this shader was cut short by an internal failure.
    pub const ANALYSIS_INCOMPLETE: &str = "W0006";
}
