//! Completion candidates.

use smol_str::SmolStr;

/// Kind of completion item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionKind {
    Variable,
    Method,
    Composition,
    Intrinsic,
    Keyword,
    Type,
    Shader,
    Semantic,
}

impl CompletionKind {
    /// Convert to LSP completion item kind number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            CompletionKind::Variable => 5,    // Field
            CompletionKind::Method => 2,      // Method
            CompletionKind::Composition => 10, // Property
            CompletionKind::Intrinsic => 3,   // Function
            CompletionKind::Keyword => 14,    // Keyword
            CompletionKind::Type => 22,       // Struct
            CompletionKind::Shader => 7,      // Class
            CompletionKind::Semantic => 21,   // Constant
        }
    }
}

/// Candidate class priorities, ascending: lowest number shown first.
pub mod priority {
    pub const LOCAL: u32 = 10;
    pub const INHERITED: u32 = 20;
    pub const INTRINSIC: u32 = 30;
    pub const KEYWORD: u32 = 40;
    pub const BUILTIN_TYPE: u32 = 50;
    pub const SHADER_NAME: u32 = 60;
}

/// A completion suggestion.
#[derive(Clone, Debug)]
pub struct CompletionItem {
    /// The text to insert.
    pub label: SmolStr,
    /// The kind of completion.
    pub kind: CompletionKind,
    /// Detail text (shown after label), usually the declared type or the
    /// defining shader.
    pub detail: Option<String>,
    /// Sort priority (lower = higher priority).
    pub sort_priority: u32,
}

impl CompletionItem {
    /// Create a new completion item.
    pub fn new(label: impl Into<SmolStr>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            sort_priority: 100,
        }
    }

    /// Set the detail text.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the sort priority.
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.sort_priority = priority;
        self
    }
}
