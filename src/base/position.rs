/// Position tracking for declaration nodes
///
/// Stores the source location (line/column) of declarations and expressions
/// for LSP features like hover, diagnostics, and inheritance navigation.
/// A span representing a range in source code (0-indexed for LSP compatibility)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// A position in source code (0-indexed)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a span from line/column coordinates
    pub fn from_coords(
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Self {
        Self {
            start: Position::new(start_line, start_col),
            end: Position::new(end_line, end_col),
        }
    }

    /// Check if a position falls within this span
    pub fn contains(&self, position: Position) -> bool {
        if position.line < self.start.line || position.line > self.end.line {
            return false;
        }
        if position.line == self.start.line && position.column < self.start.column {
            return false;
        }
        if position.line == self.end.line && position.column > self.end.column {
            return false;
        }
        true
    }
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_contains() {
        let span = Span::from_coords(2, 4, 2, 10);
        assert!(span.contains(Position::new(2, 4)));
        assert!(span.contains(Position::new(2, 10)));
        assert!(!span.contains(Position::new(2, 11)));
        assert!(!span.contains(Position::new(1, 5)));
    }

    #[test]
    fn test_span_contains_multiline() {
        let span = Span::from_coords(1, 8, 3, 2);
        assert!(span.contains(Position::new(2, 0)));
        assert!(span.contains(Position::new(2, 999)));
        assert!(!span.contains(Position::new(3, 3)));
    }
}
