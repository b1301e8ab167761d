use std::fmt;

/// A 1-based line/column position, attached to diagnostics from the shared
/// lexer toolkit (`.proto` parsing, text format, JSON).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Loc {
    pub line: u32,
    pub col: u32,
}

impl Loc {
    pub fn start() -> Loc {
        Loc { line: 1, col: 1 }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
