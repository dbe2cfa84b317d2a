//! Source line scanning.
//!
//! ELIN is line oriented: every statement occupies one line and its tokens
//! are separated by plain whitespace. The scanner splits source text into
//! statement token lists, drops blank lines and comment lines, and keeps the
//! original 1-based line numbers for diagnostics. Token validity is the
//! compiler's concern, not the scanner's.

/// One source statement, already split into whitespace-delimited tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// The tokens of the line, in order. Never empty.
    pub tokens: Vec<String>,
    /// 1-based line number in the original source.
    pub line: u32,
}

impl Statement {
    /// The leading keyword that selects the statement kind.
    pub fn keyword(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }
}

/// Splits source text into statements, dropping blanks and comments.
///
/// Lines whose first non-space characters are `#` or `//` are comments.
pub fn scan(source: &str) -> Vec<Statement> {
    let mut statements = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }
        statements.push(Statement {
            tokens: line.split_whitespace().map(str::to_owned).collect(),
            line: index as u32 + 1,
        });
    }
    statements
}
