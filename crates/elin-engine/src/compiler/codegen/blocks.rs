//! Block extraction for nested control-flow constructs.

use crate::Error;
use crate::lexer::Statement;

/// A block-opening statement together with everything through its closer.
#[derive(Debug)]
pub struct Block<'a> {
    /// The statements from the opener through the matching closer, inclusive.
    pub statements: &'a [Statement],
    /// Index within `statements` of an `else` marker at nesting depth 0.
    ///
    /// Only meaningful for conditional blocks; loop callers ignore it.
    pub else_index: Option<usize>,
}

/// Scans forward from the opener at `statements[0]` for its matching closer.
///
/// Encountering the same opening keyword increases the nesting depth, the
/// closing keyword decreases it, and the block ends exactly when the depth
/// returns to 0 at a closing keyword. Matching is by exact first-token
/// equality, so a `while`/`wend` pair inside an `if` block never disturbs
/// the `if`/`end` count, and vice versa.
pub fn collect<'a>(
    statements: &'a [Statement],
    opener: &str,
    closer: &str,
) -> Result<Block<'a>, Error> {
    let mut depth = 0usize;
    let mut else_index = None;

    for (index, statement) in statements.iter().enumerate() {
        match statement.keyword() {
            Some(keyword) if keyword == opener => depth += 1,
            Some(keyword) if keyword == closer => {
                depth -= 1;
                if depth == 0 {
                    return Ok(Block {
                        statements: &statements[..=index],
                        else_index,
                    });
                }
            }
            Some("else") if depth == 1 && else_index.is_none() => else_index = Some(index),
            _ => {}
        }
    }

    Err(Error::MissingBlockTerminator(format!(
        "'{}' on line {} never reaches '{}'",
        opener, statements[0].line, closer
    )))
}
