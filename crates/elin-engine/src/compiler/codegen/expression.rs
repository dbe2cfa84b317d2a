//! Infix expression lowering.
//!
//! Arithmetic expressions are rewritten from infix to postfix order with the
//! classic operator-precedence stack algorithm, then walked left to right to
//! emit push/load/arithmetic instructions. No syntax tree is built.

use unicode_xid::UnicodeXID;

use crate::Error;
use crate::compiler::bytecode::{Instruction, ProgramBuilder};

use super::symbols::SymbolTable;

/// Returns true for the four arithmetic operator tokens.
pub fn is_arithmetic(token: &str) -> bool {
    matches!(token, "+" | "-" | "*" | "/")
}

/// Returns true for the six comparison operator tokens.
pub fn is_comparison(token: &str) -> bool {
    matches!(token, "==" | "!=" | "<" | "<=" | ">" | ">=")
}

/// Maps a comparison operator token to its instruction.
pub fn comparison_instruction(token: &str) -> Option<Instruction> {
    let instruction = match token {
        "==" => Instruction::CmpEq,
        "!=" => Instruction::CmpNeq,
        "<" => Instruction::CmpLt,
        "<=" => Instruction::CmpLte,
        ">" => Instruction::CmpGt,
        ">=" => Instruction::CmpGte,
        _ => return None,
    };
    Some(instruction)
}

/// Returns true for tokens shaped like an integer literal, with an optional
/// leading minus sign.
pub fn is_numeric(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Returns true for tokens that are valid variable names.
pub fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_xid_start() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_xid_continue())
}

fn precedence(token: &str) -> u8 {
    match token {
        "+" | "-" => 1,
        "*" | "/" => 2,
        _ => 0,
    }
}

/// Rewrites an infix token sequence into postfix order.
///
/// Operands pass straight through; operators wait on a stack until a
/// lower-precedence operator (or a parenthesis) arrives. An unmatched `)`
/// is tolerated and simply pops nothing further.
pub fn infix_to_postfix(tokens: &[String]) -> Vec<&str> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut operators: Vec<&str> = Vec::new();

    for token in tokens {
        let token = token.as_str();
        if token == "(" {
            operators.push(token);
        } else if token == ")" {
            loop {
                match operators.pop() {
                    Some("(") | None => break,
                    Some(op) => output.push(op),
                }
            }
        } else if is_arithmetic(token) {
            while let Some(&top) = operators.last() {
                if !is_arithmetic(top) || precedence(top) < precedence(token) {
                    break;
                }
                output.push(top);
                operators.pop();
            }
            operators.push(token);
        } else {
            output.push(token);
        }
    }

    while let Some(op) = operators.pop() {
        output.push(op);
    }
    output
}

/// Lowers one arithmetic expression to stack-machine instructions.
///
/// A single-token expression skips the postfix machinery entirely and is
/// handled as a bare operand.
pub fn lower(
    tokens: &[String],
    symbols: &mut SymbolTable,
    code: &mut ProgramBuilder,
) -> Result<(), Error> {
    if let [single] = tokens {
        return lower_operand(single, symbols, code);
    }
    for token in infix_to_postfix(tokens) {
        match token {
            "+" => {
                code.emit(Instruction::Add);
            }
            "-" => {
                code.emit(Instruction::Sub);
            }
            "*" => {
                code.emit(Instruction::Mul);
            }
            "/" => {
                code.emit(Instruction::Div);
            }
            operand => lower_operand(operand, symbols, code)?,
        }
    }
    Ok(())
}

/// Emits a bare operand: a literal pushes, a name loads its slot.
pub fn lower_operand(
    token: &str,
    symbols: &mut SymbolTable,
    code: &mut ProgramBuilder,
) -> Result<(), Error> {
    if is_numeric(token) {
        let value: i64 = token
            .parse()
            .map_err(|_| Error::NumberOverflow(token.to_owned()))?;
        code.emit(Instruction::Push(value));
    } else if is_identifier(token) {
        let slot = symbols.mark_used(token)?;
        code.emit(Instruction::Load(slot));
    } else {
        return Err(Error::UnknownOperator(token.to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(source: &str) -> Vec<String> {
        source.split_whitespace().map(str::to_owned).collect()
    }

    #[test]
    fn test_postfix_precedence() {
        let tokens = toks("a + b * c");
        assert_eq!(infix_to_postfix(&tokens), vec!["a", "b", "c", "*", "+"]);
    }

    #[test]
    fn test_postfix_parentheses() {
        let tokens = toks("( a + b ) * c");
        assert_eq!(infix_to_postfix(&tokens), vec!["a", "b", "+", "c", "*"]);
    }

    #[test]
    fn test_postfix_left_associative() {
        let tokens = toks("a - b - c");
        assert_eq!(infix_to_postfix(&tokens), vec!["a", "b", "-", "c", "-"]);
    }

    #[test]
    fn test_postfix_unmatched_close_paren() {
        let tokens = toks("a + b )");
        assert_eq!(infix_to_postfix(&tokens), vec!["a", "b", "+"]);
    }

    #[test]
    fn test_lower_single_token_skips_postfix() {
        let mut symbols = SymbolTable::new();
        let mut code = ProgramBuilder::new();
        lower(&toks("42"), &mut symbols, &mut code).unwrap();
        let program = code.finish().unwrap();
        assert_eq!(program.instructions, vec![Instruction::Push(42)]);
    }

    #[test]
    fn test_lower_negative_literal() {
        let mut symbols = SymbolTable::new();
        let mut code = ProgramBuilder::new();
        lower(&toks("-7"), &mut symbols, &mut code).unwrap();
        let program = code.finish().unwrap();
        assert_eq!(program.instructions, vec![Instruction::Push(-7)]);
    }

    #[test]
    fn test_lower_undefined_name() {
        let mut symbols = SymbolTable::new();
        let mut code = ProgramBuilder::new();
        let result = lower(&toks("x + 1"), &mut symbols, &mut code);
        assert_eq!(result, Err(Error::UndefinedVariable("x".into())));
    }

    #[test]
    fn test_lower_unknown_operator() {
        let mut symbols = SymbolTable::new();
        let mut code = ProgramBuilder::new();
        let result = lower(&toks("1 % 2"), &mut symbols, &mut code);
        assert_eq!(result, Err(Error::UnknownOperator("%".into())));
    }

    #[test]
    fn test_lower_literal_out_of_range() {
        let mut symbols = SymbolTable::new();
        let mut code = ProgramBuilder::new();
        let result = lower(&toks("99999999999999999999"), &mut symbols, &mut code);
        assert!(matches!(result, Err(Error::NumberOverflow(_))));
    }

    #[test]
    fn test_identifier_classification() {
        assert!(is_identifier("counter"));
        assert!(is_identifier("_tmp"));
        assert!(is_identifier("x1"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("%"));
        assert!(!is_identifier(""));
    }
}
