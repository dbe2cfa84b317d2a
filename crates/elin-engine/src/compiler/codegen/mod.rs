//! Statement compilation and jump resolution.
//!
//! This module contains the [`Compiler`] which lowers a statement stream to
//! stack-machine instructions in a single forward pass. Forward jump targets
//! are resolved with reserved slots patched in place once the target address
//! is known; backward jumps reuse addresses recorded before the body was
//! compiled.

mod blocks;
mod expression;
mod symbols;


pub use symbols::{SymbolTable, Variable};

use log::debug;

use crate::Error;
use crate::compiler::bytecode::{Instruction, PendingJump, Program, ProgramBuilder};
use crate::lexer::Statement;

/// Compiles a statement stream into a stack-machine program.
///
/// A compiler instance covers exactly one compilation run; `compile` consumes
/// it, so the symbol table and program under construction are never shared
/// across runs.
#[derive(Debug, Default)]
pub struct Compiler {
    code: ProgramBuilder,
    symbols: SymbolTable,
}

impl Compiler {
    /// Creates a new compiler.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Driver
    // ========================================================================

    /// Compiles the whole statement stream and finalizes the program.
    ///
    /// Appends a trailing [`Instruction::Halt`] if the program does not end
    /// with one, then enforces the whole-program unused-variable rule:
    /// finalization is all-or-nothing, so no program is produced when any
    /// defined variable was never read.
    pub fn compile(mut self, statements: &[Statement]) -> Result<Program, Error> {
        self.compile_sequence(statements)?;

        if self.code.last_instruction() != Some(Instruction::Halt) {
            self.code.emit(Instruction::Halt);
        }

        let unused = self.symbols.unused_names();
        if !unused.is_empty() {
            return Err(Error::UnusedVariables(unused));
        }

        debug!(
            "compiled {} instructions across {} variable slots",
            self.code.len(),
            self.symbols.slot_count()
        );
        self.code.finish()
    }

    /// Streams a statement list, dispatching block openers to the control
    /// flow emitter and everything else to the statement compiler.
    fn compile_sequence(&mut self, statements: &[Statement]) -> Result<(), Error> {
        let mut index = 0;
        while index < statements.len() {
            match statements[index].keyword() {
                Some("if") => {
                    let block = blocks::collect(&statements[index..], "if", "end")?;
                    let length = block.statements.len();
                    self.compile_conditional(&block)?;
                    index += length;
                }
                Some("while") => {
                    let block = blocks::collect(&statements[index..], "while", "wend")?;
                    let length = block.statements.len();
                    self.compile_loop(block.statements)?;
                    index += length;
                }
                _ => {
                    self.compile_statement(&statements[index])?;
                    index += 1;
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Statement Compilation
    // ========================================================================

    fn compile_statement(&mut self, statement: &Statement) -> Result<(), Error> {
        match statement.keyword() {
            Some("let") => self.compile_assignment(statement),
            Some("print") => self.compile_print(statement),
            Some("halt") => {
                self.code.emit(Instruction::Halt);
                Ok(())
            }
            Some(other) => Err(Error::UnknownStatement(format!(
                "'{}' on line {}",
                other, statement.line
            ))),
            None => Ok(()),
        }
    }

    /// Compiles `let <name> = <expression>`.
    ///
    /// The target is defined before the expression is lowered, so a
    /// self-referential right-hand side resolves to the same slot.
    fn compile_assignment(&mut self, statement: &Statement) -> Result<(), Error> {
        let tokens = &statement.tokens;
        if tokens.len() < 4 || tokens[2] != "=" || !expression::is_identifier(&tokens[1]) {
            return Err(Error::MalformedStatement(format!(
                "line {}: expected 'let <name> = <expression>'",
                statement.line
            )));
        }

        let target = self.symbols.define(&tokens[1]);
        self.compile_value(&tokens[3..], statement.line)?;
        self.code.emit(Instruction::Store(target));
        Ok(())
    }

    /// Compiles `print <value>`.
    ///
    /// The print instruction addresses a slot, not a literal, so a numeric
    /// value is first materialized into a synthetic variable.
    fn compile_print(&mut self, statement: &Statement) -> Result<(), Error> {
        if statement.tokens.len() < 2 {
            return Err(Error::MalformedStatement(format!(
                "line {}: 'print' needs a value",
                statement.line
            )));
        }

        let value = &statement.tokens[1];
        let slot = if expression::is_numeric(value) {
            let name = format!("__literal_{value}");
            self.symbols.define(&name);
            let slot = self.symbols.mark_used(&name)?;
            expression::lower_operand(value, &mut self.symbols, &mut self.code)?;
            self.code.emit(Instruction::Store(slot));
            slot
        } else {
            self.symbols.mark_used(value)?
        };

        self.code.emit(Instruction::Print(slot));
        Ok(())
    }

    /// Lowers an assignment right-hand side, splitting at the first
    /// comparison operator when one is present.
    fn compile_value(&mut self, tokens: &[String], line: u32) -> Result<(), Error> {
        match tokens.iter().position(|token| expression::is_comparison(token)) {
            Some(at) => self.compile_comparison(tokens, at, line),
            None => expression::lower(tokens, &mut self.symbols, &mut self.code),
        }
    }

    /// Compiles a condition; the comparison operator is mandatory here, so
    /// the top of the stack always holds a one-or-zero flag afterwards.
    fn compile_condition(&mut self, tokens: &[String], line: u32) -> Result<(), Error> {
        match tokens.iter().position(|token| expression::is_comparison(token)) {
            Some(at) => self.compile_comparison(tokens, at, line),
            None => Err(Error::MalformedStatement(format!(
                "line {line}: condition requires a comparison operator"
            ))),
        }
    }

    /// Compiles `<lhs> <cmp> <rhs>` with the comparison operator at `at`.
    ///
    /// Only the first comparison operator is a split point; a second one
    /// anywhere in the right sub-expression is rejected rather than given
    /// chain semantics.
    fn compile_comparison(&mut self, tokens: &[String], at: usize, line: u32) -> Result<(), Error> {
        let (lhs, rest) = tokens.split_at(at);
        let operator = &rest[0];
        let rhs = &rest[1..];

        if lhs.is_empty() || rhs.is_empty() {
            return Err(Error::MalformedStatement(format!(
                "line {line}: comparison '{operator}' is missing an operand"
            )));
        }
        if rhs.iter().any(|token| expression::is_comparison(token)) {
            return Err(Error::MalformedStatement(format!(
                "line {line}: chained comparisons are not supported"
            )));
        }

        expression::lower(lhs, &mut self.symbols, &mut self.code)?;
        expression::lower(rhs, &mut self.symbols, &mut self.code)?;
        let comparison = expression::comparison_instruction(operator)
            .ok_or_else(|| Error::UnknownOperator(operator.clone()))?;
        self.code.emit(comparison);
        Ok(())
    }

    // ========================================================================
    // Control Flow
    // ========================================================================

    /// Compiles `if <condition> ... [else ...] end`.
    fn compile_conditional(&mut self, block: &blocks::Block) -> Result<(), Error> {
        let statements = block.statements;
        let opener = &statements[0];
        let closer = statements.len() - 1;

        self.compile_condition(&opener.tokens[1..], opener.line)?;
        let skip = self.code.reserve_jump(PendingJump::JumpIfZero);

        match block.else_index {
            Some(else_at) => {
                self.compile_sequence(&statements[1..else_at])?;
                let exit = self.code.reserve_jump(PendingJump::Jump);

                let else_start = self.code.len();
                self.compile_sequence(&statements[else_at + 1..closer])?;
                let end = self.code.len();

                self.code.patch(skip, else_start);
                self.code.patch(exit, end);
                debug!(
                    "if/else on line {}: false -> {}, exit -> {}",
                    opener.line, else_start, end
                );
            }
            None => {
                self.compile_sequence(&statements[1..closer])?;
                let end = self.code.len();
                self.code.patch(skip, end);
                debug!("if on line {}: false -> {}", opener.line, end);
            }
        }
        Ok(())
    }

    /// Compiles `while <condition> ... wend`.
    ///
    /// The back edge targets the address recorded before the condition, so
    /// every iteration re-evaluates it.
    fn compile_loop(&mut self, statements: &[Statement]) -> Result<(), Error> {
        let opener = &statements[0];
        let start = self.code.len();

        self.compile_condition(&opener.tokens[1..], opener.line)?;
        let exit = self.code.reserve_jump(PendingJump::JumpIfZero);

        self.compile_sequence(&statements[1..statements.len() - 1])?;
        self.code.emit(Instruction::Jump(start));

        let end = self.code.len();
        self.code.patch(exit, end);
        debug!(
            "while on line {}: back edge -> {}, exit -> {}",
            opener.line, start, end
        );
        Ok(())
    }
}
