// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # elin-engine
//!
//! A single-pass compiler and stack-machine interpreter for the ELIN
//! language, implemented in Rust.
//!
//! ## Overview
//!
//! ELIN is a small, line-oriented imperative language: assignments with
//! infix arithmetic and comparisons, `print`, `halt`, `if`/`else`/`end`
//! conditionals and `while`/`wend` loops. This crate provides:
//! - Line scanner (whitespace tokenization, comment stripping)
//! - Single-pass bytecode compiler with placeholder-then-patch jump
//!   resolution
//! - Textual instruction image serializer and loader
//! - Stack-machine interpreter
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use elin_engine::Engine;
//!
//! let engine = Engine::new();
//! let output = engine.run("let x = 2 + 3 * 4\nprint x")?;
//! assert_eq!(output, vec![14]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compiler;
pub mod emitter;
pub mod lexer;
pub mod vm;

// Re-exports for convenience
pub use compiler::{Compiler, Instruction, Program};
pub use vm::Vm;

/// The main entry point for compiling and running ELIN programs.
///
/// Stateless across invocations: every call owns its compilation run and
/// its machine, so nothing persists between compilations.
#[derive(Debug, Default)]
pub struct Engine;

impl Engine {
    /// Creates a new engine.
    pub fn new() -> Self {
        Self
    }

    /// Compiles ELIN source text into a stack-machine program.
    pub fn compile(&self, source: &str) -> Result<Program, Error> {
        let statements = lexer::scan(source);
        Compiler::new().compile(&statements)
    }

    /// Compiles ELIN source read from a file.
    pub fn compile_file(&self, path: &std::path::Path) -> Result<Program, Error> {
        let source = std::fs::read_to_string(path).map_err(|e| Error::Io(e.to_string()))?;
        self.compile(&source)
    }

    /// Compiles and immediately executes, returning the printed values.
    pub fn run(&self, source: &str) -> Result<Vec<i64>, Error> {
        let program = self.compile(source)?;
        Vm::new().run(&program)
    }
}

/// Errors produced while compiling or running an ELIN program.
///
/// All failures are fatal and synchronous: compilation stops at the first
/// detected fault, and every error is a deterministic function of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A name was read before any assignment defined it
    UndefinedVariable(String),
    /// A token that is neither an operand nor a recognized operator
    UnknownOperator(String),
    /// A statement without the shape its keyword requires
    MalformedStatement(String),
    /// A conditional or loop never reached its closing keyword
    MissingBlockTerminator(String),
    /// An unrecognized leading keyword
    UnknownStatement(String),
    /// Variables defined but never read, detected after the full program
    /// was otherwise successfully compiled
    UnusedVariables(Vec<String>),
    /// A numeric literal that does not fit the 64-bit operand width
    NumberOverflow(String),
    /// A serialized instruction image that cannot be decoded
    InvalidImage(String),
    /// Arithmetic overflow at run time
    Overflow,
    /// Division by zero at run time
    DivisionByZero,
    /// The evaluation stack was popped while empty
    StackUnderflow,
    /// A jump target outside the program
    BadJump(usize),
    /// A compiler invariant was violated
    Internal(String),
    /// An I/O failure while reading source or writing output
    Io(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UndefinedVariable(name) => {
                write!(f, "variable '{}' used before definition", name)
            }
            Error::UnknownOperator(token) => write!(f, "unknown operator '{}'", token),
            Error::MalformedStatement(msg) => write!(f, "malformed statement: {}", msg),
            Error::MissingBlockTerminator(msg) => write!(f, "missing block terminator: {}", msg),
            Error::UnknownStatement(msg) => write!(f, "unknown statement {}", msg),
            Error::UnusedVariables(names) => {
                write!(f, "variables defined but never used: {}", names.join(", "))
            }
            Error::NumberOverflow(token) => {
                write!(f, "numeric literal '{}' is out of range", token)
            }
            Error::InvalidImage(msg) => write!(f, "invalid instruction image: {}", msg),
            Error::Overflow => write!(f, "arithmetic overflow"),
            Error::DivisionByZero => write!(f, "division by zero"),
            Error::StackUnderflow => write!(f, "evaluation stack underflow"),
            Error::BadJump(address) => write!(f, "jump to invalid address {}", address),
            Error::Internal(msg) => write!(f, "internal error: {}", msg),
            Error::Io(msg) => write!(f, "i/o error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
