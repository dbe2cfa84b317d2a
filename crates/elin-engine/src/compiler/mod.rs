//! The ELIN bytecode compiler.
//!
//! Lowers a scanned statement stream into a linear stack-machine program in
//! a single forward pass.
//!
//! # Module Structure
//!
//! - `bytecode`: instruction set and the index-addressed program builder
//! - `codegen`: statement compilation and jump resolution
//!   - `codegen::symbols`: variable slot allocation and use tracking
//!   - `codegen::expression`: infix-to-postfix expression lowering
//!   - `codegen::blocks`: block extraction for nested constructs

pub mod bytecode;
pub mod codegen;

pub use bytecode::{Instruction, PendingJump, Program, ProgramBuilder};
pub use codegen::Compiler;
