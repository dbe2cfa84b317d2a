//! Bytecode definitions.
//!
//! The address of an instruction is its position in the program at the moment
//! it is emitted. Jump targets are computed as "current program length" at a
//! specific compilation moment, so emission order must exactly mirror final
//! instruction order except for slots reserved for not-yet-resolved jumps.

use crate::Error;

/// A single stack-machine instruction.
///
/// Slots index the flat variable store; addresses index the instruction
/// sequence itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Push a literal value onto the evaluation stack
    Push(i64),
    /// Push the value of a variable slot
    Load(usize),
    /// Pop into a variable slot
    Store(usize),
    /// Pop two values, push their sum
    Add,
    /// Pop two values, push their difference
    Sub,
    /// Pop two values, push their product
    Mul,
    /// Pop two values, push their quotient
    Div,
    /// Output the value of a variable slot
    Print(usize),
    /// Stop execution
    Halt,
    /// Pop two values, push 1 if equal else 0
    CmpEq,
    /// Pop two values, push 1 if not equal else 0
    CmpNeq,
    /// Pop two values, push 1 if a < b else 0
    CmpLt,
    /// Pop two values, push 1 if a <= b else 0
    CmpLte,
    /// Pop two values, push 1 if a > b else 0
    CmpGt,
    /// Pop two values, push 1 if a >= b else 0
    CmpGte,
    /// Unconditional jump
    Jump(usize),
    /// Pop a value, jump if it is zero
    JumpIfZero(usize),
    /// Pop a value, jump if it is not zero
    JumpIfNotZero(usize),
}

/// The kind of jump a reserved slot becomes once its target is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingJump {
    /// Will become [`Instruction::Jump`]
    Jump,
    /// Will become [`Instruction::JumpIfZero`]
    JumpIfZero,
    /// Will become [`Instruction::JumpIfNotZero`]
    JumpIfNotZero,
}

/// A slot in the program under construction. Pending slots hold jumps whose
/// target address is not yet known; they never survive into a [`Program`].
#[derive(Debug, Clone, Copy)]
enum Slot {
    Ready(Instruction),
    Pending(PendingJump),
}

/// A finished, immutable instruction sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// The instructions, addressed by position
    pub instructions: Vec<Instruction>,
}

impl Program {
    /// Returns the number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program contains no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// An append-only, index-addressed instruction arena.
///
/// Owned by exactly one compilation run.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    code: Vec<Slot>,
}

impl ProgramBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an instruction and returns its address.
    pub fn emit(&mut self, instruction: Instruction) -> usize {
        let address = self.code.len();
        self.code.push(Slot::Ready(instruction));
        address
    }

    /// Reserves a jump whose target is not yet known and returns its address.
    ///
    /// The slot must be resolved with [`ProgramBuilder::patch`] before
    /// [`ProgramBuilder::finish`].
    pub fn reserve_jump(&mut self, kind: PendingJump) -> usize {
        let address = self.code.len();
        self.code.push(Slot::Pending(kind));
        address
    }

    /// Resolves the reserved slot at `at` to jump to `target`.
    pub fn patch(&mut self, at: usize, target: usize) {
        let jump = match self.code[at] {
            Slot::Pending(PendingJump::Jump) => Instruction::Jump(target),
            Slot::Pending(PendingJump::JumpIfZero) => Instruction::JumpIfZero(target),
            Slot::Pending(PendingJump::JumpIfNotZero) => Instruction::JumpIfNotZero(target),
            Slot::Ready(_) => unreachable!("patch target {at} is already finalized"),
        };
        self.code[at] = Slot::Ready(jump);
    }

    /// The address the next emitted instruction will receive.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Returns true if nothing has been emitted yet.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// The most recently emitted instruction, if it is finalized.
    pub fn last_instruction(&self) -> Option<Instruction> {
        match self.code.last() {
            Some(Slot::Ready(instruction)) => Some(*instruction),
            _ => None,
        }
    }

    /// Finalizes the program. Fails if any reserved jump was never patched.
    pub fn finish(self) -> Result<Program, Error> {
        let mut instructions = Vec::with_capacity(self.code.len());
        for (address, slot) in self.code.into_iter().enumerate() {
            match slot {
                Slot::Ready(instruction) => instructions.push(instruction),
                Slot::Pending(_) => {
                    return Err(Error::Internal(format!(
                        "unresolved jump at address {address}"
                    )));
                }
            }
        }
        Ok(Program { instructions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_returns_addresses_in_order() {
        let mut code = ProgramBuilder::new();
        assert_eq!(code.emit(Instruction::Push(1)), 0);
        assert_eq!(code.emit(Instruction::Push(2)), 1);
        assert_eq!(code.len(), 2);
    }

    #[test]
    fn test_reserve_and_patch() {
        let mut code = ProgramBuilder::new();
        code.emit(Instruction::Push(0));
        let at = code.reserve_jump(PendingJump::JumpIfZero);
        code.emit(Instruction::Halt);
        code.patch(at, 2);
        let program = code.finish().unwrap();
        assert_eq!(program.instructions[at], Instruction::JumpIfZero(2));
    }

    #[test]
    fn test_finish_rejects_unpatched_slot() {
        let mut code = ProgramBuilder::new();
        code.reserve_jump(PendingJump::Jump);
        assert!(matches!(code.finish(), Err(Error::Internal(_))));
    }

    #[test]
    fn test_last_instruction() {
        let mut code = ProgramBuilder::new();
        assert_eq!(code.last_instruction(), None);
        code.emit(Instruction::Halt);
        assert_eq!(code.last_instruction(), Some(Instruction::Halt));
        code.reserve_jump(PendingJump::Jump);
        assert_eq!(code.last_instruction(), None);
    }
}
