//! The textual instruction image.
//!
//! A compiled program is persisted as a `.outz` file: a four-line header
//! carrying the package name, then one instruction per line as
//! space-separated integers. `Push` keeps the wide `1 0 0 0 <value>`
//! encoding so the value always sits in the fifth field. Jump addresses
//! count instructions only; header and comment lines are not addressable,
//! which keeps a loaded image consistent with compile-time addresses.
//!
//! Opcode assignments: `PUSH`=1, `LOAD`=2, `STORE`=3, `ADD`=4, `SUB`=5,
//! `MUL`=6, `DIV`=7, `PRINT`=8, `HALT`=9, comparisons `EQ`..`GTE`=10..15,
//! `JMP`=16, `JZ`=17, `JNZ`=18.

use crate::Error;
use crate::compiler::{Instruction, Program};

/// Renders a finished program into the textual image.
pub fn serialize(program: &Program, package: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Package: {package}\n#\n#\n#\n"));
    for instruction in &program.instructions {
        out.push_str(&encode(instruction));
        out.push('\n');
    }
    out
}

fn encode(instruction: &Instruction) -> String {
    match *instruction {
        Instruction::Push(value) => format!("1 0 0 0 {value}"),
        Instruction::Load(slot) => format!("2 {slot}"),
        Instruction::Store(slot) => format!("3 {slot}"),
        Instruction::Add => "4".to_owned(),
        Instruction::Sub => "5".to_owned(),
        Instruction::Mul => "6".to_owned(),
        Instruction::Div => "7".to_owned(),
        Instruction::Print(slot) => format!("8 {slot}"),
        Instruction::Halt => "9".to_owned(),
        Instruction::CmpEq => "10".to_owned(),
        Instruction::CmpNeq => "11".to_owned(),
        Instruction::CmpLt => "12".to_owned(),
        Instruction::CmpLte => "13".to_owned(),
        Instruction::CmpGt => "14".to_owned(),
        Instruction::CmpGte => "15".to_owned(),
        Instruction::Jump(address) => format!("16 {address}"),
        Instruction::JumpIfZero(address) => format!("17 {address}"),
        Instruction::JumpIfNotZero(address) => format!("18 {address}"),
    }
}

/// Parses a textual image back into a program.
///
/// Blank lines and `#` comment lines are skipped. Unknown opcodes, missing
/// operands and non-numeric fields are rejected.
pub fn parse(text: &str) -> Result<Program, Error> {
    let mut instructions = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<i64> = line
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map_err(|_| {
                Error::InvalidImage(format!("line {}: non-numeric field", index + 1))
            })?;
        let instruction = decode(&fields).ok_or_else(|| {
            Error::InvalidImage(format!("line {}: '{line}'", index + 1))
        })?;
        instructions.push(instruction);
    }
    Ok(Program { instructions })
}

fn decode(fields: &[i64]) -> Option<Instruction> {
    let instruction = match *fields {
        [1, _, _, _, value] => Instruction::Push(value),
        [2, slot] => Instruction::Load(usize::try_from(slot).ok()?),
        [3, slot] => Instruction::Store(usize::try_from(slot).ok()?),
        [4] => Instruction::Add,
        [5] => Instruction::Sub,
        [6] => Instruction::Mul,
        [7] => Instruction::Div,
        [8, slot] => Instruction::Print(usize::try_from(slot).ok()?),
        [9] => Instruction::Halt,
        [10] => Instruction::CmpEq,
        [11] => Instruction::CmpNeq,
        [12] => Instruction::CmpLt,
        [13] => Instruction::CmpLte,
        [14] => Instruction::CmpGt,
        [15] => Instruction::CmpGte,
        [16, address] => Instruction::Jump(usize::try_from(address).ok()?),
        [17, address] => Instruction::JumpIfZero(usize::try_from(address).ok()?),
        [18, address] => Instruction::JumpIfNotZero(usize::try_from(address).ok()?),
        _ => return None,
    };
    Some(instruction)
}
