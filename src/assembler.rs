//! Lowers a symbolic program into IR and IR into bytecode.
//!
//! The pipeline is
//! ```text
//! JSON -> [`parse_program`] -> `ProgramEntry`s -> [`to_ir`] -> `Instruction`s -> [`assemble`] -> bytes
//! ```
//! Operand ranges are not validated here. Operands are read as signed 64-bit integers and
//! wrapped to 32 bits, and the encoder then keeps only the low bits each field holds, so `-1`
//! in a 7-bit field encodes as 127. An address outside memory is only discovered when the
//! program runs.

use std::fmt::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bytecode::{encode_instruction, wrap_operand, Instruction, Operation, INSTRUCTION_SIZE};
use crate::error::AssemblyError;

/// One record of a symbolic program: `{"op": "pow", "B": 0, "C": 120, "D": 100}`.
/// Keys other than these four are ignored.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct ProgramEntry {
  pub op : String,
  #[serde(rename = "B")]
  pub b  : i64,
  #[serde(rename = "C")]
  pub c  : i64,
  #[serde(rename = "D", default, skip_serializing_if = "Option::is_none")]
  pub d  : Option<i64>
}

impl ProgramEntry {
  /// Validates the mnemonic and picks the operands its opcode uses. A `D` given to a two
  /// operand instruction is ignored.
  pub fn to_instruction(&self) -> Result<Instruction, AssemblyError> {
    let operation =
      Operation::from_str(&self.op)
        .map_err(|_| AssemblyError::UnknownInstruction(self.op.clone()))?;

    let d =
      match operation.arity() {
        2 => 0,
        _ => self.d.ok_or(AssemblyError::MissingOperand { operation, operand: "D" })?,
      };
    let operands = [self.b, self.c, d];

    Ok(Instruction::from_fn(operation, |i| wrap_operand(operands[i])))
  }
}

impl From<&Instruction> for ProgramEntry {
  fn from(instruction: &Instruction) -> ProgramEntry {
    let operands = instruction.operands();
    ProgramEntry {
      op : instruction.operation().mnemonic().to_string(),
      b  : i64::from(operands[0]),
      c  : i64::from(operands[1]),
      d  : operands.get(2).copied().map(i64::from)
    }
  }
}

/// Reads a JSON array of program entries.
pub fn parse_program(json: &str) -> Result<Vec<ProgramEntry>, AssemblyError> {
  Ok(serde_json::from_str(json)?)
}

/// Converts program entries to IR, preserving order. Stops at the first bad entry.
pub fn to_ir(program: &[ProgramEntry]) -> Result<Vec<Instruction>, AssemblyError> {
  program.iter().map(ProgramEntry::to_instruction).collect()
}

/// Encodes IR into a contiguous byte sequence of exactly `4 * ir.len()` bytes.
pub fn assemble(ir: &[Instruction]) -> Vec<u8> {
  let mut bytecode = Vec::with_capacity(ir.len() * INSTRUCTION_SIZE);
  for instruction in ir {
    bytecode.extend_from_slice(&encode_instruction(instruction));
  }
  bytecode
}

/// Runs the whole JSON to bytecode path, returning the bytecode together with the IR.
pub fn assemble_json(json: &str) -> Result<(Vec<u8>, Vec<Instruction>), AssemblyError> {
  let ir = to_ir(&parse_program(json)?)?;
  Ok((assemble(&ir), ir))
}

/// Renders bytecode as space separated uppercase hex bytes.
pub fn hex_dump(bytecode: &[u8]) -> String {
  let mut text = String::with_capacity(bytecode.len() * 3);
  for (i, byte) in bytecode.iter().enumerate() {
    if i > 0 {
      text.push(' ');
    }
    // Writing to a `String` cannot fail.
    let _ = write!(text, "{:02X}", byte);
  }
  text
}
