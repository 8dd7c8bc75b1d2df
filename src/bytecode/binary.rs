/*!
  This module is responsible for the encoding and decoding of binary instructions.
*/
use std::convert::TryFrom;

use super::{Field, Instruction, Operand, Operation};
use crate::error::DecodeError;

// If you change this you must also change `INSTRUCTION_SIZE` and `decode_instruction`.
pub type Word = u32;

/// Every instruction occupies exactly one word.
pub const INSTRUCTION_SIZE: usize = 4;

/// The opcode tag occupies the lowest bits of every word.
pub const TAG_FIELD: Field = Field::new(0, 4);

/// Packs the instruction into a word. Operands are truncated to their field widths.
pub fn encode_word(instruction: &Instruction) -> Word {
  let operation = instruction.operation();
  operation
    .layout()
    .iter()
    .zip(instruction.operands())
    .fold(
      TAG_FIELD.pack(operation.code() as Operand),
      |word, (field, operand)| word | field.pack(operand)
    )
}

/// Encodes the instruction into its four little-endian bytes.
pub fn encode_instruction(instruction: &Instruction) -> [u8; INSTRUCTION_SIZE] {
  encode_word(instruction).to_le_bytes()
}

/// Unpacks a word, or returns `None` if its tag is not a known opcode.
pub fn try_decode_word(word: Word) -> Option<Instruction> {
  let operation = Operation::try_from(TAG_FIELD.unpack(word) as u8).ok()?;
  let layout    = operation.layout();

  Some(Instruction::from_fn(operation, |i| layout[i].unpack(word)))
}

/**
  Decodes the instruction whose first byte is at `offset`, returning it along with the
  number of bytes it occupies.
*/
pub fn decode_instruction(bytes: &[u8], offset: usize) -> Result<(Instruction, usize), DecodeError> {
  let chunk =
    bytes.get(offset..)
         .and_then(|rest| rest.get(..INSTRUCTION_SIZE))
         .ok_or(DecodeError::IncompleteInstruction {
           offset,
           remaining: bytes.len().saturating_sub(offset)
         })?;

  let mut word_bytes = [0u8; INSTRUCTION_SIZE];
  word_bytes.copy_from_slice(chunk);
  let word = Word::from_le_bytes(word_bytes);

  match try_decode_word(word) {
    Some(instruction) => Ok((instruction, INSTRUCTION_SIZE)),
    None => Err(DecodeError::UnknownOpcode { offset, tag: TAG_FIELD.unpack(word) as u8 })
  }
}

/// Decodes an entire bytecode stream, one word at a time.
pub fn disassemble(bytes: &[u8]) -> Result<Vec<Instruction>, DecodeError> {
  let mut instructions = Vec::with_capacity(bytes.len() / INSTRUCTION_SIZE);
  let mut offset = 0;

  while offset < bytes.len() {
    let (instruction, size) = decode_instruction(bytes, offset)?;
    instructions.push(instruction);
    offset += size;
  }

  Ok(instructions)
}
