/*!

  The VM uses a 32 bit little-endian word size, and every instruction is exactly one word.
  The low 4 bits of the word hold the opcode tag. The operands are packed immediately above
  the tag at fixed bit offsets whose widths depend on the opcode:

  ```text
    load_const   [Tag:4][B:7][C:14]        B = destination, C = constant
    read_value   [Tag:4][B:7][C:7][D:12]   B = base pointer, C = destination, D = offset
    write_value  [Tag:4][B:7][C:11]        B = source, C = destination
    pow          [Tag:4][B:7][C:7][D:7]    B = pointer to exponent, C = destination, D = base
  ```

  Unused high bits are zero. Because the stride is constant, the interpreter advances the
  program counter by four bytes after every instruction.

  The layouts live in a single table keyed by `Operation` (see `Operation::layout`), and
  both directions of the codec are driven by it. Encoding masks each operand to its field
  width, so an operand too wide for its field wraps rather than spilling into the next one.
  This is the only encode path in the crate.

  The textual listing form of a program, `mnemonic(B, C[, D])` per line, is handled by the
  `assembly` module.

*/

mod binary;
mod instruction;
pub mod assembly;

pub use binary::{encode_word, encode_instruction, try_decode_word, decode_instruction, disassemble,
                 Word, INSTRUCTION_SIZE, TAG_FIELD};
pub use instruction::{wrap_operand, Instruction, Operation, Operand, Field};
