use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};
use num_enum::{TryFromPrimitive, IntoPrimitive};

use crate::bytecode::Word;

/// A raw operand: a cell index or an immediate constant, depending on the opcode.
pub type Operand = u32;

/// Reduces a signed source operand to its low 32 bits in two's complement, so `-1` becomes
/// all ones and `2 ** 32 + 5` becomes 5. The encoder then masks to the field width.
pub fn wrap_operand(value: i64) -> Operand {
  value as Operand
}

/**
  Opcodes of the virtual machine. The discriminant of each variant is its 4 bit tag in the
  encoded word, so the conversions to and from the tag are derived rather than written out.
  The mnemonic of each variant is its name in the symbolic program format.
*/
#[derive(
StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq, PartialEq,  Debug, Hash
)]
#[repr(u8)]
pub enum Operation {
  #[strum(serialize = "read_value")]
  ReadValue  =  3, // read_value( base pointer, destination, offset )
  #[strum(serialize = "write_value")]
  WriteValue =  7, // write_value( source, destination )
  #[strum(serialize = "load_const")]
  LoadConst  =  8, // load_const( destination, constant )
  #[strum(serialize = "pow")]
  Pow        = 10, // pow( exponent pointer, destination, base )
}

/// A bit field of an encoded word.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct Field {
  pub offset : u32,
  pub width  : u32
}

impl Field {
  pub const fn new(offset: u32, width: u32) -> Field {
    Field{ offset, width }
  }

  pub const fn mask(&self) -> Word {
    (1 << self.width) - 1
  }

  /// Truncates the operand to the field width and shifts it into place.
  pub fn pack(&self, operand: Operand) -> Word {
    (operand & self.mask()) << self.offset
  }

  pub fn unpack(&self, word: Word) -> Operand {
    (word >> self.offset) & self.mask()
  }

  /// Whether `operand` survives packing unchanged.
  pub fn fits(&self, operand: Operand) -> bool {
    operand & self.mask() == operand
  }
}

// Operand layouts, in B, C, D order. Each field begins where the previous one ends.
const LOAD_CONST_LAYOUT  : [Field; 2] = [Field::new(4, 7), Field::new(11, 14)];
const READ_VALUE_LAYOUT  : [Field; 3] = [Field::new(4, 7), Field::new(11, 7), Field::new(18, 12)];
const WRITE_VALUE_LAYOUT : [Field; 2] = [Field::new(4, 7), Field::new(11, 11)];
const POW_LAYOUT         : [Field; 3] = [Field::new(4, 7), Field::new(11, 7), Field::new(18, 7)];

impl Operation {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  pub fn mnemonic(&self) -> &'static str {
    (*self).into()
  }

  /// The operand fields of this opcode's encoding, in operand order.
  pub fn layout(&self) -> &'static [Field] {
    match self {
      Operation::LoadConst  => &LOAD_CONST_LAYOUT,
      Operation::ReadValue  => &READ_VALUE_LAYOUT,
      Operation::WriteValue => &WRITE_VALUE_LAYOUT,
      Operation::Pow        => &POW_LAYOUT,
    }
  }

  pub fn arity(&self) -> usize {
    self.layout().len()
  }
}

/// Holds the unencoded components of an instruction. The variant determines how the
/// positional operands B, C and D are interpreted.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
  /// `memory[b] = c`
  LoadConst {
    b: Operand,
    c: Operand
  },
  /// `memory[c] = memory[memory[b] + d]`
  ReadValue {
    b: Operand,
    c: Operand,
    d: Operand
  },
  /// `memory[c] = memory[b]`
  WriteValue {
    b: Operand,
    c: Operand
  },
  /// `memory[c] = memory[d] ** memory[memory[b]]`
  Pow {
    b: Operand,
    c: Operand,
    d: Operand
  },
}

impl Instruction {
  /// Builds an instruction from operands in B, C, D order. Returns `None` if the number of
  /// operands does not match the arity of `operation`.
  pub fn new(operation: Operation, operands: &[Operand]) -> Option<Instruction> {
    match operands.len() == operation.arity() {
      true  => Some(Instruction::from_fn(operation, |i| operands[i])),
      false => None
    }
  }

  /// Builds an instruction by asking `operand` for each position below the arity.
  pub(crate) fn from_fn<F>(operation: Operation, mut operand: F) -> Instruction
    where F: FnMut(usize) -> Operand
  {
    match operation {
      Operation::LoadConst  => Instruction::LoadConst { b: operand(0), c: operand(1) },
      Operation::ReadValue  => Instruction::ReadValue { b: operand(0), c: operand(1), d: operand(2) },
      Operation::WriteValue => Instruction::WriteValue{ b: operand(0), c: operand(1) },
      Operation::Pow        => Instruction::Pow       { b: operand(0), c: operand(1), d: operand(2) },
    }
  }

  pub fn operation(&self) -> Operation {
    match self {
      Instruction::LoadConst {..} => Operation::LoadConst,
      Instruction::ReadValue {..} => Operation::ReadValue,
      Instruction::WriteValue{..} => Operation::WriteValue,
      Instruction::Pow       {..} => Operation::Pow,
    }
  }

  /// The operands in B, C, D order.
  pub fn operands(&self) -> Vec<Operand> {
    match *self {
      | Instruction::LoadConst { b, c }
      | Instruction::WriteValue{ b, c }    => vec![b, c],
      | Instruction::ReadValue { b, c, d }
      | Instruction::Pow       { b, c, d } => vec![b, c, d],
    }
  }

  /// The instruction as it comes out of an encode/decode trip, each operand truncated to
  /// the width of its field.
  pub fn masked(&self) -> Instruction {
    let operation = self.operation();
    let layout    = operation.layout();
    let operands  = self.operands();
    Instruction::from_fn(operation, |i| operands[i] & layout[i].mask())
  }

  /// Whether every operand fits its field, i.e. encoding loses nothing.
  pub fn fits(&self) -> bool {
    self.operation()
        .layout()
        .iter()
        .zip(self.operands())
        .all(|(field, operand)| field.fits(operand))
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{}({})",
      self.operation(),
      self.operands()
          .iter()
          .map(Operand::to_string)
          .collect::<Vec<String>>()
          .join(", ")
    )
  }
}
