//! Error conditions for every stage of the pipeline. Each stage has its own enum so callers
//! can tell a malformed program from a malformed bytecode stream from a failed run.

use thiserror::Error;

use crate::bytecode::Operation;
use crate::memory::{Address, Cell};

/// Failures of the decode path of the instruction codec.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum DecodeError {
  #[error("incomplete instruction at offset {offset}: {remaining} of 4 bytes remain")]
  IncompleteInstruction {
    offset    : usize,
    remaining : usize
  },

  #[error("unknown opcode {tag} at offset {offset}")]
  UnknownOpcode {
    offset : usize,
    tag    : u8
  },
}

/// Failures while lowering a symbolic program into IR.
#[derive(Error, Debug)]
pub enum AssemblyError {
  #[error("unknown instruction: {0}")]
  UnknownInstruction(String),

  #[error("{operation} requires operand {operand}")]
  MissingOperand {
    operation : Operation,
    operand   : &'static str
  },

  #[error("{operation} requires {expected} operands but was given {found}")]
  WrongArity {
    operation : Operation,
    expected  : usize,
    found     : usize
  },

  #[error("line {line}: {source}")]
  Line {
    line   : usize,
    #[source]
    source : Box<AssemblyError>
  },

  #[error("line {line}: cannot parse `{text}`")]
  Syntax {
    line : usize,
    text : String
  },

  #[error("malformed program: {0}")]
  Json(#[from] serde_json::Error),

  #[error("cannot disassemble: {0}")]
  Decode(#[from] DecodeError),
}

/// An access outside the memory array.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
#[error("out-of-bounds memory access: address {address} not in [0, {size})")]
pub struct OutOfBounds {
  pub address : i64,
  pub size    : usize
}

/// Domain failures of the power function.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ArithmeticError {
  #[error("0 cannot be raised to the negative power {exponent}")]
  ZeroToNegativePower { exponent: Cell },

  #[error("{base} ** {exponent} does not fit in a memory cell")]
  Overflow { base: Cell, exponent: Cell },
}

/// Conditions that abort a run. Every variant records the program counter of the
/// instruction that failed.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ExecutionError {
  #[error("{0}")]
  Decode(#[from] DecodeError),

  #[error("pc {pc}: {source}")]
  Memory {
    pc     : usize,
    #[source]
    source : OutOfBounds
  },

  #[error("pc {pc}: {source}")]
  Arithmetic {
    pc     : usize,
    #[source]
    source : ArithmeticError
  },
}

/// Failures of the dump surface.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum DumpError {
  #[error("invalid range `{0}`: expected `<start>-<end>` with start <= end")]
  InvalidRange(String),

  #[error("dump range {start}-{end} exceeds memory of {size} cells")]
  OutOfBounds {
    start : Address,
    end   : Address,
    size  : usize
  },
}
