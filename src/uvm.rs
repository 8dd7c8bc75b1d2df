//! The interpreter. A `Uvm` owns a zero-initialized memory and a program counter for the
//! duration of one run, decodes the word at the program counter, applies it, and advances by
//! one word until the program counter passes the end of the bytecode. Any failure aborts the
//! whole run; there is no way to resume a machine that stopped on an error.

use std::convert::TryFrom;

use crate::bytecode::{decode_instruction, Instruction};
use crate::error::{ArithmeticError, ExecutionError, OutOfBounds};
use crate::memory::{Address, Cell, Memory, DEFAULT_MEMORY_SIZE};

pub struct Uvm {
  memory : Memory, // The only data store: registers and addresses alike index into it
  pc     : usize   // Byte offset of the next instruction
}

impl Uvm {

  pub fn new(memory_size: usize) -> Uvm {
    Uvm {
      memory : Memory::new(memory_size),
      pc     : 0
    }
  }

  /// Runs `bytecode` to completion and returns the final memory.
  pub fn run(mut self, bytecode: &[u8]) -> Result<Memory, ExecutionError> {
    #[cfg(feature = "trace_computation")]
    println!("Tracing {} bytes against {} cells", bytecode.len(), self.memory.len());

    while self.pc < bytecode.len() {
      let (instruction, size) = decode_instruction(bytecode, self.pc)?;
      let written = self.step(&instruction)?;
      self.trace(&instruction, written);
      self.pc += size;
    }

    Ok(self.memory)
  }

  /// Applies one instruction, returning the cell it wrote and the value stored there.
  fn step(&mut self, instruction: &Instruction) -> Result<(Address, Cell), ExecutionError> {
    let pc            = self.pc;
    let out_of_bounds = move |source: OutOfBounds| ExecutionError::Memory { pc, source };

    let (destination, value) =
      match *instruction {

        Instruction::LoadConst { b, c } => {
          (b, Cell::from(c))
        }

        Instruction::ReadValue { b, c, d } => {
          // One level of indirection: cell `b` holds a base address.
          let base    = self.memory.read(b.into()).map_err(out_of_bounds)?;
          let address = base.saturating_add(d.into());
          (c, self.memory.read(address).map_err(out_of_bounds)?)
        }

        Instruction::WriteValue { b, c } => {
          (c, self.memory.read(b.into()).map_err(out_of_bounds)?)
        }

        Instruction::Pow { b, c, d } => {
          let base             = self.memory.read(d.into()).map_err(out_of_bounds)?;
          let exponent_address = self.memory.read(b.into()).map_err(out_of_bounds)?;
          let exponent         = self.memory.read(exponent_address).map_err(out_of_bounds)?;
          let result =
            power(base, exponent).map_err(|source| ExecutionError::Arithmetic { pc, source })?;
          (c, result)
        }

      };

    let address = self.memory.write(destination.into(), value).map_err(out_of_bounds)?;
    Ok((address, value))
  }

  #[cfg(feature = "trace_computation")]
  fn trace(&self, instruction: &Instruction, (address, value): (Address, Cell)) {
    println!("{:>6} │ {:<24} │ M[{}] = {}", self.pc, instruction.to_string(), address, value);
  }

  #[cfg(not(feature = "trace_computation"))]
  fn trace(&self, _instruction: &Instruction, _written: (Address, Cell)) {}
}

impl Default for Uvm {
  fn default() -> Uvm {
    Uvm::new(DEFAULT_MEMORY_SIZE)
  }
}

/// Executes `bytecode` against a fresh memory of `memory_size` cells.
pub fn execute(bytecode: &[u8], memory_size: usize) -> Result<Memory, ExecutionError> {
  Uvm::new(memory_size).run(bytecode)
}

/**
  Integer exponentiation with the results a real-valued power would give after truncation
  toward zero: a negative exponent yields `0` unless the base is `1` or `-1`. Zero to a
  negative power has no value, and results outside the range of a cell overflow.

  Cells are `i64`, so exactness stops at 63 bits: `2 ** 64` is an `Overflow` error here,
  where a machine with unbounded integer cells would store 18446744073709551616.
*/
fn power(base: Cell, exponent: Cell) -> Result<Cell, ArithmeticError> {
  let odd = exponent % 2 != 0;

  match (base, exponent) {
    (0, e) if e < 0  => Err(ArithmeticError::ZeroToNegativePower { exponent }),
    (_, 0)           => Ok(1),
    (0, _)           => Ok(0),
    (1, _)           => Ok(1),
    (-1, _)          => Ok(if odd { -1 } else { 1 }),
    (_, e) if e < 0  => Ok(0),
    (_, e) => {
      u32::try_from(e)
        .ok()
        .and_then(|e| base.checked_pow(e))
        .ok_or(ArithmeticError::Overflow { base, exponent })
    }
  }
}
