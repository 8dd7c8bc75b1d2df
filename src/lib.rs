/*!
  A minimal register-addressed virtual machine.

  A symbolic program is lowered by the `assembler` into IR and then into bytecode using the
  codec in `bytecode`. The interpreter in `uvm` executes that bytecode against a flat `memory`
  and hands back the final memory. The assembler and the interpreter never talk to each other;
  the encoding is their only contract.

  ```
  use uvm::{assemble_json, execute, DEFAULT_MEMORY_SIZE};

  let (bytecode, _ir) = assemble_json(r#"[{"op": "load_const", "B": 5, "C": 42}]"#).unwrap();
  let memory = execute(&bytecode, DEFAULT_MEMORY_SIZE).unwrap();
  assert_eq!(memory.read(5), Ok(42));
  ```
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod assembler;
pub mod bytecode;
pub mod error;
pub mod memory;
pub mod uvm;

pub use assembler::{assemble, assemble_json, hex_dump, parse_program, to_ir, ProgramEntry};
pub use bytecode::{decode_instruction, disassemble, encode_instruction, Instruction, Operation};
pub use error::{ArithmeticError, AssemblyError, DecodeError, DumpError, ExecutionError, OutOfBounds};
pub use memory::{AddressRange, Memory, DEFAULT_MEMORY_SIZE};
pub use crate::uvm::{execute, Uvm};
