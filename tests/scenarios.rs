use proptest::prelude::*;

use uvm::bytecode::{assembly, decode_instruction, INSTRUCTION_SIZE};
use uvm::{
  assemble, assemble_json, execute, AddressRange, DecodeError, ExecutionError, Instruction,
  OutOfBounds, DEFAULT_MEMORY_SIZE
};

fn run(ir: &[Instruction]) -> Result<Vec<i64>, ExecutionError> {
  execute(&assemble(ir), DEFAULT_MEMORY_SIZE).map(|memory| memory.into_cells())
}

#[test]
fn load_const_touches_one_cell() {
  let memory = run(&[Instruction::LoadConst { b: 5, c: 42 }]).unwrap();

  assert_eq!(memory.len(), 4096);
  for (address, &value) in memory.iter().enumerate() {
    assert_eq!(value, if address == 5 { 42 } else { 0 }, "cell {}", address);
  }
}

#[test]
fn write_value_copies() {
  let memory = run(&[
    Instruction::LoadConst { b: 0, c: 10 },
    Instruction::LoadConst { b: 1, c: 3 },
    Instruction::WriteValue{ b: 0, c: 2 },
  ]).unwrap();

  assert_eq!(memory[2], 10);
}

#[test]
fn pow_through_pointers() {
  let memory = run(&[
    Instruction::LoadConst { b: 0, c: 2 },      // base
    Instruction::LoadConst { b: 1, c: 5 },      // exponent
    Instruction::LoadConst { b: 2, c: 1 },      // address of the exponent
    Instruction::Pow       { b: 2, c: 3, d: 0 },
  ]).unwrap();

  assert_eq!(memory[3], 32);
}

#[test]
fn pow_overflow_aborts() {
  let error = run(&[
    Instruction::LoadConst { b: 0, c: 2 },
    Instruction::LoadConst { b: 1, c: 64 },
    Instruction::LoadConst { b: 2, c: 1 },
    Instruction::Pow       { b: 2, c: 3, d: 0 },
  ]).unwrap_err();

  assert!(matches!(error, ExecutionError::Arithmetic { pc: 12, .. }), "{}", error);
}

#[test]
fn short_tail_is_incomplete() {
  let mut bytecode = assemble(&[
    Instruction::LoadConst { b: 0, c: 1 },
    Instruction::LoadConst { b: 1, c: 2 },
  ]);
  bytecode.truncate(bytecode.len() - 2);

  assert_eq!(
    execute(&bytecode, DEFAULT_MEMORY_SIZE),
    Err(ExecutionError::Decode(DecodeError::IncompleteInstruction { offset: 4, remaining: 2 }))
  );
}

#[test]
fn out_of_bounds_is_reported_not_wrapped() {
  let bytecode = assemble(&[Instruction::WriteValue { b: 0, c: 2000 }]);

  assert_eq!(
    execute(&bytecode, 1024),
    Err(ExecutionError::Memory { pc: 0, source: OutOfBounds { address: 2000, size: 1024 } })
  );
  assert!(execute(&bytecode, 2001).is_ok());
}

#[test]
fn negative_operand_lands_on_masked_cell() {
  let (bytecode, _) = assemble_json(r#"[{"op": "load_const", "B": -1, "C": 42}]"#).unwrap();
  let memory = execute(&bytecode, DEFAULT_MEMORY_SIZE).unwrap();
  assert_eq!(memory.read(127), Ok(42));
}

#[test]
fn demo_programs() {
  let (bytecode, ir) = assemble_json(include_str!("../demos/power.json")).unwrap();
  let listing = assembly::parse_listing(include_str!("../demos/power.uvm")).unwrap();
  assert_eq!(ir, listing);

  let memory = execute(&bytecode, DEFAULT_MEMORY_SIZE).unwrap();
  let dump   = memory.dump("95-135".parse::<AddressRange>().unwrap()).unwrap();
  assert_eq!(dump.len(), 41);
  assert_eq!(dump[0], (95, 0));
  assert!(dump.contains(&(100, 2)));
  assert!(dump.contains(&(101, 3)));
  assert!(dump.contains(&(120, 8)));

  let (bytecode, _) = assemble_json(include_str!("../demos/default.json")).unwrap();
  let memory = execute(&bytecode, DEFAULT_MEMORY_SIZE).unwrap();
  assert_eq!(memory.read(27), Ok(898));
  // 0 ** 0 through cell 82, which is zero and so points at cell 0.
  assert_eq!(memory.read(17), Ok(1));
}

fn any_program() -> impl Strategy<Value = Vec<Instruction>> {
  let operand = 0u32..128;
  let instruction = prop_oneof![
    (operand.clone(), 0u32..1 << 14).prop_map(|(b, c)| Instruction::LoadConst { b, c }),
    (operand.clone(), operand.clone(), 0u32..64)
      .prop_map(|(b, c, d)| Instruction::ReadValue { b, c, d }),
    (operand.clone(), operand.clone()).prop_map(|(b, c)| Instruction::WriteValue { b, c }),
    (operand.clone(), operand.clone(), operand)
      .prop_map(|(b, c, d)| Instruction::Pow { b, c, d }),
  ];
  proptest::collection::vec(instruction, 0..32)
}

proptest! {
  #[test]
  fn every_word_boundary_decodes(ir in any_program()) {
    let bytecode = assemble(&ir);
    prop_assert_eq!(bytecode.len(), INSTRUCTION_SIZE * ir.len());

    for (i, instruction) in ir.iter().enumerate() {
      let (decoded, size) = decode_instruction(&bytecode, i * INSTRUCTION_SIZE).unwrap();
      prop_assert_eq!(&decoded, instruction);
      prop_assert_eq!(size, INSTRUCTION_SIZE);
    }
    prop_assert_eq!(
      decode_instruction(&bytecode, bytecode.len()).unwrap_err(),
      DecodeError::IncompleteInstruction { offset: bytecode.len(), remaining: 0 }
    );
  }

  #[test]
  fn execution_is_deterministic(ir in any_program()) {
    let bytecode = assemble(&ir);
    prop_assert_eq!(execute(&bytecode, 256), execute(&bytecode, 256));
  }
}
