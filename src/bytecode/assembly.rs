/*!
  The human readable textual form of a program is called a listing. A listing has one
  instruction per line, written `mnemonic(B, C)` or `mnemonic(B, C, D)`. Blank lines are
  ignored and `#` starts a comment that runs to the end of the line. This module leverages
  the `strum` derives of `Operation` to map mnemonics to opcodes, so the listing form and the
  `Display` form of `Instruction` are the same text.
*/

use std::str::FromStr;

use nom::{
  IResult,
  branch::alt,
  bytes::complete::{is_not, tag},
  character::complete::{
    alpha1,
    alphanumeric1,
    char as one_char,
    digit1,
    space0
  },
  combinator::{all_consuming, map, map_res, opt, recognize},
  multi::{many0, separated_list},
  sequence::{delimited, pair, preceded, terminated, tuple},
};

use crate::bytecode::{wrap_operand, Instruction, Operand, Operation};
use crate::error::AssemblyError;

fn comment(input: &str) -> IResult<&str, (char, Option<&str>)> {
  pair(one_char('#'), opt(is_not("\n\r")))(input)
}

fn mnemonic(input: &str) -> IResult<&str, &str> {
  recognize(pair(alpha1, many0(alt((alphanumeric1, tag("_"))))))(input)
}

/// A decimal integer, possibly negative, wrapped to an operand the way JSON operands are.
fn operand(input: &str) -> IResult<&str, Operand> {
  map_res(
    recognize(pair(opt(one_char('-')), digit1)),
    |text: &str| text.parse::<i64>().map(wrap_operand)
  )(input)
}

/// `mnemonic ( operand, operand, ... )` with optional surrounding whitespace.
fn instruction(input: &str) -> IResult<&str, (&str, Vec<Operand>)> {
  tuple((
    preceded(space0, mnemonic),
    delimited(
      delimited(space0, one_char('('), space0),
      separated_list(delimited(space0, one_char(','), space0), operand),
      preceded(space0, one_char(')'))
    )
  ))(input)
}

/// A line holding an instruction, possibly followed by a comment.
fn instruction_line(input: &str) -> IResult<&str, (&str, Vec<Operand>)> {
  all_consuming(terminated(instruction, pair(space0, opt(comment))))(input)
}

/// A line holding nothing but whitespace and perhaps a comment.
fn empty_line(input: &str) -> IResult<&str, ()> {
  map(all_consuming(pair(space0, opt(comment))), |_| ())(input)
}

/// Resolves the mnemonic and checks the operand count against the opcode's arity.
fn lower(name: &str, operands: &[Operand]) -> Result<Instruction, AssemblyError> {
  let operation =
    Operation::from_str(name)
      .map_err(|_| AssemblyError::UnknownInstruction(name.to_string()))?;

  Instruction::new(operation, operands).ok_or(AssemblyError::WrongArity {
    operation,
    expected : operation.arity(),
    found    : operands.len()
  })
}

/// Parses a listing into IR. Errors name the 1-based line they occurred on.
pub fn parse_listing(text: &str) -> Result<Vec<Instruction>, AssemblyError> {
  let mut instructions = Vec::new();

  for (index, raw_line) in text.lines().enumerate() {
    let line = index + 1;

    if empty_line(raw_line).is_ok() {
      continue;
    }

    let (_, (name, operands)) =
      instruction_line(raw_line).map_err(|_| AssemblyError::Syntax {
        line,
        text: raw_line.trim().to_string()
      })?;

    let instruction =
      lower(name, &operands).map_err(|e| AssemblyError::Line { line, source: Box::new(e) })?;
    instructions.push(instruction);
  }

  Ok(instructions)
}

/// Renders IR as a listing that `parse_listing` reads back.
pub fn render_listing(instructions: &[Instruction]) -> String {
  instructions
    .iter()
    .map(Instruction::to_string)
    .collect::<Vec<String>>()
    .join("\n")
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_program(){
    let text = "
# Store 2 ** 3 in cell 120.
  load_const(10, 2)
load_const ( 11,3 )     # exponent
    write_value(10, 100)
write_value(11, 101)

load_const(0, 101)
pow(0, 120, 100)
";
    let ir = parse_listing(text).unwrap();
    assert_eq!(
      ir,
      vec![
        Instruction::LoadConst { b: 10, c: 2 },
        Instruction::LoadConst { b: 11, c: 3 },
        Instruction::WriteValue{ b: 10, c: 100 },
        Instruction::WriteValue{ b: 11, c: 101 },
        Instruction::LoadConst { b: 0, c: 101 },
        Instruction::Pow       { b: 0, c: 120, d: 100 },
      ]
    );
  }

  #[test]
  fn render_then_parse(){
    let ir = vec![
      Instruction::ReadValue { b: 4, c: 54, d: 396 },
      Instruction::LoadConst { b: 27, c: 898 },
    ];
    let listing = render_listing(&ir);
    assert_eq!(listing, "read_value(4, 54, 396)\nload_const(27, 898)");
    assert_eq!(parse_listing(&listing).unwrap(), ir);
  }

  #[test]
  fn empty_listing(){
    assert_eq!(parse_listing("").unwrap(), vec![]);
    assert_eq!(parse_listing("  # nothing here\n\n").unwrap(), vec![]);
  }

  #[test]
  fn unknown_instruction(){
    let error = parse_listing("load_const(1, 2)\njump(4, 5)").unwrap_err();
    match error {
      AssemblyError::Line { line, source } => {
        assert_eq!(line, 2);
        assert!(matches!(*source, AssemblyError::UnknownInstruction(ref name) if name == "jump"));
      }
      other => panic!("unexpected error: {}", other)
    }
  }

  #[test]
  fn wrong_arity(){
    let error = parse_listing("pow(1, 2)").unwrap_err();
    assert_eq!(error.to_string(), "line 1: pow requires 3 operands but was given 2");
  }

  #[test]
  fn signed_and_wide_operands_wrap(){
    let ir = parse_listing("load_const(-1, 42)\nwrite_value(4294967301, 2)").unwrap();
    assert_eq!(
      ir.iter().map(Instruction::masked).collect::<Vec<_>>(),
      vec![
        Instruction::LoadConst { b: 127, c: 42 },
        Instruction::WriteValue{ b: 5, c: 2 },
      ]
    );
    assert!(matches!(
      parse_listing("load_const(1, 99999999999999999999)"),
      Err(AssemblyError::Syntax { line: 1, .. })
    ));
  }

  #[test]
  fn malformed(){
    for text in &["load_const(1, 2", "load_const 1 2", "load_const(1, - 2)", "(1, 2)", "pow(1, 2, 3) x"] {
      match parse_listing(text) {
        Err(AssemblyError::Syntax { line: 1, .. }) => {}
        other => panic!("`{}` parsed as {:?}", text, other.map(|ir| render_listing(&ir)))
      }
    }
  }
}
