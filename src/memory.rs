//! The single flat address space of the machine. There is no separate register file: every
//! operand that names a "register" is an index into this array, so all reads and writes go
//! through the bounds-checked accessors below.

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use nom::{
  IResult,
  character::complete::{char as one_char, digit1, space0},
  combinator::{all_consuming, map_res},
  sequence::{delimited, separated_pair},
};
use prettytable::{format as TableFormat, Table};

use crate::error::{DumpError, OutOfBounds};

/// The contents of one memory cell.
pub type Cell = i64;
/// An index into memory that is known to be in bounds.
pub type Address = usize;

pub const DEFAULT_MEMORY_SIZE: usize = 4096;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Memory {
  cells: Vec<Cell>
}

impl Memory {
  /// Allocates `size` cells, all zero. The size never changes afterward.
  pub fn new(size: usize) -> Memory {
    Memory {
      cells: vec![0; size]
    }
  }

  pub fn len(&self) -> usize {
    self.cells.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  pub fn cells(&self) -> &[Cell] {
    &self.cells
  }

  pub fn into_cells(self) -> Vec<Cell> {
    self.cells
  }

  /// Checks that `address` lies in `[0, len)`. Negative addresses never wrap.
  pub fn resolve(&self, address: i64) -> Result<Address, OutOfBounds> {
    usize::try_from(address)
      .ok()
      .filter(|&index| index < self.cells.len())
      .ok_or(OutOfBounds { address, size: self.cells.len() })
  }

  pub fn read(&self, address: i64) -> Result<Cell, OutOfBounds> {
    let index = self.resolve(address)?;
    Ok(self.cells[index])
  }

  /// Stores `value` and returns the address it was written to.
  pub fn write(&mut self, address: i64, value: Cell) -> Result<Address, OutOfBounds> {
    let index = self.resolve(address)?;
    self.cells[index] = value;
    Ok(index)
  }

  /// The `(address, value)` pairs of every cell in the inclusive range.
  pub fn dump(&self, range: AddressRange) -> Result<Vec<(Address, Cell)>, DumpError> {
    match self.cells.get(range.start..=range.end) {
      Some(cells) => Ok((range.start..=range.end).zip(cells.iter().copied()).collect()),
      None => Err(DumpError::OutOfBounds { start: range.start, end: range.end, size: self.len() })
    }
  }

  /// Renders the dump of `range` as a two column table.
  pub fn dump_table(&self, range: AddressRange) -> Result<Table, DumpError> {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubr->"Value"]);

    for (address, value) in self.dump(range)? {
      table.add_row(row![r->address, r->value]);
    }

    Ok(table)
  }
}

/// An inclusive range of addresses, written `<start>-<end>`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct AddressRange {
  pub start : Address,
  pub end   : Address
}

impl AddressRange {
  pub fn new(start: Address, end: Address) -> Option<AddressRange> {
    match start <= end {
      true  => Some(AddressRange{ start, end }),
      false => None
    }
  }

  /// The number of cells covered.
  /// Saturates at `usize::MAX` for the range covering every address.
  pub fn len(&self) -> usize {
    (self.end - self.start).saturating_add(1)
  }
}

fn address(input: &str) -> IResult<&str, Address> {
  map_res(digit1, |text: &str| text.parse::<Address>())(input)
}

fn address_range(input: &str) -> IResult<&str, (Address, Address)> {
  all_consuming(
    delimited(
      space0,
      separated_pair(address, delimited(space0, one_char('-'), space0), address),
      space0
    )
  )(input)
}

impl FromStr for AddressRange {
  type Err = DumpError;

  fn from_str(text: &str) -> Result<AddressRange, DumpError> {
    let invalid = || DumpError::InvalidRange(text.to_string());
    let (_, (start, end)) = address_range(text).map_err(|_| invalid())?;

    AddressRange::new(start, end).ok_or_else(invalid)
  }
}

impl Display for AddressRange {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}-{}", self.start, self.end)
  }
}

lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}
