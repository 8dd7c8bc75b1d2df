use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use uvm::assembler::{assemble, hex_dump, parse_program, to_ir};
use uvm::bytecode::{assembly, disassemble, Instruction};
use uvm::memory::{AddressRange, Memory, DEFAULT_MEMORY_SIZE};

#[derive(Parser)]
#[command(name = "uvm")]
#[command(about = "Assembler and interpreter for the UVM bytecode", long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Assemble a JSON program (`.json`) or a listing (any other extension) into bytecode
  Assemble {
    #[arg(short, long)]
    input: PathBuf,
    #[arg(short, long)]
    output: PathBuf,
    /// Print the IR and the bytecode in hex
    #[arg(short, long)]
    test: bool,
  },
  /// Execute bytecode and write a CSV dump of a memory range
  Run {
    #[arg(short, long)]
    input: PathBuf,
    #[arg(short, long)]
    output: PathBuf,
    /// Inclusive range to dump, `<start>-<end>`
    #[arg(short, long)]
    range: AddressRange,
    #[arg(long, default_value_t = DEFAULT_MEMORY_SIZE)]
    memory_size: usize,
    /// Also print the dumped range as a table
    #[arg(long)]
    print: bool,
  },
  /// Print the listing of a bytecode file
  Disasm {
    #[arg(short, long)]
    input: PathBuf,
  },
}

fn main() {
  if let Err(e) = dispatch(Cli::parse().command) {
    eprintln!("Error: {:#}", e);
    std::process::exit(1);
  }
}

fn dispatch(command: Command) -> anyhow::Result<()> {
  match command {
    Command::Assemble { input, output, test } => assemble_file(&input, &output, test),
    Command::Run { input, output, range, memory_size, print } => {
      run_file(&input, &output, range, memory_size, print)
    }
    Command::Disasm { input } => {
      let bytecode = read_bytecode(&input)?;
      println!("{}", assembly::render_listing(&disassemble(&bytecode)?));
      Ok(())
    }
  }
}

fn read_ir(path: &Path) -> anyhow::Result<Vec<Instruction>> {
  let text =
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;

  let is_json = path.extension().map_or(false, |extension| extension == "json");
  let ir = match is_json {
    true  => to_ir(&parse_program(&text)?)?,
    false => assembly::parse_listing(&text)?
  };

  Ok(ir)
}

fn read_bytecode(path: &Path) -> anyhow::Result<Vec<u8>> {
  fs::read(path).with_context(|| format!("cannot read {}", path.display()))
}

fn assemble_file(input: &Path, output: &Path, test: bool) -> anyhow::Result<()> {
  let ir       = read_ir(input)?;
  let bytecode = assemble(&ir);

  fs::write(output, &bytecode).with_context(|| format!("cannot write {}", output.display()))?;
  println!("Commands assembled: {}", ir.len());

  if test {
    println!("\nIR:\n{}", assembly::render_listing(&ir));
    println!("\nBytecode:\n{}", hex_dump(&bytecode));
  }

  Ok(())
}

fn run_file(
  input       : &Path,
  output      : &Path,
  range       : AddressRange,
  memory_size : usize,
  print       : bool
) -> anyhow::Result<()> {
  let bytecode = read_bytecode(input)?;
  let memory   = uvm::execute(&bytecode, memory_size)?;

  write_csv(&memory, range, output)?;
  println!("Memory dump written to {}", output.display());

  if print {
    memory.dump_table(range)?.printstd();
  }

  Ok(())
}

fn write_csv(memory: &Memory, range: AddressRange, path: &Path) -> anyhow::Result<()> {
  let dump = memory.dump(range)?;

  let file   = fs::File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
  let mut out = BufWriter::new(file);

  writeln!(out, "addr,value")?;
  for (address, value) in dump {
    writeln!(out, "{},{}", address, value)?;
  }
  out.flush()?;

  Ok(())
}
