mod cli;
mod program;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use ckt_circuit::{text, Limits};
use ckt_isa::{compile_program, MemoryKind};
use ckt_state::Layout;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mimalloc::MiMalloc;

use cli::{Cli, Commands, MemoryTierArg};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Exit codes: 0 success, 1 compilation error, 2 divergent, 3 timeout/unknown.
mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const COMPILATION_ERROR: i32 = 1;
    pub const DIVERGENT: i32 = 2;
    pub const UNKNOWN: i32 = 3;
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Compile { program, mode, depth, memory_bytes, base_pc, dedup, output } => {
            match run_compile(&program, mode, depth, memory_bytes, base_pc, dedup, output.as_deref()) {
                Ok(()) => exit_code::SUCCESS,
                Err(e) => {
                    eprintln!("error: {e:?}");
                    exit_code::COMPILATION_ERROR
                }
            }
        }
        Commands::Equiv { a, b, timeout_secs, export_cnf } => {
            match run_equiv(&a, &b, Duration::from_secs(timeout_secs), export_cnf.as_deref()) {
                Ok(code) => code,
                Err(e) => {
                    eprintln!("error: {e:?}");
                    exit_code::COMPILATION_ERROR
                }
            }
        }
    };

    std::process::exit(code);
}

fn default_memory_bytes(mode: MemoryTierArg) -> u64 {
    match mode {
        MemoryTierArg::Ultra => 32,
        MemoryTierArg::Simple => 1024,
        MemoryTierArg::Secure => 32,
    }
}

#[allow(clippy::too_many_arguments)]
fn run_compile(
    program_path: &std::path::Path,
    mode: MemoryTierArg,
    depth: usize,
    memory_bytes: Option<u64>,
    base_pc: u32,
    dedup: bool,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let words = program::parse_program(program_path)?;
    let memory_bytes = memory_bytes.unwrap_or_else(|| default_memory_bytes(mode));

    let layout = Layout::new(memory_bytes).context("building machine-state layout")?;
    let memory_kind = match mode {
        MemoryTierArg::Ultra => MemoryKind::Ultra,
        MemoryTierArg::Simple => MemoryKind::Simple,
        MemoryTierArg::Secure => MemoryKind::Secure { depth },
    };

    let bar = ProgressBar::new(words.len() as u64);
    bar.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} instructions").unwrap());
    bar.set_position(0);
    log::debug!("ckt: compiling {} instruction words, mode {mode:?}", words.len());

    let circuit = compile_program(Limits::default(), &layout, memory_kind, &words, base_pc, dedup)
        .context("compiling program to a circuit")?;
    bar.finish_and_clear();

    let stats = circuit.stats();
    log::info!(
        "ckt: compiled {} gates ({} AND, {} XOR), {} outputs",
        stats.num_gates,
        stats.num_and_gates,
        stats.num_xor_gates,
        stats.num_output_bits
    );

    match output {
        Some(path) => {
            let mut writer = BufWriter::new(
                File::create(path).with_context(|| format!("creating {}", path.display()))?,
            );
            text::write_text(&mut writer, &circuit)?;
            writer.flush()?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            text::write_text(&mut stdout, &circuit)?;
        }
    }

    Ok(())
}

fn run_equiv(
    a_path: &std::path::Path,
    b_path: &std::path::Path,
    timeout: Duration,
    export_cnf: Option<&std::path::Path>,
) -> Result<i32> {
    let a = read_circuit(a_path)?;
    let b = read_circuit(b_path)?;

    let miter = ckt_equiv::build_miter(&a, &b).context("building the miter")?;

    if let Some(path) = export_cnf {
        std::fs::write(path, miter.formula.to_dimacs())
            .with_context(|| format!("writing CNF to {}", path.display()))?;
    }

    let verdict = ckt_equiv::solve(miter.formula, miter.input_vars, timeout)
        .context("running the SAT solver")?;

    match verdict {
        ckt_equiv::Verdict::Equivalent => {
            println!("equivalent");
            Ok(exit_code::SUCCESS)
        }
        ckt_equiv::Verdict::Divergent { counterexample } => {
            let bits: Vec<&str> = counterexample.iter().map(|&b| if b { "1" } else { "0" }).collect();
            println!("divergent (counterexample: {})", bits.join(""));
            Ok(exit_code::DIVERGENT)
        }
        ckt_equiv::Verdict::Unknown => {
            println!("unknown (timeout)");
            Ok(exit_code::UNKNOWN)
        }
    }
}

fn read_circuit(path: &std::path::Path) -> Result<ckt_circuit::SealedCircuit> {
    let mut reader =
        BufReader::new(File::open(path).with_context(|| format!("opening {}", path.display()))?);
    text::read_text(&mut reader).with_context(|| format!("parsing {}", path.display()))
}
