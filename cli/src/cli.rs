use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Compiles RV32IM programs to boolean circuits and checks circuit
/// equivalence.
#[derive(Parser, Debug)]
#[command(name = "ckt")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Which memory tier a `compile` run targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MemoryTierArg {
    /// 8-word bank, no authentication — the smallest, fastest tier.
    Ultra,
    /// 256-word bank, no authentication.
    Simple,
    /// Merkle-authenticated tree of arbitrary depth.
    Secure,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a fixed RV32IM instruction stream into a sealed circuit.
    Compile {
        /// Program file: one instruction word per line, `0x`-prefixed hex
        /// or decimal, `#` comments and blank lines ignored.
        #[arg(value_name = "PROGRAM")]
        program: PathBuf,

        /// Memory tier the compiled circuit addresses.
        #[arg(short = 'm', long, value_enum, default_value_t = MemoryTierArg::Ultra)]
        mode: MemoryTierArg,

        /// Merkle tree depth, only meaningful with `-m secure`.
        #[arg(long, default_value_t = 3)]
        depth: usize,

        /// Addressable memory size in bytes.
        #[arg(long)]
        memory_bytes: Option<u64>,

        /// Fetch PC of the first instruction.
        #[arg(long, default_value_t = 0)]
        base_pc: u32,

        /// Route repeated register/immediate ALU gates (and the load/store
        /// witness-authentication chain) through the gate deduplicator.
        /// Address computation and branch conditions are not deduplicated.
        #[arg(long)]
        dedup: bool,

        /// Output circuit file, in the line-oriented text format. Defaults to stdout.
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Check whether two sealed circuits compute the same function.
    Equiv {
        /// First circuit file.
        #[arg(value_name = "A")]
        a: PathBuf,

        /// Second circuit file.
        #[arg(value_name = "B")]
        b: PathBuf,

        /// Wall-clock budget for the SAT solver, in seconds.
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,

        /// Dump the miter's DIMACS CNF to this file before solving.
        #[arg(long, value_name = "FILE")]
        export_cnf: Option<PathBuf>,
    },
}
