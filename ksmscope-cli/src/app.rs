use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ksmscope - compiled KerboScript (KSM) inspection and disassembly
#[derive(Debug, Parser)]
#[command(name = "ksmscope", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Display file overview: index widths, argument, unit, and instruction counts.
    Info {
        /// Path to the compiled KSM file.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Disassemble the argument pool, code sections, and debug map.
    Disasm {
        /// Path to the compiled KSM file.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Write the listing to a file instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Omit the argument section.
        #[arg(long)]
        no_pool: bool,

        /// Omit the debug section.
        #[arg(long)]
        no_debug: bool,

        /// Omit the file summary header.
        #[arg(long)]
        no_header: bool,
    },
}
