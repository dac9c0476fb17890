use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tacc::grammar;

/// Compiles a small imperative language to three-address code.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Lower the three-address code further to pseudo-assembly.
    #[arg(long)]
    asm: bool,

    /// Print the grammar toolkit report for the built-in demonstration grammar.
    #[arg(long, conflicts_with_all = ["asm", "input"])]
    demo_grammar: bool,

    /// Read the program from this file instead of standard input.
    input: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    debug!(?args, "starting");

    match run(&args) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<String> {
    if args.demo_grammar {
        return Ok(grammar::demo::report());
    }

    let src = read_source(args.input.as_deref())?;
    let tac = tacc::compile(&src)?;

    Ok(if args.asm {
        tacc::render_asm(&tac)
    } else {
        tacc::render_tac(&tac)
    })
}

fn read_source(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        None => {
            let mut src = String::new();
            io::stdin()
                .read_to_string(&mut src)
                .context("reading standard input")?;
            Ok(src)
        }
    }
}
