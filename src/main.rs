mod bytecode;
mod compile_error;
mod compiler;
mod diagnostic;
mod frontend;
mod lang;

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{CommandFactory as _, Parser as _};

use crate::bytecode::disasm::print_unit;
use crate::bytecode::serialize::{load_unit, save_unit};
use crate::diagnostic::Reporter;
use crate::frontend::source::{self, Source};
use crate::frontend::token_dumper::TokenDumper;

const DEFAULT_TARGET: &str = "out.cbc";

/// Compiles a source file into a bytecode unit.
#[derive(clap::Parser)]
#[command(name = "cinder", version)]
struct Args {
    /// Source file to compile
    source: Option<PathBuf>,

    /// Output file
    #[arg(default_value = DEFAULT_TARGET)]
    target: PathBuf,

    /// Print the token stream and exit
    #[arg(long)]
    tokens: bool,

    /// Disable ANSI colors in --tokens output
    #[arg(long)]
    no_color: bool,

    /// Print the parsed syntax tree
    #[arg(long)]
    ast: bool,

    /// Print a listing of the compiled unit
    #[arg(long)]
    disasm: bool,

    /// Stop at the first error instead of recovering
    #[arg(long)]
    stop_on_first_error: bool,

    /// Print a listing of an existing unit file and exit
    #[arg(long, value_name = "UNIT")]
    inspect: Option<PathBuf>,
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    if let Some(unit_path) = &args.inspect {
        let bytes = fs::read(unit_path)
            .with_context(|| format!("could not open file '{}'", unit_path.display()))?;
        let unit = load_unit(&bytes)
            .with_context(|| format!("could not load unit '{}'", unit_path.display()))?;
        print_unit(&unit);
        return Ok(ExitCode::SUCCESS);
    }

    let Some(source_path) = &args.source else {
        Args::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let bytes = fs::read(source_path)
        .with_context(|| format!("could not open file '{}'", source_path.display()))?;
    let text = source::decode(&bytes);
    let source = Source::new(&text);
    log::debug!("read {} bytes from '{}'", source.len(), source_path.display());

    if args.tokens {
        let mut dumper = TokenDumper::new();
        if args.no_color {
            dumper = dumper.no_color();
        }
        dumper.dump(&source);
        return Ok(ExitCode::SUCCESS);
    }

    let mut reporter = Reporter::new(&source, io::stderr());
    if args.stop_on_first_error {
        reporter = reporter.stop_on_first_error();
    }

    let unit = if args.ast {
        compiler::parse(&source, &mut reporter).and_then(|tree| {
            println!("{:#?}", tree);
            compiler::generate(&source, &tree, &mut reporter)
        })
    } else {
        compiler::compile(&source, &mut reporter)
    };
    reporter.finish();
    log::debug!("{} error(s) reported", reporter.error_count());

    let Ok(unit) = unit else {
        return Ok(ExitCode::FAILURE);
    };

    if args.disasm {
        print_unit(&unit);
    }

    let file = File::create(&args.target)
        .with_context(|| format!("could not create file '{}'", args.target.display()))?;
    save_unit(&mut BufWriter::new(file), &unit)
        .with_context(|| format!("could not write '{}'", args.target.display()))?;
    log::info!("wrote '{}'", args.target.display());

    Ok(ExitCode::SUCCESS)
}
