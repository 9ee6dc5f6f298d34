use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use quill::{
    lexer::{lexer::Lexer, tokens::TokenKind},
    parse_file,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Parses Quill source files and reports the first syntax error in each.
#[derive(Debug, Parser)]
#[command(name = "quill", version, about = "Quill front end")]
struct Cli {
    /// Source files to parse
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print the token stream of each file before parsing it
    #[arg(long)]
    tokens: bool,

    /// Pretty-print the syntax tree of each file
    #[arg(long)]
    ast: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut failures = 0;
    for file in &cli.files {
        if let Err(error) = run(&cli, file) {
            eprintln!("{:?}", error);
            failures += 1;
        }
    }

    if failures > 0 {
        debug!(failures, files = cli.files.len(), "some files failed to parse");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn directive_for_verbosity(v: u8) -> &'static str {
    match v {
        0 => "quill=warn",
        1 => "quill=debug",
        _ => "quill=trace",
    }
}

fn run(cli: &Cli, path: &Path) -> Result<()> {
    if cli.tokens {
        dump_tokens(path).with_context(|| format!("failed to lex {}", path.display()))?;
    }

    let start = Instant::now();
    // `Error` shares line text through `Rc`, so it is rendered here rather
    // than wrapped.
    let module = parse_file(path)
        .map_err(|error| anyhow!("{}", error))
        .with_context(|| format!("failed to parse {}", path.display()))?;

    println!(
        "{}: {} statements, parsed in {:?}",
        path.display(),
        module.len(),
        start.elapsed()
    );
    if cli.ast {
        for stmt in module.iter() {
            println!("{:#?}", stmt);
        }
    }
    Ok(())
}

fn dump_tokens(path: &Path) -> Result<()> {
    let mut lexer = Lexer::from_path(path).map_err(|error| anyhow!("{}", error))?;
    loop {
        let token = lexer.next_token().map_err(|error| anyhow!("{}", error))?;
        token.debug();
        if token.kind == TokenKind::EOF {
            return Ok(());
        }
    }
}
