use std::io::stdout;

use colored::Colorize;
use lang_rs::{run, RunOptions, SourceReference};
use miette::{IntoDiagnostic, Report, Result};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: lang-rs [--tokens] [--ast] [-e <source>] [file ...]";

enum Input {
    Inline(String),
    File(String),
}

struct Args {
    options: RunOptions,
    inputs: Vec<Input>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LANG_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(unrecognized) => {
            eprintln!("Unrecognized arguments: {:?}", unrecognized);
            eprintln!("{}", USAGE.bold());
            std::process::exit(1);
        }
    };
    if args.inputs.is_empty() {
        println!("{}", USAGE);
        return Ok(());
    }

    let source_reference = load(&args.inputs)?;
    let mut stdout = stdout();
    if let Err(err) = run(source_reference.clone(), args.options, &mut stdout) {
        tracing::debug!(summary = %err.summary(&source_reference), "run failed");
        let exit_code = if err.is_static() { 65 } else { 70 };
        eprintln!("{:?}", Report::new(err));
        std::process::exit(exit_code);
    }

    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, Vec<String>> {
    let mut options = RunOptions::default();
    let mut inputs = Vec::new();
    let mut unrecognized = Vec::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--tokens" => options.dump_tokens = true,
            "--ast" => options.dump_ast = true,
            "-e" => match args.next() {
                Some(source) => inputs.push(Input::Inline(source)),
                None => unrecognized.push(arg),
            },
            flag if flag.starts_with('-') => unrecognized.push(arg),
            _ => inputs.push(Input::File(arg)),
        }
    }
    if unrecognized.is_empty() {
        Ok(Args { options, inputs })
    } else {
        Err(unrecognized)
    }
}

/// All inputs joined into one program, in command line order.
fn load(inputs: &[Input]) -> Result<SourceReference> {
    let mut names = Vec::new();
    let mut sources = Vec::new();
    for input in inputs {
        match input {
            Input::Inline(source) => {
                names.push("<inline>".to_string());
                sources.push(source.clone());
            }
            Input::File(file_name) => {
                let path = std::fs::canonicalize(file_name).into_diagnostic()?;
                sources.push(std::fs::read_to_string(&path).into_diagnostic()?);
                names.push(path.to_string_lossy().to_string());
            }
        }
    }
    Ok(SourceReference::concatenate(
        names.join("+"),
        sources.iter().map(String::as_str),
    ))
}
