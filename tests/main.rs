use std::{
    fs,
    path::{Path, PathBuf},
};

use colored::Colorize;
use itertools::{EitherOrBoth, Itertools};
use lazy_static::lazy_static;
use libtest_mimic::{self, run_tests, Arguments, Outcome, Test};
use lang_rs::{run, RunOptions, SourceReference};
use miette::{miette, IntoDiagnostic, Result};
use regex::Regex;

fn main() {
    let tests = read_all_files("test_fixtures".to_string().into())
        .unwrap()
        .into_iter()
        .filter(|path| path.extension().map_or(false, |ext| ext == "lang"))
        .map(|path| Test {
            name: path.to_string_lossy().into(),
            kind: "treewalk".into(),
            is_bench: false,
            is_ignored: false,
            data: path,
        })
        .collect::<Vec<_>>();

    run_tests(&Arguments::from_args(), tests, |test| {
        match run_test(&test.data) {
            Ok(outcome) => outcome,
            Err(err) => Outcome::Failed {
                msg: Some(format!("{:?}", err)),
            },
        }
    })
    .exit();
}

lazy_static! {
    static ref EXPECTED_OUTPUT_RE: Regex = Regex::new("// expect: (.*)\n?").unwrap();
    static ref EXPECTED_ERROR_RE: Regex =
        Regex::new("// (TokenizerError|ParserError|ResolverError|RuntimeError):(.*)\n?").unwrap();
}

fn run_test(path: &Path) -> Result<Outcome> {
    let test_source = fs::read_to_string(path).into_diagnostic()?;
    let source_reference =
        SourceReference::new(path.to_string_lossy().to_string(), test_source.clone());

    let expected_output = EXPECTED_OUTPUT_RE
        .captures_iter(&test_source)
        .map(|captures| format!("{}\n", &captures[1]))
        .collect::<String>();

    let expected_error = EXPECTED_ERROR_RE
        .captures_iter(&test_source)
        .map(|captures| format!("{}:{}", &captures[1], &captures[2]))
        .at_most_one()
        .map_err(|_| miette!("should have at most one expected error"))?;

    let mut output = Vec::new();
    let result = run(source_reference.clone(), RunOptions::default(), &mut output);

    match (result, &expected_error) {
        (Ok(()), None) => {}
        (Ok(()), Some(expected)) => {
            return Ok(Outcome::Failed {
                msg: Some(format!("Expected error:\n{}", expected)),
            })
        }
        (Err(err), expected) => {
            if let Err(msg) = match_errors(&err.summary(&source_reference), expected) {
                return Ok(Outcome::Failed { msg: Some(msg) });
            }
        }
    }

    Ok(compare_outputs(
        &expected_output,
        &String::from_utf8_lossy(&output),
    ))
}

/// An expectation matches when it is a prefix of the actual summary, so a
/// fixture can pin just the stage, or the stage and kind, when the rest is
/// incidental.
fn match_errors(actual: &str, expected: &Option<String>) -> Result<(), String> {
    match expected {
        Some(expected) if actual.starts_with(expected.trim()) => Ok(()),
        Some(expected) => Err(format!(
            "Errors do not match.\nExpected: {}\n  Actual: {}",
            expected.trim(),
            actual
        )),
        None => Err(format!("Unexpected error:\n{}", actual)),
    }
}

fn compare_outputs(expected: &str, actual: &str) -> Outcome {
    const NONE: &str = "<None>";

    let width = |text: &str, label: &str| {
        text.lines()
            .map(str::len)
            .chain([label.len(), NONE.len()])
            .max()
            .unwrap_or_default()
    };
    let expected_width = width(expected, "expected");
    let actual_width = width(actual, "actual");

    let mut table = format!(
        "   | {:expected_width$} | {:actual_width$}\n",
        "expected".bold(),
        "actual".bold()
    );
    let mut mismatches = 0;
    for pair in expected.lines().zip_longest(actual.lines()) {
        let (expected_line, actual_line) = match pair {
            EitherOrBoth::Both(expected, actual) => (Some(expected), Some(actual)),
            EitherOrBoth::Left(expected) => (Some(expected), None),
            EitherOrBoth::Right(actual) => (None, Some(actual)),
        };
        let matched = expected_line == actual_line;
        if !matched {
            mismatches += 1;
        }
        let paint = |line: Option<&str>| match line {
            Some(line) if matched => line.green(),
            Some(line) => line.red(),
            None => NONE.dimmed(),
        };
        table.push_str(&format!(
            " {} | {:expected_width$} | {:actual_width$}\n",
            if matched { "✓".green() } else { "✗".red() },
            paint(expected_line),
            paint(actual_line),
        ));
    }

    match mismatches {
        0 => Outcome::Passed,
        _ => Outcome::Failed { msg: Some(table) },
    }
}

fn read_all_files(prefix: PathBuf) -> Result<Vec<PathBuf>> {
    let mut results = Vec::<PathBuf>::new();
    read_children(prefix, &mut results)?;
    results.sort();
    return Ok(results);

    fn read_children(prefix: PathBuf, results: &mut Vec<PathBuf>) -> Result<()> {
        for entry in fs::read_dir(prefix).into_diagnostic()? {
            let entry = entry.into_diagnostic()?;
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            if entry.file_type().into_diagnostic()?.is_dir() {
                read_children(entry.path(), results)?;
            } else {
                results.push(entry.path())
            }
        }
        Ok(())
    }
}
