//! Command-line front-end: test a file, stdin or a literal against a regex.
//!
//! Usage:
//!   brex [-a | -n | -c | -x] [-s | -l TEXT] <regex> [input-file]

use std::fs;
use std::io::Read;
use std::process::ExitCode;

use clap::{Arg, ArgAction, Command};

use brex::regex::{Executor, RegexCompiler};
use brex::syntax::parse_unicode_regex;

fn cli() -> Command {
    Command::new("brex")
        .about("Test inputs against a brex regex")
        .arg(
            Arg::new("regex")
                .required(true)
                .help("The regex to match against"),
        )
        .arg(Arg::new("input").help("The input file to match"))
        .arg(
            Arg::new("accepts")
                .short('a')
                .action(ArgAction::SetTrue)
                .conflicts_with_all(["line-numbers", "count", "whole-lines"])
                .help("Test if the regex accepts the whole input"),
        )
        .arg(
            Arg::new("line-numbers")
                .short('n')
                .action(ArgAction::SetTrue)
                .conflicts_with("count")
                .help("Include line numbers in the output"),
        )
        .arg(
            Arg::new("count")
                .short('c')
                .action(ArgAction::SetTrue)
                .help("Only report the match count"),
        )
        .arg(
            Arg::new("whole-lines")
                .short('x')
                .action(ArgAction::SetTrue)
                .help("Test whole lines instead of searching for a match"),
        )
        .arg(
            Arg::new("stdin")
                .short('s')
                .action(ArgAction::SetTrue)
                .conflicts_with_all(["literal", "input"])
                .help("Read input from stdin"),
        )
        .arg(
            Arg::new("literal")
                .short('l')
                .value_name("TEXT")
                .conflicts_with("input")
                .help("Use TEXT as the input"),
        )
}

fn load_input(matches: &clap::ArgMatches) -> Result<Vec<u8>, String> {
    if let Some(text) = matches.get_one::<String>("literal") {
        return Ok(text.clone().into_bytes());
    }
    if matches.get_flag("stdin") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|e| format!("error reading stdin: {e}"))?;
        return Ok(buf);
    }
    match matches.get_one::<String>("input") {
        Some(path) => fs::read(path).map_err(|e| format!("error reading {path}: {e}")),
        None => Err("no input specified; pass a file, -s or -l".to_string()),
    }
}

fn run_lines(executor: &Executor, input: &[u8], matches: &clap::ArgMatches) -> Result<(), String> {
    let whole_lines = matches.get_flag("whole-lines");
    let mut lines: Vec<&[u8]> = input.split(|&b| b == b'\n').collect();
    if input.last() == Some(&b'\n') {
        lines.pop();
    }
    let mut hits = Vec::new();
    for (no, line) in lines.into_iter().enumerate() {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let matched = if whole_lines {
            executor.test(line)
        } else {
            executor.search(line)
        }
        .map_err(|e| format!("line {}: {e}", no + 1))?;
        if matched {
            hits.push((no + 1, line.to_vec()));
        }
    }

    if matches.get_flag("count") {
        println!("{}", hits.len());
        return Ok(());
    }
    let numbered = matches.get_flag("line-numbers");
    for (no, line) in hits {
        let line = String::from_utf8_lossy(&line);
        if numbered {
            println!("{no}: {line}");
        } else {
            println!("{line}");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let matches = match cli().try_get_matches() {
        Ok(m) => m,
        Err(e) => {
            // -h / -V land here too, with a zero exit.
            if e.use_stderr() {
                eprintln!("{e}");
                return ExitCode::from(1);
            }
            print!("{e}");
            return ExitCode::SUCCESS;
        }
    };

    let source = matches.get_one::<String>("regex").expect("required arg");
    let (re, diags) = parse_unicode_regex(source);
    if !diags.is_empty() || re.is_none() {
        eprintln!("Invalid regex");
        for d in diags {
            eprintln!("{d}");
        }
        return ExitCode::from(1);
    }

    let executor = match RegexCompiler::compile(&re.expect("checked above")) {
        Ok(e) => e,
        Err(errors) => {
            eprintln!("Error compiling regex");
            for e in errors {
                eprintln!("{e}");
            }
            return ExitCode::from(1);
        }
    };

    let input = match load_input(&matches) {
        Ok(i) => i,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::from(1);
        }
    };

    if matches.get_flag("accepts") {
        match executor.test(&input) {
            Ok(true) => println!("Accepted"),
            Ok(false) => println!("Rejected"),
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::from(1);
            }
        }
        return ExitCode::SUCCESS;
    }

    match run_lines(&executor, &input, &matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::from(1)
        }
    }
}
