use std::env;
use std::process::{Command, ExitCode};

fn print_usage() {
    eprintln!(
        "Usage:
  cargo run --bin xtask -- precommit [--locked]
  cargo run --bin xtask -- ci [--locked]"
    );
}

fn run_step(program: &str, args: &[String]) -> Result<(), String> {
    eprintln!("+ {program} {}", args.join(" "));
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|error| format!("Failed to run `{program}`: {error}"))?;

    if !status.success() {
        return Err(format!(
            "Command `{program} {}` exited with status {status}",
            args.join(" ")
        ));
    }
    Ok(())
}

/// `--locked` goes before any `--` separator so cargo, not the test harness, sees it.
fn cargo_step(args: &[&str], locked: bool) -> Vec<String> {
    let mut out: Vec<String> = args.iter().map(ToString::to_string).collect();
    if locked {
        let at = args.iter().position(|a| *a == "--").unwrap_or(args.len());
        out.insert(at, "--locked".to_string());
    }
    out
}

fn precommit_steps(locked: bool) -> Vec<Vec<String>> {
    vec![
        cargo_step(&["fmt", "--all", "--", "--check"], false),
        cargo_step(&["clippy", "--all-targets", "--", "-D", "warnings"], locked),
        cargo_step(&["test", "--lib", "--tests"], locked),
    ]
}

fn ci_steps(locked: bool) -> Vec<Vec<String>> {
    let mut steps = precommit_steps(locked);
    steps.push(cargo_step(&["test", "--doc"], locked));
    steps
}

fn run_steps(steps: &[Vec<String>]) -> Result<(), String> {
    steps.iter().try_for_each(|step| run_step("cargo", step))
}

fn parse_locked(rest: &[String]) -> Result<bool, ExitCode> {
    let mut locked = false;
    for flag in rest {
        if flag != "--locked" {
            eprintln!("Unknown option: {flag}");
            print_usage();
            return Err(ExitCode::from(2));
        }
        locked = true;
    }
    Ok(locked)
}

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        print_usage();
        return ExitCode::from(2);
    };
    let rest: Vec<String> = args.collect();

    let steps = match command.as_str() {
        "precommit" => match parse_locked(&rest) {
            Ok(locked) => precommit_steps(locked),
            Err(code) => return code,
        },
        "ci" => match parse_locked(&rest) {
            Ok(locked) => ci_steps(locked),
            Err(code) => return code,
        },
        _ => {
            eprintln!("Unknown command: {command}");
            print_usage();
            return ExitCode::from(2);
        }
    };

    match run_steps(&steps) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::from(1)
        }
    }
}
