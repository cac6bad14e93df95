use assume_kernel::{Case, Outcome, Value, evaluate, simple_display};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Exit code for malformed input: unreadable files, bad JSON, unknown functions.
pub const EXIT_INPUT: i32 = 2;
/// Exit code when the assumption itself failed.
pub const EXIT_FAILED: i32 = 1;

pub fn read_case_or_exit(path: &str) -> Case {
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error: failed to read case at {path}: {e}");
        std::process::exit(EXIT_INPUT);
    });
    let is_toml = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let parsed = if is_toml {
        toml::from_str::<Case>(&text).map_err(|e| e.to_string())
    } else {
        serde_json::from_str::<Case>(&text).map_err(|e| e.to_string())
    };
    parsed.unwrap_or_else(|e| {
        let format = if is_toml { "TOML" } else { "JSON" };
        eprintln!("error: failed to parse case {format} at {path}: {e}");
        std::process::exit(EXIT_INPUT);
    })
}

pub fn parse_arg_or_exit(raw: &str, position: usize) -> Value {
    serde_json::from_str::<Value>(raw).unwrap_or_else(|e| {
        eprintln!("error: failed to parse argument {position} as a value: {e}");
        std::process::exit(EXIT_INPUT);
    })
}

pub fn evaluate_or_exit(case: &Case) -> Outcome {
    evaluate(case).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_INPUT);
    })
}

pub fn print_json_or_exit<T: Serialize>(payload: &T, label: &str) {
    let rendered = serde_json::to_string_pretty(payload).unwrap_or_else(|e| {
        eprintln!("error: failed to render {label} json: {e}");
        std::process::exit(EXIT_INPUT);
    });
    println!("{rendered}");
}

/// Print an outcome and exit with [`EXIT_FAILED`] if the assumption failed.
pub fn report_outcome(command: &str, function: &str, outcome: &Outcome, json_output: bool) {
    if json_output {
        print_json_or_exit(outcome, "outcome");
    } else {
        println!("assume {command}");
        println!("  Function: {function}");
        match outcome {
            Outcome::Ok(value) => {
                println!("  Outcome: ok");
                println!("  Value: {}", describe_value(value));
                if let Some(refinement) = value.refinement().filter(|r| !r.is_empty()) {
                    let rendered = serde_json::to_string(refinement)
                        .unwrap_or_else(|_| "<unrenderable>".to_string());
                    println!("  Refinement: {rendered}");
                }
            }
            Outcome::Error(report) => {
                println!("  Outcome: error");
                println!("  Class: {}", report.class);
                println!("  Position: {}", report.position);
                println!("  Message: {}", report.message);
            }
        }
    }

    if !outcome.is_ok() {
        std::process::exit(EXIT_FAILED);
    }
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::Unknown { ty, .. } => format!("unknown {ty}"),
        _ => simple_display(value).unwrap_or_else(|| format!("known {}", value.ty())),
    }
}
