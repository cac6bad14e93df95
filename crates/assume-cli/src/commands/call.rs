use crate::support::{evaluate_or_exit, parse_arg_or_exit, report_outcome};
use assume_kernel::Case;

pub fn run(function: String, raw_args: Vec<String>, json_output: bool) {
    let args = raw_args
        .iter()
        .enumerate()
        .map(|(position, raw)| parse_arg_or_exit(raw, position))
        .collect();
    let case = Case { function, args };

    let outcome = evaluate_or_exit(&case);
    report_outcome("call", &case.function, &outcome, json_output);
}
