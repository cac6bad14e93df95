use crate::support::{evaluate_or_exit, read_case_or_exit, report_outcome};
use tracing::debug;

pub fn run(case_path: String, json_output: bool) {
    let case = read_case_or_exit(&case_path);
    debug!(path = %case_path, function = %case.function, args = case.args.len(), "loaded case");

    let outcome = evaluate_or_exit(&case);
    report_outcome("eval", &case.function, &outcome, json_output);
}
