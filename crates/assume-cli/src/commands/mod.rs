pub mod call;
pub mod eval;
pub mod functions;
