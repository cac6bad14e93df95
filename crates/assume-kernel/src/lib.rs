//! # Assume Kernel
//!
//! Declarative assumptions over values that may be known, unknown, or
//! null. An assumption either confirms itself against a known value, is
//! recorded as a refinement on an unknown value, or fails because it
//! contradicts what is already known. It never produces a guarantee that
//! the eventual value could break.
//!
//! Every call is pure: immutable inputs in, a new value or an error out.
//!
//! ## Architecture
//!
//! ```text
//! Type                  ← static types and conversion
//!     │
//! Value                 ← Null | Known(payload) | Unknown(refinement)
//!     │
//! Refinement            ← not-null, string prefix, length bounds; merges
//!     │
//! check                 ← one checker per assumption kind
//!     │
//! catalog               ← function names, signatures, calls by name
//! ```

pub mod catalog;
pub mod check;
pub mod convert;
pub mod error;
pub mod kind;
pub mod refinement;
pub mod render;
pub mod ty;
pub mod value;

pub use catalog::{
    CallError, Case, Outcome, Signature, call, catalog, catalog_json, evaluate,
};
pub use check::apply_assumption;
pub use convert::convert;
pub use error::{AssumptionError, Contradiction, ErrorClass, ErrorReport};
pub use kind::{AssumptionKind, CollectionKind};
pub use refinement::{
    Refinement, RefinementBuilder, merge_length_bounds, merge_string_prefix, safe_prefix_boundary,
};
pub use render::simple_display;
pub use ty::Type;
pub use value::{Payload, Value, length_of};
