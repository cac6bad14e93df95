//! Error types for assumption checking.
//!
//! Two layers: [`Contradiction`] is the local signal raised by the value
//! model when a constraint cannot hold, and [`AssumptionError`] is what a
//! caller of [`crate::apply_assumption`] sees.

use serde::{Deserialize, Serialize};

/// Message used for every violated constraint-class assumption.
pub const NOT_UPHELD: &str = "assumption was not upheld";

/// A proposed constraint conflicts with what is already known.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Contradiction {
    /// The value is null but was required to be non-null.
    #[error("value is null")]
    Null,

    /// Intersecting two length ranges left nothing.
    #[error("length range [{lower}, {upper}] is empty")]
    EmptyLengthRange { lower: usize, upper: usize },

    /// Two string prefixes disagree on a shared character.
    #[error("prefix {proposed:?} is incompatible with known prefix {existing:?}")]
    PrefixMismatch { existing: String, proposed: String },

    /// A known value does not satisfy the constraint.
    #[error("known value does not satisfy {constraint}")]
    Unsatisfied { constraint: &'static str },

    /// The constraint has no meaning for values of this type.
    #[error("{constraint} is not applicable to {ty}")]
    NotApplicable { constraint: &'static str, ty: String },
}

/// Caller-facing failure of an assumption check.
///
/// `Display` renders only the message; the argument position is carried
/// separately for diagnostics, with 0 being the value under assumption and
/// `n` the n-th assumption parameter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssumptionError {
    /// A malformed or out-of-domain assumption parameter.
    #[error("{message}")]
    Parameter { position: usize, message: String },

    /// The value's type cannot convert to the assumed value's type.
    #[error("actual value type {actual} does not match assumed value type {assumed}")]
    TypeMismatch {
        position: usize,
        actual: String,
        assumed: String,
    },

    /// The value, or what is known about it, contradicts the assumption.
    #[error("{message}")]
    Violated {
        position: usize,
        message: String,
        cause: Option<Contradiction>,
    },
}

/// Classification of an [`AssumptionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    Parameter,
    TypeMismatch,
    Violated,
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Parameter => "parameter",
            Self::TypeMismatch => "type_mismatch",
            Self::Violated => "violated",
        })
    }
}

impl AssumptionError {
    pub fn parameter(position: usize, message: impl Into<String>) -> Self {
        Self::Parameter {
            position,
            message: message.into(),
        }
    }

    /// The "not upheld" failure for constraint-class assumptions.
    pub fn not_upheld(cause: Contradiction) -> Self {
        Self::Violated {
            position: 0,
            message: NOT_UPHELD.to_string(),
            cause: Some(cause),
        }
    }

    /// Which argument is at fault.
    pub fn position(&self) -> usize {
        match self {
            Self::Parameter { position, .. }
            | Self::TypeMismatch { position, .. }
            | Self::Violated { position, .. } => *position,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Parameter { .. } => ErrorClass::Parameter,
            Self::TypeMismatch { .. } => ErrorClass::TypeMismatch,
            Self::Violated { .. } => ErrorClass::Violated,
        }
    }
}

/// Serializable form of an [`AssumptionError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub class: ErrorClass,
    pub position: usize,
    pub message: String,
}

impl From<&AssumptionError> for ErrorReport {
    fn from(err: &AssumptionError) -> Self {
        Self {
            class: err.class(),
            position: err.position(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_message_only() {
        let err = AssumptionError::not_upheld(Contradiction::Null);
        assert_eq!(err.to_string(), NOT_UPHELD);
        assert_eq!(err.position(), 0);
        assert_eq!(err.class(), ErrorClass::Violated);
    }

    #[test]
    fn type_mismatch_message() {
        let err = AssumptionError::TypeMismatch {
            position: 0,
            actual: "list of string".into(),
            assumed: "string".into(),
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"actual value type list of string does not match assumed value type string"
        );
    }
}
