//! Assumption checkers.
//!
//! Every checker validates its parameters first, then either evaluates the
//! assumption directly against a known value or merges it into an unknown
//! value's refinement. Contradictions from the value model stop here and
//! become [`AssumptionError::Violated`].
//!
//! Positions in errors count the value under assumption as argument 0, so
//! the n-th parameter (zero-based) is reported at position n + 1.

use tracing::{debug, trace};

use crate::convert::convert;
use crate::error::{AssumptionError, Contradiction};
use crate::kind::AssumptionKind;
use crate::refinement::{Refinement, RefinementBuilder};
use crate::render::simple_display;
use crate::value::{Payload, Value};

/// Apply one assumption to `value`.
///
/// `params` are the assumption's own arguments, not including `value`.
pub fn apply_assumption(
    kind: AssumptionKind,
    value: Value,
    params: &[Value],
) -> Result<Value, AssumptionError> {
    debug!(%kind, ty = %value.ty(), known = value.is_known(), "applying assumption");

    check_arity(kind, params)?;
    let result = match kind {
        AssumptionKind::NotNull => check_not_null(value),
        AssumptionKind::Equal => check_equal(value, &params[0]),
        AssumptionKind::StringPrefix => check_string_prefix(value, &params[0]),
        AssumptionKind::CollectionLengthBounds(_) => {
            check_length_bounds(value, &params[0], &params[1])
        }
        AssumptionKind::CollectionLengthLowerBound(_) => {
            check_length_lower_bound(value, &params[0])
        }
        AssumptionKind::CollectionLengthUpperBound(_) => {
            check_length_upper_bound(value, &params[0])
        }
    };

    if let Err(err) = &result {
        debug!(%kind, position = err.position(), error = %err, "assumption rejected");
    }
    result
}

fn check_arity(kind: AssumptionKind, params: &[Value]) -> Result<(), AssumptionError> {
    let expected = kind.param_count();
    if params.len() == expected {
        return Ok(());
    }
    let noun = if expected == 1 { "parameter" } else { "parameters" };
    Err(AssumptionError::parameter(
        params.len().min(expected) + 1,
        format!("{kind} expects {expected} {noun}, got {}", params.len()),
    ))
}

pub fn check_not_null(value: Value) -> Result<Value, AssumptionError> {
    refine_or_not_upheld(value, |b| b.not_null())
}

pub fn check_string_prefix(value: Value, prefix: &Value) -> Result<Value, AssumptionError> {
    let prefix = string_param(prefix, 0)?;
    refine_or_not_upheld(value, |b| b.string_prefix(prefix))
}

pub fn check_length_bounds(
    value: Value,
    lower: &Value,
    upper: &Value,
) -> Result<Value, AssumptionError> {
    let lower = length_bound_param(lower, 0)?;
    let upper = length_bound_param(upper, 1)?;
    refine_or_not_upheld(value, |b| b.length_lower_bound(lower).length_upper_bound(upper))
}

pub fn check_length_lower_bound(value: Value, bound: &Value) -> Result<Value, AssumptionError> {
    let bound = length_bound_param(bound, 0)?;
    refine_or_not_upheld(value, |b| b.length_lower_bound(bound))
}

pub fn check_length_upper_bound(value: Value, bound: &Value) -> Result<Value, AssumptionError> {
    let bound = length_bound_param(bound, 0)?;
    refine_or_not_upheld(value, |b| b.length_upper_bound(bound))
}

/// Assume `value` equals `assumed`.
///
/// On success the result is always `assumed` itself, so a value that was
/// unknown and a value that was already known and equal come out the same.
pub fn check_equal(value: Value, assumed: &Value) -> Result<Value, AssumptionError> {
    if !assumed.is_wholly_known() {
        return Err(AssumptionError::parameter(
            1,
            "the assumed value must be fully known",
        ));
    }

    let Some(actual) = convert(&value, assumed.ty()) else {
        return Err(AssumptionError::TypeMismatch {
            position: 0,
            actual: value.ty().to_string(),
            assumed: assumed.ty().to_string(),
        });
    };

    let verdict = match &actual {
        Value::Unknown { refinement, .. } => merge_implied(refinement, assumed).map(|_| ()),
        _ => match actual.equals(assumed) {
            Some(false) => Err(Contradiction::Unsatisfied {
                constraint: "equality",
            }),
            Some(true) | None => Ok(()),
        },
    };

    match verdict {
        Ok(()) => Ok(assumed.clone()),
        Err(cause) => {
            trace!(%cause, "equality contradicted");
            let message = match simple_display(&value) {
                Some(shown) => format!("the actual value {shown} does not match the assumed value"),
                None => "the actual value does not match the assumed value".to_string(),
            };
            Err(AssumptionError::Violated {
                position: 0,
                message,
                cause: Some(cause),
            })
        }
    }
}

/// Merge everything `assumed` implies into what is known about the
/// unknown side of an equality.
///
/// This catches early only what the refinement can express. An unknown
/// value that passes may still turn out unequal once it is known.
fn merge_implied(refinement: &Refinement, assumed: &Value) -> Result<Refinement, Contradiction> {
    let Some(implied) = Refinement::implied_by(assumed) else {
        // The assumed value is null.
        return if refinement.not_null {
            Err(Contradiction::Null)
        } else {
            Ok(refinement.clone())
        };
    };
    let merged = refinement.merge(&implied)?;
    // The assumed string is complete, so a known prefix may not run past it.
    if merged.string_prefix != implied.string_prefix && assumed.as_str().is_some() {
        return Err(Contradiction::PrefixMismatch {
            existing: refinement.string_prefix.clone().unwrap_or_default(),
            proposed: implied.string_prefix.unwrap_or_default(),
        });
    }
    Ok(merged)
}

fn refine_or_not_upheld<F>(value: Value, build: F) -> Result<Value, AssumptionError>
where
    F: FnOnce(RefinementBuilder) -> RefinementBuilder,
{
    value.refine(build).map_err(|cause| {
        trace!(%cause, "refinement contradicted");
        AssumptionError::not_upheld(cause)
    })
}

fn known_param(param: &Value, index: usize) -> Result<&Value, AssumptionError> {
    if param.is_known() {
        Ok(param)
    } else {
        Err(AssumptionError::parameter(index + 1, "must be known"))
    }
}

fn string_param(param: &Value, index: usize) -> Result<&str, AssumptionError> {
    known_param(param, index)?
        .as_str()
        .ok_or_else(|| AssumptionError::parameter(index + 1, "must be a string"))
}

/// A length bound must be a whole number in `[0, usize::MAX)`.
fn length_bound_param(param: &Value, index: usize) -> Result<usize, AssumptionError> {
    let param = known_param(param, index)?;
    match param {
        Value::Known {
            payload: Payload::Number(n),
            ..
        } if n.fract() == 0.0 && *n >= 0.0 && *n < usize::MAX as f64 => Ok(*n as usize),
        _ => Err(AssumptionError::parameter(
            index + 1,
            format!("must be a whole number between 0 and {}", usize::MAX),
        )),
    }
}
