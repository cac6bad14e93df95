//! Refinements: what has been proven about an unknown value.
//!
//! A refinement only ever gets stronger. Every merge either returns a
//! refinement at least as strong as both inputs or a [`Contradiction`].
//!
//! Constraints are applied to values through [`RefinementBuilder`], which
//! treats each value state differently:
//!
//! - unknown: the constraint is merged into the refinement
//! - unknown of dynamic type: nothing happens
//! - known: the constraint is checked against the payload
//! - null: only a not-null constraint fails

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use unicode_normalization::{UnicodeNormalization, is_nfc};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::Contradiction;
use crate::ty::Type;
use crate::value::{Payload, Value, length_of};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Refinement {
    #[serde(default, skip_serializing_if = "is_false")]
    pub not_null: bool,

    /// A prefix the eventual string is guaranteed to start with. Never
    /// `Some("")`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_prefix: Option<String>,

    /// Element count bounds, inclusive. A lower bound of zero is stored as
    /// `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_lower: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_upper: Option<usize>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Refinement {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The strongest refinement a wholly-known value satisfies.
    ///
    /// Returns `None` for null, which no refinement can describe.
    pub fn implied_by(value: &Value) -> Option<Refinement> {
        match value {
            Value::Null { .. } => None,
            Value::Unknown { refinement, .. } => Some(refinement.clone()),
            Value::Known { payload, .. } => {
                let length = length_of(value);
                Some(Refinement {
                    not_null: true,
                    string_prefix: match payload {
                        Payload::String(s) if !s.is_empty() => Some(s.clone()),
                        _ => None,
                    },
                    length_lower: length.filter(|n| *n > 0),
                    length_upper: length,
                })
            }
        }
    }

    /// Combine two refinements of the same value.
    pub fn merge(&self, other: &Refinement) -> Result<Refinement, Contradiction> {
        let mut merged = self.clone();
        merged.not_null |= other.not_null;
        if let Some(prefix) = &other.string_prefix {
            merged.string_prefix =
                non_empty(merge_string_prefix(self.string_prefix.as_deref(), prefix)?);
        }
        let (lower, upper) = merge_length_bounds(self, other.length_lower, other.length_upper)?;
        merged.length_lower = lower;
        merged.length_upper = upper;
        Ok(merged)
    }

    /// Whether a known or null value is consistent with this refinement.
    pub fn admits(&self, value: &Value) -> bool {
        match value {
            Value::Null { .. } => !self.not_null,
            Value::Unknown { .. } => true,
            Value::Known { payload, .. } => {
                if let (Some(prefix), Payload::String(s)) = (&self.string_prefix, payload) {
                    if !nfc(s).starts_with(&*nfc(prefix)) {
                        return false;
                    }
                }
                match length_of(value) {
                    Some(n) => {
                        self.length_lower.is_none_or(|lower| n >= lower)
                            && self.length_upper.is_none_or(|upper| n <= upper)
                    }
                    None => true,
                }
            }
        }
    }

    /// Reject refinements whose facts make no sense for `ty`.
    pub fn check_applicable(&self, ty: &Type) -> Result<(), String> {
        if ty.is_dynamic() {
            return Ok(());
        }
        if self.string_prefix.is_some() && *ty != Type::String {
            return Err(format!("string prefix refinement on {ty}"));
        }
        let has_bounds = self.length_lower.is_some() || self.length_upper.is_some();
        if has_bounds && ty.collection_kind().is_none() {
            return Err(format!("length refinement on {ty}"));
        }
        if let (Some(lower), Some(upper)) = (self.length_lower, self.length_upper) {
            if lower > upper {
                return Err(format!("length range [{lower}, {upper}] is empty"));
            }
        }
        Ok(())
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Intersect the existing length range with `[lower, upper]`.
pub fn merge_length_bounds(
    old: &Refinement,
    lower: Option<usize>,
    upper: Option<usize>,
) -> Result<(Option<usize>, Option<usize>), Contradiction> {
    let lower = old.length_lower.max(lower).filter(|n| *n > 0);
    let upper = match (old.length_upper, upper) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };
    if let (Some(lower), Some(upper)) = (lower, upper) {
        if lower > upper {
            return Err(Contradiction::EmptyLengthRange { lower, upper });
        }
    }
    Ok((lower, upper))
}

/// The longer of two prefixes when one extends the other.
pub fn merge_string_prefix(old: Option<&str>, proposed: &str) -> Result<String, Contradiction> {
    let old = old.unwrap_or_default();
    if old.starts_with(proposed) {
        Ok(old.to_string())
    } else if proposed.starts_with(old) {
        Ok(proposed.to_string())
    } else {
        Err(Contradiction::PrefixMismatch {
            existing: old.to_string(),
            proposed: proposed.to_string(),
        })
    }
}

/// Trim `prefix` to what a longer string is still guaranteed to start with.
///
/// A character appended later can merge with the final grapheme cluster
/// (a combining accent after `o`, say), so the final cluster is dropped
/// unless it is a single character nothing can attach to.
pub fn safe_prefix_boundary(prefix: &str) -> String {
    let normalized = nfc(prefix).into_owned();
    match normalized.grapheme_indices(true).next_back() {
        Some((_, last)) if is_terminator(last) => normalized,
        Some((start, _)) => normalized[..start].to_string(),
        None => normalized,
    }
}

/// NFC form of `s`, borrowed when it is already composed.
fn nfc(s: &str) -> Cow<'_, str> {
    if is_nfc(s) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.nfc().collect())
    }
}

pub(crate) fn into_nfc(s: String) -> String {
    if is_nfc(&s) { s } else { s.nfc().collect() }
}

fn is_terminator(cluster: &str) -> bool {
    let mut chars = cluster.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.is_ascii_punctuation() || (c.is_control() && c != '\r'),
        _ => false,
    }
}

#[derive(Debug, Clone, Copy)]
enum Constraint<'a> {
    NotNull,
    Prefix(&'a str),
    LowerBound(usize),
    UpperBound(usize),
}

impl Constraint<'_> {
    fn name(self) -> &'static str {
        match self {
            Self::NotNull => "not-null",
            Self::Prefix(_) => "string prefix",
            Self::LowerBound(_) => "length lower bound",
            Self::UpperBound(_) => "length upper bound",
        }
    }
}

/// Accumulates constraints against one value. The first contradiction
/// sticks and later constraints are ignored.
#[derive(Debug)]
pub struct RefinementBuilder {
    value: Value,
    failure: Option<Contradiction>,
}

impl RefinementBuilder {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            failure: None,
        }
    }

    pub fn not_null(self) -> Self {
        self.constrain(Constraint::NotNull)
    }

    /// Assume a prefix, trimmed to a grapheme-safe boundary for unknown
    /// strings. Known strings are checked against the whole prefix.
    pub fn string_prefix(self, prefix: &str) -> Self {
        self.constrain(Constraint::Prefix(prefix))
    }

    pub fn length_lower_bound(self, bound: usize) -> Self {
        self.constrain(Constraint::LowerBound(bound))
    }

    pub fn length_upper_bound(self, bound: usize) -> Self {
        self.constrain(Constraint::UpperBound(bound))
    }

    pub fn finish(self) -> Result<Value, Contradiction> {
        match self.failure {
            Some(contradiction) => Err(contradiction),
            None => Ok(self.value),
        }
    }

    fn constrain(mut self, constraint: Constraint<'_>) -> Self {
        if self.failure.is_none() {
            if let Err(contradiction) = apply_constraint(&mut self.value, constraint) {
                self.failure = Some(contradiction);
            }
        }
        self
    }
}

fn apply_constraint(value: &mut Value, constraint: Constraint<'_>) -> Result<(), Contradiction> {
    match value {
        Value::Null { .. } => match constraint {
            Constraint::NotNull => Err(Contradiction::Null),
            _ => Ok(()),
        },
        Value::Unknown { ty, .. } if ty.is_dynamic() => Ok(()),
        Value::Unknown { ty, refinement } => refine_unknown(ty, refinement, constraint),
        Value::Known { ty, payload } => check_known(ty, payload, constraint),
    }
}

fn refine_unknown(
    ty: &Type,
    refinement: &mut Refinement,
    constraint: Constraint<'_>,
) -> Result<(), Contradiction> {
    let not_applicable = || Contradiction::NotApplicable {
        constraint: constraint.name(),
        ty: ty.to_string(),
    };
    match constraint {
        Constraint::NotNull => refinement.not_null = true,
        Constraint::Prefix(prefix) => {
            if *ty != Type::String {
                return Err(not_applicable());
            }
            let prefix = safe_prefix_boundary(prefix);
            let merged = merge_string_prefix(refinement.string_prefix.as_deref(), &prefix)?;
            refinement.string_prefix = non_empty(merged);
        }
        Constraint::LowerBound(bound) | Constraint::UpperBound(bound) => {
            if ty.collection_kind().is_none() {
                return Err(not_applicable());
            }
            let (lower, upper) = match constraint {
                Constraint::LowerBound(_) => (Some(bound), None),
                _ => (None, Some(bound)),
            };
            let (lower, upper) = merge_length_bounds(refinement, lower, upper)?;
            refinement.length_lower = lower;
            refinement.length_upper = upper;
        }
    }
    Ok(())
}

fn check_known(ty: &Type, payload: &Payload, constraint: Constraint<'_>) -> Result<(), Contradiction> {
    let holds = match (constraint, payload) {
        (Constraint::NotNull, _) => true,
        (Constraint::Prefix(prefix), Payload::String(s)) => nfc(s).starts_with(&*nfc(prefix)),
        (Constraint::LowerBound(bound), _) | (Constraint::UpperBound(bound), _) => {
            let Some(n) = payload_len(payload) else {
                return Err(Contradiction::NotApplicable {
                    constraint: constraint.name(),
                    ty: ty.to_string(),
                });
            };
            match constraint {
                Constraint::LowerBound(_) => n >= bound,
                _ => n <= bound,
            }
        }
        (Constraint::Prefix(_), _) => {
            return Err(Contradiction::NotApplicable {
                constraint: constraint.name(),
                ty: ty.to_string(),
            });
        }
    };
    if holds {
        Ok(())
    } else {
        Err(Contradiction::Unsatisfied {
            constraint: constraint.name(),
        })
    }
}

fn payload_len(payload: &Payload) -> Option<usize> {
    match payload {
        Payload::List(elems) | Payload::Set(elems) => Some(elems.len()),
        Payload::Map(entries) => Some(entries.len()),
        _ => None,
    }
}

impl Value {
    /// Apply constraints built by `build` to this value.
    ///
    /// ```
    /// use assume_kernel::{Type, Value};
    ///
    /// let refined = Value::unknown(Type::list(Type::String))
    ///     .refine(|b| b.not_null().length_lower_bound(1))
    ///     .unwrap();
    /// assert_eq!(refined.refinement().unwrap().length_lower, Some(1));
    /// ```
    pub fn refine<F>(self, build: F) -> Result<Value, Contradiction>
    where
        F: FnOnce(RefinementBuilder) -> RefinementBuilder,
    {
        build(RefinementBuilder::new(self)).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(lower: usize, upper: usize) -> Refinement {
        Refinement {
            length_lower: Some(lower),
            length_upper: Some(upper),
            ..Refinement::default()
        }
    }

    #[test]
    fn bound_intersection() {
        assert_eq!(
            merge_length_bounds(&bounds(1, 5), Some(3), Some(10)),
            Ok((Some(3), Some(5)))
        );
        assert_eq!(
            merge_length_bounds(&bounds(1, 2), Some(3), Some(4)),
            Err(Contradiction::EmptyLengthRange { lower: 3, upper: 2 })
        );
    }

    #[test]
    fn zero_lower_bound_is_vacuous() {
        let (lower, upper) = merge_length_bounds(&Refinement::default(), Some(0), None).unwrap();
        assert_eq!((lower, upper), (None, None));
    }

    #[test]
    fn prefix_merge() {
        assert_eq!(merge_string_prefix(Some("foo"), "foobar").unwrap(), "foobar");
        assert_eq!(merge_string_prefix(Some("foobar"), "foo").unwrap(), "foobar");
        assert_eq!(merge_string_prefix(None, "foo").unwrap(), "foo");
        assert!(merge_string_prefix(Some("foo"), "bar").is_err());
    }

    #[test]
    fn safe_prefix_drops_combinable_tail() {
        assert_eq!(safe_prefix_boundary("foo"), "fo");
        assert_eq!(safe_prefix_boundary("foo-"), "foo-");
        assert_eq!(safe_prefix_boundary("arn:"), "arn:");
        assert_eq!(safe_prefix_boundary("a"), "");
        assert_eq!(safe_prefix_boundary(""), "");
        assert_eq!(safe_prefix_boundary("line\n"), "line\n");
        assert_eq!(safe_prefix_boundary("crlf\r"), "crlf");
    }

    #[test]
    fn safe_prefix_normalizes_before_trimming() {
        // "e" followed by a combining acute accent composes to one cluster.
        assert_eq!(safe_prefix_boundary("cafe\u{301}"), "caf");
        assert_eq!(safe_prefix_boundary("cafe\u{301}."), "caf\u{e9}.");
    }

    #[test]
    fn not_null_is_idempotent() {
        let once = Value::unknown(Type::String).refine(|b| b.not_null()).unwrap();
        let twice = once.clone().refine(|b| b.not_null()).unwrap();
        assert_eq!(once, twice);
        assert!(twice.refinement().unwrap().not_null);
    }

    #[test]
    fn null_only_fails_not_null() {
        let null = Value::null(Type::String);
        assert_eq!(null.clone().refine(|b| b.not_null()), Err(Contradiction::Null));
        assert_eq!(null.clone().refine(|b| b.string_prefix("foo-")), Ok(null));
    }

    #[test]
    fn dynamic_passes_through() {
        let refined = Value::dynamic()
            .refine(|b| b.not_null().string_prefix("x").length_upper_bound(0))
            .unwrap();
        assert_eq!(refined, Value::dynamic());
    }

    #[test]
    fn inapplicable_constraint_on_unknown() {
        let err = Value::unknown(Type::Number)
            .refine(|b| b.string_prefix("1"))
            .unwrap_err();
        assert!(matches!(err, Contradiction::NotApplicable { .. }));
    }

    #[test]
    fn known_values_are_checked_directly() {
        let list = Value::list(Type::Bool, vec![Value::bool(true), Value::bool(true)]);
        assert!(list.clone().refine(|b| b.length_upper_bound(2)).is_ok());
        assert_eq!(
            list.refine(|b| b.length_upper_bound(1)),
            Err(Contradiction::Unsatisfied {
                constraint: "length upper bound"
            })
        );
    }

    #[test]
    fn first_contradiction_sticks() {
        let err = Value::unknown(Type::list(Type::String))
            .refine(|b| b.length_lower_bound(3).length_upper_bound(1).length_upper_bound(0))
            .unwrap_err();
        assert_eq!(err, Contradiction::EmptyLengthRange { lower: 3, upper: 1 });
    }

    #[test]
    fn implied_refinement_of_known_values() {
        let implied = Refinement::implied_by(&Value::string("hi")).unwrap();
        assert!(implied.not_null);
        assert_eq!(implied.string_prefix.as_deref(), Some("hi"));

        let empty = Refinement::implied_by(&Value::list(Type::String, vec![])).unwrap();
        assert_eq!((empty.length_lower, empty.length_upper), (None, Some(0)));

        assert!(Refinement::implied_by(&Value::null(Type::String)).is_none());
    }

    #[test]
    fn admits_checks_every_fact() {
        let r = Refinement {
            not_null: true,
            string_prefix: Some("arn:".into()),
            ..Refinement::default()
        };
        assert!(r.admits(&Value::string("arn:aws")));
        assert!(!r.admits(&Value::string("nope")));
        assert!(!r.admits(&Value::null(Type::String)));
    }
}
