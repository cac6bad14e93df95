//! Function catalog: assumption signatures and calls by name.
//!
//! This is the surface a host uses when it only has a function name and a
//! list of argument values. [`call`] resolves the name, checks arity,
//! converts arguments to the declared parameter types, and then hands off
//! to [`apply_assumption`].

use serde::{Deserialize, Serialize};
use serde_json::{Value as Json, json};

use crate::check::apply_assumption;
use crate::convert::convert;
use crate::error::{AssumptionError, ErrorReport};
use crate::kind::{AssumptionKind, CollectionKind};
use crate::ty::Type;
use crate::value::Value;

pub const CATALOG_KIND: &str = "assume.function_catalog.v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Param {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: Type,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub name: String,
    pub description: String,
    /// Declared type of the value argument. `Dynamic` accepts anything;
    /// a collection of `Dynamic` accepts that collection of any element.
    pub value_type: Type,
    pub params: Vec<Param>,
}

impl AssumptionKind {
    pub fn signature(self) -> Signature {
        let value_param = Param {
            name: "value",
            ty: Type::Dynamic,
            description: "The value to make the assumption about.".to_string(),
        };
        let (description, value_type, params) = match self {
            Self::NotNull => (
                "Assume that the given value will never be null.".to_string(),
                Type::Dynamic,
                vec![],
            ),
            Self::Equal => (
                "Assume that the first given value will equal the second given value."
                    .to_string(),
                Type::Dynamic,
                vec![Param {
                    name: "assumed_value",
                    ty: Type::Dynamic,
                    description: "The value that the first argument is assumed to match."
                        .to_string(),
                }],
            ),
            Self::StringPrefix => (
                "Assume that the given string will always have a fixed prefix.".to_string(),
                Type::String,
                vec![Param {
                    name: "prefix",
                    ty: Type::String,
                    description: "The prefix to assume.".to_string(),
                }],
            ),
            Self::CollectionLengthBounds(kind) => (
                format!("Assume that the given {kind} will have a length in the given bounds."),
                collection_type(kind),
                vec![min_length(kind), max_length(kind)],
            ),
            Self::CollectionLengthLowerBound(kind) => (
                format!(
                    "Assume that the given {kind} will have a length of at least the given number."
                ),
                collection_type(kind),
                vec![min_length(kind)],
            ),
            Self::CollectionLengthUpperBound(kind) => (
                format!(
                    "Assume that the given {kind} will have a length of at most the given number."
                ),
                collection_type(kind),
                vec![max_length(kind)],
            ),
        };
        Signature {
            name: self.name(),
            description,
            value_type: value_type.clone(),
            params: std::iter::once(Param {
                ty: value_type,
                ..value_param
            })
            .chain(params)
            .collect(),
        }
    }
}

fn collection_type(kind: CollectionKind) -> Type {
    match kind {
        CollectionKind::List => Type::list(Type::Dynamic),
        CollectionKind::Set => Type::set(Type::Dynamic),
        CollectionKind::Map => Type::map(Type::Dynamic),
    }
}

fn min_length(kind: CollectionKind) -> Param {
    Param {
        name: "min_length",
        ty: Type::Number,
        description: format!("The minimum possible {kind} length."),
    }
}

fn max_length(kind: CollectionKind) -> Param {
    Param {
        name: "max_length",
        ty: Type::Number,
        description: format!("The maximum possible {kind} length."),
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CallError {
    #[error("unknown assumption function: {0}")]
    UnknownFunction(String),

    #[error(transparent)]
    Assumption(#[from] AssumptionError),
}

/// Call an assumption by function name with all arguments, value first.
///
/// Arguments are brought to canonical form first (see
/// [`Value::canonical`]), so deserialized input behaves like values built
/// through the constructors.
pub fn call(function: &str, args: Vec<Value>) -> Result<Value, CallError> {
    let kind: AssumptionKind = function
        .parse()
        .map_err(|_| CallError::UnknownFunction(function.to_string()))?;
    let signature = kind.signature();

    if args.len() != signature.params.len() {
        let expected = signature.params.len();
        return Err(AssumptionError::parameter(
            args.len().min(expected),
            format!("{function} expects {expected} arguments, got {}", args.len()),
        )
        .into());
    }

    let mut conformed = Vec::with_capacity(args.len());
    for (position, (arg, param)) in args.into_iter().zip(&signature.params).enumerate() {
        arg.check_well_typed()
            .map_err(|message| AssumptionError::parameter(position, message))?;
        conformed.push(conform(arg.canonical(), &param.ty, position)?);
    }

    let mut args = conformed.into_iter();
    let value = args
        .next()
        .ok_or_else(|| AssumptionError::parameter(0, "missing value argument"))?;
    let params: Vec<Value> = args.collect();
    Ok(apply_assumption(kind, value, &params)?)
}

/// Bring an argument to its declared type, as a host would before calling.
fn conform(arg: Value, declared: &Type, position: usize) -> Result<Value, AssumptionError> {
    if accepts(declared, arg.ty()) {
        return Ok(arg);
    }
    if !contains_dynamic(declared) {
        if let Some(converted) = convert(&arg, declared) {
            return Ok(converted);
        }
    }
    Err(AssumptionError::parameter(
        position,
        format!("{} required", describe(declared)),
    ))
}

fn accepts(declared: &Type, actual: &Type) -> bool {
    match (declared, actual) {
        (Type::Dynamic, _) | (_, Type::Dynamic) => true,
        (Type::List(d), Type::List(a)) | (Type::Set(d), Type::Set(a)) | (Type::Map(d), Type::Map(a)) => {
            accepts(d, a)
        }
        _ => declared == actual,
    }
}

fn contains_dynamic(ty: &Type) -> bool {
    match ty {
        Type::Dynamic => true,
        Type::List(t) | Type::Set(t) | Type::Map(t) => contains_dynamic(t),
        Type::Object(attrs) => attrs.values().any(contains_dynamic),
        Type::Tuple(elems) => elems.iter().any(contains_dynamic),
        Type::String | Type::Number | Type::Bool => false,
    }
}

fn describe(ty: &Type) -> String {
    match ty {
        Type::List(t) | Type::Set(t) | Type::Map(t) if t.is_dynamic() => ty
            .collection_kind()
            .map(|kind| kind.noun().to_string())
            .unwrap_or_else(|| ty.to_string()),
        _ => ty.to_string(),
    }
}

/// A serialized call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub function: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

/// The result of evaluating a [`Case`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ok(Value),
    Error(ErrorReport),
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

/// Evaluate a case. Only an unresolvable function name is an `Err`; every
/// assumption failure is reported in the [`Outcome`].
pub fn evaluate(case: &Case) -> Result<Outcome, CallError> {
    match call(&case.function, case.args.clone()) {
        Ok(value) => Ok(Outcome::Ok(value)),
        Err(CallError::Assumption(err)) => Ok(Outcome::Error(ErrorReport::from(&err))),
        Err(err) => Err(err),
    }
}

pub fn catalog() -> Vec<Signature> {
    AssumptionKind::ALL.iter().map(|kind| kind.signature()).collect()
}

pub fn catalog_json() -> Json {
    json!({
        "schema": 1,
        "catalogKind": CATALOG_KIND,
        "functions": catalog(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;

    #[test]
    fn every_kind_has_a_signature() {
        for kind in AssumptionKind::ALL {
            let sig = kind.signature();
            assert_eq!(sig.params.len(), kind.param_count() + 1);
            assert_eq!(sig.params[0].name, "value");
            assert_eq!(sig.name, kind.name());
        }
    }

    #[test]
    fn call_by_name() {
        let got = call(
            "listlength",
            vec![
                Value::list(Type::String, vec![Value::string("a")]),
                Value::number(1.0),
                Value::number(2.0),
            ],
        )
        .unwrap();
        assert_eq!(got, Value::list(Type::String, vec![Value::string("a")]));
    }

    #[test]
    fn call_unknown_function() {
        let err = call("listlengthavg", vec![]).unwrap_err();
        assert_eq!(err, CallError::UnknownFunction("listlengthavg".into()));
    }

    #[test]
    fn call_checks_arity() {
        let CallError::Assumption(err) = call("notnull", vec![]).unwrap_err() else {
            panic!("expected an assumption error");
        };
        assert_eq!(err.class(), ErrorClass::Parameter);
        assert_eq!(err.position(), 0);
    }

    #[test]
    fn call_converts_declared_parameters() {
        let got = call(
            "listlengthmin",
            vec![Value::unknown(Type::list(Type::Bool)), Value::string("3")],
        )
        .unwrap();
        assert_eq!(got.refinement().unwrap().length_lower, Some(3));
    }

    #[test]
    fn call_rejects_wrong_collection() {
        let CallError::Assumption(err) = call(
            "setlength",
            vec![Value::string("x"), Value::number(0.0), Value::number(1.0)],
        )
        .unwrap_err() else {
            panic!("expected an assumption error");
        };
        assert_eq!(err.to_string(), "set required");
        assert_eq!(err.position(), 0);
    }

    fn raw_string(s: &str) -> Value {
        Value::Known {
            ty: Type::String,
            payload: crate::value::Payload::String(s.into()),
        }
    }

    #[test]
    fn decomposed_prefix_agrees_between_known_and_unknown() {
        let known = call(
            "stringprefix",
            vec![raw_string("cafe\u{301}.x"), raw_string("cafe\u{301}.")],
        );
        assert!(known.is_ok());

        let unknown = call(
            "stringprefix",
            vec![Value::unknown(Type::String), raw_string("cafe\u{301}.")],
        )
        .unwrap();
        let got = call("equal", vec![unknown, raw_string("cafe\u{301}.x")]).unwrap();
        assert_eq!(got, Value::string("caf\u{e9}.x"));
    }

    #[test]
    fn duplicate_set_elements_count_once() {
        let set = Value::Known {
            ty: Type::set(Type::String),
            payload: crate::value::Payload::Set(vec![raw_string("a"), raw_string("a")]),
        };
        let CallError::Assumption(err) =
            call("setlengthmin", vec![set, Value::number(2.0)]).unwrap_err()
        else {
            panic!("expected an assumption error");
        };
        assert_eq!(err.class(), ErrorClass::Violated);
        assert_eq!(err.position(), 0);
    }

    #[test]
    fn evaluate_reports_failures() {
        let case = Case {
            function: "notnull".into(),
            args: vec![Value::null(Type::String)],
        };
        let outcome = evaluate(&case).unwrap();
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"error": {"class": "violated", "position": 0, "message": "assumption was not upheld"}})
        );
    }

    #[test]
    fn catalog_lists_every_function() {
        let payload = catalog_json();
        assert_eq!(payload["catalogKind"], CATALOG_KIND);
        assert_eq!(
            payload["functions"].as_array().map(Vec::len),
            Some(AssumptionKind::ALL.len())
        );
        assert_eq!(payload["functions"][3]["valueType"], json!({"list": "dynamic"}));
    }
}
