//! Tri-state values.
//!
//! A value is either null, known (with a concrete payload), or unknown with
//! a [`Refinement`] recording what has been proven about it so far. Known
//! collections may hold unknown elements, which makes them only partially
//! known.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::refinement::{Refinement, into_nfc};
use crate::ty::Type;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Value {
    Null {
        #[serde(rename = "type")]
        ty: Type,
    },
    Known {
        #[serde(rename = "type")]
        ty: Type,
        payload: Payload,
    },
    Unknown {
        #[serde(rename = "type")]
        ty: Type,
        #[serde(default, skip_serializing_if = "Refinement::is_empty")]
        refinement: Refinement,
    },
}

/// Concrete contents of a known value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    String(String),
    Number(f64),
    Bool(bool),
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(BTreeMap<String, Value>),
    Tuple(Vec<Value>),
}

impl Value {
    /// A known string, stored in NFC form.
    pub fn string(s: impl Into<String>) -> Self {
        Self::Known {
            ty: Type::String,
            payload: Payload::String(into_nfc(s.into())),
        }
    }

    pub fn number(n: f64) -> Self {
        Self::Known {
            ty: Type::Number,
            payload: Payload::Number(n),
        }
    }

    pub fn bool(b: bool) -> Self {
        Self::Known {
            ty: Type::Bool,
            payload: Payload::Bool(b),
        }
    }

    pub fn null(ty: Type) -> Self {
        Self::Null { ty }
    }

    /// An unknown value with nothing proven about it.
    pub fn unknown(ty: Type) -> Self {
        Self::Unknown {
            ty,
            refinement: Refinement::default(),
        }
    }

    /// An unknown value whose type is not resolved yet.
    pub fn dynamic() -> Self {
        Self::unknown(Type::Dynamic)
    }

    pub fn list(element: Type, elements: Vec<Value>) -> Self {
        Self::Known {
            ty: Type::list(element),
            payload: Payload::List(elements),
        }
    }

    /// A set value. Wholly-known duplicates are collapsed.
    pub fn set(element: Type, elements: Vec<Value>) -> Self {
        Self::Known {
            ty: Type::set(element),
            payload: Payload::Set(distinct(elements)),
        }
    }

    pub fn map<K: Into<String>>(element: Type, entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Known {
            ty: Type::map(element),
            payload: Payload::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    pub fn object<K: Into<String>>(attrs: impl IntoIterator<Item = (K, Value)>) -> Self {
        let attrs: BTreeMap<String, Value> =
            attrs.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let ty = Type::Object(attrs.iter().map(|(k, v)| (k.clone(), v.ty().clone())).collect());
        Self::Known {
            ty,
            payload: Payload::Object(attrs),
        }
    }

    pub fn tuple(elements: Vec<Value>) -> Self {
        let ty = Type::Tuple(elements.iter().map(|v| v.ty().clone()).collect());
        Self::Known {
            ty,
            payload: Payload::Tuple(elements),
        }
    }

    pub fn ty(&self) -> &Type {
        match self {
            Self::Null { ty } | Self::Known { ty, .. } | Self::Unknown { ty, .. } => ty,
        }
    }

    /// True unless the value itself is unknown. Nested elements may still
    /// be unknown; see [`Value::is_wholly_known`].
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown { .. })
    }

    /// True when neither the value nor anything nested in it is unknown.
    pub fn is_wholly_known(&self) -> bool {
        match self {
            Self::Null { .. } => true,
            Self::Unknown { .. } => false,
            Self::Known { payload, .. } => payload.elements().all(Value::is_wholly_known),
        }
    }

    pub fn refinement(&self) -> Option<&Refinement> {
        match self {
            Self::Unknown { refinement, .. } => Some(refinement),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Known {
                payload: Payload::String(s),
                ..
            } => Some(s),
            _ => None,
        }
    }

    /// Three-valued equality between two values of the same type.
    ///
    /// `None` means the answer depends on parts that are still unknown.
    /// An unknown side still compares unequal when its refinement already
    /// excludes the other side.
    pub fn equals(&self, other: &Value) -> Option<bool> {
        match (self, other) {
            (Self::Unknown { refinement, .. }, other) | (other, Self::Unknown { refinement, .. }) => {
                if other.is_known() && !refinement.admits(other) {
                    Some(false)
                } else {
                    None
                }
            }
            (Self::Null { .. }, Self::Null { .. }) => Some(true),
            (Self::Null { .. }, _) | (_, Self::Null { .. }) => Some(false),
            (Self::Known { payload: a, .. }, Self::Known { payload: b, .. }) => a.equals(b),
        }
    }

    /// The form every argument is brought to before an assumption sees it:
    /// strings and string prefixes in NFC, set duplicates collapsed.
    ///
    /// Values built with [`Value::string`] and [`Value::set`] are already
    /// canonical. Deserialized ones may not be.
    pub fn canonical(self) -> Value {
        match self {
            Self::Null { .. } => self,
            Self::Unknown { ty, mut refinement } => {
                refinement.string_prefix = refinement.string_prefix.map(into_nfc);
                Self::Unknown { ty, refinement }
            }
            Self::Known { ty, payload } => {
                let payload = match payload {
                    Payload::String(s) => Payload::String(into_nfc(s)),
                    Payload::Number(_) | Payload::Bool(_) => payload,
                    Payload::List(elems) => Payload::List(canonical_all(elems)),
                    Payload::Set(elems) => Payload::Set(distinct(canonical_all(elems))),
                    Payload::Tuple(elems) => Payload::Tuple(canonical_all(elems)),
                    Payload::Map(entries) => Payload::Map(canonical_entries(entries)),
                    Payload::Object(attrs) => Payload::Object(canonical_entries(attrs)),
                };
                Self::Known { ty, payload }
            }
        }
    }

    /// Check that the payload agrees with the declared type and that any
    /// refinement is applicable and consistent.
    pub fn check_well_typed(&self) -> Result<(), String> {
        match self {
            Self::Null { .. } => Ok(()),
            Self::Unknown { ty, refinement } => refinement.check_applicable(ty),
            Self::Known { ty, payload } => payload.check_against(ty),
        }
    }
}

/// Number of elements in a known list, set or map value.
pub fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::Known {
            payload: Payload::List(elems) | Payload::Set(elems),
            ..
        } => Some(elems.len()),
        Value::Known {
            payload: Payload::Map(entries),
            ..
        } => Some(entries.len()),
        _ => None,
    }
}

impl Payload {
    /// Nested values, in payload order.
    pub fn elements(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match self {
            Self::String(_) | Self::Number(_) | Self::Bool(_) => Box::new(std::iter::empty()),
            Self::List(elems) | Self::Set(elems) | Self::Tuple(elems) => Box::new(elems.iter()),
            Self::Map(entries) | Self::Object(entries) => Box::new(entries.values()),
        }
    }

    fn equals(&self, other: &Payload) -> Option<bool> {
        match (self, other) {
            (Self::String(a), Self::String(b)) => Some(a == b),
            (Self::Number(a), Self::Number(b)) => Some(a == b),
            (Self::Bool(a), Self::Bool(b)) => Some(a == b),
            (Self::List(a), Self::List(b)) | (Self::Tuple(a), Self::Tuple(b)) => {
                if a.len() != b.len() {
                    return Some(false);
                }
                all_equal(a.iter().zip(b))
            }
            (Self::Map(a), Self::Map(b)) | (Self::Object(a), Self::Object(b)) => {
                if a.len() != b.len() || a.keys().ne(b.keys()) {
                    return Some(false);
                }
                all_equal(a.values().zip(b.values()))
            }
            (Self::Set(a), Self::Set(b)) => {
                let wholly_known = a.iter().chain(b).all(Value::is_wholly_known);
                if !wholly_known {
                    return None;
                }
                Some(
                    a.len() == b.len()
                        && a.iter()
                            .all(|x| b.iter().any(|y| x.equals(y) == Some(true))),
                )
            }
            _ => Some(false),
        }
    }

    fn check_against(&self, ty: &Type) -> Result<(), String> {
        match (self, ty) {
            (Self::String(_), Type::String)
            | (Self::Number(_), Type::Number)
            | (Self::Bool(_), Type::Bool) => Ok(()),
            (Self::List(elems), Type::List(t)) | (Self::Set(elems), Type::Set(t)) => {
                check_elements(elems.iter().map(|v| (v, &**t)), ty)
            }
            (Self::Map(entries), Type::Map(t)) => {
                check_elements(entries.values().map(|v| (v, &**t)), ty)
            }
            (Self::Object(attrs), Type::Object(attr_types)) => {
                if attrs.keys().ne(attr_types.keys()) {
                    return Err("object attributes do not match the object type".to_string());
                }
                check_elements(attrs.values().zip(attr_types.values()), ty)
            }
            (Self::Tuple(elems), Type::Tuple(elem_types)) => {
                if elems.len() != elem_types.len() {
                    return Err("tuple length does not match the tuple type".to_string());
                }
                check_elements(elems.iter().zip(elem_types), ty)
            }
            _ => Err(format!("payload does not match type {ty}")),
        }
    }
}

fn check_elements<'a>(
    pairs: impl Iterator<Item = (&'a Value, &'a Type)>,
    container: &Type,
) -> Result<(), String> {
    for (value, expected) in pairs {
        if value.ty() != expected {
            return Err(format!("element of type {} in {container}", value.ty()));
        }
        value.check_well_typed()?;
    }
    Ok(())
}

fn canonical_all(values: Vec<Value>) -> Vec<Value> {
    values.into_iter().map(Value::canonical).collect()
}

fn canonical_entries(entries: BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    entries.into_iter().map(|(k, v)| (k, v.canonical())).collect()
}

/// Drop elements equal to an earlier one. Elements that are not wholly
/// known never compare equal and are all kept.
fn distinct(elements: Vec<Value>) -> Vec<Value> {
    let mut kept: Vec<Value> = Vec::with_capacity(elements.len());
    for elem in elements {
        if !kept.iter().any(|seen| seen.equals(&elem) == Some(true)) {
            kept.push(elem);
        }
    }
    kept
}

fn all_equal<'a>(pairs: impl Iterator<Item = (&'a Value, &'a Value)>) -> Option<bool> {
    let mut undecided = false;
    for (a, b) in pairs {
        match a.equals(b) {
            Some(false) => return Some(false),
            None => undecided = true,
            Some(true) => {}
        }
    }
    if undecided { None } else { Some(true) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_of_collections() {
        let list = Value::list(Type::String, vec![Value::string("a"), Value::string("b")]);
        assert_eq!(length_of(&list), Some(2));
        let map = Value::map(Type::Number, [("a", Value::number(1.0))]);
        assert_eq!(length_of(&map), Some(1));
        assert_eq!(length_of(&Value::string("ab")), None);
        assert_eq!(length_of(&Value::unknown(Type::list(Type::String))), None);
    }

    #[test]
    fn set_collapses_duplicates() {
        let set = Value::set(
            Type::Number,
            vec![Value::number(1.0), Value::number(1.0), Value::number(2.0)],
        );
        assert_eq!(length_of(&set), Some(2));
    }

    #[test]
    fn strings_are_stored_composed() {
        assert_eq!(Value::string("cafe\u{301}").as_str(), Some("caf\u{e9}"));
    }

    #[test]
    fn canonical_composes_and_collapses() {
        let raw = Value::Known {
            ty: Type::set(Type::String),
            payload: Payload::Set(vec![
                Value::Known {
                    ty: Type::String,
                    payload: Payload::String("cafe\u{301}".into()),
                },
                Value::Known {
                    ty: Type::String,
                    payload: Payload::String("caf\u{e9}".into()),
                },
                Value::unknown(Type::String),
            ]),
        };
        let canonical = raw.canonical();
        assert_eq!(length_of(&canonical), Some(2));
        assert_eq!(
            canonical,
            Value::set(
                Type::String,
                vec![Value::string("caf\u{e9}"), Value::unknown(Type::String)]
            )
        );
    }

    #[test]
    fn partial_lists_compare_three_valued() {
        let partial = Value::list(
            Type::String,
            vec![Value::string("a"), Value::unknown(Type::String)],
        );
        let matching = Value::list(Type::String, vec![Value::string("a"), Value::string("b")]);
        let mismatching =
            Value::list(Type::String, vec![Value::string("not a"), Value::string("b")]);
        assert_eq!(partial.equals(&matching), None);
        assert_eq!(partial.equals(&mismatching), Some(false));
    }

    #[test]
    fn null_equality() {
        assert_eq!(Value::null(Type::String).equals(&Value::null(Type::String)), Some(true));
        assert_eq!(Value::null(Type::String).equals(&Value::string("")), Some(false));
    }

    #[test]
    fn wholly_known_looks_inside() {
        let partial = Value::tuple(vec![Value::bool(true), Value::dynamic()]);
        assert!(partial.is_known());
        assert!(!partial.is_wholly_known());
    }

    #[test]
    fn well_typed_rejects_mismatched_payload() {
        let bad = Value::Known {
            ty: Type::list(Type::String),
            payload: Payload::List(vec![Value::number(1.0)]),
        };
        assert!(bad.check_well_typed().is_err());
        assert!(Value::object([("a", Value::string("x"))]).check_well_typed().is_ok());
    }

    #[test]
    fn wire_format() {
        let json = serde_json::json!({
            "state": "known",
            "type": {"list": "string"},
            "payload": {"list": [
                {"state": "known", "type": "string", "payload": {"string": "a"}},
                {"state": "unknown", "type": "string", "refinement": {"not_null": true}}
            ]}
        });
        let value: Value = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(serde_json::to_value(&value).unwrap(), json);
    }
}
