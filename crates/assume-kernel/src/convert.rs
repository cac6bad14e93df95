//! Type conversion ahead of comparison.
//!
//! Conversion never invents information. Null stays null, unknown stays
//! unknown, and an unknown value keeps only the refinement facts that
//! still hold for the target type.

use std::collections::BTreeMap;

use crate::refinement::Refinement;
use crate::ty::Type;
use crate::value::{Payload, Value};

/// Convert `value` to `target`.
///
/// Returns `None` when no conversion exists, either at the type level or
/// for this particular known value.
pub fn convert(value: &Value, target: &Type) -> Option<Value> {
    if value.ty() == target || target.is_dynamic() {
        return Some(value.clone());
    }
    if !value.ty().converts_to(target) {
        return None;
    }
    match value {
        Value::Null { .. } => Some(Value::null(target.clone())),
        Value::Unknown { ty, refinement } => Some(Value::Unknown {
            ty: target.clone(),
            refinement: carry_refinement(ty, target, refinement),
        }),
        Value::Known { payload, .. } => convert_payload(payload, target),
    }
}

fn carry_refinement(from: &Type, to: &Type, refinement: &Refinement) -> Refinement {
    use crate::kind::CollectionKind::{List, Set};

    let mut carried = Refinement {
        not_null: refinement.not_null,
        ..Refinement::default()
    };
    match (from.collection_kind(), to.collection_kind()) {
        (Some(a), Some(b)) if a == b || (a == Set && b == List) => {
            carried.length_lower = refinement.length_lower;
            carried.length_upper = refinement.length_upper;
        }
        // Deduplication can only shrink a list on its way into a set.
        (Some(List), Some(Set)) => carried.length_upper = refinement.length_upper,
        _ => {}
    }
    carried
}

fn convert_payload(payload: &Payload, target: &Type) -> Option<Value> {
    match (payload, target) {
        (Payload::Number(n), Type::String) => Some(Value::string(n.to_string())),
        (Payload::Bool(b), Type::String) => Some(Value::string(b.to_string())),
        (Payload::String(s), Type::Number) => {
            s.trim().parse::<f64>().ok().filter(|n| n.is_finite()).map(Value::number)
        }
        (Payload::String(s), Type::Bool) => match s.as_str() {
            "true" => Some(Value::bool(true)),
            "false" => Some(Value::bool(false)),
            _ => None,
        },
        (
            Payload::List(elems) | Payload::Set(elems) | Payload::Tuple(elems),
            Type::List(elem_ty),
        ) => Some(Value::list(
            (**elem_ty).clone(),
            convert_all(elems.iter(), elem_ty)?,
        )),
        (
            Payload::List(elems) | Payload::Set(elems) | Payload::Tuple(elems),
            Type::Set(elem_ty),
        ) => Some(Value::set(
            (**elem_ty).clone(),
            convert_all(elems.iter(), elem_ty)?,
        )),
        (Payload::Tuple(elems), Type::Tuple(elem_types)) if elems.len() == elem_types.len() => {
            let converted = elems
                .iter()
                .zip(elem_types)
                .map(|(v, t)| convert(v, t))
                .collect::<Option<Vec<_>>>()?;
            Some(Value::tuple(converted))
        }
        (Payload::Map(entries) | Payload::Object(entries), Type::Map(elem_ty)) => {
            let keys = entries.keys().cloned();
            let converted = convert_all(entries.values(), elem_ty)?;
            Some(Value::map((**elem_ty).clone(), keys.zip(converted)))
        }
        (Payload::Map(entries) | Payload::Object(entries), Type::Object(attr_types)) => {
            if entries.keys().ne(attr_types.keys()) {
                return None;
            }
            let converted = entries
                .iter()
                .map(|(k, v)| Some((k.clone(), convert(v, attr_types.get(k)?)?)))
                .collect::<Option<BTreeMap<_, _>>>()?;
            Some(Value::Known {
                ty: target.clone(),
                payload: Payload::Object(converted),
            })
        }
        _ => None,
    }
}

fn convert_all<'a>(values: impl Iterator<Item = &'a Value>, target: &Type) -> Option<Vec<Value>> {
    values.map(|v| convert(v, target)).collect()
}
