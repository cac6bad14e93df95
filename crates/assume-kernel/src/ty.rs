//! Static types carried by every value.
//!
//! `Dynamic` stands for a type that has not been resolved yet. Values of
//! dynamic type defer all checking, and any type converts to and from it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::kind::CollectionKind;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Dynamic,
    String,
    Number,
    Bool,
    List(Box<Type>),
    Set(Box<Type>),
    Map(Box<Type>),
    Object(BTreeMap<String, Type>),
    Tuple(Vec<Type>),
}

impl Type {
    pub fn list(element: Type) -> Self {
        Self::List(Box::new(element))
    }

    pub fn set(element: Type) -> Self {
        Self::Set(Box::new(element))
    }

    pub fn map(element: Type) -> Self {
        Self::Map(Box::new(element))
    }

    pub fn object<K: Into<String>>(attrs: impl IntoIterator<Item = (K, Type)>) -> Self {
        Self::Object(attrs.into_iter().map(|(k, t)| (k.into(), t)).collect())
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::String | Self::Number | Self::Bool)
    }

    /// The collection kind for list, set and map types.
    pub fn collection_kind(&self) -> Option<CollectionKind> {
        match self {
            Self::List(_) => Some(CollectionKind::List),
            Self::Set(_) => Some(CollectionKind::Set),
            Self::Map(_) => Some(CollectionKind::Map),
            _ => None,
        }
    }

    /// Whether some value of type `self` may convert to type `target`.
    ///
    /// This is a type-level answer: a `true` here can still fail for a
    /// particular known value (e.g. `"abc"` to number, or a map whose keys
    /// do not match an object's attributes).
    pub fn converts_to(&self, target: &Type) -> bool {
        if self == target || self.is_dynamic() || target.is_dynamic() {
            return true;
        }
        match (self, target) {
            (Type::String, Type::Number | Type::Bool) => true,
            (Type::Number | Type::Bool, Type::String) => true,
            (
                Type::List(from) | Type::Set(from),
                Type::List(to) | Type::Set(to),
            ) => from.converts_to(to),
            (Type::Tuple(from), Type::List(to) | Type::Set(to)) => {
                from.iter().all(|t| t.converts_to(to))
            }
            (Type::Tuple(from), Type::Tuple(to)) => {
                from.len() == to.len() && from.iter().zip(to).all(|(f, t)| f.converts_to(t))
            }
            (Type::Map(from), Type::Map(to)) => from.converts_to(to),
            (Type::Object(from), Type::Map(to)) => from.values().all(|t| t.converts_to(to)),
            (Type::Object(from), Type::Object(to)) => {
                from.len() == to.len()
                    && from
                        .iter()
                        .all(|(k, f)| to.get(k).is_some_and(|t| f.converts_to(t)))
            }
            (Type::Map(from), Type::Object(to)) => to.values().all(|t| from.converts_to(t)),
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dynamic => write!(f, "dynamic"),
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Bool => write!(f, "bool"),
            Self::List(t) => write!(f, "list of {t}"),
            Self::Set(t) => write!(f, "set of {t}"),
            Self::Map(t) => write!(f, "map of {t}"),
            Self::Object(_) => write!(f, "object"),
            Self::Tuple(_) => write!(f, "tuple"),
        }
    }
}
