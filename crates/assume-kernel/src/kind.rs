//! Assumption identities.
//!
//! Length assumptions come in three shapes (bounds, lower, upper) over
//! three collection kinds, parameterized here rather than spelled out.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Collection shapes that carry a length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    List,
    Set,
    Map,
}

impl CollectionKind {
    pub fn noun(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Set => "set",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssumptionKind {
    NotNull,
    Equal,
    StringPrefix,
    CollectionLengthBounds(CollectionKind),
    CollectionLengthLowerBound(CollectionKind),
    CollectionLengthUpperBound(CollectionKind),
}

impl AssumptionKind {
    pub const ALL: [AssumptionKind; 12] = [
        Self::NotNull,
        Self::Equal,
        Self::StringPrefix,
        Self::CollectionLengthBounds(CollectionKind::List),
        Self::CollectionLengthLowerBound(CollectionKind::List),
        Self::CollectionLengthUpperBound(CollectionKind::List),
        Self::CollectionLengthBounds(CollectionKind::Set),
        Self::CollectionLengthLowerBound(CollectionKind::Set),
        Self::CollectionLengthUpperBound(CollectionKind::Set),
        Self::CollectionLengthBounds(CollectionKind::Map),
        Self::CollectionLengthLowerBound(CollectionKind::Map),
        Self::CollectionLengthUpperBound(CollectionKind::Map),
    ];

    /// The function name this assumption is called by.
    pub fn name(self) -> String {
        match self {
            Self::NotNull => "notnull".to_string(),
            Self::Equal => "equal".to_string(),
            Self::StringPrefix => "stringprefix".to_string(),
            Self::CollectionLengthBounds(kind) => format!("{kind}length"),
            Self::CollectionLengthLowerBound(kind) => format!("{kind}lengthmin"),
            Self::CollectionLengthUpperBound(kind) => format!("{kind}lengthmax"),
        }
    }

    /// Number of parameters after the leading value argument.
    pub fn param_count(self) -> usize {
        match self {
            Self::NotNull => 0,
            Self::Equal | Self::StringPrefix => 1,
            Self::CollectionLengthBounds(_) => 2,
            Self::CollectionLengthLowerBound(_) | Self::CollectionLengthUpperBound(_) => 1,
        }
    }
}

impl fmt::Display for AssumptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl std::str::FromStr for AssumptionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown assumption function: {s}"))
    }
}
