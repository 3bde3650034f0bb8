//! The values that flow through a matcher chain.

use std::fmt::{self, Display};

use indexmap::IndexMap;

/// A single path parameter or query value.
///
/// Query values infer all three kinds; path parameters are only ever strings or integers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ParamValue {
    /// A literal `true` or `false`.
    Bool(bool),
    /// Text of the form `-?[0-9]+` that fits an `i64`.
    Int(i64),
    /// Anything else.
    Str(String),
}

impl ParamValue {
    /// Coerce raw text: integers become [`ParamValue::Int`], everything else is kept as text.
    ///
    /// ```rust
    /// # use distributed_router::ParamValue;
    /// assert_eq!(ParamValue::integer_or_text("-500"), ParamValue::Int(-500));
    /// assert_eq!(ParamValue::integer_or_text("5-01"), ParamValue::from("5-01"));
    /// ```
    #[must_use]
    pub fn integer_or_text(text: &str) -> Self {
        if is_integer_literal(text) {
            if let Ok(int) = text.parse() {
                return Self::Int(int);
            }
        }
        Self::Str(text.to_string())
    }

    /// Whether this is an empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Str(s) if s.is_empty())
    }
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => b.fmt(f),
            Self::Int(i) => i.fmt(f),
            Self::Str(s) => s.fmt(f),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for ParamValue {
    fn from(i: i32) -> Self {
        Self::Int(i.into())
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Parameters extracted from the path, in the order they were captured.
pub type Params = IndexMap<String, ParamValue>;

/// A decoded query string, in the order the keys appeared.
pub type Query = IndexMap<String, ParamValue>;

/// `^-?[0-9]+$`
pub(crate) fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// A snapshot of the path state handed down a chain of matchers.
///
/// The root route is produced by the [`LocationSynchronizer`](crate::LocationSynchronizer); each
/// [`SegmentMatcher`](crate::SegmentMatcher) consumes a prefix of `path` and passes the rest on.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// The part of the path not yet consumed. Starts with `/`, or is empty once fully consumed.
    pub path: String,
    /// How many segments upstream matchers have consumed.
    pub segment: usize,
    /// Parameters captured upstream.
    pub params: Params,
    /// The whole decoded query string.
    pub query: Query,
    /// Whether every upstream matcher matched. Once false it stays false down the chain.
    pub active: bool,
}

impl Route {
    /// An active route at depth zero with no params or query.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            segment: 0,
            params: Params::new(),
            query: Query::new(),
            active: true,
        }
    }

    /// The root route for a url's `path` and decoded `query`.
    #[must_use]
    pub fn root(path: impl Into<String>, query: Query) -> Self {
        Self {
            query,
            ..Self::new(path)
        }
    }

    /// Set the consumed segment count.
    #[must_use]
    pub fn with_segment(self, segment: usize) -> Self {
        Self { segment, ..self }
    }

    /// Set the params captured upstream.
    #[must_use]
    pub fn with_params(self, params: Params) -> Self {
        Self { params, ..self }
    }

    /// Set the query.
    #[must_use]
    pub fn with_query(self, query: Query) -> Self {
        Self { query, ..self }
    }

    /// Set whether the route is active.
    #[must_use]
    pub fn with_active(self, active: bool) -> Self {
        Self { active, ..self }
    }
}

/// A change requested by a matcher, travelling up towards the
/// [`LocationSynchronizer`](crate::LocationSynchronizer).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutePatch {
    /// The new path text, relative to `segment`. [`None`] leaves the path alone.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub path: Option<String>,
    /// The depth `path` is anchored at. Required whenever `path` is set.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub segment: Option<usize>,
    /// A replacement for the whole query. [`None`] leaves the query alone.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub query: Option<Query>,
}

impl RoutePatch {
    /// Replace everything from `segment` onwards with `path`.
    #[must_use]
    pub fn path(segment: usize, path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            segment: Some(segment),
            query: None,
        }
    }

    /// Replace the query.
    #[must_use]
    pub fn query(query: Query) -> Self {
        Self {
            query: Some(query),
            ..Default::default()
        }
    }
}
