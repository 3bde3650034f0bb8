//! Pattern and activation guard grammar for [`SegmentMatcher`](crate::SegmentMatcher).

use std::fmt::{self, Display};

use crate::{
    error::{Result, RouteError},
    route::Params,
};

/// One `/`-delimited piece of a [`Pattern`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Piece {
    /// Must equal the path segment exactly.
    Literal(String),
    /// Captures the path segment under this name (written `:name`).
    Param(String),
}

/// A parsed matcher pattern such as `/:page/:sub`, `/full` or `/:page/`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    pieces: Vec<Piece>,
    trailing_slash: bool,
}

impl Pattern {
    /// Parse a pattern. It must start with `/` and every parameter needs a name.
    ///
    /// ```rust
    /// # use distributed_router::pattern::{Pattern, Piece};
    /// let pattern = Pattern::parse("/reports/:id/").unwrap();
    /// assert_eq!(pattern.segment_count(), 2);
    /// assert!(pattern.has_trailing_slash());
    /// assert_eq!(pattern.pieces()[1], Piece::Param("id".to_string()));
    /// ```
    pub fn parse(source: &str) -> Result<Self> {
        let invalid = |reason| RouteError::InvalidPattern {
            pattern: source.to_string(),
            reason,
        };

        let body = source
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'"))?;
        let trailing_slash = body.ends_with('/');
        let body = body.strip_suffix('/').unwrap_or(body);

        let pieces = body
            .split('/')
            .map(|piece| match piece.strip_prefix(':') {
                Some("") => Err(invalid("parameter without a name")),
                Some(name) => Ok(Piece::Param(name.to_string())),
                None => Ok(Piece::Literal(piece.to_string())),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            source: source.to_string(),
            pieces,
            trailing_slash,
        })
    }

    /// The pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The pieces, in path order.
    #[must_use]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// How many path segments a successful match consumes.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.pieces.len()
    }

    /// Whether the pattern was written with a trailing `/`.
    #[must_use]
    pub fn has_trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    /// The path a purely literal pattern stands for, or [`None`] if it has parameters.
    #[must_use]
    pub fn literal_path(&self) -> Option<String> {
        let literals = self
            .pieces
            .iter()
            .map(|piece| match piece {
                Piece::Literal(text) => Some(text.as_str()),
                Piece::Param(_) => None,
            })
            .collect::<Option<Vec<_>>>()?;
        Some(format!("/{}", literals.join("/")))
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// A `key:value` precondition on the params captured by ancestors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Guard {
    key: String,
    value: String,
}

impl Guard {
    /// Parse `key:value`. The value may be empty, the key may not.
    pub fn parse(source: &str) -> Result<Self> {
        match source.split_once(':') {
            Some((key, value)) if !key.is_empty() => Ok(Self {
                key: key.to_string(),
                value: value.to_string(),
            }),
            _ => Err(RouteError::InvalidGuard {
                guard: source.to_string(),
            }),
        }
    }

    /// Whether `params` holds the expected value. Values are compared in their text form, so
    /// `id:5` accepts a captured integer `5`.
    #[must_use]
    pub fn allows(&self, params: &Params) -> bool {
        params
            .get(&self.key)
            .is_some_and(|value| value.to_string() == self.value)
    }
}
