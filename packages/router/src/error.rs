/// A convenience alias for results produced by the router.
pub type Result<T, E = RouteError> = std::result::Result<T, E>;

/// Errors raised by the router.
///
/// None of these describe a url that simply does not match a route; that is ordinary data
/// (an inactive [`Route`](crate::Route)). They all indicate a misconfigured matcher tree or a
/// contract violation by the caller.
#[non_exhaustive]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// A matcher received an active route whose path does not start with `/`.
    #[error("route path must start with '/', got {path:?}")]
    PathNotAbsolute {
        /// The offending path.
        path: String,
    },

    /// A patch was anchored deeper than the current path.
    #[error("patch anchored at segment {segment} but the current path only has {depth} segments")]
    SegmentOutOfRange {
        /// The segment the patch was anchored at.
        segment: usize,
        /// The number of segments in the current path.
        depth: usize,
    },

    /// A patch carried a path without the segment it is anchored at.
    #[error("patch for path {path:?} has no segment")]
    MissingSegment {
        /// The path carried by the patch.
        path: String,
    },

    /// A params setter received a value that cannot be rendered into a path.
    #[error("param {key:?} must be a string, a number or empty, got {value}")]
    InvalidParam {
        /// The param key.
        key: String,
        /// The rejected value.
        value: String,
    },

    /// A matcher pattern could not be parsed.
    #[error("invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The pattern as given.
        pattern: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// An activation guard is not of the form `key:value`.
    #[error("invalid activation guard {guard:?}, expected `key:value`")]
    InvalidGuard {
        /// The guard as given.
        guard: String,
    },

    /// The connection toggle was used on a pattern with parameters.
    #[error("connection can only be toggled on literal patterns, {pattern:?} has parameters")]
    ParameterizedConnection {
        /// The pattern of the matcher.
        pattern: String,
    },
}
