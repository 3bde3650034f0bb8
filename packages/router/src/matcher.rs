use std::{cell::RefCell, rc::Rc};

use tracing::{trace, warn};

use crate::{
    bus::PatchSink,
    error::{Result, RouteError},
    pattern::{Guard, Pattern, Piece},
    route::{ParamValue, Params, Query, Route, RoutePatch},
};

#[derive(Default)]
struct MatcherState {
    in_route: Option<Route>,
    out_route: Option<Route>,
    captured: Params,
}

/// One step of a routing chain.
///
/// A matcher consumes the start of the [`Route`] it is handed, according to its [`Pattern`], and
/// returns the reduced route for the next matcher. Its `set_*` methods turn local changes into
/// [`RoutePatch`]es that travel up to its parent [`PatchSink`].
///
/// ```rust
/// # use distributed_router::{ParamValue, Route, SegmentMatcher};
/// let matcher = SegmentMatcher::new("/:page").unwrap();
/// let out = matcher.route_change(Route::new("/reports/bydate")).unwrap();
///
/// assert!(out.active);
/// assert_eq!(out.path, "/bydate");
/// assert_eq!(out.segment, 1);
/// assert_eq!(out.params["page"], ParamValue::from("reports"));
/// ```
pub struct SegmentMatcher {
    pattern: Pattern,
    guard: Option<Guard>,
    parent: RefCell<Option<Rc<dyn PatchSink>>>,
    state: RefCell<MatcherState>,
}

impl SegmentMatcher {
    /// Create a matcher for `pattern`, e.g. `/:page`, `/:page/:sub` or `/full`.
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Pattern::parse(pattern)?,
            guard: None,
            parent: RefCell::new(None),
            state: RefCell::new(MatcherState::default()),
        })
    }

    /// Create a matcher that only activates when an ancestor captured a param with a specific
    /// value. `guard` is written `key:value`.
    ///
    /// ```rust
    /// # use distributed_router::{Params, ParamValue, Route, SegmentMatcher};
    /// let matcher = SegmentMatcher::guarded("/:page", "section:management").unwrap();
    /// let params = Params::from([("section".to_string(), ParamValue::from("reports"))]);
    ///
    /// let out = matcher.route_change(Route::new("/list").with_params(params)).unwrap();
    /// assert!(!out.active);
    /// ```
    pub fn guarded(pattern: &str, guard: &str) -> Result<Self> {
        Ok(Self {
            guard: Some(Guard::parse(guard)?),
            ..Self::new(pattern)?
        })
    }

    /// Set where this matcher's patches go: its parent matcher, or the [`EventBus`] at the top.
    ///
    /// [`EventBus`]: crate::EventBus
    pub fn attach(&self, parent: Rc<dyn PatchSink>) {
        *self.parent.borrow_mut() = Some(parent);
    }

    /// The pattern this matcher consumes.
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// The route most recently handed to the next matcher.
    #[must_use]
    pub fn route(&self) -> Option<Route> {
        self.state.borrow().out_route.clone()
    }

    /// The params this matcher captured itself, excluding those from upstream.
    #[must_use]
    pub fn params(&self) -> Params {
        self.state.borrow().captured.clone()
    }

    /// The query as last seen.
    #[must_use]
    pub fn query(&self) -> Query {
        self.state
            .borrow()
            .out_route
            .as_ref()
            .map(|route| route.query.clone())
            .unwrap_or_default()
    }

    /// Whether the last route matched.
    #[must_use]
    pub fn connection(&self) -> bool {
        self.state
            .borrow()
            .out_route
            .as_ref()
            .is_some_and(|route| route.active)
    }

    /// Match `in_route` and return the route for the next matcher.
    ///
    /// A route that does not apply here is not an error: the result is simply inactive. The only
    /// error is a non-empty path without a leading `/`, whether or not the route is active.
    pub fn route_change(&self, in_route: Route) -> Result<Route> {
        let count = self.pattern.segment_count();

        let (out_route, captured) = match self.matching(&in_route)? {
            Some((captured, remainder)) => {
                let mut params = in_route.params.clone();
                for (key, value) in &captured {
                    if params.contains_key(key) {
                        warn!(
                            "{} captured {key:?} which an ancestor already set, keeping the ancestor's value",
                            self.pattern
                        );
                        continue;
                    }
                    params.insert(key.clone(), value.clone());
                }
                let out = Route {
                    path: remainder,
                    segment: in_route.segment + count,
                    params,
                    query: in_route.query.clone(),
                    active: true,
                };
                (out, captured)
            }
            None => {
                let out = Route {
                    segment: in_route.segment + count,
                    active: false,
                    ..in_route.clone()
                };
                (out, Params::new())
            }
        };

        trace!(pattern = %self.pattern, active = out_route.active, path = %out_route.path, "route changed");
        *self.state.borrow_mut() = MatcherState {
            in_route: Some(in_route),
            out_route: Some(out_route.clone()),
            captured,
        };
        Ok(out_route)
    }

    /// Returns the captured params and the remainder, or [`None`] when the route does not apply.
    fn matching(&self, in_route: &Route) -> Result<Option<(Params, String)>> {
        if in_route.path.is_empty() {
            return Ok(None);
        }
        let Some(rest) = in_route.path.strip_prefix('/') else {
            return Err(RouteError::PathNotAbsolute {
                path: in_route.path.clone(),
            });
        };
        if !in_route.active {
            return Ok(None);
        }
        if let Some(guard) = &self.guard {
            if !guard.allows(&in_route.params) {
                return Ok(None);
            }
        }

        let segments: Vec<&str> = rest.split('/').collect();
        let count = self.pattern.segment_count();
        if segments.len() < count {
            return Ok(None);
        }

        let mut captured = Params::new();
        for (piece, text) in self.pattern.pieces().iter().zip(&segments) {
            match piece {
                Piece::Literal(literal) if literal == text => {}
                Piece::Literal(_) => return Ok(None),
                Piece::Param(name) => {
                    captured.insert(name.clone(), ParamValue::integer_or_text(text));
                }
            }
        }

        let (consumed, unconsumed) = segments.split_at(count);
        let remainder = remainder(consumed, unconsumed, self.pattern.has_trailing_slash());
        Ok(Some((captured, remainder)))
    }

    /// Change some of this matcher's params, which rewrites the path from this matcher's depth.
    ///
    /// [`None`] or an empty string clears a param. Cleared params at the end of the pattern are
    /// left out of the path; a cleared param followed by other segments leaves an empty segment.
    /// The path below this matcher is only kept when every param has a value.
    ///
    /// Nothing happens unless the last route handed to this matcher was active, or when the path
    /// would not change. Booleans cannot be placed in a path and are rejected.
    pub fn set_params<K: Into<String>>(
        &self,
        changes: impl IntoIterator<Item = (K, Option<ParamValue>)>,
    ) -> Result<()> {
        let changes: Vec<(String, Option<ParamValue>)> = changes
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect();
        for (key, value) in &changes {
            if let Some(value @ ParamValue::Bool(_)) = value {
                return Err(RouteError::InvalidParam {
                    key: key.clone(),
                    value: value.to_string(),
                });
            }
        }
        if changes.is_empty() {
            return Ok(());
        }

        let patch = {
            let state = self.state.borrow();
            let Some(in_route) = state.in_route.as_ref().filter(|route| route.active) else {
                trace!(pattern = %self.pattern, "params set while inactive, ignoring");
                return Ok(());
            };
            let out_route = state.out_route.as_ref().filter(|route| route.active);

            let mut pieces = Vec::with_capacity(self.pattern.segment_count());
            for piece in self.pattern.pieces() {
                match piece {
                    Piece::Literal(text) => pieces.push((text.clone(), false)),
                    Piece::Param(name) => {
                        let value = match changes.iter().rev().find(|(key, _)| key == name) {
                            Some((_, value)) => value.clone(),
                            None => state.captured.get(name).cloned(),
                        };
                        let text = value.map(|v| v.to_string()).unwrap_or_default();
                        pieces.push((text, true));
                    }
                }
            }

            let complete = pieces
                .iter()
                .all(|(text, is_param)| !is_param || !text.is_empty());
            while matches!(pieces.last(), Some((text, true)) if text.is_empty()) {
                pieces.pop();
            }

            let texts: Vec<&str> = pieces.iter().map(|(text, _)| text.as_str()).collect();
            let mut path = format!("/{}", texts.join("/"));
            if let Some(out_route) = out_route.filter(|_| complete) {
                if out_route.path.len() > 1 {
                    path.push_str(&out_route.path);
                }
            }

            if path == normalized(&in_route.path) {
                trace!(pattern = %self.pattern, %path, "params unchanged");
                return Ok(());
            }
            RoutePatch::path(in_route.segment, path)
        };

        self.emit(patch)
    }

    /// Replace the whole query. Only has an effect while this matcher is matched and the query
    /// differs.
    pub fn set_query(&self, query: Query) -> Result<()> {
        {
            let state = self.state.borrow();
            let Some(out_route) = state.out_route.as_ref().filter(|route| route.active) else {
                trace!(pattern = %self.pattern, "query set while inactive, ignoring");
                return Ok(());
            };
            if out_route.query == query {
                return Ok(());
            }
        }
        self.emit(RoutePatch::query(query))
    }

    /// Select (`true`) or deselect (`false`) this matcher's literal path at its parent's depth.
    ///
    /// Does nothing while the parent route is inactive or when the matcher is already in the
    /// requested state. Only literal patterns can be toggled.
    pub fn set_connection(&self, connected: bool) -> Result<()> {
        let Some(literal) = self.pattern.literal_path() else {
            return Err(RouteError::ParameterizedConnection {
                pattern: self.pattern.to_string(),
            });
        };

        let patch = {
            let state = self.state.borrow();
            let Some(in_route) = state.in_route.as_ref().filter(|route| route.active) else {
                return Ok(());
            };
            let active = state.out_route.as_ref().is_some_and(|route| route.active);
            if active == connected {
                return Ok(());
            }
            let path = if connected { literal } else { "/".to_string() };
            RoutePatch::path(in_route.segment, path)
        };

        self.emit(patch)
    }

    fn emit(&self, patch: RoutePatch) -> Result<()> {
        // no borrow of our state may be held here, the patch comes straight back down
        let parent = self.parent.borrow().clone();
        match parent {
            Some(parent) => parent.dispatch(patch),
            None => {
                trace!(pattern = %self.pattern, ?patch, "no parent attached, dropping patch");
                Ok(())
            }
        }
    }
}

impl PatchSink for SegmentMatcher {
    /// Patches from children are forwarded unchanged; they are always applied at the root using
    /// their segment anchor.
    fn dispatch(&self, patch: RoutePatch) -> Result<()> {
        self.emit(patch)
    }
}

/// Builds the path handed to the next matcher.
///
/// Fully consuming a segment with content leaves `/` (the next matcher sits at its home); fully
/// consuming an empty segment leaves nothing.
fn remainder(consumed: &[&str], unconsumed: &[&str], trailing_slash: bool) -> String {
    if unconsumed.is_empty() {
        let ended_empty = consumed.last().is_some_and(|segment| segment.is_empty());
        return if trailing_slash || ended_empty {
            String::new()
        } else {
            "/".to_string()
        };
    }

    let mut path = format!("/{}", unconsumed.join("/"));
    if path.len() > 1 && path.ends_with('/') {
        path.pop();
    }
    if trailing_slash && path == "/" {
        path.clear();
    }
    path
}

fn normalized(path: &str) -> &str {
    match path {
        "" => "/",
        "/" => path,
        _ => path.strip_suffix('/').unwrap_or(path),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;

    use super::*;

    /// Records patches instead of applying them.
    #[derive(Default)]
    struct Recorder(RefCell<Vec<RoutePatch>>);

    impl PatchSink for Recorder {
        fn dispatch(&self, patch: RoutePatch) -> Result<()> {
            self.0.borrow_mut().push(patch);
            Ok(())
        }
    }

    impl Recorder {
        fn take(&self) -> Vec<RoutePatch> {
            std::mem::take(&mut *self.0.borrow_mut())
        }
    }

    fn attached(pattern: &str) -> (SegmentMatcher, Rc<Recorder>) {
        let matcher = SegmentMatcher::new(pattern).unwrap();
        let recorder = Rc::new(Recorder::default());
        matcher.attach(recorder.clone());
        (matcher, recorder)
    }

    fn params(entries: &[(&str, ParamValue)]) -> Params {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn fails_if_path_does_not_start_with_slash() {
        let matcher = SegmentMatcher::new("/:page").unwrap();
        assert_eq!(
            matcher.route_change(Route::new("reports/")),
            Err(RouteError::PathNotAbsolute {
                path: "reports/".into()
            })
        );
    }

    #[test]
    fn inactive_routes_still_need_a_leading_slash() {
        let matcher = SegmentMatcher::new("/:page").unwrap();
        assert_eq!(
            matcher.route_change(Route::new("reports").with_active(false)),
            Err(RouteError::PathNotAbsolute {
                path: "reports".into()
            })
        );
        assert!(!matcher
            .route_change(Route::new("").with_active(false))
            .unwrap()
            .active);
    }

    #[test]
    fn matches_a_simple_route() {
        let matcher = SegmentMatcher::new("/:page").unwrap();
        let route = matcher.route_change(Route::new("/reports")).unwrap();
        assert_eq!(
            route,
            Route::new("/")
                .with_segment(1)
                .with_params(params(&[("page", "reports".into())]))
        );
    }

    #[test]
    fn guard_allows_a_match() {
        let matcher = SegmentMatcher::guarded("/:page", "section:management").unwrap();
        let route = matcher
            .route_change(
                Route::new("/reports")
                    .with_segment(1)
                    .with_params(params(&[("section", "management".into())])),
            )
            .unwrap();
        assert_eq!(
            route,
            Route::new("/").with_segment(2).with_params(params(&[
                ("section", "management".into()),
                ("page", "reports".into()),
            ]))
        );
    }

    #[test]
    fn guard_blocks_a_match() {
        let matcher = SegmentMatcher::guarded("/:page", "section:nonstandard").unwrap();
        let route = matcher
            .route_change(
                Route::new("/reports")
                    .with_segment(1)
                    .with_params(params(&[("section", "management".into())])),
            )
            .unwrap();
        assert!(!route.active);
        assert_eq!(route.segment, 2);
        assert_eq!(route.path, "/reports");
    }

    #[test]
    fn matches_home_route() {
        let matcher = SegmentMatcher::new("/:page").unwrap();
        let route = matcher.route_change(Route::new("/")).unwrap();
        assert_eq!(
            route,
            Route::new("")
                .with_segment(1)
                .with_params(params(&[("page", "".into())]))
        );
    }

    #[test]
    fn passes_the_remainder_on() {
        let matcher = SegmentMatcher::new("/:page").unwrap();
        let route = matcher.route_change(Route::new("/reports/bydate")).unwrap();
        assert_eq!(route.path, "/bydate");

        let route = matcher.route_change(Route::new("/reports/bydate/")).unwrap();
        assert_eq!(route.path, "/bydate");

        let route = matcher.route_change(Route::new("/reports/")).unwrap();
        assert_eq!(route.path, "/");
    }

    #[test]
    fn inactive_in_route_gives_inactive_out_route() {
        let matcher = SegmentMatcher::new("/:page").unwrap();
        let route = matcher
            .route_change(Route::new("/reports").with_active(false))
            .unwrap();
        assert!(!route.active);
        assert!(!matcher.connection());
    }

    #[test]
    fn trailing_slash_pattern_leaves_nothing() {
        let matcher = SegmentMatcher::new("/:page/").unwrap();
        let route = matcher.route_change(Route::new("/reports")).unwrap();
        assert_eq!(route.path, "");
        assert!(route.active);

        let route = matcher.route_change(Route::new("/reports/")).unwrap();
        assert_eq!(route.path, "");

        let route = matcher.route_change(Route::new("/reports/bydate")).unwrap();
        assert_eq!(route.path, "/bydate");
    }

    #[test]
    fn empty_path_does_not_match() {
        let matcher = SegmentMatcher::new("/:page").unwrap();
        let route = matcher.route_change(Route::new("")).unwrap();
        assert!(!route.active);
    }

    #[test]
    fn too_few_segments_do_not_match() {
        let matcher = SegmentMatcher::new("/:page/:sub").unwrap();
        let route = matcher.route_change(Route::new("/reports")).unwrap();
        assert!(!route.active);
        assert_eq!(route.segment, 2);
    }

    #[test]
    fn literals_match_exactly() {
        let matcher = SegmentMatcher::new("/full/:id").unwrap();
        assert!(matcher.route_change(Route::new("/full/3")).unwrap().active);
        assert!(!matcher.route_change(Route::new("/Full/3")).unwrap().active);
        assert!(!matcher.route_change(Route::new("/empty/3")).unwrap().active);
    }

    #[test]
    fn numeric_params_are_integers() {
        let matcher = SegmentMatcher::new("/:page").unwrap();

        let route = matcher.route_change(Route::new("/20160101/staff")).unwrap();
        assert_eq!(route.params["page"], ParamValue::Int(20160101));

        let route = matcher.route_change(Route::new("/-500/staff")).unwrap();
        assert_eq!(route.params["page"], ParamValue::Int(-500));

        let route = matcher.route_change(Route::new("/5-01/staff")).unwrap();
        assert_eq!(route.params["page"], ParamValue::from("5-01"));

        let route = matcher.route_change(Route::new("/staff")).unwrap();
        assert_eq!(route.params["page"], ParamValue::from("staff"));
    }

    #[test]
    fn ancestor_params_win() {
        let matcher = SegmentMatcher::new("/:page").unwrap();
        let route = matcher
            .route_change(Route::new("/reports").with_params(params(&[("page", "home".into())])))
            .unwrap();
        assert_eq!(route.params["page"], ParamValue::from("home"));
        assert_eq!(matcher.params()["page"], ParamValue::from("reports"));
    }

    #[test]
    fn query_is_passed_down() {
        let matcher = SegmentMatcher::new("/:page").unwrap();
        let query = params(&[("date", "20160101".into())]);
        let route = matcher
            .route_change(Route::new("/reports").with_query(query.clone()))
            .unwrap();
        assert_eq!(route.query, query);
        assert_eq!(matcher.query(), query);
    }

    #[test]
    fn query_passed_upwards_when_active() {
        let (matcher, recorder) = attached("/:page");
        matcher.route_change(Route::new("/reports")).unwrap();

        let query = params(&[("date", "20161231".into())]);
        matcher.set_query(query.clone()).unwrap();
        assert_eq!(recorder.take(), vec![RoutePatch::query(query.clone())]);

        // same query again is not a change
        matcher
            .route_change(Route::new("/reports").with_query(query.clone()))
            .unwrap();
        matcher.set_query(query).unwrap();
        assert_eq!(recorder.take(), vec![]);
    }

    #[test]
    fn query_not_passed_upwards_when_inactive() {
        let (matcher, recorder) = attached("/:page");
        matcher
            .set_query(params(&[("date", "20161231".into())]))
            .unwrap();
        assert_eq!(recorder.take(), vec![]);

        matcher.route_change(Route::new("")).unwrap();
        matcher
            .set_query(params(&[("date", "20161231".into())]))
            .unwrap();
        assert_eq!(recorder.take(), vec![]);
    }

    #[test]
    fn param_change_rewrites_path_from_own_depth() {
        let (matcher, recorder) = attached("/:page");
        matcher
            .route_change(Route::new("/reports/bydate").with_segment(2))
            .unwrap();

        matcher
            .set_params([("page", Some(ParamValue::from("query")))])
            .unwrap();
        assert_eq!(recorder.take(), vec![RoutePatch::path(2, "/query/bydate")]);
    }

    #[test]
    fn single_param_change_keeps_the_others() {
        let (matcher, recorder) = attached("/:page/:sub");
        matcher.route_change(Route::new("/reports/bydate")).unwrap();

        matcher
            .set_params([("page", Some(ParamValue::from("query")))])
            .unwrap();
        assert_eq!(recorder.take(), vec![RoutePatch::path(0, "/query/bydate")]);
    }

    #[test]
    fn cleared_leading_param_leaves_a_placeholder() {
        let (matcher, recorder) = attached("/:page/:sub");
        matcher.route_change(Route::new("/reports/bydate")).unwrap();

        matcher
            .set_params([("page", Some(ParamValue::from("")))])
            .unwrap();
        assert_eq!(recorder.take(), vec![RoutePatch::path(0, "//bydate")]);
    }

    #[test]
    fn cleared_trailing_param_collapses() {
        let (matcher, recorder) = attached("/:page/:sub");
        matcher.route_change(Route::new("/reports/bydate")).unwrap();

        matcher.set_params([("sub", None)]).unwrap();
        assert_eq!(recorder.take(), vec![RoutePatch::path(0, "/reports")]);
    }

    #[test]
    fn cleared_param_drops_the_path_below() {
        let (matcher, recorder) = attached("/:page");
        matcher.route_change(Route::new("/reports/bydate")).unwrap();

        matcher.set_params([("page", None)]).unwrap();
        assert_eq!(recorder.take(), vec![RoutePatch::path(0, "/")]);
    }

    #[test]
    fn unchanged_params_emit_nothing() {
        let (matcher, recorder) = attached("/:page");
        matcher.route_change(Route::new("/reports/bydate")).unwrap();

        matcher
            .set_params([("page", Some(ParamValue::from("reports")))])
            .unwrap();
        matcher.set_params(Vec::<(String, _)>::new()).unwrap();
        assert_eq!(recorder.take(), vec![]);
    }

    #[test]
    fn numeric_params_render_as_numbers() {
        let (matcher, recorder) = attached("/:page/:year");
        matcher.route_change(Route::new("/reports/2015")).unwrap();

        matcher
            .set_params([("year", Some(ParamValue::Int(2016)))])
            .unwrap();
        assert_eq!(recorder.take(), vec![RoutePatch::path(0, "/reports/2016")]);
    }

    #[test]
    fn params_can_select_an_unmatched_route() {
        let (matcher, recorder) = attached("/reports/:id");
        matcher
            .route_change(Route::new("/other").with_segment(1))
            .unwrap();

        matcher
            .set_params([("id", Some(ParamValue::Int(5)))])
            .unwrap();
        assert_eq!(recorder.take(), vec![RoutePatch::path(1, "/reports/5")]);
    }

    #[test]
    fn params_ignored_while_inactive() {
        let (matcher, recorder) = attached("/:page");
        matcher
            .set_params([("page", Some(ParamValue::from("query")))])
            .unwrap();

        matcher
            .route_change(Route::new("/reports").with_active(false))
            .unwrap();
        matcher
            .set_params([("page", Some(ParamValue::from("query")))])
            .unwrap();
        assert_eq!(recorder.take(), vec![]);
    }

    #[test]
    fn boolean_param_is_rejected() {
        let (matcher, recorder) = attached("/:page");
        matcher.route_change(Route::new("/reports/bydate")).unwrap();

        let result = matcher.set_params([("page", Some(ParamValue::Bool(true)))]);
        assert_eq!(
            result,
            Err(RouteError::InvalidParam {
                key: "page".into(),
                value: "true".into()
            })
        );
        assert_eq!(recorder.take(), vec![]);
    }

    #[test]
    fn connection_ignored_when_parent_inactive() {
        let (matcher, recorder) = attached("/full");
        matcher
            .route_change(Route::new("/reports").with_active(false))
            .unwrap();

        matcher.set_connection(true).unwrap();
        matcher.set_connection(false).unwrap();
        assert_eq!(recorder.take(), vec![]);
    }

    #[test]
    fn connection_already_active() {
        let (matcher, recorder) = attached("/full");
        matcher.route_change(Route::new("/full")).unwrap();

        matcher.set_connection(true).unwrap();
        assert_eq!(recorder.take(), vec![]);
    }

    #[test]
    fn connection_selects_own_path() {
        let (matcher, recorder) = attached("/full");
        matcher.route_change(Route::new("/empty")).unwrap();

        matcher.set_connection(true).unwrap();
        assert_eq!(recorder.take(), vec![RoutePatch::path(0, "/full")]);
    }

    #[test]
    fn connection_already_inactive() {
        let (matcher, recorder) = attached("/full");
        matcher.route_change(Route::new("/empty")).unwrap();

        matcher.set_connection(false).unwrap();
        assert_eq!(recorder.take(), vec![]);
    }

    #[test]
    fn connection_deselects_own_path() {
        let (matcher, recorder) = attached("/full");
        matcher.route_change(Route::new("/full")).unwrap();

        matcher.set_connection(false).unwrap();
        assert_eq!(recorder.take(), vec![RoutePatch::path(0, "/")]);
    }

    #[test]
    fn connection_needs_a_literal_pattern() {
        let (matcher, _) = attached("/:page");
        matcher.route_change(Route::new("/reports")).unwrap();
        assert!(matches!(
            matcher.set_connection(false),
            Err(RouteError::ParameterizedConnection { .. })
        ));
    }

    #[test]
    fn children_patches_are_forwarded() {
        let (parent, recorder) = attached("/:page");
        let parent = Rc::new(parent);
        let child = SegmentMatcher::new("/full").unwrap();
        child.attach(parent.clone());

        let out = parent.route_change(Route::new("/reports")).unwrap();
        child.route_change(out).unwrap();

        child.set_connection(true).unwrap();
        assert_eq!(recorder.take(), vec![RoutePatch::path(1, "/full")]);
    }
}
