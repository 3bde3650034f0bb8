use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
    time::Instant,
};

use distributed_router_history::History;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use tracing::{debug, trace, warn};
use url::Url;

use crate::{
    bus::{EventBus, ListenerId},
    config::RouterConfig,
    error::{Result, RouteError},
    query,
    route::{Route, RoutePatch},
};

/// Characters escaped when a decoded segment is written back into a url path.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Default)]
struct SyncState {
    route: Option<Route>,
    /// [`None`] means the dwell window has expired.
    last_changed_at: Option<Instant>,
    callback: Option<Rc<dyn Fn(Route)>>,
    registrations: Vec<ListenerId>,
}

/// Keeps a [`History`] and the root of a matcher chain in sync.
///
/// Reading: whenever the url changes (a foreign navigation, a `location-altered` signal or a patch
/// it applied itself) the synchronizer derives a root [`Route`] and hands it to its callback.
///
/// Writing: patches coming up from the matchers through the [`EventBus`] are applied to the url.
/// Changes that follow each other within the [dwell window](crate::DwellTime) replace the current
/// history entry instead of pushing a new one, so a burst of edits costs a single back-button
/// press.
///
/// ```rust
/// # use std::{cell::RefCell, rc::Rc};
/// # use distributed_router::{EventBus, LocationSynchronizer, MemoryHistory, PatchSink, RoutePatch, RouterConfig};
/// let history = Rc::new(MemoryHistory::with_initial_url("http://localhost/reports").unwrap());
/// let bus = EventBus::new();
/// let sync = LocationSynchronizer::new(history.clone(), bus.clone(), RouterConfig::default());
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let log = seen.clone();
/// sync.connect(move |route| log.borrow_mut().push(route.path));
///
/// // the first route arrives on the next turn
/// bus.run_pending();
/// bus.dispatch(RoutePatch::path(1, "/bydate")).unwrap();
///
/// assert_eq!(*seen.borrow(), ["/reports", "/reports/bydate"]);
/// ```
pub struct LocationSynchronizer {
    history: Rc<dyn History>,
    bus: EventBus,
    config: RouterConfig,
    /// Bumped on every connect so stale deferred work can tell it is stale.
    session: Cell<u64>,
    connected: Cell<bool>,
    state: RefCell<SyncState>,
}

impl LocationSynchronizer {
    /// Create a synchronizer. Nothing happens until [`LocationSynchronizer::connect`].
    pub fn new(history: Rc<dyn History>, bus: EventBus, config: RouterConfig) -> Rc<Self> {
        Rc::new(Self {
            history,
            bus,
            config,
            session: Cell::new(0),
            connected: Cell::new(false),
            state: RefCell::new(SyncState::default()),
        })
    }

    /// Start listening to the url and to patches on the bus, delivering routes to `callback`.
    ///
    /// The first route is derived on the bus's next turn (see [`EventBus::run_pending`]) so that
    /// the rest of the tree can finish wiring itself up first. Connecting again replaces the
    /// previous callback.
    pub fn connect(self: &Rc<Self>, callback: impl Fn(Route) + 'static) {
        if self.connected.get() {
            warn!("location synchronizer connected twice, dropping the previous connection");
            self.disconnect();
        }
        let session = self.session.get() + 1;
        self.session.set(session);
        self.connected.set(true);

        let weak = Rc::downgrade(self);
        self.history.updater(Rc::new(move || {
            if let Some(this) = live(&weak, session) {
                trace!("foreign navigation");
                this.derive_route();
            }
        }));

        let weak = Rc::downgrade(self);
        let altered = self.bus.on_location_altered(move || {
            if let Some(this) = live(&weak, session) {
                this.derive_route();
            }
        });

        let weak = Rc::downgrade(self);
        let patches = self.bus.set_patch_handler(move |patch| match live(&weak, session) {
            Some(this) => this.apply_patch(patch),
            None => Ok(()),
        });

        {
            let mut state = self.state.borrow_mut();
            state.route = None;
            state.callback = Some(Rc::new(callback));
            state.registrations = vec![altered, patches];
        }

        let weak = Rc::downgrade(self);
        self.bus.schedule(move || {
            let Some(this) = live(&weak, session) else {
                trace!("synchronizer disconnected before its first route");
                return;
            };
            this.derive_route();
            // start-up is not a user action, the next change always gets its own entry
            this.state.borrow_mut().last_changed_at = None;
        });
    }

    /// Stop listening. A first route that has not been delivered yet never will be.
    pub fn disconnect(&self) {
        self.connected.set(false);
        let registrations = {
            let mut state = self.state.borrow_mut();
            state.callback = None;
            std::mem::take(&mut state.registrations)
        };
        for id in registrations {
            self.bus.remove_listener(id);
        }
    }

    /// Whether [`LocationSynchronizer::connect`] is in effect.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.get()
    }

    /// The last route derived from the url.
    #[must_use]
    pub fn route(&self) -> Option<Route> {
        self.state.borrow().route.clone()
    }

    /// Read the url and hand a fresh root [`Route`] to the callback if its path or query differ
    /// from the last one. Returns whether a route was delivered.
    ///
    /// A trailing file name (a last segment containing `.`, like `index.html`) is not part of the
    /// route.
    pub fn derive_route(&self) -> bool {
        let url = self.history.current_url();
        let route = Route::root(
            route_path(&url),
            url.query().map(query::decode).unwrap_or_default(),
        );

        let callback = {
            let mut state = self.state.borrow_mut();
            let unchanged = state
                .route
                .as_ref()
                .is_some_and(|last| last.path == route.path && last.query == route.query);
            if unchanged {
                trace!(path = %route.path, "route unchanged");
                return false;
            }
            state.route = Some(route.clone());
            state.last_changed_at = Some(self.config.clock.now());
            state.callback.clone()
        };

        debug!(path = %route.path, query = ?route.query, "derived route");
        if let Some(callback) = callback {
            callback(route);
        }
        true
    }

    /// Apply a patch from a matcher to the url.
    ///
    /// The patch path replaces everything from its segment onwards; empty segments are dropped
    /// from the result. A patch query replaces the whole query.
    pub fn apply_patch(&self, patch: RoutePatch) -> Result<()> {
        let current = self.history.current_url();
        let mut url = current.clone();

        if let Some(path) = &patch.path {
            let segment = patch.segment.ok_or_else(|| RouteError::MissingSegment {
                path: path.clone(),
            })?;
            // anchored against the path the matchers saw, not the raw url
            let canonical = route_path(&current);
            let existing = route_segments(&canonical);
            if segment > existing.len() {
                return Err(RouteError::SegmentOutOfRange {
                    segment,
                    depth: existing.len(),
                });
            }

            let joined = existing[..segment]
                .iter()
                .copied()
                .chain(path.split('/'))
                .filter(|piece| !piece.is_empty())
                .map(|piece| utf8_percent_encode(piece, PATH_SEGMENT).to_string())
                .collect::<Vec<_>>()
                .join("/");
            url.set_path(&format!("/{joined}"));
        }

        if let Some(query) = &patch.query {
            let encoded = query::encode(query);
            url.set_query((!encoded.is_empty()).then_some(encoded.as_str()));
        }

        if url == current {
            trace!(%url, "patch leaves the url unchanged");
            return Ok(());
        }

        let now = self.config.clock.now();
        let dwell = self.config.dwell_time.get();
        let within_dwell = self
            .state
            .borrow()
            .last_changed_at
            .is_some_and(|at| now.saturating_duration_since(at) < dwell);

        if within_dwell {
            debug!(%url, "replacing history entry");
            self.history.replace(url);
        } else {
            debug!(%url, "pushing history entry");
            self.history.push(url);
        }
        self.derive_route();
        Ok(())
    }
}

/// Upgrades `weak` if it still belongs to the connection made in `session`.
fn live(weak: &Weak<LocationSynchronizer>, session: u64) -> Option<Rc<LocationSynchronizer>> {
    weak.upgrade()
        .filter(|this| this.connected.get() && this.session.get() == session)
}

/// A route path split into segments, `/` being a single empty segment.
fn route_segments(path: &str) -> Vec<&str> {
    path.strip_prefix('/').unwrap_or(path).split('/').collect()
}

fn route_path(url: &Url) -> String {
    let decoded = percent_decode_str(url.path()).decode_utf8_lossy();
    let path = match decoded.rsplit_once('/') {
        Some((head, file)) if file.contains('.') => head,
        _ => decoded.as_ref(),
    };
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}
