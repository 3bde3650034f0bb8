//! The glue between matchers and the synchronizer.
//!
//! Patches travel upwards through [`PatchSink`]s: every [`SegmentMatcher`](crate::SegmentMatcher)
//! forwards to its parent, and the topmost one hands them to an [`EventBus`], which delivers them
//! to whichever [`LocationSynchronizer`](crate::LocationSynchronizer) is connected to it.
//!
//! The bus also carries the `location-altered` signal and a queue of deferred work that runs on the
//! host's next turn.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use futures_channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use tracing::{trace, warn};

use crate::{error::Result, route::RoutePatch};

/// Something that accepts patches coming up from below.
pub trait PatchSink {
    /// Deliver `patch`. Errors are contract violations and are reported back to whoever set the
    /// property that produced the patch.
    fn dispatch(&self, patch: RoutePatch) -> Result<()>;
}

/// Identifies a registration on an [`EventBus`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Task = Box<dyn FnOnce()>;
type PatchHandler = Rc<dyn Fn(RoutePatch) -> Result<()>>;

struct BusInner {
    next_id: Cell<u64>,
    patch_handler: RefCell<Option<(ListenerId, PatchHandler)>>,
    location_listeners: RefCell<Vec<(ListenerId, Rc<dyn Fn()>)>>,
    tx: UnboundedSender<Task>,
    rx: RefCell<UnboundedReceiver<Task>>,
}

/// A single-threaded event bus. Cloning it yields another handle to the same bus.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<BusInner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            inner: Rc::new(BusInner {
                next_id: Cell::new(0),
                patch_handler: RefCell::new(None),
                location_listeners: RefCell::new(Vec::new()),
                tx,
                rx: RefCell::new(rx),
            }),
        }
    }

    fn next_id(&self) -> ListenerId {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        ListenerId(id)
    }

    /// Queue `task` to run on the next call to [`EventBus::run_pending`].
    pub fn schedule(&self, task: impl FnOnce() + 'static) {
        // the receiver lives as long as the sender, so this cannot fail
        self.inner.tx.unbounded_send(Box::new(task)).ok();
    }

    /// Run every queued task, including ones queued while draining. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.inner.rx.borrow_mut().try_next();
            match next {
                Ok(Some(task)) => {
                    task();
                    ran += 1;
                }
                _ => break ran,
            }
        }
    }

    /// Subscribe to the `location-altered` signal.
    pub fn on_location_altered(&self, listener: impl Fn() + 'static) -> ListenerId {
        let id = self.next_id();
        self.inner
            .location_listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        id
    }

    /// Tell every subscriber that the location changed behind the router's back, so they can
    /// resynchronize.
    pub fn notify_location_altered(&self) {
        let listeners: Vec<_> = self
            .inner
            .location_listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        trace!("location altered, notifying {} listeners", listeners.len());
        for listener in listeners {
            listener();
        }
    }

    /// Install the handler patches reaching the top of the tree are delivered to. There is only
    /// one; installing another replaces it.
    pub fn set_patch_handler(
        &self,
        handler: impl Fn(RoutePatch) -> Result<()> + 'static,
    ) -> ListenerId {
        let id = self.next_id();
        let previous = self
            .inner
            .patch_handler
            .borrow_mut()
            .replace((id, Rc::new(handler)));
        if previous.is_some() {
            warn!("replacing the patch handler of an event bus");
        }
        id
    }

    /// Remove a registration made with [`EventBus::on_location_altered`] or
    /// [`EventBus::set_patch_handler`]. Unknown ids are ignored.
    pub fn remove_listener(&self, id: ListenerId) {
        self.inner
            .location_listeners
            .borrow_mut()
            .retain(|(listener, _)| *listener != id);

        let mut handler = self.inner.patch_handler.borrow_mut();
        if handler.as_ref().is_some_and(|(current, _)| *current == id) {
            *handler = None;
        }
    }
}

impl PatchSink for EventBus {
    fn dispatch(&self, patch: RoutePatch) -> Result<()> {
        let handler = self
            .inner
            .patch_handler
            .borrow()
            .as_ref()
            .map(|(_, handler)| handler.clone());
        match handler {
            Some(handler) => handler(patch),
            None => {
                trace!(?patch, "no location synchronizer connected, dropping patch");
                Ok(())
            }
        }
    }
}
