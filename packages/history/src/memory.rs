use std::{cell::RefCell, rc::Rc};

use tracing::error;
use url::Url;

use crate::History;

struct MemoryHistoryState {
    current: Url,
    history: Vec<Url>,
    future: Vec<Url>,
}

/// A [`History`] that stores all navigation information in memory.
///
/// Besides the [`History`] methods it can simulate the user typing into the address bar with
/// [`MemoryHistory::visit`].
pub struct MemoryHistory {
    state: RefCell<MemoryHistoryState>,
    updater: RefCell<Option<Rc<dyn Fn()>>>,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::with_initial_url(Self::DEFAULT_URL)
            .unwrap_or_else(|err| panic!("default url does not parse: {err}"))
    }
}

impl MemoryHistory {
    /// The URL a default [`MemoryHistory`] starts at.
    pub const DEFAULT_URL: &'static str = "http://localhost/";

    /// Create a [`MemoryHistory`] starting at `url`, which must be absolute.
    ///
    /// ```rust
    /// # use distributed_router_history::{History, MemoryHistory};
    /// let history = MemoryHistory::with_initial_url("http://localhost/reports?page=2").unwrap();
    /// assert_eq!(history.current_url().path(), "/reports");
    /// assert_eq!(history.can_go_back(), false);
    /// ```
    pub fn with_initial_url(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            state: MemoryHistoryState {
                current: Url::parse(url)?,
                history: Vec::new(),
                future: Vec::new(),
            }
            .into(),
            updater: RefCell::new(None),
        })
    }

    /// Simulate a manual edit of the address: `location` is resolved against the current URL,
    /// pushed as a new entry and the updater is notified.
    pub fn visit(&self, location: &str) -> Result<(), url::ParseError> {
        let url = self.state.borrow().current.join(location)?;
        self.push(url);
        self.notify();
        Ok(())
    }

    /// Number of entries behind the current one.
    #[must_use]
    pub fn back_len(&self) -> usize {
        self.state.borrow().history.len()
    }

    /// Number of entries ahead of the current one.
    #[must_use]
    pub fn forward_len(&self) -> usize {
        self.state.borrow().future.len()
    }

    fn notify(&self) {
        // clone out so the callback may freely read or write this history
        let updater = self.updater.borrow().clone();
        if let Some(callback) = updater {
            callback();
        }
    }
}

impl History for MemoryHistory {
    fn current_url(&self) -> Url {
        self.state.borrow().current.clone()
    }

    fn can_go_back(&self) -> bool {
        !self.state.borrow().history.is_empty()
    }

    fn go_back(&self) {
        {
            let mut write = self.state.borrow_mut();
            let Some(last) = write.history.pop() else {
                return;
            };
            let old = std::mem::replace(&mut write.current, last);
            write.future.push(old);
        }
        self.notify();
    }

    fn can_go_forward(&self) -> bool {
        !self.state.borrow().future.is_empty()
    }

    fn go_forward(&self) {
        {
            let mut write = self.state.borrow_mut();
            let Some(next) = write.future.pop() else {
                return;
            };
            let old = std::mem::replace(&mut write.current, next);
            write.history.push(old);
        }
        self.notify();
    }

    fn push(&self, url: Url) {
        let mut write = self.state.borrow_mut();
        if url.origin() != write.current.origin() {
            error!("cannot push a url from another origin: {url}");
            return;
        }
        let old = std::mem::replace(&mut write.current, url);
        write.history.push(old);
        write.future.clear();
    }

    fn replace(&self, url: Url) {
        let mut write = self.state.borrow_mut();
        if url.origin() != write.current.origin() {
            error!("cannot replace with a url from another origin: {url}");
            return;
        }
        write.current = url;
    }

    fn updater(&self, callback: Rc<dyn Fn()>) {
        *self.updater.borrow_mut() = Some(callback);
    }
}
