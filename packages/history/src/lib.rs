//! History Integration
//!
//! The distributed router never touches a browser directly. It reads and writes the address through
//! a [`History`], which stores the current URL and possibly a history (i.e. a browsers back button)
//! and future (i.e. a browsers forward button).
//!
//! To integrate the router with any kind of history, implement the [`History`] trait. This crate
//! ships one implementation, [`MemoryHistory`], which keeps everything in memory.
#![warn(missing_docs)]

use std::rc::Rc;

use url::Url;

mod memory;
pub use memory::*;

/// An integration with some kind of navigation history.
///
/// The described behaviors are designed to mimic a web browser's History API. Implementations may
/// deviate, but should document it.
pub trait History {
    /// Get the full current URL, including query and fragment.
    ///
    /// ```rust
    /// # use distributed_router_history::{History, MemoryHistory};
    /// let history = MemoryHistory::default();
    /// assert_eq!(history.current_url().path(), "/");
    /// ```
    #[must_use]
    fn current_url(&self) -> Url;

    /// Check whether there is a previous entry to navigate back to.
    ///
    /// If a [`History`] cannot know this, it should return [`true`].
    #[must_use]
    fn can_go_back(&self) -> bool {
        true
    }

    /// Go back to the previous entry.
    ///
    /// Like the browser's `popstate`, this is a foreign navigation: the updater callback must be
    /// invoked once the current URL has changed.
    fn go_back(&self);

    /// Check whether there is a future entry to navigate forward to.
    ///
    /// If a [`History`] cannot know this, it should return [`true`].
    #[must_use]
    fn can_go_forward(&self) -> bool {
        true
    }

    /// Go forward to the next entry. Invokes the updater like [`History::go_back`].
    fn go_forward(&self);

    /// Add a new entry for `url` and make it current, clearing the navigation future.
    ///
    /// This is not a foreign navigation and must not invoke the updater.
    ///
    /// ```rust
    /// # use distributed_router_history::{History, MemoryHistory};
    /// let history = MemoryHistory::default();
    /// let next = history.current_url().join("/some-other-page").unwrap();
    ///
    /// history.push(next);
    /// assert_eq!(history.current_url().path(), "/some-other-page");
    /// assert!(history.can_go_back());
    /// ```
    fn push(&self, url: Url);

    /// Overwrite the current entry with `url`. The history and future stay untouched.
    ///
    /// ```rust
    /// # use distributed_router_history::{History, MemoryHistory};
    /// let history = MemoryHistory::default();
    /// let next = history.current_url().join("/some-other-page").unwrap();
    ///
    /// history.replace(next);
    /// assert_eq!(history.current_url().path(), "/some-other-page");
    /// assert!(!history.can_go_back());
    /// ```
    fn replace(&self, url: Url);

    /// Provide the [`History`] with an update callback.
    ///
    /// Some [`History`]s receive URL updates from outside the router (back/forward buttons, hash
    /// changes, the user editing the address). When that happens they should call `callback`.
    /// Registering a new callback replaces the previous one.
    #[allow(unused_variables)]
    fn updater(&self, callback: Rc<dyn Fn()>) {}
}
