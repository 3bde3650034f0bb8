//! A router where every route component owns one slice of the url.
//!
//! Instead of one central route table, routing is spread over a chain of [`SegmentMatcher`]s.
//! Each consumes the segments its pattern describes, captures its params and hands the remainder
//! down to the next matcher. Changes flow the other way: a matcher emits a [`RoutePatch`]
//! anchored at its depth, which travels up through its parents to the [`EventBus`] and from there
//! to the [`LocationSynchronizer`], which rewrites the url through a [`History`].
//!
//! ```rust
//! # use std::rc::Rc;
//! # use distributed_router::prelude::*;
//! let history = Rc::new(MemoryHistory::with_initial_url("http://localhost/reports").unwrap());
//! let bus = EventBus::new();
//!
//! let page = Rc::new(SegmentMatcher::new("/:page").unwrap());
//! page.attach(Rc::new(bus.clone()));
//!
//! let sync = LocationSynchronizer::new(history.clone(), bus.clone(), RouterConfig::default());
//! let matcher = page.clone();
//! sync.connect(move |route| {
//!     matcher.route_change(route).unwrap();
//! });
//! bus.run_pending();
//! assert_eq!(page.params()["page"], ParamValue::from("reports"));
//!
//! page.set_params([("page", Some(ParamValue::from("staff")))]).unwrap();
//! assert_eq!(history.current_url().path(), "/staff");
//! assert_eq!(page.params()["page"], ParamValue::from("staff"));
//! ```
#![warn(missing_docs)]

mod bus;
pub mod clock;
mod config;
mod error;
mod location;
mod matcher;
pub mod pattern;
pub mod query;
mod route;

pub use bus::{EventBus, ListenerId, PatchSink};
pub use config::{DwellTime, RouterConfig};
pub use error::{Result, RouteError};
pub use location::LocationSynchronizer;
pub use matcher::SegmentMatcher;
pub use route::{ParamValue, Params, Query, Route, RoutePatch};

pub use distributed_router_history::{History, MemoryHistory};

/// A collection of useful items most applications might need.
pub mod prelude {
    pub use crate::bus::{EventBus, PatchSink};
    pub use crate::config::{DwellTime, RouterConfig};
    pub use crate::error::RouteError;
    pub use crate::location::LocationSynchronizer;
    pub use crate::matcher::SegmentMatcher;
    pub use crate::route::{ParamValue, Params, Query, Route, RoutePatch};
    pub use distributed_router_history::{History, MemoryHistory};
}
