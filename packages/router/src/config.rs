use std::{cell::Cell, rc::Rc, time::Duration};

use tracing::warn;

use crate::clock::{Clock, SystemClock};

/// A shared, adjustable dwell window.
///
/// Navigations that land within this long of the previous route change replace the current
/// history entry instead of pushing a new one. Every clone refers to the same value and the
/// synchronizer reads it at each decision, so it can be changed mid-session.
#[derive(Clone, Debug)]
pub struct DwellTime(Rc<Cell<Duration>>);

impl Default for DwellTime {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl DwellTime {
    /// Two seconds.
    pub const DEFAULT: Duration = Duration::from_millis(2000);

    /// A dwell window of `duration`.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self(Rc::new(Cell::new(duration)))
    }

    /// The current window.
    #[must_use]
    pub fn get(&self) -> Duration {
        self.0.get()
    }

    /// Change the window for every holder of this handle.
    pub fn set(&self, duration: Duration) {
        self.0.set(duration);
    }

    /// Apply a stored setting holding whole milliseconds, such as a value kept in local storage.
    ///
    /// A missing setting restores the default. So does one that does not parse, which is logged.
    ///
    /// ```rust
    /// # use std::time::Duration;
    /// # use distributed_router::DwellTime;
    /// let dwell = DwellTime::default();
    /// dwell.set_from_setting(Some("500"));
    /// assert_eq!(dwell.get(), Duration::from_millis(500));
    ///
    /// dwell.set_from_setting(Some("soon"));
    /// assert_eq!(dwell.get(), DwellTime::DEFAULT);
    /// ```
    pub fn set_from_setting(&self, setting: Option<&str>) {
        let duration = match setting.map(|raw| raw.trim().parse::<u64>()) {
            None => Self::DEFAULT,
            Some(Ok(millis)) => Duration::from_millis(millis),
            Some(Err(err)) => {
                warn!("ignoring dwell time setting {setting:?}: {err}");
                Self::DEFAULT
            }
        };
        self.set(duration);
    }
}

/// Configuration for a [`LocationSynchronizer`](crate::LocationSynchronizer).
///
/// This implements [`Default`] and follows the builder pattern:
/// ```rust
/// # use std::{rc::Rc, time::Duration};
/// # use distributed_router::{clock::ManualClock, DwellTime, RouterConfig};
/// let dwell = DwellTime::new(Duration::from_millis(500));
/// let config = RouterConfig::default()
///     .dwell_time(dwell.clone())
///     .clock(Rc::new(ManualClock::new()));
///
/// // still adjustable afterwards
/// dwell.set(Duration::from_secs(1));
/// ```
#[derive(Clone)]
pub struct RouterConfig {
    pub(crate) dwell_time: DwellTime,
    pub(crate) clock: Rc<dyn Clock>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            dwell_time: DwellTime::default(),
            clock: Rc::new(SystemClock),
        }
    }
}

impl RouterConfig {
    /// The dwell window handle to consult on each navigation.
    ///
    /// Defaults to [`DwellTime::DEFAULT`].
    pub fn dwell_time(self, dwell_time: DwellTime) -> Self {
        Self { dwell_time, ..self }
    }

    /// The time source for dwell decisions.
    ///
    /// Defaults to [`SystemClock`].
    pub fn clock(self, clock: Rc<dyn Clock>) -> Self {
        Self { clock, ..self }
    }
}
