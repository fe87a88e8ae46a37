//! Viewport change coordination: debounce bounds notifications, skip sub-threshold
//! jitter, and apply only the newest aggregate response.

use crate::epoch::{RequestEpoch, RequestToken};
use crate::error::ApiError;
use crate::models::{BoundsQuery, MapPoint, SpanDelta, ViewportBounds, ViewportChange};
use crate::timer::{SingleSlotTimer, TimerPoll};

/// Quiet period after the last bounds notification before data is requested.
pub const SETTLE_DELAY_MS: f64 = 1000.0;

/// Summed edge movement (degrees) on either axis required to refetch.
pub const SIGNIFICANT_CHANGE_DEGREES: f64 = 1.0;

/// Summed absolute movement of the bounding edges between two viewports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsShift {
    /// `|Δnorth| + |Δsouth|`
    pub lat: f64,
    /// `|Δeast| + |Δwest|`
    pub lng: f64,
}

pub fn bounds_shift(previous: &ViewportBounds, next: &ViewportBounds) -> BoundsShift {
    BoundsShift {
        lat: (next.north - previous.north).abs() + (next.south - previous.south).abs(),
        lng: (next.east - previous.east).abs() + (next.west - previous.west).abs(),
    }
}

/// Whether `next` moved far enough from the last fetched bounds to warrant a new request.
/// With nothing fetched yet the answer is always yes.
pub fn is_significant_change(
    last_fetched: Option<&ViewportBounds>,
    next: &ViewportBounds,
    threshold: f64,
) -> bool {
    match last_fetched {
        None => true,
        Some(previous) => {
            let shift = bounds_shift(previous, next);
            shift.lat > threshold || shift.lng > threshold
        }
    }
}

/// An aggregate request the caller must perform and report back via [`ViewportCoordinator::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub token: RequestToken,
    pub bounds: ViewportBounds,
    pub query: BoundsQuery,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettleOutcome {
    /// No notification is waiting.
    Idle,
    /// Input has not been quiet long enough yet.
    Pending { remaining_ms: f64 },
    /// Settled, but the viewport barely moved since the last fetch.
    /// Any fetch still in flight is dropped when it lands.
    BelowThreshold,
    Fetch(FetchTicket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchResolution {
    /// Points replaced and bounds recorded as last fetched.
    Applied { points: usize },
    /// The request failed; the point set is now empty.
    Cleared,
    /// A newer request was issued since; the response was ignored.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinatorSettings {
    pub settle_delay_ms: f64,
    pub threshold_degrees: f64,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        CoordinatorSettings {
            settle_delay_ms: SETTLE_DELAY_MS,
            threshold_degrees: SIGNIFICANT_CHANGE_DEGREES,
        }
    }
}

/// Owns the current point set and decides when the viewport warrants a refetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportCoordinator {
    settle: SingleSlotTimer,
    threshold: f64,
    zoom: Option<f64>,
    bounds: Option<ViewportBounds>,
    delta: SpanDelta,
    last_fetched: Option<ViewportBounds>,
    epoch: RequestEpoch,
    points: Vec<MapPoint>,
}

impl Default for ViewportCoordinator {
    fn default() -> Self {
        Self::new(CoordinatorSettings::default())
    }
}

impl ViewportCoordinator {
    pub fn new(settings: CoordinatorSettings) -> Self {
        ViewportCoordinator {
            settle: SingleSlotTimer::new(settings.settle_delay_ms),
            threshold: settings.threshold_degrees,
            zoom: None,
            bounds: None,
            delta: SpanDelta::default(),
            last_fetched: None,
            epoch: RequestEpoch::default(),
            points: Vec::new(),
        }
    }

    /// Record a bounds/zoom notification and restart the settle timer.
    ///
    /// Returns how long the caller should wait before calling [`Self::settle`].
    pub fn on_viewport_changed(&mut self, change: ViewportChange, now_ms: f64) -> f64 {
        self.zoom = Some(change.zoom);
        self.bounds = Some(change.bounds);
        self.delta = change.bounds.span();
        self.settle.arm(now_ms)
    }

    /// Check the settle timer; once due, decide whether to fetch the latest bounds.
    pub fn settle(&mut self, now_ms: f64) -> SettleOutcome {
        match self.settle.poll(now_ms) {
            TimerPoll::Idle => SettleOutcome::Idle,
            TimerPoll::Pending { remaining_ms } => SettleOutcome::Pending { remaining_ms },
            TimerPoll::Due => {
                let Some(bounds) = self.bounds else {
                    return SettleOutcome::Idle;
                };
                if !is_significant_change(self.last_fetched.as_ref(), &bounds, self.threshold) {
                    // Back near the displayed data: a fetch still in flight is for elsewhere.
                    self.epoch.retire();
                    return SettleOutcome::BelowThreshold;
                }
                SettleOutcome::Fetch(FetchTicket {
                    token: self.epoch.issue(),
                    bounds,
                    query: bounds.to_query(),
                })
            }
        }
    }

    /// Apply the outcome of a fetch issued by [`Self::settle`].
    pub fn resolve(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<MapPoint>, ApiError>,
    ) -> FetchResolution {
        if !self.epoch.is_current(ticket.token) {
            return FetchResolution::Stale;
        }
        match result {
            Ok(points) => {
                let count = points.len();
                self.points = points;
                self.last_fetched = Some(ticket.bounds);
                FetchResolution::Applied { points: count }
            }
            Err(_) => {
                self.points.clear();
                FetchResolution::Cleared
            }
        }
    }

    /// Stop the settle timer and ignore any response still in flight.
    pub fn teardown(&mut self) {
        self.settle.disarm();
        self.epoch.retire();
    }

    pub fn points(&self) -> &[MapPoint] {
        &self.points
    }

    pub fn zoom(&self) -> Option<f64> {
        self.zoom
    }

    pub fn bounds(&self) -> Option<ViewportBounds> {
        self.bounds
    }

    pub fn delta(&self) -> SpanDelta {
        self.delta
    }

    pub fn last_fetched(&self) -> Option<ViewportBounds> {
        self.last_fetched
    }

    pub fn is_settling(&self) -> bool {
        self.settle.is_armed()
    }
}
