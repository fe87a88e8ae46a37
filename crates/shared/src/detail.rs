//! Hover/click driven detail popup: which point is selected, what its roster
//! request returned, and when the popup goes away.

use serde_json::Value;

use crate::agent::AgentRecord;
use crate::epoch::{RequestEpoch, RequestToken};
use crate::error::ApiError;
use crate::models::{DetailQuery, MapPoint};
use crate::timer::{SingleSlotTimer, TimerPoll};

/// Grace period after the pointer leaves a marker or the popup before it hides.
pub const DISMISS_DELAY_MS: f64 = 1000.0;

const SUCCESS_STATUS: &str = "success";

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetailState {
    /// Nothing requested (no selection, or a district is selected).
    #[default]
    Idle,
    Loading,
    Loaded(Vec<AgentRecord>),
    /// The roster came back empty or could not be fetched.
    Empty,
    Dismissed,
}

/// A roster request the caller must perform and report back via [`DetailSession::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct DetailTicket {
    pub token: RequestToken,
    pub query: DetailQuery,
}

/// Extract the roster from a detail response body.
///
/// `{"status": "success", "response": [...]}` is the only accepted shape; a missing or
/// null `response` alongside a success status is an empty roster.
pub fn parse_detail_response(body: &Value) -> Result<Vec<AgentRecord>, ApiError> {
    let Value::Object(map) = body else {
        return Err(ApiError::Shape("detail response is not an object".to_string()));
    };
    match map.get("status").and_then(Value::as_str) {
        Some(SUCCESS_STATUS) => {}
        Some(other) => return Err(ApiError::Rejected(other.to_string())),
        None => return Err(ApiError::Shape("missing status".to_string())),
    }
    match map.get("response") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Object(fields) => Ok(AgentRecord(fields.clone())),
                _ => Err(ApiError::Shape("agent record is not an object".to_string())),
            })
            .collect(),
        Some(_) => Err(ApiError::Shape("response is not an array".to_string())),
    }
}

/// Transient popup state for one map instance.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailSession {
    selected: Option<MapPoint>,
    tooltip_visible: bool,
    state: DetailState,
    dismissal: SingleSlotTimer,
    epoch: RequestEpoch,
}

impl Default for DetailSession {
    fn default() -> Self {
        Self::new(DISMISS_DELAY_MS)
    }
}

impl DetailSession {
    pub fn new(dismiss_delay_ms: f64) -> Self {
        DetailSession {
            selected: None,
            tooltip_visible: false,
            state: DetailState::Idle,
            dismissal: SingleSlotTimer::new(dismiss_delay_ms),
            epoch: RequestEpoch::default(),
        }
    }

    /// Pointer entered a marker. Localities start a roster fetch; districts only show a summary.
    pub fn hover(&mut self, point: &MapPoint) -> Option<DetailTicket> {
        self.dismissal.disarm();
        self.selected = Some(point.clone());
        self.tooltip_visible = true;
        match point.detail_query() {
            Some(query) => {
                self.state = DetailState::Loading;
                Some(DetailTicket {
                    token: self.epoch.issue(),
                    query,
                })
            }
            None => {
                // Drop interest in a roster requested for a previously hovered locality.
                self.epoch.retire();
                self.state = DetailState::Idle;
                None
            }
        }
    }

    /// Click on a marker. Districts are ignored entirely until the user zooms to localities.
    pub fn click(&mut self, point: &MapPoint) -> Option<DetailTicket> {
        if !point.is_locality() {
            return None;
        }
        self.hover(point)
    }

    /// Pointer left a marker. Returns how long to wait before polling the dismissal.
    pub fn pointer_out(&mut self, now_ms: f64) -> f64 {
        self.dismissal.arm(now_ms)
    }

    /// Pointer entered the popup; a pending dismissal is cancelled.
    pub fn popup_enter(&mut self) {
        self.dismissal.disarm();
    }

    pub fn popup_leave(&mut self, now_ms: f64) -> f64 {
        self.dismissal.arm(now_ms)
    }

    /// Check the dismissal timer, hiding the popup if it is due.
    pub fn poll_dismissal(&mut self, now_ms: f64) -> TimerPoll {
        let poll = self.dismissal.poll(now_ms);
        if poll == TimerPoll::Due {
            self.dismiss();
        }
        poll
    }

    /// Hide immediately (close button).
    pub fn close(&mut self) {
        self.dismissal.disarm();
        self.dismiss();
    }

    fn dismiss(&mut self) {
        self.tooltip_visible = false;
        self.selected = None;
        self.state = DetailState::Dismissed;
        self.epoch.retire();
    }

    /// Apply a roster response. Returns false when the response was for an outdated request.
    pub fn resolve(
        &mut self,
        token: RequestToken,
        result: Result<Vec<AgentRecord>, ApiError>,
    ) -> bool {
        if !self.epoch.is_current(token) {
            return false;
        }
        self.state = match result {
            Ok(agents) if !agents.is_empty() => DetailState::Loaded(agents),
            Ok(_) | Err(_) => DetailState::Empty,
        };
        true
    }

    /// Stop the dismissal timer and ignore any roster still in flight.
    pub fn teardown(&mut self) {
        self.dismissal.disarm();
        self.epoch.retire();
    }

    /// The point whose popup should be shown, if any.
    pub fn visible_point(&self) -> Option<&MapPoint> {
        if self.tooltip_visible {
            self.selected.as_ref()
        } else {
            None
        }
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn is_dismissal_pending(&self) -> bool {
        self.dismissal.is_armed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PointKind;
    use serde_json::json;

    fn locality() -> MapPoint {
        MapPoint {
            lat: 18.52,
            lng: 73.85,
            weight: 4.0,
            name: "Shivajinagar".to_string(),
            kind: PointKind::Locality,
        }
    }

    fn district() -> MapPoint {
        MapPoint {
            lat: 19.75,
            lng: 75.71,
            weight: 10.0,
            name: "Aurangabad".to_string(),
            kind: PointKind::District,
        }
    }

    fn roster() -> Vec<AgentRecord> {
        parse_detail_response(&json!({
            "status": "success",
            "response": [{"first_name": "Asha", "last_name": "Patil"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_hover_district_never_fetches() {
        let mut session = DetailSession::default();
        assert!(session.hover(&district()).is_none());
        assert_eq!(session.state(), &DetailState::Idle);
        assert_eq!(session.visible_point().map(|p| p.name.as_str()), Some("Aurangabad"));
    }

    #[test]
    fn test_hover_locality_fetches_by_coordinates() {
        let mut session = DetailSession::default();
        let ticket = session.hover(&locality()).unwrap();
        assert_eq!(ticket.query.lat, 18.52);
        assert_eq!(ticket.query.lon, 73.85);
        assert_eq!(ticket.query.coordinate_type, "locality");
        assert_eq!(session.state(), &DetailState::Loading);
    }

    #[test]
    fn test_click_district_is_noop() {
        let mut session = DetailSession::default();
        let ticket = session.hover(&locality()).unwrap();
        session.resolve(ticket.token, Ok(roster()));
        let before = session.clone();
        assert!(session.click(&district()).is_none());
        assert_eq!(session, before);
    }

    #[test]
    fn test_click_locality_fetches() {
        let mut session = DetailSession::default();
        assert!(session.click(&locality()).is_some());
        assert_eq!(session.state(), &DetailState::Loading);
    }

    #[test]
    fn test_success_with_agents_is_loaded() {
        let mut session = DetailSession::default();
        let ticket = session.hover(&locality()).unwrap();
        assert!(session.resolve(ticket.token, Ok(roster())));
        match session.state() {
            DetailState::Loaded(agents) => assert_eq!(agents[0].full_name(), "Asha Patil"),
            other => panic!("expected loaded, got {other:?}"),
        }
    }

    #[test]
    fn test_success_with_empty_roster_is_empty() {
        let mut session = DetailSession::default();
        let ticket = session.hover(&locality()).unwrap();
        let agents = parse_detail_response(&json!({"status": "success", "response": []}));
        session.resolve(ticket.token, agents);
        assert_eq!(session.state(), &DetailState::Empty);
        assert_ne!(session.state(), &DetailState::Loading);
    }

    #[test]
    fn test_failure_is_shown_as_empty() {
        let mut session = DetailSession::default();
        let ticket = session.hover(&locality()).unwrap();
        session.resolve(ticket.token, Err(ApiError::Transport("offline".to_string())));
        assert_eq!(session.state(), &DetailState::Empty);
    }

    #[test]
    fn test_new_hover_clears_previous_payload() {
        let mut session = DetailSession::default();
        let ticket = session.hover(&locality()).unwrap();
        session.resolve(ticket.token, Ok(roster()));
        session.hover(&locality());
        assert_eq!(session.state(), &DetailState::Loading);
    }

    #[test]
    fn test_stale_roster_is_discarded() {
        let mut session = DetailSession::default();
        let first = session.hover(&locality()).unwrap();
        let second = session.hover(&locality()).unwrap();
        assert!(!session.resolve(first.token, Ok(roster())));
        assert_eq!(session.state(), &DetailState::Loading);
        assert!(session.resolve(second.token, Ok(Vec::new())));
        assert_eq!(session.state(), &DetailState::Empty);
    }

    #[test]
    fn test_roster_after_moving_to_district_is_discarded() {
        let mut session = DetailSession::default();
        let ticket = session.hover(&locality()).unwrap();
        session.hover(&district());
        assert!(!session.resolve(ticket.token, Ok(roster())));
        assert_eq!(session.state(), &DetailState::Idle);
    }

    #[test]
    fn test_pointer_out_dismisses_after_delay() {
        let mut session = DetailSession::default();
        session.hover(&locality());
        assert_eq!(session.pointer_out(0.0), DISMISS_DELAY_MS);
        assert!(matches!(session.poll_dismissal(999.0), TimerPoll::Pending { .. }));
        assert!(session.visible_point().is_some());
        assert_eq!(session.poll_dismissal(1000.0), TimerPoll::Due);
        assert!(session.visible_point().is_none());
        assert_eq!(session.state(), &DetailState::Dismissed);
    }

    #[test]
    fn test_reenter_popup_within_grace_keeps_it_open() {
        let mut session = DetailSession::default();
        let ticket = session.hover(&locality()).unwrap();
        session.resolve(ticket.token, Ok(roster()));
        session.pointer_out(0.0);
        assert_eq!(
            session.poll_dismissal(400.0),
            TimerPoll::Pending { remaining_ms: 600.0 }
        );
        session.popup_enter();
        assert_eq!(session.poll_dismissal(1500.0), TimerPoll::Idle);
        assert_eq!(session.poll_dismissal(2000.0), TimerPoll::Idle);
        assert!(session.visible_point().is_some());
        assert!(matches!(session.state(), DetailState::Loaded(_)));
    }

    #[test]
    fn test_popup_leave_rearms_dismissal() {
        let mut session = DetailSession::default();
        session.hover(&locality());
        session.pointer_out(0.0);
        session.popup_enter();
        session.popup_leave(3000.0);
        assert!(session.is_dismissal_pending());
        assert_eq!(session.poll_dismissal(4000.0), TimerPoll::Due);
        assert!(session.visible_point().is_none());
    }

    #[test]
    fn test_hover_cancels_pending_dismissal() {
        let mut session = DetailSession::default();
        session.hover(&locality());
        session.pointer_out(0.0);
        session.hover(&district());
        assert_eq!(session.poll_dismissal(5000.0), TimerPoll::Idle);
        assert!(session.visible_point().is_some());
    }

    #[test]
    fn test_roster_after_dismissal_is_discarded() {
        let mut session = DetailSession::default();
        let ticket = session.hover(&locality()).unwrap();
        session.close();
        assert!(!session.resolve(ticket.token, Ok(roster())));
        assert_eq!(session.state(), &DetailState::Dismissed);
        assert!(session.visible_point().is_none());
    }

    #[test]
    fn test_teardown() {
        let mut session = DetailSession::default();
        let ticket = session.hover(&locality()).unwrap();
        session.pointer_out(0.0);
        session.teardown();
        assert!(!session.is_dismissal_pending());
        assert!(!session.resolve(ticket.token, Ok(roster())));
    }

    #[test]
    fn test_parse_detail_response_shapes() {
        assert_eq!(
            parse_detail_response(&json!({"status": "success"})).unwrap(),
            Vec::<AgentRecord>::new()
        );
        assert_eq!(
            parse_detail_response(&json!({"status": "error", "response": []})),
            Err(ApiError::Rejected("error".to_string()))
        );
        assert!(matches!(
            parse_detail_response(&json!([{"first_name": "A"}])),
            Err(ApiError::Shape(_))
        ));
        assert!(matches!(
            parse_detail_response(&json!({"status": "success", "response": {"a": 1}})),
            Err(ApiError::Shape(_))
        ));
        assert!(matches!(
            parse_detail_response(&json!({"status": "success", "response": ["x"]})),
            Err(ApiError::Shape(_))
        ));
        assert!(matches!(
            parse_detail_response(&json!({"response": []})),
            Err(ApiError::Shape(_))
        ));
    }
}
