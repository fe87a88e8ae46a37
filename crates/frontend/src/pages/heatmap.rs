use dioxus::prelude::*;
use heatmap_shared::config::RuntimeConfig;
use heatmap_shared::detail::{DetailSession, DetailTicket};
use heatmap_shared::models::{MapPoint, ViewportChange};
use heatmap_shared::normalize::normalize_aggregate;
use heatmap_shared::timer::TimerPoll;
use heatmap_shared::viewport::{
    FetchResolution, FetchTicket, SettleOutcome, ViewportCoordinator,
};

use crate::api;
use crate::components::diagnostics_panel::DiagnosticsPanel;
use crate::components::info_popup::InfoPopup;
use crate::components::map_view::MapView;
use crate::timers::{now_ms, sleep_ms, TimerSlot};

/// Wait out the settle delay, then fetch the aggregate for the latest bounds if it moved enough.
fn schedule_settle(
    slot: &TimerSlot,
    mut coordinator: Signal<ViewportCoordinator>,
    config: RuntimeConfig,
    wait_ms: f64,
) {
    slot.schedule(async move {
        let mut wait = wait_ms;
        loop {
            sleep_ms(wait).await;
            let outcome = coordinator.write().settle(now_ms());
            match outcome {
                SettleOutcome::Pending { remaining_ms } => wait = remaining_ms,
                SettleOutcome::Idle => return,
                SettleOutcome::BelowThreshold => {
                    tracing::debug!("Viewport moved less than the fetch threshold");
                    return;
                }
                SettleOutcome::Fetch(ticket) => {
                    spawn(fetch_points(coordinator, config, ticket));
                    return;
                }
            }
        }
    });
}

async fn fetch_points(
    mut coordinator: Signal<ViewportCoordinator>,
    config: RuntimeConfig,
    ticket: FetchTicket,
) {
    tracing::debug!(token = ticket.token.value(), bounds = ?ticket.bounds, "Fetching aggregate");
    let result = api::fetch_aggregate(&config.aggregate_url, &ticket.query)
        .await
        .and_then(|body| normalize_aggregate(&body, config.weight_policy));
    if let Err(e) = &result {
        tracing::warn!(error = %e, "Aggregate fetch failed, clearing points");
    }

    let resolution = coordinator.write().resolve(&ticket, result);
    match resolution {
        FetchResolution::Applied { points } => tracing::info!(points, "Heatmap updated"),
        FetchResolution::Cleared => {}
        FetchResolution::Stale => {
            tracing::debug!(token = ticket.token.value(), "Discarded stale aggregate response")
        }
    }
}

async fn fetch_detail(mut detail: Signal<DetailSession>, url: String, ticket: DetailTicket) {
    let result = api::fetch_locality_detail(&url, &ticket.query).await;
    match &result {
        Ok(agents) => tracing::debug!(agents = agents.len(), "Roster loaded"),
        Err(e) => tracing::warn!(
            lat = ticket.query.lat,
            lon = ticket.query.lon,
            error = %e,
            "Roster fetch failed"
        ),
    }
    if !detail.write().resolve(ticket.token, result) {
        tracing::debug!(token = ticket.token.value(), "Discarded stale roster response");
    }
}

/// Poll the popup's dismissal timer until it fires or is cancelled.
fn schedule_dismissal(slot: &TimerSlot, mut detail: Signal<DetailSession>, wait_ms: f64) {
    slot.schedule(async move {
        let mut wait = wait_ms;
        loop {
            sleep_ms(wait).await;
            let poll = detail.write().poll_dismissal(now_ms());
            match poll {
                TimerPoll::Pending { remaining_ms } => wait = remaining_ms,
                TimerPoll::Due | TimerPoll::Idle => return,
            }
        }
    });
}

/// Hover or click outcome: start the roster request if one was issued.
fn request_roster(
    detail: Signal<DetailSession>,
    config: Option<&RuntimeConfig>,
    ticket: Option<DetailTicket>,
) {
    if let (Some(config), Some(ticket)) = (config, ticket) {
        spawn(fetch_detail(detail, config.detail_url.clone(), ticket));
    }
}

#[component]
pub fn HeatmapPage() -> Element {
    let runtime = use_resource(|| async {
        match api::fetch_runtime_config().await {
            Ok(config) => {
                tracing::info!(
                    aggregate_url = %config.aggregate_url,
                    weight_policy = ?config.weight_policy,
                    "Runtime configuration loaded"
                );
                Some(config)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load runtime configuration");
                None
            }
        }
    });

    let mut coordinator = use_signal(ViewportCoordinator::default);
    let mut detail = use_signal(DetailSession::default);
    let settle_slot = use_hook(TimerSlot::default);
    let dismiss_slot = use_hook(TimerSlot::default);

    {
        let settle_slot = settle_slot.clone();
        let dismiss_slot = dismiss_slot.clone();
        use_drop(move || {
            settle_slot.cancel();
            dismiss_slot.cancel();
            if let Ok(mut c) = coordinator.try_write() {
                c.teardown();
            }
            if let Ok(mut d) = detail.try_write() {
                d.teardown();
            }
        });
    }

    let config: Option<RuntimeConfig> = runtime.read().clone().flatten();

    // --- Map callbacks ---

    let viewport_config = config.clone();
    let viewport_slot = settle_slot.clone();
    let on_viewport_change = move |change: ViewportChange| {
        let Some(config) = viewport_config.clone() else { return };
        let wait = coordinator.write().on_viewport_changed(change, now_ms());
        schedule_settle(&viewport_slot, coordinator, config, wait);
    };

    let enter_config = config.clone();
    let enter_slot = dismiss_slot.clone();
    let on_marker_enter = move |point: MapPoint| {
        enter_slot.cancel();
        let ticket = detail.write().hover(&point);
        request_roster(detail, enter_config.as_ref(), ticket);
    };

    let click_config = config.clone();
    let click_slot = dismiss_slot.clone();
    let on_marker_click = move |point: MapPoint| {
        let ticket = detail.write().click(&point);
        if ticket.is_some() {
            click_slot.cancel();
        }
        request_roster(detail, click_config.as_ref(), ticket);
    };

    let leave_slot = dismiss_slot.clone();
    let on_marker_leave = move |_: ()| {
        let wait = detail.write().pointer_out(now_ms());
        schedule_dismissal(&leave_slot, detail, wait);
    };

    // --- Popup callbacks ---

    let popup_enter_slot = dismiss_slot.clone();
    let on_popup_enter = move |_: ()| {
        popup_enter_slot.cancel();
        detail.write().popup_enter();
    };

    let popup_leave_slot = dismiss_slot.clone();
    let on_popup_leave = move |_: ()| {
        let wait = detail.write().popup_leave(now_ms());
        schedule_dismissal(&popup_leave_slot, detail, wait);
    };

    let close_slot = dismiss_slot.clone();
    let on_popup_close = move |_: ()| {
        close_slot.cancel();
        detail.write().close();
    };

    // --- Render state ---

    let (points, zoom, bounds, delta, settling) = {
        let c = coordinator.read();
        (
            c.points().to_vec(),
            c.zoom(),
            c.bounds(),
            c.delta(),
            c.is_settling(),
        )
    };
    let point_count = points.len();

    let (selected, detail_state) = {
        let session = detail.read();
        (session.visible_point().cloned(), session.state().clone())
    };
    let popup_anchor = selected.as_ref().map(MapPoint::position);

    rsx! {
        div { class: "app",
            header { class: "header",
                h1 { "Locality Heatmap" }
            }
            div { class: "layout",
                div { class: "map-panel",
                    MapView {
                        config,
                        points,
                        on_viewport_change,
                        on_marker_enter,
                        on_marker_leave,
                        on_marker_click,
                        popup_anchor,
                        if let Some(point) = selected {
                            InfoPopup {
                                point,
                                state: detail_state,
                                on_enter: on_popup_enter,
                                on_leave: on_popup_leave,
                                on_close: on_popup_close,
                            }
                        }
                    }
                }
                DiagnosticsPanel {
                    zoom,
                    bounds,
                    delta,
                    point_count,
                    settling,
                }
            }
        }
    }
}
