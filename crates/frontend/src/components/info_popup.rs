use dioxus::prelude::*;
use heatmap_shared::agent::AgentRecord;
use heatmap_shared::detail::DetailState;
use heatmap_shared::models::MapPoint;

fn display_name(point: &MapPoint) -> &str {
    if point.name.trim().is_empty() {
        "Unknown Location"
    } else {
        &point.name
    }
}

#[component]
fn AgentCard(agent: AgentRecord) -> Element {
    let name = agent.full_name();
    let jurisdiction = agent.jurisdiction();
    let address = agent.address();
    let past = agent.past_experience();
    let current = agent.current_projects();

    rsx! {
        div { class: "agent-card",
            h4 { class: "agent-name", "{name}" }
            if !jurisdiction.is_empty() {
                dl { class: "agent-jurisdiction",
                    for (label, value) in jurisdiction {
                        dt { "{label}" }
                        dd { "{value}" }
                    }
                }
            }
            if let Some(address) = address {
                p { class: "agent-address", "{address}" }
            }
            if !past.is_empty() {
                div { class: "agent-section",
                    h5 { "Past experience" }
                    ul {
                        for entry in past {
                            li { "{entry}" }
                        }
                    }
                }
            }
            if !current.is_empty() {
                div { class: "agent-section",
                    h5 { "Current projects" }
                    ul {
                        for entry in current {
                            li { "{entry}" }
                        }
                    }
                }
            }
        }
    }
}

/// Popup for the selected point: summary, map link and the locality roster.
#[component]
pub fn InfoPopup(
    point: MapPoint,
    state: DetailState,
    on_enter: EventHandler<()>,
    on_leave: EventHandler<()>,
    on_close: EventHandler<()>,
) -> Element {
    let name = display_name(&point).to_string();
    let maps_url = point.google_maps_url();
    let kind = point.kind.to_string();
    let (lat, lng, weight) = (point.lat, point.lng, point.weight);

    let body = match state {
        DetailState::Loading => rsx! {
            p { class: "popup-status", "Loading agents…" }
        },
        DetailState::Loaded(agents) => rsx! {
            div { class: "agent-list",
                for (i, agent) in agents.into_iter().enumerate() {
                    AgentCard { key: "{i}", agent }
                }
            }
        },
        DetailState::Empty => rsx! {
            p { class: "popup-status", "No agents found." }
        },
        DetailState::Idle if !point.is_locality() => rsx! {
            p { class: "popup-hint", "Zoom in to see localities and their agents." }
        },
        DetailState::Idle | DetailState::Dismissed => rsx! {},
    };

    rsx! {
        div {
            class: "info-popup",
            onmouseenter: move |_| on_enter.call(()),
            onmouseleave: move |_| on_leave.call(()),
            onmousedown: move |evt: Event<MouseData>| evt.stop_propagation(),
            onwheel: move |evt: Event<WheelData>| evt.stop_propagation(),

            button {
                class: "popup-close",
                title: "Close",
                onclick: move |_| on_close.call(()),
                "×"
            }
            h3 { class: "popup-title", "{name}" }
            span { class: "popup-kind", "{kind}" }
            dl { class: "popup-summary",
                dt { "Latitude" }
                dd { "{lat}" }
                dt { "Longitude" }
                dd { "{lng}" }
                dt { "Weight" }
                dd { "{weight}" }
            }
            a {
                class: "popup-link",
                href: "{maps_url}",
                target: "_blank",
                rel: "noopener noreferrer",
                "View on Google Maps"
            }
            {body}
        }
    }
}
