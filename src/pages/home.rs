use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, info};

use crate::api::fetch_topology;
use crate::components::details_panel::DetailsPanel;
use crate::components::topology_map::{
	LayoutGraph, RefreshOutcome, RefreshSequence, SelectionEvent, TopologyCanvas, build,
};
use crate::config::MapConfig;
use crate::error::RefreshError;

async fn load_graph(endpoint: &str) -> Result<LayoutGraph, RefreshError> {
	let topology = fetch_topology(endpoint).await?;
	let graph = build(&topology)?;
	if !graph.unresolved.is_empty() {
		info!("{} link endpoints could not be resolved", graph.unresolved.len());
	}
	Ok(graph)
}

/// Network map page: the topology canvas, its details panel and a refresh
/// action.
#[component]
pub fn Home() -> impl IntoView {
	let config = MapConfig::default();
	let endpoint = StoredValue::new(config.endpoint.clone());
	let (graph, set_graph) = signal(None::<LayoutGraph>);
	let (selected, set_selected) = signal(None::<SelectionEvent>);
	let (failure, set_failure) = signal(None::<String>);
	let (loading, set_loading) = signal(false);
	let sequence = StoredValue::new(RefreshSequence::default());

	// Failures keep the graph that is already on screen.
	let refresh = move || {
		let mut next = sequence.get_value();
		let seq = next.begin();
		sequence.set_value(next);
		set_loading.set(true);
		let endpoint = endpoint.get_value();
		spawn_local(async move {
			let result = load_graph(&endpoint).await;
			let current = sequence.get_value();
			let mut outcome = RefreshOutcome::Stale;
			set_graph.maybe_update(|shown| {
				outcome = current.apply(seq, shown, result);
				outcome.replaced()
			});
			match outcome {
				RefreshOutcome::Stale => {}
				RefreshOutcome::Replaced => {
					set_loading.set(false);
					set_failure.set(None);
					set_selected.set(None);
				}
				RefreshOutcome::Failed(e) => {
					set_loading.set(false);
					error!("refresh failed: {e}");
					set_failure.set(Some(e.to_string()));
				}
			}
		});
	};
	refresh();

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="network-map">
				<header class="map-toolbar">
					<h1>"Mesh Network Map"</h1>
					<button on:click=move |_| refresh() disabled=move || loading.get()>
						{move || if loading.get() { "Refreshing…" } else { "Refresh" }}
					</button>
					{move || failure.get().map(|msg| view! { <p class="map-error">{msg}</p> })}
				</header>
				<div class="map-body">
					<TopologyCanvas
						graph=graph
						on_select=move |event: SelectionEvent| set_selected.set(Some(event))
						config=config
					/>
					<DetailsPanel selected=selected />
				</div>
			</div>
		</ErrorBoundary>
	}
}
