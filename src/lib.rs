//! Live map of a wireless mesh network: a force-directed layout of the
//! coordinator, routers and end devices, with signal strength on every link.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

mod api;
mod components;
mod config;
mod error;
mod pages;

use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

const MAP_CSS: &str = r#"
body { margin: 0; font-family: Arial, sans-serif; color: #444666; }
.map-toolbar { display: flex; align-items: center; gap: 1rem; padding: 0.5rem 1rem; border-bottom: 1px solid #ddd; }
.map-toolbar h1 { font-size: 1.25rem; margin: 0; }
.map-error { color: #ED1C24; margin: 0; }
.map-body { display: flex; align-items: flex-start; gap: 1rem; padding: 1rem; }
.topology-canvas { border: 1px solid #ddd; }
.network-details { min-width: 16rem; }
.network-details dl { display: grid; grid-template-columns: auto 1fr; gap: 0.25rem 1rem; }
.network-details dt { font-weight: bold; }
.network-details dd { margin: 0; }
"#;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("mesh map logging initialized");
}

/// Root component: page metadata, styles and the map routes.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="Mesh Network Map" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />
		<Style>{MAP_CSS}</Style>

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
				<Route path=path!("/map") view=Home />
			</Routes>
		</Router>
	}
}
