//! Leptos client-side venue map: floor plan, booth search and wayfinding.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod navigation;
mod pages;
pub mod telemetry;

// Top-Level pages
use crate::config::MapConfig;
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// Reads the page's map configuration and applies its log level.
pub fn load_config() -> MapConfig {
	let config = MapConfig::from_document();
	log::set_max_level(config.log_level().to_level_filter());
	info!("log level {}, api base {:?}", config.log_level(), config.api_base);
	config
}

/// An app router which renders the venue map and handles 404's
#[component]
pub fn App(config: MapConfig) -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();
	provide_context(config);

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		// sets the document title
		<Title text="Venue Map" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
