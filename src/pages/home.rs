use std::time::Duration;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_query_map;
use log::{debug, error, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::api;
use crate::components::booth_search::{BoothSearch, Countdown, SelectionState, Slot};
use crate::components::controls::MapControls;
use crate::components::floor_plan::{Booth, FloorPlanCanvas, GraphData, NodeDetails, SceneHandle};
use crate::config::MapConfig;
use crate::navigation::history::{
	BackAction, FROM_PARAM, Overlay, OverlayStack, SelectionQuery, TO_PARAM, WriteMode, plan_write,
};
use crate::navigation::path_query::{PathQueryCoordinator, QueryCommand, QueryOutcome, drive};
use crate::telemetry::{Telemetry, TelemetryEvent, now_ms};

fn address_bar() -> SelectionQuery {
	web_sys::window()
		.and_then(|w| w.location().search().ok())
		.map(|search| SelectionQuery::parse(&search))
		.unwrap_or_default()
}

fn write_history(search: &str, mode: WriteMode) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let path = window.location().pathname().unwrap_or_else(|_| "/".into());
	let url = format!("{path}{search}");
	let Ok(history) = window.history() else {
		return;
	};
	let written = match mode {
		WriteMode::Push => history.push_state_with_url(&JsValue::NULL, "", Some(&url)),
		WriteMode::Replace => history.replace_state_with_url(&JsValue::NULL, "", Some(&url)),
	};
	if let Err(e) = written {
		warn!("history write failed: {e:?}");
	}
}

fn is_narrow_screen(px: u32) -> bool {
	web_sys::window()
		.and_then(|w| w.match_media(&format!("(max-width: {px}px)")).ok().flatten())
		.is_some_and(|m| m.matches())
}

/// Window listener kept alive for the page's lifetime.
struct PopStateListener {
	window: web_sys::Window,
	closure: Closure<dyn FnMut()>,
}

impl Drop for PopStateListener {
	fn drop(&mut self) {
		let _ = self
			.window
			.remove_event_listener_with_callback("popstate", self.closure.as_ref().unchecked_ref());
	}
}

/// The map page: owns the selection and keeps canvas, search, route and
/// address bar in step with it.
#[component]
pub fn Home() -> impl IntoView {
	let config = use_context::<MapConfig>().unwrap_or_default();
	let telemetry = Telemetry;

	let seed = use_query_map().with_untracked(|q| {
		let param = |k: &str| q.get(k).filter(|v| !v.is_empty());
		SelectionQuery {
			from: param(FROM_PARAM),
			to: param(TO_PARAM),
		}
	});
	if !seed.is_bare() {
		info!("seeding selection from URL: {seed:?}");
	}

	let scene = SceneHandle::new();
	let scene_ready = RwSignal::new(false);
	let graph_data = RwSignal::new(None::<GraphData>);
	let directory = RwSignal::new(None::<Vec<Booth>>);
	let load_error = RwSignal::new(None::<String>);
	let selection = RwSignal::new(SelectionState::seeded(seed.from, seed.to));
	let expanded = RwSignal::new(false);
	let overlays = StoredValue::new(OverlayStack::default());
	let coordinator = StoredValue::new(PathQueryCoordinator::new());
	let countdown = RwSignal::new(config.auto_reset_secs.map(Countdown::new));

	// Startup loads run in parallel; the map waits for the graph only.
	{
		let config = config.clone();
		spawn_local(async move {
			let started = now_ms();
			match api::fetch_graph(&config).await {
				Ok(data) => {
					telemetry.timing("graphLoad", now_ms() - started);
					info!("graph loaded: {} nodes, {} edges", data.nodes.len(), data.edges.len());
					graph_data.set(Some(data));
				}
				Err(e) => {
					error!("{e}");
					telemetry.emit(TelemetryEvent::Error {
						message: "graph load failed".into(),
						detail: e.to_string(),
					});
					load_error.set(Some(e.to_string()));
				}
			}
		});
	}
	{
		let config = config.clone();
		spawn_local(async move {
			let started = now_ms();
			match api::fetch_booths(&config).await {
				Ok(booths) => {
					telemetry.timing("boothsLoad", now_ms() - started);
					directory.set(Some(booths));
				}
				Err(e) => warn!("booth directory unavailable, using graph booths: {e}"),
			}
		});
	}

	let booths = Memo::new(move |_| {
		directory.get().unwrap_or_else(|| {
			graph_data.with(|d| d.as_ref().map(GraphData::booths).unwrap_or_default())
		})
	});
	let resolved = Memo::new(move |_| {
		selection.with(|s| (s.origin.resolved.clone(), s.destination.resolved.clone()))
	});

	// Overlay open/close. Each open overlay owns a history entry so the back
	// gesture closes it first.
	let collapse = move || {
		if overlays.with_value(|o| o.is_open(Overlay::ExpandedSearch)) {
			if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
				let _ = history.back();
				return;
			}
		}
		expanded.set(false);
	};
	let on_expand = Callback::new(move |()| {
		if overlays.try_update_value(|o| o.push(Overlay::ExpandedSearch)) == Some(true) {
			if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
				let _ = history.push_state(&JsValue::NULL, "");
			}
		}
		expanded.set(true);
		telemetry.action("expandSearch");
	});
	let on_collapse = Callback::new(move |()| collapse());

	let popstate = StoredValue::new_local(None::<PopStateListener>);
	if let Some(window) = web_sys::window() {
		let closure = Closure::<dyn FnMut()>::new(move || {
			let action = overlays
				.try_update_value(|o| o.on_back(address_bar()))
				.unwrap_or(BackAction::RestoreSelection(SelectionQuery::default()));
			match action {
				BackAction::CollapseOverlay(overlay) => {
					debug!("back gesture closed {overlay:?}");
					expanded.set(false);
					// The overlay entry may predate the current selection.
					let (from, to) = resolved.get_untracked();
					let kept = SelectionQuery { from, to };
					if address_bar() != kept {
						write_history(&kept.to_search(), WriteMode::Replace);
					}
				}
				BackAction::RestoreSelection(landed) => {
					debug!("back gesture restored {landed:?}");
					selection.update(|s| {
						s.apply_resolved(landed.from, landed.to);
					});
				}
			}
		});
		match window.add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref()) {
			Ok(()) => popstate.set_value(Some(PopStateListener { window, closure })),
			Err(e) => warn!("popstate listener not installed: {e:?}"),
		}
	}
	on_cleanup(move || popstate.set_value(None));

	// Badges follow the resolved pair.
	let markers_scene = scene.clone();
	Effect::new(move |_| {
		let (origin, destination) = resolved.get();
		if !scene_ready.get() {
			return;
		}
		let _ = markers_scene.with_mut(|s| s.mark_booths(origin.as_deref(), destination.as_deref()));
	});

	// Route requests follow the resolved pair.
	let route_scene = scene.clone();
	let route_config = config.clone();
	Effect::new(move |_| {
		let (origin, destination) = resolved.get();
		if !scene_ready.get() {
			return;
		}
		let pair = origin.as_deref().zip(destination.as_deref());
		let Some(command) = coordinator.try_update_value(|c| c.update(pair)) else {
			return;
		};
		match command {
			QueryCommand::Unchanged => {}
			QueryCommand::Clear => {
				let _ = route_scene.with_mut(|s| s.clear_highlight());
			}
			QueryCommand::Local(key) => {
				let _ = route_scene.with_mut(|s| s.highlight_booth(&key.origin));
			}
			QueryCommand::Issue(ticket) => {
				let key = ticket.key.clone();
				let config = route_config.clone();
				let scene = route_scene.clone();
				telemetry.emit(TelemetryEvent::Navigation {
					event: "pathRequested".into(),
					origin: key.origin.clone(),
					destination: key.destination.clone(),
					path_length: None,
				});
				let narrow_px = config.narrow_screen_px;
				spawn_local(async move {
					let started = now_ms();
					let request = api::fetch_shortest_path(config, key.clone());
					let (token, result) = drive(ticket, request).await;
					let outcome = coordinator
						.try_update_value(|c| c.complete(token, result))
						.unwrap_or(QueryOutcome::Ignored);
					match outcome {
						QueryOutcome::Highlight(path) => {
							telemetry.timing("shortestPath", now_ms() - started);
							if path.is_empty() {
								info!("no route between {} and {}", key.origin, key.destination);
							}
							telemetry.emit(TelemetryEvent::Navigation {
								event: "pathFound".into(),
								origin: key.origin.clone(),
								destination: key.destination.clone(),
								path_length: Some(path.len()),
							});
							let _ = scene.with_mut(|s| s.highlight(&path));
							if expanded.get_untracked() && is_narrow_screen(narrow_px) {
								collapse();
							}
						}
						QueryOutcome::Failed(e) => {
							error!("{e}");
							telemetry.emit(TelemetryEvent::Navigation {
								event: "pathFailed".into(),
								origin: key.origin.clone(),
								destination: key.destination.clone(),
								path_length: None,
							});
							telemetry.emit(TelemetryEvent::Error {
								message: "path query failed".into(),
								detail: e.to_string(),
							});
							let _ = scene.with_mut(|s| s.clear_highlight());
							selection.update(|s| {
								s.clear_destination_resolution();
							});
						}
						QueryOutcome::Ignored => {}
					}
				});
			}
		}
	});

	// Address bar follows the resolved pair.
	Effect::new(move |_| {
		let (from, to) = resolved.get();
		let next = SelectionQuery { from, to };
		if let Some(write) = plan_write(&address_bar(), &next) {
			debug!("history {:?} {}", write.mode, write.search);
			write_history(&write.search, write.mode);
		}
	});

	// Optional idle reset once a route is shown.
	if config.auto_reset_secs.is_some() {
		Effect::new(move |_| {
			let complete = resolved.with(|(o, d)| o.is_some() && d.is_some());
			countdown.update(|c| {
				if let Some(c) = c.as_mut() {
					if complete {
						c.start();
					} else {
						c.cancel();
					}
				}
			});
		});
		match set_interval_with_handle(
			move || {
				let armed = countdown.with_untracked(|c| c.as_ref().and_then(Countdown::remaining).is_some());
				if !armed {
					return;
				}
				let fired = countdown
					.try_update(|c| c.as_mut().is_some_and(Countdown::tick))
					.unwrap_or(false);
				if fired {
					info!("selection reset after idle countdown");
					telemetry.action("autoReset");
					selection.update(|s| {
						s.reset();
					});
				}
			},
			Duration::from_secs(1),
		) {
			Ok(handle) => on_cleanup(move || handle.clear()),
			Err(e) => warn!("countdown timer not started: {e:?}"),
		}
	}

	// Callbacks must be Send; the scene handle is reached through local storage.
	let fit_scene = StoredValue::new_local(scene.clone());
	let on_fit = Callback::new(move |()| {
		telemetry.action("fitView");
		fit_scene.with_value(|scene| {
			let _ = scene.with_mut(|s| s.fit());
		});
	});
	let on_reset = Callback::new(move |()| {
		telemetry.action("resetPath");
		selection.update(|s| {
			s.reset();
		});
	});
	let on_im_here = Callback::new(move |details: NodeDetails| {
		telemetry.action_with("setOriginFromPopup", details.label.clone());
		selection.update(|s| {
			s.select_for(Slot::Origin, &details.label);
		});
	});
	let on_get_here = Callback::new(move |details: NodeDetails| {
		telemetry.action_with("setDestinationFromPopup", details.label.clone());
		selection.update(|s| {
			s.select_for(Slot::Destination, &details.label);
		});
	});

	let remaining = Signal::derive(move || countdown.with(|c| c.as_ref().and_then(Countdown::remaining)));

	view! {
		<div class="venue-map">
			<FloorPlanCanvas
				data=graph_data
				scene=scene
				ready=scene_ready
				on_im_here=on_im_here
				on_get_here=on_get_here
			/>
			{move || {
				if let Some(message) = load_error.get() {
					Some(
						view! {
							<div class="venue-map__status venue-map__status--error">
								<p>"The floor plan could not be loaded."</p>
								<p class="venue-map__detail">{message}</p>
							</div>
						}
						.into_any(),
					)
				} else if graph_data.with(Option::is_none) {
					Some(view! { <div class="venue-map__status">"Loading floor plan..."</div> }.into_any())
				} else {
					None
				}
			}}
			<BoothSearch
				selection=selection
				booths=booths
				expanded=expanded
				on_expand=on_expand
				on_collapse=on_collapse
			/>
			<MapControls on_fit=on_fit on_reset=on_reset countdown=remaining />
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn assert_send_sync<T: Send + Sync>() {}

	#[test]
	fn scene_handle_reaches_callbacks_through_local_storage() {
		assert_send_sync::<StoredValue<SceneHandle, LocalStorage>>();
		assert_send_sync::<Callback<()>>();
	}
}
