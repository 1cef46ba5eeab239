use std::time::Duration;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::warn;
use wasm_bindgen_futures::JsFuture;

use crate::components::booth_search::selection::ALL_CATEGORIES;
use crate::telemetry::Telemetry;

const TOAST_DURATION: Duration = Duration::from_secs(2);

/// One filter button per category; the catch-all reads "All".
#[component]
pub fn CategoryButtons(
	#[prop(into)] categories: Signal<Vec<String>>,
	#[prop(into)] selected: Signal<String>,
	#[prop(into)] on_change: Callback<String>,
) -> impl IntoView {
	let button = move |value: String, text: String| {
		let current = value.clone();
		view! {
			<button
				type="button"
				class="category-button"
				class:active=move || selected.with(|s| *s == current)
				on:click=move |_| on_change.run(value.clone())
			>
				{text}
			</button>
		}
	};

	view! {
		<div class="category-buttons">
			{move || {
				categories
					.get()
					.into_iter()
					.map(|c| {
						let text = if c == ALL_CATEGORIES { "All".to_string() } else { c.clone() };
						button(c, text)
					})
					.collect_view()
			}}
		</div>
	}
}

/// Fit, reset and share buttons floating over the map.
#[component]
pub fn MapControls(
	#[prop(into)] on_fit: Callback<()>,
	#[prop(into)] on_reset: Callback<()>,
	/// Seconds left before the selection resets itself, if counting.
	#[prop(into)]
	countdown: Signal<Option<u32>>,
) -> impl IntoView {
	let telemetry = Telemetry;
	let toast = RwSignal::new(false);

	let share = move |_| {
		telemetry.action("shareLink");
		spawn_local(async move {
			let Some(window) = web_sys::window() else {
				return;
			};
			let href = match window.location().href() {
				Ok(href) => href,
				Err(e) => {
					warn!("cannot read location: {e:?}");
					return;
				}
			};
			let copied = JsFuture::from(window.navigator().clipboard().write_text(&href)).await;
			match copied {
				Ok(_) => {
					toast.set(true);
					set_timeout(
						move || {
							let _ = toast.try_set(false);
						},
						TOAST_DURATION,
					);
				}
				Err(e) => warn!("clipboard write failed: {e:?}"),
			}
		});
	};

	view! {
		<div class="map-controls">
			<button type="button" class="map-controls__fit" title="Fit to screen" on:click=move |_| on_fit.run(())>
				"Fit"
			</button>
			<button type="button" class="map-controls__reset" title="Reset path" on:click=move |_| on_reset.run(())>
				"Reset"
				{move || countdown.get().map(|secs| view! { <span class="map-controls__countdown">{format!(" ({secs})")}</span> })}
			</button>
			<button type="button" class="map-controls__share" title="Copy link" on:click=share>
				"Share"
			</button>
		</div>
		{move || toast.get().then(|| view! { <div class="toast">"Link copied to clipboard"</div> })}
	}
}
