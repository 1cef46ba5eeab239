use leptos::prelude::*;

use super::debounce::SearchDebouncer;
use super::selection::{Slot, SelectionState, categories};
use crate::components::controls::CategoryButtons;
use crate::components::floor_plan::Booth;
use crate::config::MapConfig;
use crate::telemetry::Telemetry;

fn slot_events(slot: Slot) -> (&'static str, &'static str, &'static str) {
	match slot {
		Slot::Origin => ("focusOriginSearch", "searchOrigin", "selectOriginFromSearch"),
		Slot::Destination => ("focusDestinationSearch", "searchDest", "selectDestinationFromSearch"),
	}
}

/// Origin/destination search with the filtered booth list.
///
/// Collapsed it is a single search box; focusing it asks the page to open
/// the expanded overlay.
#[component]
pub fn BoothSearch(
	selection: RwSignal<SelectionState>,
	#[prop(into)] booths: Signal<Vec<Booth>>,
	#[prop(into)] expanded: Signal<bool>,
	#[prop(into)] on_expand: Callback<()>,
	#[prop(into)] on_collapse: Callback<()>,
) -> impl IntoView {
	let config = use_context::<MapConfig>().unwrap_or_default();
	let telemetry = Telemetry;
	let debouncer = StoredValue::new(SearchDebouncer::new(config.search_min_len));
	let debounce = config.search_debounce();
	let origin_ref = NodeRef::<leptos::html::Input>::new();
	let destination_ref = NodeRef::<leptos::html::Input>::new();

	// Land in the origin box when opening with nothing picked yet.
	Effect::new(move |_| {
		if expanded.get() && selection.with_untracked(|s| s.origin.resolved.is_none()) {
			if let Some(input) = origin_ref.get() {
				let _ = input.focus();
			}
		}
	});

	let on_input = move |slot: Slot, value: String| {
		selection.update(|s| {
			s.type_term(slot, &value);
		});
		let Some(ticket) = debouncer.try_update_value(|d| d.input(&value)).flatten() else {
			return;
		};
		let (_, search_event, _) = slot_events(slot);
		set_timeout(
			move || {
				if let Some(term) = debouncer.with_value(|d| d.settle(ticket)) {
					telemetry.action_with(search_event, term);
				}
			},
			debounce,
		);
	};

	let on_focus = move |slot: Slot| {
		selection.update(|s| s.focus(slot));
		telemetry.action(slot_events(slot).0);
	};

	let search_box = move |slot: Slot, placeholder: &'static str, node_ref: NodeRef<leptos::html::Input>| {
		view! {
			<input
				type="search"
				class="booth-search__input"
				placeholder=placeholder
				node_ref=node_ref
				prop:value=move || selection.with(|s| s.slot(slot).term.clone())
				on:input=move |ev| on_input(slot, event_target_value(&ev))
				on:focus=move |_| on_focus(slot)
			/>
		}
	};

	let category_list = Signal::derive(move || booths.with(|b| categories(b)));
	let selected_category = Signal::derive(move || selection.with(|s| s.category.clone()));
	let on_category = Callback::new(move |category: String| {
		selection.update(|s| s.set_category(&category));
		telemetry.action_with("selectCategory", category);
	});

	let booth_list = move || {
		let list: Vec<Booth> = booths.with(|b| {
			selection.with(|s| s.candidates(b).into_iter().cloned().collect())
		});
		if list.is_empty() {
			return view! {
				<div class="booth-list__empty">
					<span>"No booths found"</span>
					<span>"Try adjusting your search"</span>
				</div>
			}
			.into_any();
		}
		view! {
			<ul class="booth-list">
				{list
					.into_iter()
					.map(|booth| {
						let (label, label_sel) = (booth.label.clone(), booth.label.clone());
						view! {
							<li>
								<button
									type="button"
									class="booth-list__item"
									class:selected=move || selection.with(|s| s.is_selected(&label_sel))
									on:click=move |_| {
										let slot = selection.with_untracked(|s| s.active);
										selection.update(|s| {
											s.select(&label);
										});
										telemetry.action_with(slot_events(slot).2, label.clone());
									}
								>
									<div class="booth-list__name">{booth.name}</div>
									<div class="booth-list__label">{booth.label}</div>
								</button>
							</li>
						}
					})
					.collect_view()}
			</ul>
		}
		.into_any()
	};

	move || {
		if !expanded.get() {
			return view! {
				<div class="booth-search booth-search--collapsed">
					<input
						type="search"
						class="booth-search__input"
						placeholder="Search for a booth..."
						on:focus=move |_| on_expand.run(())
					/>
				</div>
			}
			.into_any();
		}
		view! {
			<div class="booth-search__backdrop" on:pointerdown=move |_| on_collapse.run(()) />
			<div class="booth-search booth-search--expanded">
				<div class="booth-search__field">
					{search_box(Slot::Origin, "Search Origin", origin_ref)}
				</div>
				<div class="booth-search__field">
					{search_box(Slot::Destination, "Search Destination", destination_ref)}
				</div>
				<div class="booth-search__categories">
					<CategoryButtons
						categories=category_list
						selected=selected_category
						on_change=on_category
					/>
				</div>
				<div class="booth-search__results">{booth_list}</div>
			</div>
		}
		.into_any()
	}
}
