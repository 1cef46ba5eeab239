use leptos::prelude::*;

use super::types::NodeDetails;

/// Detail card for a tapped booth, with the two shortcut actions.
#[component]
pub fn NodePopup(
	details: RwSignal<Option<NodeDetails>>,
	on_im_here: Callback<NodeDetails>,
	on_get_here: Callback<NodeDetails>,
) -> impl IntoView {
	move || {
		details.get().map(|d| {
			let (here, there) = (d.clone(), d.clone());
			view! {
				<div class="node-popup">
					<button
						type="button"
						class="node-popup__close"
						aria-label="Close popup"
						on:click=move |_| details.set(None)
					>
						"×"
					</button>
					<h3 class="node-popup__title">{format!("{} ({})", d.name, d.label)}</h3>
					<dl class="node-popup__facts">
						<dt>"Booth Number:"</dt>
						<dd>{d.label.clone()}</dd>
						<dt>"Category:"</dt>
						<dd>{d.category.clone()}</dd>
						<dt>"Size:"</dt>
						<dd>{format!("{} × {}", d.width, d.height)}</dd>
					</dl>
					<button
						type="button"
						class="node-popup__action node-popup__action--destination"
						on:click=move |_| {
							details.set(None);
							on_get_here.run(there.clone());
						}
					>
						"Get directions to here"
					</button>
					<button
						type="button"
						class="node-popup__action node-popup__action--origin"
						on:click=move |_| {
							details.set(None);
							on_im_here.run(here.clone());
						}
					>
						"I'm here"
					</button>
				</div>
			}
		})
	}
}
