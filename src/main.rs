use leptos::prelude::*;
use venue_wayfinder::{App, init_logging, load_config};

fn main() {
	init_logging();
	let config = load_config();
	leptos::mount::mount_to_body(move || view! { <App config=config.clone() /> });
}
