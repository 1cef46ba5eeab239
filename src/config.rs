//! Runtime knobs for the map, with defaults matching the production venue.

use std::time::Duration;

use log::{Level, warn};
use serde::Deserialize;

/// Name of the `<meta>` tag that may carry a JSON override of [`MapConfig`].
pub const CONFIG_META_NAME: &str = "venue-map-config";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
	/// Prefix for every backend request; empty means same origin.
	pub api_base: String,
	pub min_zoom: f64,
	pub max_zoom: f64,
	pub wheel_sensitivity: f64,
	/// Graph-space padding kept around the extent on `fit()`.
	pub fit_padding: f64,
	/// Pointer travel in pixels under which a press counts as a tap.
	pub tap_slop: f64,
	pub search_debounce_ms: u64,
	pub search_min_len: usize,
	/// Seconds before a completed selection resets itself; `None` disables it.
	pub auto_reset_secs: Option<u32>,
	/// Viewport width at or under which a found route collapses the search overlay.
	pub narrow_screen_px: u32,
	pub log_level: String,
}

impl Default for MapConfig {
	fn default() -> Self {
		Self {
			api_base: String::new(),
			min_zoom: 0.1,
			max_zoom: 2.0,
			wheel_sensitivity: 0.1,
			fit_padding: 30.0,
			tap_slop: 5.0,
			search_debounce_ms: 500,
			search_min_len: 3,
			auto_reset_secs: None,
			narrow_screen_px: 767,
			log_level: "debug".into(),
		}
	}
}

impl MapConfig {
	/// Parses an override document. Missing fields keep their defaults.
	pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
		let mut config: Self = serde_json::from_str(raw)?;
		config.normalize();
		Ok(config)
	}

	/// Reads the override from the page head, falling back to defaults.
	pub fn from_document() -> Self {
		let Some(raw) = web_sys::window()
			.and_then(|w| w.document())
			.and_then(|d| {
				d.query_selector(&format!("meta[name=\"{CONFIG_META_NAME}\"]"))
					.ok()
					.flatten()
			})
			.and_then(|el| el.get_attribute("content"))
		else {
			return Self::default();
		};
		Self::from_json(&raw).unwrap_or_else(|e| {
			warn!("ignoring malformed {CONFIG_META_NAME}: {e}");
			Self::default()
		})
	}

	pub fn log_level(&self) -> Level {
		self.log_level.parse().unwrap_or(Level::Debug)
	}

	pub fn search_debounce(&self) -> Duration {
		Duration::from_millis(self.search_debounce_ms)
	}

	pub fn url(&self, path: &str) -> String {
		format!("{}{}", self.api_base.trim_end_matches('/'), path)
	}

	fn normalize(&mut self) {
		if self.min_zoom <= 0.0 {
			self.min_zoom = Self::default().min_zoom;
		}
		if self.max_zoom < self.min_zoom {
			std::mem::swap(&mut self.min_zoom, &mut self.max_zoom);
		}
		if self.auto_reset_secs == Some(0) {
			self.auto_reset_secs = None;
		}
	}
}
