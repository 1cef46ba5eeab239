//! Structured, fire-and-forget usage events.
//!
//! Each event is written as one JSON line on the `telemetry` log target.
//! Shipping those lines anywhere is the job of whatever tails that target.

use log::{error, info};
use serde::Serialize;

pub const TARGET: &str = "telemetry";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TelemetryEvent {
	UserAction {
		action: &'static str,
		#[serde(skip_serializing_if = "Option::is_none")]
		detail: Option<String>,
	},
	Navigation {
		event: &'static str,
		origin: String,
		destination: String,
		#[serde(skip_serializing_if = "Option::is_none")]
		path_length: Option<usize>,
	},
	Performance {
		operation: &'static str,
		time_ms: f64,
	},
	Error {
		message: &'static str,
		detail: String,
	},
}

impl TelemetryEvent {
	pub fn action(action: &'static str) -> Self {
		Self::UserAction {
			action,
			detail: None,
		}
	}

	pub fn action_with(action: &'static str, detail: impl Into<String>) -> Self {
		Self::UserAction {
			action,
			detail: Some(detail.into()),
		}
	}

	pub fn to_line(&self) -> String {
		serde_json::to_string(self).unwrap_or_else(|e| format!("{{\"type\":\"unserializable\",\"reason\":\"{e}\"}}"))
	}
}

/// Emits events. Copyable so it can be captured by any handler.
#[derive(Clone, Copy, Debug, Default)]
pub struct Telemetry;

impl Telemetry {
	pub fn emit(&self, event: TelemetryEvent) {
		match event {
			TelemetryEvent::Error { .. } => error!(target: TARGET, "{}", event.to_line()),
			_ => info!(target: TARGET, "{}", event.to_line()),
		}
	}

	pub fn action(&self, action: &'static str) {
		self.emit(TelemetryEvent::action(action));
	}

	pub fn action_with(&self, action: &'static str, detail: impl Into<String>) {
		self.emit(TelemetryEvent::action_with(action, detail));
	}

	pub fn timing(&self, operation: &'static str, time_ms: f64) {
		self.emit(TelemetryEvent::Performance { operation, time_ms });
	}
}

/// Milliseconds since page load, for performance timings.
pub fn now_ms() -> f64 {
	web_sys::window()
		.and_then(|w| w.performance())
		.map(|p| p.now())
		.unwrap_or_else(js_sys::Date::now)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn navigation_event_is_tagged_camel_case() {
		let line = TelemetryEvent::Navigation {
			event: "pathFound",
			origin: "12".into(),
			destination: "40".into(),
			path_length: Some(5),
		}
		.to_line();
		assert_eq!(
			line,
			r#"{"type":"navigation","event":"pathFound","origin":"12","destination":"40","path_length":5}"#
		);
	}

	#[test]
	fn action_without_detail_omits_field() {
		assert_eq!(
			TelemetryEvent::action("resetSelection").to_line(),
			r#"{"type":"userAction","action":"resetSelection"}"#
		);
	}
}
