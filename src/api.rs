//! Backend calls: graph, booth directory and shortest path.

use gloo_net::http::{Request, Response};
use log::debug;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use web_sys::AbortController;

use crate::components::floor_plan::{Booth, BoothRecord, GraphData};
use crate::config::MapConfig;
use crate::error::MapError;
use crate::navigation::history::encode_component;
use crate::navigation::path_query::RouteKey;

pub const GRAPH_PATH: &str = "/api/graph";
pub const BOOTHS_PATH: &str = "/api/booths";
pub const SHORTEST_PATH_PREFIX: &str = "/shortest-path";

#[derive(Debug, Deserialize)]
struct PathResponse {
	#[serde(default)]
	path: Option<Vec<String>>,
}

/// Aborts the browser request when the owning future is dropped.
struct AbortOnDrop(Option<AbortController>);

impl AbortOnDrop {
	fn new() -> Self {
		Self(AbortController::new().ok())
	}

	fn signal(&self) -> Option<web_sys::AbortSignal> {
		self.0.as_ref().map(AbortController::signal)
	}

	fn disarm(&mut self) {
		self.0 = None;
	}
}

impl Drop for AbortOnDrop {
	fn drop(&mut self) {
		if let Some(controller) = self.0.take() {
			controller.abort();
		}
	}
}

async fn decode<T: DeserializeOwned>(url: &str, what: &'static str, response: Response) -> Result<T, MapError> {
	if !response.ok() {
		return Err(MapError::Fetch {
			url: url.to_string(),
			reason: format!("HTTP {}", response.status()),
		});
	}
	response.json::<T>().await.map_err(|e| MapError::Decode {
		what,
		reason: e.to_string(),
	})
}

async fn get<T: DeserializeOwned>(url: &str, what: &'static str) -> Result<T, MapError> {
	debug!("GET {url}");
	let response = Request::get(url).send().await.map_err(|e| MapError::Fetch {
		url: url.to_string(),
		reason: e.to_string(),
	})?;
	decode(url, what, response).await
}

pub async fn fetch_graph(config: &MapConfig) -> Result<GraphData, MapError> {
	get(&config.url(GRAPH_PATH), "graph").await
}

pub async fn fetch_booths(config: &MapConfig) -> Result<Vec<Booth>, MapError> {
	let records: Vec<BoothRecord> = get(&config.url(BOOTHS_PATH), "booth directory").await?;
	Ok(records.into_iter().map(Booth::from).collect())
}

pub fn shortest_path_url(config: &MapConfig, key: &RouteKey) -> String {
	config.url(&format!(
		"{SHORTEST_PATH_PREFIX}/{}/{}",
		encode_component(&key.origin),
		encode_component(&key.destination)
	))
}

/// Fetches the route for `key`. Dropping the future aborts the request.
pub async fn fetch_shortest_path(config: MapConfig, key: RouteKey) -> Result<Vec<String>, MapError> {
	let url = shortest_path_url(&config, &key);
	let mut guard = AbortOnDrop::new();
	let signal = guard.signal();
	let failed = |reason: String| MapError::QueryFailed {
		origin: key.origin.clone(),
		destination: key.destination.clone(),
		reason,
	};

	let response = Request::get(&url)
		.abort_signal(signal.as_ref())
		.send()
		.await
		.map_err(|e| failed(e.to_string()))?;
	let body: PathResponse = decode(&url, "shortest path", response)
		.await
		.map_err(|e| failed(e.to_string()))?;
	guard.disarm();
	Ok(body.path.unwrap_or_default())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn shortest_path_url_escapes_labels() {
		let config = MapConfig {
			api_base: "https://map.example/".into(),
			..MapConfig::default()
		};
		let url = shortest_path_url(&config, &RouteKey::new("Hall A/12", "40"));
		assert_eq!(url, "https://map.example/shortest-path/Hall%20A%2F12/40");
	}

	#[test]
	fn missing_path_reads_as_no_route() {
		let body: PathResponse = serde_json::from_str("{}").unwrap();
		assert_eq!(body.path.unwrap_or_default(), Vec::<String>::new());
		let body: PathResponse = serde_json::from_str(r#"{"path":["A","w","B"]}"#).unwrap();
		assert_eq!(body.path.map(|p| p.len()), Some(3));
	}
}
