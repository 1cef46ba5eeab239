//! Error taxonomy for the map. Every variant is locally recoverable.

use thiserror::Error;

/// Failures the map can run into. None of them end the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
	/// Graph or booth data has not arrived yet; the caller should defer.
	#[error("{0} is not loaded yet")]
	DataNotReady(&'static str),

	/// A referenced node, edge or label does not exist in the loaded graph.
	#[error("no {kind} found for `{key}`")]
	LookupMiss { kind: &'static str, key: String },

	/// A path query superseded by a newer selection.
	#[error("path query {origin} -> {destination} was cancelled")]
	QueryCancelled { origin: String, destination: String },

	/// The pathfinding service failed while both endpoints were resolved.
	#[error("path query {origin} -> {destination} failed: {reason}")]
	QueryFailed {
		origin: String,
		destination: String,
		reason: String,
	},

	/// An HTTP request for startup data failed.
	#[error("request to {url} failed: {reason}")]
	Fetch { url: String, reason: String },

	/// A response body could not be decoded.
	#[error("could not decode {what}: {reason}")]
	Decode { what: &'static str, reason: String },
}

impl MapError {
	pub fn lookup_miss(kind: &'static str, key: impl Into<String>) -> Self {
		Self::LookupMiss {
			kind,
			key: key.into(),
		}
	}

	/// Cancellation is expected control flow and never shown to the user.
	pub fn is_cancellation(&self) -> bool {
		matches!(self, Self::QueryCancelled { .. })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn only_cancellation_is_silent() {
		let cancelled = MapError::QueryCancelled {
			origin: "A".into(),
			destination: "B".into(),
		};
		let failed = MapError::QueryFailed {
			origin: "A".into(),
			destination: "B".into(),
			reason: "503".into(),
		};
		assert!(cancelled.is_cancellation());
		assert!(!failed.is_cancellation());
		assert_eq!(
			failed.to_string(),
			"path query A -> B failed: 503"
		);
	}

	#[test]
	fn lookup_miss_names_the_key() {
		let err = MapError::lookup_miss("node", "n42");
		assert_eq!(err.to_string(), "no node found for `n42`");
	}
}
