use log::warn;

use super::graph::{FloorGraph, NodeIdx};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerKind {
	Origin,
	Destination,
}

/// Origin/destination badges, independent of the highlighted route.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocationMarkers {
	origin: Option<NodeIdx>,
	destination: Option<NodeIdx>,
}

impl LocationMarkers {
	pub fn set(&mut self, graph: &FloorGraph, origin: Option<&str>, destination: Option<&str>) {
		self.origin = resolve(graph, origin, "origin");
		self.destination = resolve(graph, destination, "destination");
	}

	pub fn clear(&mut self) {
		self.origin = None;
		self.destination = None;
	}

	pub fn origin(&self) -> Option<NodeIdx> {
		self.origin
	}

	pub fn destination(&self) -> Option<NodeIdx> {
		self.destination
	}

	pub fn marker_at(&self, idx: NodeIdx) -> Option<MarkerKind> {
		if self.origin == Some(idx) {
			Some(MarkerKind::Origin)
		} else if self.destination == Some(idx) {
			Some(MarkerKind::Destination)
		} else {
			None
		}
	}
}

fn resolve(graph: &FloorGraph, id: Option<&str>, role: &str) -> Option<NodeIdx> {
	let id = id?;
	graph
		.node_index(id)
		.map_err(|e| warn!("{role} marker: {e}"))
		.ok()
}

#[cfg(test)]
mod tests {
	use super::super::graph::fixtures::row;
	use super::*;

	#[test]
	fn markers_replace_previous_marks() {
		let graph = row(&[]);
		let mut markers = LocationMarkers::default();
		markers.set(&graph, Some("A"), Some("C"));
		assert_eq!(markers.marker_at(0), Some(MarkerKind::Origin));
		assert_eq!(markers.marker_at(2), Some(MarkerKind::Destination));

		markers.set(&graph, Some("B"), None);
		assert_eq!(markers.marker_at(0), None);
		assert_eq!(markers.origin(), Some(1));
		assert_eq!(markers.destination(), None);
	}

	#[test]
	fn unknown_ids_are_ignored() {
		let graph = row(&[]);
		let mut markers = LocationMarkers::default();
		markers.set(&graph, Some("missing"), Some("A"));
		assert_eq!(markers.origin(), None);
		assert_eq!(markers.destination(), Some(0));
		markers.clear();
		assert_eq!(markers, LocationMarkers::default());
	}
}
