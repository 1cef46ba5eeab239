use std::collections::HashMap;

use log::{debug, warn};

use super::types::{GraphData, NodeDetails, ShapeType};
use crate::error::MapError;

pub type NodeIdx = usize;
pub type EdgeIdx = usize;

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: String,
	pub label: String,
	pub name: String,
	pub category: String,
	pub shape: ShapeType,
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Node {
	pub fn contains(&self, gx: f64, gy: f64) -> bool {
		(gx - self.x).abs() <= self.width / 2.0 && (gy - self.y).abs() <= self.height / 2.0
	}

	pub fn details(&self) -> NodeDetails {
		NodeDetails {
			id: self.id.clone(),
			label: self.label.clone(),
			name: self.name.clone(),
			category: self.category.clone(),
			width: self.width,
			height: self.height,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	pub id: String,
	pub source: NodeIdx,
	pub target: NodeIdx,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub x1: f64,
	pub y1: f64,
	pub x2: f64,
	pub y2: f64,
}

impl Bounds {
	pub fn width(&self) -> f64 {
		self.x2 - self.x1
	}

	pub fn height(&self) -> f64 {
		self.y2 - self.y1
	}

	pub fn contains(&self, x: f64, y: f64) -> bool {
		x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
	}
}

/// The loaded floor plan. Immutable once built.
///
/// Edges are undirected: the adjacency map is keyed by the node pair in
/// index order, so a hop resolves the same edge whichever way it was stored.
#[derive(Clone, Debug, Default)]
pub struct FloorGraph {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	by_id: HashMap<String, NodeIdx>,
	adjacency: HashMap<(NodeIdx, NodeIdx), EdgeIdx>,
	bounds: Option<Bounds>,
}

fn pair(a: NodeIdx, b: NodeIdx) -> (NodeIdx, NodeIdx) {
	if a <= b { (a, b) } else { (b, a) }
}

impl FloorGraph {
	pub fn new(data: &GraphData) -> Self {
		let mut graph = Self::default();

		for element in &data.nodes {
			let attrs = &element.data;
			if graph.by_id.contains_key(&attrs.id) {
				warn!("duplicate node id `{}` ignored", attrs.id);
				continue;
			}
			let idx = graph.nodes.len();
			graph.by_id.insert(attrs.id.clone(), idx);
			graph.nodes.push(Node {
				id: attrs.id.clone(),
				label: attrs.label.clone().unwrap_or_else(|| attrs.id.clone()),
				name: attrs.name.clone(),
				category: attrs.category.clone(),
				shape: attrs.shape_type,
				x: element.position.x,
				y: element.position.y,
				width: attrs.width,
				height: attrs.height,
			});
		}

		for element in &data.edges {
			let attrs = &element.data;
			let (Some(&source), Some(&target)) =
				(graph.by_id.get(&attrs.source), graph.by_id.get(&attrs.target))
			else {
				warn!(
					"edge `{}` references a missing node ({} -> {}), dropped",
					attrs.id, attrs.source, attrs.target
				);
				continue;
			};
			let key = pair(source, target);
			if graph.adjacency.contains_key(&key) {
				debug!("edge `{}` duplicates an existing hop, dropped", attrs.id);
				continue;
			}
			graph.adjacency.insert(key, graph.edges.len());
			graph.edges.push(Edge {
				id: attrs.id.clone(),
				source,
				target,
			});
		}

		graph.bounds = graph.compute_bounds();
		graph.report_label_collisions();
		debug!(
			"floor graph built: {} nodes, {} edges",
			graph.nodes.len(),
			graph.edges.len()
		);
		graph
	}

	fn compute_bounds(&self) -> Option<Bounds> {
		self.nodes.iter().fold(None, |acc, n| {
			let (hw, hh) = (n.width / 2.0, n.height / 2.0);
			let b = Bounds {
				x1: n.x - hw,
				y1: n.y - hh,
				x2: n.x + hw,
				y2: n.y + hh,
			};
			Some(match acc {
				None => b,
				Some(a) => Bounds {
					x1: a.x1.min(b.x1),
					y1: a.y1.min(b.y1),
					x2: a.x2.max(b.x2),
					y2: a.y2.max(b.y2),
				},
			})
		})
	}

	fn report_label_collisions(&self) {
		let mut seen: HashMap<&str, &str> = HashMap::new();
		for node in self.nodes.iter().filter(|n| n.shape.is_booth()) {
			if let Some(first) = seen.insert(&node.label, &node.id) {
				warn!(
					"label `{}` is shared by `{}` and `{}`; lookups resolve to the first",
					node.label, first, node.id
				);
				seen.insert(&node.label, first);
			}
		}
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn node(&self, idx: NodeIdx) -> &Node {
		&self.nodes[idx]
	}

	pub fn edge(&self, idx: EdgeIdx) -> &Edge {
		&self.edges[idx]
	}

	pub fn bounds(&self) -> Option<Bounds> {
		self.bounds
	}

	pub fn node_index(&self, id: &str) -> Result<NodeIdx, MapError> {
		self.by_id
			.get(id)
			.copied()
			.ok_or_else(|| MapError::lookup_miss("node", id))
	}

	/// The edge joining two nodes, in whichever orientation it was stored.
	pub fn edge_between(&self, a: NodeIdx, b: NodeIdx) -> Result<EdgeIdx, MapError> {
		self.adjacency.get(&pair(a, b)).copied().ok_or_else(|| {
			MapError::lookup_miss(
				"edge",
				format!("{}~{}", self.nodes[a].id, self.nodes[b].id),
			)
		})
	}

	/// Linear first-match scan over node labels.
	pub fn resolve_node_id_by_label(&self, label: &str) -> Option<&str> {
		self.nodes
			.iter()
			.find(|n| n.label == label)
			.map(|n| n.id.as_str())
	}
}

#[cfg(test)]
pub(crate) mod fixtures {
	use super::super::types::{EdgeAttrs, EdgeElement, NodeAttrs, NodeElement, Position};
	use super::*;

	pub fn node(id: &str, label: &str, shape: ShapeType, x: f64, y: f64) -> NodeElement {
		NodeElement {
			data: NodeAttrs {
				id: id.into(),
				label: Some(label.into()),
				name: format!("{label} booth"),
				category: "general".into(),
				shape_type: shape,
				width: 20.0,
				height: 20.0,
			},
			position: Position { x, y },
		}
	}

	pub fn edge(source: &str, target: &str) -> EdgeElement {
		EdgeElement {
			data: EdgeAttrs {
				id: format!("edge_{source}_{target}"),
				source: source.into(),
				target: target.into(),
			},
		}
	}

	/// Nodes A, B, C in a row plus the given edges.
	pub fn row(edges: &[(&str, &str)]) -> FloorGraph {
		FloorGraph::new(&GraphData {
			nodes: vec![
				node("A", "1", ShapeType::Rectangle, 0.0, 0.0),
				node("B", "2", ShapeType::Rectangle, 100.0, 0.0),
				node("C", "3", ShapeType::Hexagon, 200.0, 0.0),
			],
			edges: edges.iter().map(|(s, t)| edge(s, t)).collect(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::fixtures::*;
	use super::*;

	#[test]
	fn edge_lookup_is_orientation_free() {
		let graph = row(&[("B", "A")]);
		let (a, b) = (graph.node_index("A").unwrap(), graph.node_index("B").unwrap());
		let forward = graph.edge_between(a, b).unwrap();
		assert_eq!(graph.edge(forward).id, "edge_B_A");
		assert_eq!(graph.edge_between(b, a).unwrap(), forward);
	}

	#[test]
	fn dangling_and_duplicate_edges_are_dropped() {
		let graph = row(&[("A", "B"), ("B", "A"), ("A", "Z")]);
		assert_eq!(graph.edges().len(), 1);
		assert_eq!(graph.edges()[0].id, "edge_A_B");
	}

	#[test]
	fn missing_hop_is_a_lookup_miss() {
		let graph = row(&[("A", "B")]);
		let (a, c) = (graph.node_index("A").unwrap(), graph.node_index("C").unwrap());
		assert!(matches!(
			graph.edge_between(a, c),
			Err(MapError::LookupMiss { kind: "edge", .. })
		));
		assert!(graph.node_index("nope").is_err());
	}

	#[test]
	fn label_resolution_takes_first_match() {
		let graph = FloorGraph::new(&GraphData {
			nodes: vec![
				node("n1", "12", ShapeType::Rectangle, 0.0, 0.0),
				node("n2", "12", ShapeType::Rectangle, 50.0, 0.0),
			],
			edges: vec![],
		});
		assert_eq!(graph.resolve_node_id_by_label("12"), Some("n1"));
		assert_eq!(graph.resolve_node_id_by_label("99"), None);
	}

	#[test]
	fn bounds_cover_node_extents_including_scaffolding() {
		let graph = FloorGraph::new(&GraphData {
			nodes: vec![
				node("A", "1", ShapeType::Rectangle, 0.0, 0.0),
				node("x", "x", ShapeType::Ellipse, 300.0, 100.0),
			],
			edges: vec![],
		});
		let b = graph.bounds().unwrap();
		assert_eq!((b.x1, b.y1, b.x2, b.y2), (-10.0, -10.0, 310.0, 110.0));
	}

	#[test]
	fn node_hit_box_uses_dimensions() {
		let graph = row(&[]);
		let a = graph.node(0);
		assert!(a.contains(9.0, -9.0));
		assert!(!a.contains(11.0, 0.0));
	}
}
