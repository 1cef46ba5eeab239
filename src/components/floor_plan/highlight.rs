use std::collections::HashSet;

use log::warn;

use super::graph::{EdgeIdx, FloorGraph, NodeIdx};

/// Nodes and edges marked as part of the displayed route.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathHighlight {
	nodes: HashSet<NodeIdx>,
	edges: HashSet<EdgeIdx>,
	/// Resolved route nodes in path order.
	route: Vec<NodeIdx>,
}

impl PathHighlight {
	pub fn clear(&mut self) {
		self.nodes.clear();
		self.edges.clear();
		self.route.clear();
	}

	/// Replaces the current marks with `path`. Unknown nodes and missing
	/// hops are skipped with a warning; an empty path just clears.
	pub fn apply(&mut self, graph: &FloorGraph, path: &[String]) {
		self.clear();

		let mut prev: Option<NodeIdx> = None;
		for id in path {
			let idx = match graph.node_index(id) {
				Ok(idx) => idx,
				Err(e) => {
					warn!("highlight: {e}");
					prev = None;
					continue;
				}
			};
			self.nodes.insert(idx);
			self.route.push(idx);
			if let Some(p) = prev {
				match graph.edge_between(p, idx) {
					Ok(edge) => {
						self.edges.insert(edge);
					}
					Err(e) => warn!("highlight: {e}"),
				}
			}
			prev = Some(idx);
		}
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn has_node(&self, idx: NodeIdx) -> bool {
		self.nodes.contains(&idx)
	}

	pub fn has_edge(&self, idx: EdgeIdx) -> bool {
		self.edges.contains(&idx)
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	pub fn route(&self) -> &[NodeIdx] {
		&self.route
	}
}

#[cfg(test)]
mod tests {
	use super::super::graph::fixtures::row;
	use super::*;

	fn path(ids: &[&str]) -> Vec<String> {
		ids.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn two_node_path_marks_both_nodes_and_the_edge() {
		let graph = row(&[("A", "B")]);
		let mut hl = PathHighlight::default();
		hl.apply(&graph, &path(&["A", "B"]));

		assert_eq!(hl.edge_count(), 1);
		assert_eq!(hl.node_count(), 2);
		let a = graph.node_index("A").unwrap();
		let b = graph.node_index("B").unwrap();
		let c = graph.node_index("C").unwrap();
		assert!(hl.has_node(a) && hl.has_node(b) && !hl.has_node(c));
		assert!(hl.has_edge(graph.edge_between(a, b).unwrap()));
	}

	#[test]
	fn reverse_stored_edge_is_found() {
		let graph = row(&[("B", "A")]);
		let mut hl = PathHighlight::default();
		hl.apply(&graph, &path(&["A", "B"]));
		assert_eq!(hl.edge_count(), 1);
		assert_eq!(graph.edge(*hl.edges.iter().next().unwrap()).id, "edge_B_A");
	}

	#[test]
	fn longer_path_marks_len_minus_one_edges() {
		let graph = row(&[("A", "B"), ("C", "B")]);
		let mut hl = PathHighlight::default();
		hl.apply(&graph, &path(&["A", "B", "C"]));
		assert_eq!(hl.edge_count(), 2);
		assert_eq!(hl.node_count(), 3);
		assert_eq!(hl.route().len(), 3);
	}

	#[test]
	fn single_node_path_has_no_edges() {
		let graph = row(&[("A", "B")]);
		let mut hl = PathHighlight::default();
		hl.apply(&graph, &path(&["B"]));
		assert_eq!((hl.node_count(), hl.edge_count()), (1, 0));
	}

	#[test]
	fn empty_path_clears_idempotently() {
		let graph = row(&[("A", "B")]);
		let mut hl = PathHighlight::default();
		hl.apply(&graph, &path(&["A", "B"]));
		hl.apply(&graph, &[]);
		let once = hl.clone();
		hl.apply(&graph, &[]);
		assert!(hl.is_empty());
		assert_eq!(hl, once);
		assert_eq!(hl.edge_count(), 0);
	}

	#[test]
	fn unknown_ids_are_skipped() {
		let graph = row(&[("A", "B")]);
		let mut hl = PathHighlight::default();
		hl.apply(&graph, &path(&["A", "ghost", "B"]));
		assert_eq!(hl.node_count(), 2);
		assert_eq!(hl.edge_count(), 0);
	}
}
