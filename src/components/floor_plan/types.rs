use std::collections::HashSet;

use serde::{Deserialize, Deserializer};

const DEFAULT_NODE_SIZE: f64 = 30.0;

/// Outline of a node as authored in the floor plan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
	Hexagon,
	Ellipse,
	Diamond,
	Octagon,
	/// Also whatever shape the plan names that is not listed above.
	#[default]
	#[serde(other)]
	Rectangle,
}

impl ShapeType {
	/// Rectangles and hexagons are booths; the rest is layout scaffolding.
	pub fn is_booth(self) -> bool {
		matches!(self, Self::Rectangle | Self::Hexagon)
	}

	pub fn is_visible(self) -> bool {
		self.is_booth()
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Position {
	#[serde(deserialize_with = "number")]
	pub x: f64,
	#[serde(deserialize_with = "number")]
	pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NodeAttrs {
	pub id: String,
	#[serde(default)]
	pub label: Option<String>,
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub category: String,
	#[serde(default, deserialize_with = "shape")]
	pub shape_type: ShapeType,
	#[serde(default = "default_size", deserialize_with = "number")]
	pub width: f64,
	#[serde(default = "default_size", deserialize_with = "number")]
	pub height: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NodeElement {
	pub data: NodeAttrs,
	#[serde(default)]
	pub position: Position,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EdgeAttrs {
	pub id: String,
	pub source: String,
	pub target: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EdgeElement {
	pub data: EdgeAttrs,
}

/// Response body of `GET /api/graph`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphData {
	#[serde(default)]
	pub nodes: Vec<NodeElement>,
	#[serde(default)]
	pub edges: Vec<EdgeElement>,
}

impl GraphData {
	/// Booth-shaped nodes, first occurrence per id, for when the directory
	/// has not answered.
	pub fn booths(&self) -> Vec<Booth> {
		let mut seen = HashSet::new();
		self.nodes
			.iter()
			.map(|n| &n.data)
			.filter(|d| d.shape_type.is_booth() && seen.insert(d.id.as_str()))
			.map(|d| Booth {
				id: d.id.clone(),
				label: d.label.clone().unwrap_or_else(|| d.id.clone()),
				name: d.name.clone(),
				category: d.category.clone(),
				shape_type: d.shape_type,
			})
			.collect()
	}
}

/// A searchable venue unit.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Booth {
	pub id: String,
	#[serde(default)]
	pub label: String,
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub category: String,
	#[serde(default, deserialize_with = "shape")]
	pub shape_type: ShapeType,
}

/// The directory answers either flat booths or the graph-style `{data: ...}` envelope.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum BoothRecord {
	Wrapped { data: Booth },
	Flat(Booth),
}

impl From<BoothRecord> for Booth {
	fn from(record: BoothRecord) -> Self {
		let mut booth = match record {
			BoothRecord::Wrapped { data } => data,
			BoothRecord::Flat(booth) => booth,
		};
		if booth.label.is_empty() {
			booth.label = booth.id.clone();
		}
		booth
	}
}

/// What the detail popup shows for a tapped node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDetails {
	pub id: String,
	pub label: String,
	pub name: String,
	pub category: String,
	pub width: f64,
	pub height: f64,
}

fn default_size() -> f64 {
	DEFAULT_NODE_SIZE
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
	Number(f64),
	Text(String),
}

// GraphML attributes are forwarded verbatim, so numbers may arrive quoted.
fn number<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
	match Numeric::deserialize(de)? {
		Numeric::Number(n) => Ok(n),
		Numeric::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
	}
}

fn shape<'de, D: Deserializer<'de>>(de: D) -> Result<ShapeType, D::Error> {
	Ok(Option::<ShapeType>::deserialize(de)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn node_defaults_and_quoted_numbers() {
		let node: NodeElement = serde_json::from_str(
			r#"{"data": {"id": "n1", "width": "42.5", "shape_type": "cloud"},
			    "position": {"x": 10, "y": "20"}}"#,
		)
		.unwrap();
		assert_eq!(node.data.label, None);
		assert_eq!(node.data.width, 42.5);
		assert_eq!(node.data.height, DEFAULT_NODE_SIZE);
		assert_eq!(node.data.shape_type, ShapeType::Rectangle);
		assert_eq!(node.position, Position { x: 10.0, y: 20.0 });
	}

	#[test]
	fn null_shape_is_rectangle() {
		let node: NodeAttrs = serde_json::from_str(r#"{"id": "n1", "shape_type": null}"#).unwrap();
		assert_eq!(node.shape_type, ShapeType::Rectangle);
	}

	#[test]
	fn scaffolding_shapes_are_not_booths() {
		assert!(ShapeType::Hexagon.is_booth());
		for shape in [ShapeType::Ellipse, ShapeType::Diamond, ShapeType::Octagon] {
			assert!(!shape.is_booth());
			assert!(!shape.is_visible());
		}
	}

	#[test]
	fn graph_booths_skip_scaffolding_and_duplicates() {
		let data: GraphData = serde_json::from_str(
			r#"{"nodes": [
				{"data": {"id": "n1", "label": "12", "shape_type": "hexagon"}, "position": {"x": 0, "y": 0}},
				{"data": {"id": "n2", "shape_type": "ellipse"}, "position": {"x": 5, "y": 0}},
				{"data": {"id": "n3"}, "position": {"x": 9, "y": 0}},
				{"data": {"id": "n1", "label": "dup"}, "position": {"x": 1, "y": 1}}
			]}"#,
		)
		.unwrap();
		let booths = data.booths();
		let labels: Vec<&str> = booths.iter().map(|b| b.label.as_str()).collect();
		assert_eq!(labels, ["12", "n3"]);
		assert_eq!(booths[0].shape_type, ShapeType::Hexagon);
	}

	#[test]
	fn booth_records_accept_both_envelopes() {
		let records: Vec<BoothRecord> = serde_json::from_str(
			r#"[{"data": {"id": "n1", "label": "12", "name": "Acme", "category": "food", "shape_type": "hexagon"}},
			    {"id": "n2"}]"#,
		)
		.unwrap();
		let booths: Vec<Booth> = records.into_iter().map(Booth::from).collect();
		assert_eq!(booths[0].label, "12");
		assert_eq!(booths[0].shape_type, ShapeType::Hexagon);
		assert_eq!(booths[1].label, "n2");
		assert_eq!(booths[1].shape_type, ShapeType::Rectangle);
	}
}
