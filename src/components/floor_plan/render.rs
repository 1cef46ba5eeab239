use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::graph::Node;
use super::markers::MarkerKind;
use super::scene::Scene;
use super::types::ShapeType;

const BACKGROUND: &str = "#F9FAFB";
const NODE_FILL: &str = "#A3B18A";
const NODE_BORDER: &str = "#000";
const HIGHLIGHT_FILL: &str = "#F59E0B";
const ROUTE_STROKE: &str = "#F00";
const SELECTED_STROKE: &str = "#2563EB";
const ORIGIN_BADGE: &str = "#14B8A6";
const DESTINATION_BADGE: &str = "#DC2626";
const BORDER_WIDTH: f64 = 5.0;
const ROUTE_WIDTH: f64 = 5.0;

const RECTANGLE: [(f64, f64); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
const DIAMOND: [(f64, f64); 4] = [(0.0, -1.0), (1.0, 0.0), (0.0, 1.0), (-1.0, 0.0)];

// Concave hexagon, as fractions of the half-extents.
const NOTCHED_HEXAGON: [(f64, f64); 6] = [
	(-1.0, -0.95),
	(-0.75, 0.0),
	(-1.0, 0.95),
	(1.0, 0.95),
	(0.75, 0.0),
	(1.0, -0.95),
];

/// Polygon outline of a node in graph space; `None` for ellipses.
pub fn outline(shape: ShapeType, x: f64, y: f64, w: f64, h: f64) -> Option<Vec<(f64, f64)>> {
	let (hw, hh) = (w / 2.0, h / 2.0);
	let scale = |pts: &[(f64, f64)]| -> Vec<(f64, f64)> {
		pts.iter().map(|(px, py)| (x + px * hw, y + py * hh)).collect()
	};
	match shape {
		ShapeType::Rectangle => Some(scale(&RECTANGLE)),
		ShapeType::Hexagon => Some(scale(&NOTCHED_HEXAGON)),
		ShapeType::Diamond => Some(scale(&DIAMOND)),
		ShapeType::Octagon => {
			let pts: Vec<(f64, f64)> = (0..8)
				.map(|i| {
					let a = PI / 8.0 + i as f64 * PI / 4.0;
					(a.cos(), a.sin())
				})
				.collect();
			Some(scale(&pts))
		}
		ShapeType::Ellipse => None,
	}
}

/// Right-angle route between two node centers: vertical, horizontal, vertical.
pub fn taxi_route(x1: f64, y1: f64, x2: f64, y2: f64) -> [(f64, f64); 4] {
	let mid_y = (y1 + y2) / 2.0;
	[(x1, y1), (x1, mid_y), (x2, mid_y), (x2, y2)]
}

pub fn render(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	let cam = &scene.camera;
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, cam.width, cam.height);
	ctx.save();
	let _ = ctx.translate(cam.pan_x, cam.pan_y);
	let _ = ctx.scale(cam.zoom, cam.zoom);
	draw_route(scene, ctx);
	draw_nodes(scene, ctx);
	draw_markers(scene, ctx);
	ctx.restore();
}

// Edges are invisible unless they are part of the route.
fn draw_route(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(ROUTE_STROKE);
	ctx.set_line_width(ROUTE_WIDTH);
	ctx.set_line_join("round");
	for (idx, edge) in scene.graph.edges().iter().enumerate() {
		if !scene.highlight.has_edge(idx) {
			continue;
		}
		let (a, b) = (scene.graph.node(edge.source), scene.graph.node(edge.target));
		let pts = taxi_route(a.x, a.y, b.x, b.y);
		ctx.begin_path();
		ctx.move_to(pts[0].0, pts[0].1);
		for &(x, y) in &pts[1..] {
			ctx.line_to(x, y);
		}
		ctx.stroke();
	}
}

fn trace(ctx: &CanvasRenderingContext2d, node: &Node) {
	ctx.begin_path();
	match outline(node.shape, node.x, node.y, node.width, node.height) {
		Some(pts) => {
			ctx.move_to(pts[0].0, pts[0].1);
			for &(x, y) in &pts[1..] {
				ctx.line_to(x, y);
			}
			ctx.close_path();
		}
		None => {
			let _ = ctx.ellipse(
				node.x,
				node.y,
				node.width / 2.0,
				node.height / 2.0,
				0.0,
				0.0,
				2.0 * PI,
			);
		}
	}
}

fn draw_nodes(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	let k = scene.camera.zoom;
	for (idx, node) in scene.graph.nodes().iter().enumerate() {
		if !node.shape.is_visible() {
			continue;
		}
		trace(ctx, node);
		ctx.set_fill_style_str(if scene.highlight.has_node(idx) {
			HIGHLIGHT_FILL
		} else {
			NODE_FILL
		});
		ctx.fill();
		let selected = scene.selected == Some(idx);
		ctx.set_stroke_style_str(if selected { SELECTED_STROKE } else { NODE_BORDER });
		ctx.set_line_width(if selected { BORDER_WIDTH * 1.5 } else { BORDER_WIDTH });
		ctx.stroke();

		ctx.set_fill_style_str("#000");
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		ctx.set_font(&format!("{}px sans-serif", (12.0 / k.max(0.5)).min(node.height * 0.6)));
		let _ = ctx.fill_text(&node.label, node.x, node.y);
	}
}

fn draw_markers(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	let radius = 9.0 / scene.camera.zoom.max(0.5);
	for (idx, kind) in [
		(scene.markers.origin(), MarkerKind::Origin),
		(scene.markers.destination(), MarkerKind::Destination),
	]
	.into_iter()
	.filter_map(|(idx, kind)| idx.map(|i| (i, kind)))
	{
		let node = scene.graph.node(idx);
		let (bx, by) = (node.x, node.y - node.height / 2.0 - radius);
		ctx.begin_path();
		let _ = ctx.arc(bx, by, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(match kind {
			MarkerKind::Origin => ORIGIN_BADGE,
			MarkerKind::Destination => DESTINATION_BADGE,
		});
		ctx.fill();
		ctx.set_stroke_style_str("white");
		ctx.set_line_width(radius * 0.25);
		ctx.stroke();

		ctx.set_fill_style_str("white");
		ctx.set_font(&format!("bold {}px sans-serif", radius * 1.2));
		let glyph = match kind {
			MarkerKind::Origin => "A",
			MarkerKind::Destination => "B",
		};
		let _ = ctx.fill_text(glyph, bx, by);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hexagon_is_notched_six_point_outline() {
		let pts = outline(ShapeType::Hexagon, 0.0, 0.0, 40.0, 20.0).unwrap();
		assert_eq!(pts.len(), 6);
		// The side vertices point inward, unlike a regular hexagon.
		assert_eq!(pts[1], (-15.0, 0.0));
		assert_eq!(pts[4], (15.0, 0.0));
		assert_eq!(pts[0], (-20.0, -9.5));
	}

	#[test]
	fn rectangle_spans_dimensions() {
		let pts = outline(ShapeType::Rectangle, 10.0, 10.0, 20.0, 10.0).unwrap();
		assert_eq!(pts, vec![(0.0, 5.0), (20.0, 5.0), (20.0, 15.0), (0.0, 15.0)]);
		assert!(outline(ShapeType::Ellipse, 0.0, 0.0, 1.0, 1.0).is_none());
		assert_eq!(outline(ShapeType::Octagon, 0.0, 0.0, 2.0, 2.0).unwrap().len(), 8);
	}

	#[test]
	fn taxi_route_is_orthogonal() {
		let pts = taxi_route(0.0, 0.0, 10.0, 20.0);
		for w in pts.windows(2) {
			assert!(w[0].0 == w[1].0 || w[0].1 == w[1].1);
		}
		assert_eq!(pts[3], (10.0, 20.0));
	}
}
