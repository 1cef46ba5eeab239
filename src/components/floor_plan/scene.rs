use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};

use super::camera::Camera;
use super::graph::{FloorGraph, NodeIdx};
use super::highlight::PathHighlight;
use super::markers::LocationMarkers;
use super::types::NodeDetails;
use crate::config::MapConfig;
use crate::error::MapError;

#[derive(Clone, Debug, Default)]
pub struct PointerState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub last_x: f64,
	pub last_y: f64,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PinchState {
	pub active: bool,
	pub distance: f64,
}

/// Result of releasing a press that did not turn into a pan.
#[derive(Clone, Debug, PartialEq)]
pub enum Tap {
	Node(NodeDetails),
	Background,
}

/// Everything drawn on the canvas plus the interaction state driving it.
pub struct Scene {
	pub graph: FloorGraph,
	pub camera: Camera,
	pub highlight: PathHighlight,
	pub markers: LocationMarkers,
	pub pointer: PointerState,
	pub pinch: PinchState,
	pub selected: Option<NodeIdx>,
	fit_padding: f64,
	tap_slop: f64,
	wheel_sensitivity: f64,
	dirty: bool,
}

impl Scene {
	pub fn new(graph: FloorGraph, width: f64, height: f64, config: &MapConfig) -> Self {
		let mut camera = Camera::new(width, height, config.min_zoom, config.max_zoom);
		camera.set_extent(graph.bounds());
		let mut scene = Self {
			graph,
			camera,
			highlight: PathHighlight::default(),
			markers: LocationMarkers::default(),
			pointer: PointerState::default(),
			pinch: PinchState::default(),
			selected: None,
			fit_padding: config.fit_padding,
			tap_slop: config.tap_slop,
			wheel_sensitivity: config.wheel_sensitivity,
			dirty: true,
		};
		scene.fit();
		scene
	}

	pub fn mark_dirty(&mut self) {
		self.dirty = true;
	}

	/// Returns whether a repaint is due and clears the flag.
	pub fn take_dirty(&mut self) -> bool {
		std::mem::take(&mut self.dirty)
	}

	pub fn fit(&mut self) {
		self.camera.fit(self.fit_padding);
		self.dirty = true;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.camera.resize(width, height);
		self.dirty = true;
	}

	/// Topmost visible node under a screen point. Scaffolding is never hit.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeIdx> {
		let (gx, gy) = self.camera.screen_to_graph(sx, sy);
		self.graph
			.nodes()
			.iter()
			.enumerate()
			.rev()
			.find(|(_, n)| n.shape.is_visible() && n.contains(gx, gy))
			.map(|(idx, _)| idx)
	}

	/// Marks the route and moves the camera only if part of it is off screen.
	pub fn highlight(&mut self, path: &[String]) {
		self.highlight.apply(&self.graph, path);
		self.dirty = true;
		if self.highlight.is_empty() {
			return;
		}
		let view = self.camera.visible_extent();
		let on_screen = self.highlight.route().iter().all(|&idx| {
			let n = self.graph.node(idx);
			view.contains(n.x, n.y)
		});
		if !on_screen {
			debug!("route leaves the viewport, refitting");
			self.fit();
		}
	}

	pub fn clear_highlight(&mut self) {
		self.highlight.clear();
		self.dirty = true;
	}

	pub fn set_markers(&mut self, origin: Option<&str>, destination: Option<&str>) {
		self.markers.set(&self.graph, origin, destination);
		self.dirty = true;
	}

	/// Places the origin/destination badges on the booths carrying these labels.
	pub fn mark_booths(&mut self, origin: Option<&str>, destination: Option<&str>) {
		let origin = self.booth_node_id(origin, "origin");
		let destination = self.booth_node_id(destination, "destination");
		self.set_markers(origin.as_deref(), destination.as_deref());
	}

	fn booth_node_id(&self, label: Option<&str>, role: &str) -> Option<String> {
		let label = label?;
		let id = self.graph.resolve_node_id_by_label(label).map(str::to_string);
		if id.is_none() {
			warn!("{role} marker: {}", MapError::lookup_miss("label", label));
		}
		id
	}

	/// Highlights a single booth, for a route that starts where it ends.
	pub fn highlight_booth(&mut self, label: &str) {
		match self.graph.resolve_node_id_by_label(label).map(str::to_string) {
			Some(id) => self.highlight(&[id]),
			None => {
				debug!("no node labelled {label}");
				self.clear_highlight();
			}
		}
	}

	pub fn on_node_tap(&mut self, idx: NodeIdx) -> NodeDetails {
		self.selected = Some(idx);
		self.dirty = true;
		self.graph.node(idx).details()
	}

	pub fn on_background_tap(&mut self) {
		if self.selected.take().is_some() {
			self.dirty = true;
		}
	}

	pub fn press(&mut self, x: f64, y: f64) {
		self.pointer = PointerState {
			active: true,
			start_x: x,
			start_y: y,
			last_x: x,
			last_y: y,
			moved: false,
		};
	}

	pub fn drag(&mut self, x: f64, y: f64) {
		if !self.pointer.active || self.pinch.active {
			return;
		}
		let p = &mut self.pointer;
		if !p.moved && (x - p.start_x).hypot(y - p.start_y) > self.tap_slop {
			p.moved = true;
		}
		if p.moved {
			let (dx, dy) = (x - p.last_x, y - p.last_y);
			p.last_x = x;
			p.last_y = y;
			self.camera.pan_by(dx, dy);
			self.dirty = true;
		}
	}

	/// Ends a press; a press that never moved past the slop is a tap.
	pub fn release(&mut self, x: f64, y: f64) -> Option<Tap> {
		let was_tap = self.pointer.active && !self.pointer.moved && !self.pinch.active;
		self.pointer = PointerState::default();
		if !was_tap {
			return None;
		}
		Some(match self.node_at_position(x, y) {
			Some(idx) => Tap::Node(self.on_node_tap(idx)),
			None => {
				self.on_background_tap();
				Tap::Background
			}
		})
	}

	pub fn cancel_pointer(&mut self) {
		self.pointer = PointerState::default();
		self.pinch = PinchState::default();
	}

	pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) {
		let step = (delta_y.abs() / 100.0).clamp(0.0, 1.0) * self.wheel_sensitivity * 5.0;
		let factor = if delta_y > 0.0 { 1.0 / (1.0 + step) } else { 1.0 + step };
		self.camera.zoom_at(x, y, factor);
		self.dirty = true;
	}

	pub fn pinch_start(&mut self, distance: f64) {
		self.pointer = PointerState::default();
		self.pinch = PinchState {
			active: true,
			distance,
		};
	}

	pub fn pinch_move(&mut self, cx: f64, cy: f64, distance: f64) {
		if !self.pinch.active || self.pinch.distance <= 0.0 {
			return;
		}
		let factor = distance / self.pinch.distance;
		self.pinch.distance = distance;
		self.camera.zoom_at(cx, cy, factor);
		self.dirty = true;
	}

	pub fn pinch_end(&mut self) {
		self.pinch = PinchState::default();
	}
}

/// Owned handle to the one scene of a mounted map.
///
/// The page creates it; the canvas installs a scene on mount and destroys
/// it on unmount. Everything else borrows through it.
#[derive(Clone, Default)]
pub struct SceneHandle(Rc<RefCell<Option<Scene>>>);

impl SceneHandle {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn install(&self, scene: Scene) {
		*self.0.borrow_mut() = Some(scene);
	}

	pub fn destroy(&self) {
		if self.0.borrow_mut().take().is_some() {
			debug!("scene destroyed");
		}
	}

	pub fn is_ready(&self) -> bool {
		self.0.borrow().is_some()
	}

	pub fn with_mut<R>(&self, f: impl FnOnce(&mut Scene) -> R) -> Result<R, MapError> {
		match self.0.borrow_mut().as_mut() {
			Some(scene) => Ok(f(scene)),
			None => Err(MapError::DataNotReady("scene")),
		}
	}

	pub fn with<R>(&self, f: impl FnOnce(&Scene) -> R) -> Result<R, MapError> {
		match self.0.borrow().as_ref() {
			Some(scene) => Ok(f(scene)),
			None => Err(MapError::DataNotReady("scene")),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::super::graph::fixtures::{edge, node};
	use super::super::types::{GraphData, ShapeType};
	use super::*;

	fn scene() -> Scene {
		let graph = FloorGraph::new(&GraphData {
			nodes: vec![
				node("A", "1", ShapeType::Rectangle, 0.0, 0.0),
				node("B", "2", ShapeType::Rectangle, 100.0, 0.0),
				node("C", "3", ShapeType::Rectangle, 2000.0, 0.0),
				node("w", "w", ShapeType::Diamond, 50.0, 0.0),
			],
			edges: vec![edge("A", "w"), edge("w", "B"), edge("B", "C")],
		});
		Scene::new(graph, 800.0, 600.0, &MapConfig::default())
	}

	fn ids(ids: &[&str]) -> Vec<String> {
		ids.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn on_screen_route_does_not_move_camera() {
		let mut s = scene();
		// Zoom in around A and B so C falls off screen.
		s.camera.zoom_at(0.0, 300.0, 4.0);
		s.camera.pan_to(200.0, 300.0);
		let before = (s.camera.pan_x, s.camera.pan_y, s.camera.zoom);

		s.highlight(&ids(&["A", "w", "B"]));
		assert_eq!((s.camera.pan_x, s.camera.pan_y, s.camera.zoom), before);

		s.highlight(&ids(&["B", "C"]));
		assert_ne!((s.camera.pan_x, s.camera.pan_y, s.camera.zoom), before);
		let view = s.camera.visible_extent();
		assert!(view.contains(2000.0, 0.0));
	}

	#[test]
	fn scaffolding_is_not_tappable() {
		let mut s = scene();
		let (sx, sy) = s.camera.graph_to_screen(50.0, 0.0);
		assert_eq!(s.node_at_position(sx, sy), None);

		let (ax, ay) = s.camera.graph_to_screen(0.0, 0.0);
		s.press(ax, ay);
		match s.release(ax, ay) {
			Some(Tap::Node(d)) => assert_eq!(d.label, "1"),
			other => panic!("expected node tap, got {other:?}"),
		}
		assert_eq!(s.selected, Some(0));

		s.press(sx, sy);
		assert_eq!(s.release(sx, sy), Some(Tap::Background));
		assert_eq!(s.selected, None);
	}

	#[test]
	fn drag_beyond_slop_pans_instead_of_tapping() {
		let mut s = scene();
		let (ax, ay) = s.camera.graph_to_screen(0.0, 0.0);
		let pan_before = s.camera.pan_x;
		s.press(ax, ay);
		s.drag(ax + 2.0, ay);
		assert!(!s.pointer.moved);
		s.drag(ax + 20.0, ay);
		assert!(s.pointer.moved);
		assert_eq!(s.release(ax + 20.0, ay), None);
		assert!(s.camera.pan_x > pan_before);
	}

	#[test]
	fn dirty_flag_is_consumed() {
		let mut s = scene();
		assert!(s.take_dirty());
		assert!(!s.take_dirty());
		s.set_markers(Some("A"), Some("nope"));
		assert!(s.take_dirty());
		assert_eq!(s.markers.origin(), Some(0));
	}

	#[test]
	fn booths_are_marked_by_label() {
		let mut s = scene();
		s.mark_booths(Some("2"), Some("3"));
		assert_eq!(s.markers.origin(), Some(1));
		assert_eq!(s.markers.destination(), Some(2));
		s.mark_booths(None, Some("missing"));
		assert_eq!((s.markers.origin(), s.markers.destination()), (None, None));
		assert_eq!(s.booth_node_id(Some("3"), "destination").as_deref(), Some("C"));
		assert_eq!(s.booth_node_id(Some("ZZZ"), "origin"), None);
		assert_eq!(s.booth_node_id(None, "origin"), None);

		s.highlight_booth("1");
		assert!(s.highlight.has_node(0));
		assert_eq!(s.highlight.node_count(), 1);
		s.highlight_booth("missing");
		assert!(s.highlight.is_empty());
	}

	#[test]
	fn handle_defers_until_installed() {
		let handle = SceneHandle::new();
		assert_eq!(
			handle.with(|_| ()).unwrap_err(),
			MapError::DataNotReady("scene")
		);
		handle.install(scene());
		assert!(handle.with_mut(|s| s.fit()).is_ok());
		handle.destroy();
		assert!(!handle.is_ready());
	}
}
