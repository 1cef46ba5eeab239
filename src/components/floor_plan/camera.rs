use super::graph::Bounds;

/// Whether the next viewport change is one we caused ourselves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewportGuard {
	#[default]
	Idle,
	/// A pan correction was just applied; its echo must not be corrected again.
	Correcting,
}

/// Pan/zoom of the canvas: screen = graph * zoom + pan.
#[derive(Clone, Debug)]
pub struct Camera {
	pub pan_x: f64,
	pub pan_y: f64,
	pub zoom: f64,
	pub width: f64,
	pub height: f64,
	min_zoom: f64,
	max_zoom: f64,
	guard: ViewportGuard,
	/// Extent the pan is clamped against.
	extent: Option<Bounds>,
	corrections: u64,
}

impl Camera {
	pub fn new(width: f64, height: f64, min_zoom: f64, max_zoom: f64) -> Self {
		Self {
			pan_x: 0.0,
			pan_y: 0.0,
			zoom: 1.0,
			width,
			height,
			min_zoom,
			max_zoom,
			guard: ViewportGuard::Idle,
			extent: None,
			corrections: 0,
		}
	}

	pub fn set_extent(&mut self, extent: Option<Bounds>) {
		self.extent = extent;
	}

	pub fn guard(&self) -> ViewportGuard {
		self.guard
	}

	/// Number of pan corrections applied so far.
	pub fn corrections(&self) -> u64 {
		self.corrections
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.pan_x) / self.zoom, (sy - self.pan_y) / self.zoom)
	}

	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(gx * self.zoom + self.pan_x, gy * self.zoom + self.pan_y)
	}

	/// The graph-space rectangle currently on screen.
	pub fn visible_extent(&self) -> Bounds {
		let (x1, y1) = self.screen_to_graph(0.0, 0.0);
		let (x2, y2) = self.screen_to_graph(self.width, self.height);
		Bounds { x1, y1, x2, y2 }
	}

	/// Zooms and centers so the extent fills the viewport.
	pub fn fit(&mut self, padding: f64) {
		let Some(b) = self.extent else {
			return;
		};
		let (avail_w, avail_h) = (
			(self.width - padding * 2.0).max(1.0),
			(self.height - padding * 2.0).max(1.0),
		);
		let zoom = if b.width() <= 0.0 || b.height() <= 0.0 {
			self.zoom
		} else {
			(avail_w / b.width()).min(avail_h / b.height())
		};
		self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
		let (cx, cy) = ((b.x1 + b.x2) / 2.0, (b.y1 + b.y2) / 2.0);
		self.pan_x = self.width / 2.0 - cx * self.zoom;
		self.pan_y = self.height / 2.0 - cy * self.zoom;
		self.viewport_changed();
	}

	pub fn pan_to(&mut self, x: f64, y: f64) {
		self.pan_x = x;
		self.pan_y = y;
		self.viewport_changed();
	}

	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.pan_to(self.pan_x + dx, self.pan_y + dy);
	}

	/// Zooms by `factor` keeping the screen point (sx, sy) fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
		let ratio = new_zoom / self.zoom;
		self.pan_x = sx - (sx - self.pan_x) * ratio;
		self.pan_y = sy - (sy - self.pan_y) * ratio;
		self.zoom = new_zoom;
		self.viewport_changed();
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.viewport_changed();
	}

	/// Runs on every viewport change. Keeps the extent from being dragged
	/// more than half a viewport past any side of the screen.
	fn viewport_changed(&mut self) {
		if self.guard == ViewportGuard::Correcting {
			self.guard = ViewportGuard::Idle;
			return;
		}
		let (x, y) = self.clamped_pan();
		if (x, y) != (self.pan_x, self.pan_y) {
			self.guard = ViewportGuard::Correcting;
			self.corrections += 1;
			self.pan_x = x;
			self.pan_y = y;
			// The correction is itself a viewport change.
			self.viewport_changed();
		}
	}

	fn clamped_pan(&self) -> (f64, f64) {
		let Some(b) = self.extent else {
			return (self.pan_x, self.pan_y);
		};
		let (pad_h, pad_v) = (self.width / 2.0, self.height / 2.0);
		let (mut x, mut y) = (self.pan_x, self.pan_y);
		let z = self.zoom;

		if b.x2 * z + x < pad_h {
			x = pad_h - b.x2 * z;
		}
		if b.y2 * z + y < pad_v {
			y = pad_v - b.y2 * z;
		}
		if b.x1 * z + x > self.width - pad_h {
			x = self.width - pad_h - b.x1 * z;
		}
		if b.y1 * z + y > self.height - pad_v {
			y = self.height - pad_v - b.y1 * z;
		}
		(x, y)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn camera() -> Camera {
		let mut cam = Camera::new(400.0, 200.0, 0.1, 2.0);
		cam.set_extent(Some(Bounds {
			x1: 0.0,
			y1: 0.0,
			x2: 1000.0,
			y2: 500.0,
		}));
		cam
	}

	#[test]
	fn fit_centers_and_clamps_zoom() {
		let mut cam = camera();
		cam.fit(0.0);
		assert!((cam.zoom - 0.4).abs() < 1e-9);
		let (cx, cy) = cam.graph_to_screen(500.0, 250.0);
		assert!((cx - 200.0).abs() < 1e-9 && (cy - 100.0).abs() < 1e-9);

		let mut tiny = Camera::new(400.0, 200.0, 0.1, 2.0);
		tiny.set_extent(Some(Bounds {
			x1: 0.0,
			y1: 0.0,
			x2: 10.0,
			y2: 10.0,
		}));
		tiny.fit(0.0);
		assert_eq!(tiny.zoom, 2.0);
	}

	#[test]
	fn pan_past_half_viewport_is_pulled_back() {
		let mut cam = camera();
		cam.pan_to(5000.0, 0.0);
		// Left edge of the extent may sit at most at the screen center.
		assert_eq!(cam.pan_x, 200.0);
		cam.pan_to(-5000.0, -5000.0);
		assert_eq!(cam.graph_to_screen(1000.0, 500.0), (200.0, 100.0));
	}

	#[test]
	fn correction_echo_is_swallowed_once() {
		let mut cam = camera();
		cam.pan_to(5000.0, 0.0);
		assert_eq!(cam.corrections(), 1);
		assert_eq!(cam.guard(), ViewportGuard::Idle);

		cam.pan_by(-10.0, 0.0);
		assert_eq!(cam.corrections(), 1);
		assert_eq!(cam.pan_x, 190.0);
	}

	#[test]
	fn zoom_keeps_anchor_and_respects_bounds() {
		let mut cam = camera();
		cam.zoom_at(100.0, 50.0, 1.5);
		let (gx, gy) = cam.screen_to_graph(100.0, 50.0);
		assert!((gx - 100.0).abs() < 1e-9 && (gy - 50.0).abs() < 1e-9);
		for _ in 0..20 {
			cam.zoom_at(0.0, 0.0, 0.5);
		}
		assert_eq!(cam.zoom, 0.1);
	}

	#[test]
	fn visible_extent_tracks_pan_and_zoom() {
		let mut cam = camera();
		cam.zoom_at(0.0, 0.0, 2.0);
		let v = cam.visible_extent();
		assert_eq!((v.x1, v.y1, v.x2, v.y2), (0.0, 0.0, 200.0, 100.0));
	}
}
