use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent, Window,
};

use super::graph::FloorGraph;
use super::popup::NodePopup;
use super::render;
use super::scene::{Scene, SceneHandle, Tap};
use super::types::{GraphData, NodeDetails};
use crate::config::MapConfig;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Listeners and the frame loop of one mounted canvas.
struct CanvasRuntime {
	window: Window,
	scene: SceneHandle,
	animate: FrameCallback,
	frame: Rc<Cell<Option<i32>>>,
	resize: Closure<dyn FnMut()>,
}

impl CanvasRuntime {
	fn teardown(self) {
		if let Some(id) = self.frame.take() {
			let _ = self.window.cancel_animation_frame(id);
		}
		// Dropping the closure breaks its self-reference.
		self.animate.borrow_mut().take();
		let _ = self
			.window
			.remove_event_listener_with_callback("resize", self.resize.as_ref().unchecked_ref());
		self.scene.destroy();
		debug!("floor plan canvas torn down");
	}
}

fn container_size(canvas: &HtmlCanvasElement, window: &Window) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or_else(|| {
			(
				window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0),
				window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0),
			)
		})
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas
		.get_context("2d")
		.ok()
		.flatten()
		.and_then(|ctx| ctx.dyn_into().ok())
}

#[component]
pub fn FloorPlanCanvas(
	#[prop(into)] data: Signal<Option<GraphData>>,
	scene: SceneHandle,
	/// Set once the scene is installed, cleared on teardown.
	ready: RwSignal<bool>,
	#[prop(into)] on_im_here: Callback<NodeDetails>,
	#[prop(into)] on_get_here: Callback<NodeDetails>,
) -> impl IntoView {
	let config = use_context::<MapConfig>().unwrap_or_default();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let popup = RwSignal::new(None::<NodeDetails>);
	let runtime = StoredValue::new_local(None::<CanvasRuntime>);

	let (scene_init, config_init) = (scene.clone(), config.clone());
	Effect::new(move |_| {
		// Defer until both the canvas and the graph are there.
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(graph) = data.with(|d| d.as_ref().map(FloorGraph::new)) else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(ctx) = context_2d(&canvas) else {
			warn!("canvas has no 2d context");
			return;
		};
		runtime.update_value(|rt| {
			if let Some(old) = rt.take() {
				old.teardown();
			}
		});

		let (w, h) = container_size(&canvas, &window);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		scene_init.install(Scene::new(graph, w, h, &config_init));

		let (scene_resize, canvas_resize, window_resize) =
			(scene_init.clone(), canvas.clone(), window.clone());
		let resize: Closure<dyn FnMut()> = Closure::new(move || {
			let (nw, nh) = container_size(&canvas_resize, &window_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			let _ = scene_resize.with_mut(|s| s.resize(nw, nh));
		});
		let _ = window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref());

		let animate: FrameCallback = Rc::new(RefCell::new(None));
		let frame = Rc::new(Cell::new(None));
		let (scene_anim, animate_inner, frame_inner) =
			(scene_init.clone(), animate.clone(), frame.clone());
		*animate.borrow_mut() = Some(Closure::new(move || {
			let _ = scene_anim.with_mut(|s| {
				if s.take_dirty() {
					render::render(s, &ctx);
				}
			});
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				frame_inner.set(win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		if let Some(cb) = animate.borrow().as_ref() {
			frame.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}

		runtime.set_value(Some(CanvasRuntime {
			window,
			scene: scene_init.clone(),
			animate,
			frame,
			resize,
		}));
		ready.set(true);
		info!("floor plan mounted ({w}x{h})");
	});

	on_cleanup(move || {
		runtime.update_value(|rt| {
			if let Some(rt) = rt.take() {
				rt.teardown();
			}
		});
		let _ = ready.try_set(false);
	});

	// Closing the popup by any means drops the selection outline.
	let scene_popup = scene.clone();
	Effect::new(move |_| {
		if popup.with(Option::is_none) {
			let _ = scene_popup.with_mut(|s| s.on_background_tap());
		}
	});

	let local_point = move |client_x: i32, client_y: i32| {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((client_x as f64 - rect.left(), client_y as f64 - rect.top()))
	};
	let show_tap = move |tap: Option<Tap>| match tap {
		Some(Tap::Node(details)) => popup.set(Some(details)),
		Some(Tap::Background) => popup.set(None),
		None => {}
	};

	let scene_md = scene.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = local_point(ev.client_x(), ev.client_y()) {
			let _ = scene_md.with_mut(|s| s.press(x, y));
		}
	};

	let scene_mm = scene.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = local_point(ev.client_x(), ev.client_y()) {
			let _ = scene_mm.with_mut(|s| s.drag(x, y));
		}
	};

	let scene_mu = scene.clone();
	let on_mouseup = move |ev: MouseEvent| {
		if let Some((x, y)) = local_point(ev.client_x(), ev.client_y()) {
			show_tap(scene_mu.with_mut(|s| s.release(x, y)).ok().flatten());
		}
	};

	let scene_ml = scene.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let _ = scene_ml.with_mut(|s| s.cancel_pointer());
	};

	let scene_wh = scene.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = local_point(ev.client_x(), ev.client_y()) {
			let _ = scene_wh.with_mut(|s| s.wheel(x, y, ev.delta_y()));
		}
	};

	// Two-finger gestures report their center and spread.
	let touch_points = move |ev: &TouchEvent| {
		let touches = ev.touches();
		let first = touches.get(0)?;
		let (x0, y0) = local_point(first.client_x(), first.client_y())?;
		match touches.get(1) {
			Some(second) => {
				let (x1, y1) = local_point(second.client_x(), second.client_y())?;
				Some(((x0 + x1) / 2.0, (y0 + y1) / 2.0, Some((x1 - x0).hypot(y1 - y0))))
			}
			None => Some((x0, y0, None)),
		}
	};

	let scene_ts = scene.clone();
	let on_touchstart = move |ev: TouchEvent| {
		let Some((x, y, spread)) = touch_points(&ev) else {
			return;
		};
		let _ = scene_ts.with_mut(|s| match spread {
			Some(d) => s.pinch_start(d),
			None => s.press(x, y),
		});
	};

	let scene_tm = scene.clone();
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		let Some((x, y, spread)) = touch_points(&ev) else {
			return;
		};
		let _ = scene_tm.with_mut(|s| match spread {
			Some(d) => s.pinch_move(x, y, d),
			None => s.drag(x, y),
		});
	};

	let scene_te = scene.clone();
	let on_touchend = move |ev: TouchEvent| {
		if ev.touches().length() > 0 {
			let _ = scene_te.with_mut(|s| s.pinch_end());
			return;
		}
		let Some(point) = ev
			.changed_touches()
			.get(0)
			.and_then(|t| local_point(t.client_x(), t.client_y()))
		else {
			return;
		};
		show_tap(scene_te.with_mut(|s| s.release(point.0, point.1)).ok().flatten());
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="floor-plan-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			style="display: block; cursor: grab; touch-action: none;"
		/>
		<NodePopup details=popup on_im_here=on_im_here on_get_here=on_get_here />
	}
}
