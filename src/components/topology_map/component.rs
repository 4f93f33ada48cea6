use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::debug;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::builder::LayoutGraph;
use super::render;
use super::selection::SelectionEvent;
use super::state::{GraphSession, SessionHost};
use crate::config::MapConfig;

type FrameLoop = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Canvas that lays out and draws the current mesh graph. Every new graph
/// replaces the previous session outright.
#[component]
pub fn TopologyCanvas(
	#[prop(into)] graph: Signal<Option<LayoutGraph>>,
	#[prop(into)] on_select: Callback<SelectionEvent>,
	#[prop(optional)] config: MapConfig,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let host: Rc<RefCell<SessionHost>> = Rc::new(RefCell::new(SessionHost::default()));
	let animate: FrameLoop = Rc::new(RefCell::new(None));
	let (host_init, animate_init) = (host.clone(), animate.clone());

	Effect::new(move |_| {
		let Some(layout) = graph.get() else {
			return;
		};
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		canvas.set_width(config.width as u32);
		canvas.set_height(config.height as u32);

		let generation = host_init
			.borrow_mut()
			.install(GraphSession::new(layout, &config));

		// Settle and pick the default node once the surface has been attached.
		let host_ready = host_init.clone();
		let ready = Closure::once_into_js(move || {
			let event = {
				let mut host = host_ready.borrow_mut();
				let Some(session) = host.session_mut(generation) else {
					debug!("graph session {generation} replaced before it was ready");
					return;
				};
				session.settle();
				session.select_default()
			};
			if let Some(event) = event {
				on_select.run(event);
			}
		});
		let _ = window.request_animation_frame(ready.unchecked_ref());

		if animate_init.borrow().is_none() {
			start_frame_loop(&canvas, &window, host_init.clone(), animate_init.clone());
		}
	});

	let pointer = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let host_md = host.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		if let Some(s) = host_md.borrow_mut().current_mut() {
			s.pointer_down(x, y);
		}
	};

	let host_mm = host.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		if let Some(s) = host_mm.borrow_mut().current_mut() {
			s.pointer_move(x, y);
		}
	};

	let host_mu = host.clone();
	let on_mouseup = move |_: MouseEvent| {
		let event = host_mu
			.borrow_mut()
			.current_mut()
			.and_then(GraphSession::pointer_up);
		if let Some(event) = event {
			on_select.run(event);
		}
	};

	let host_ml = host.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(s) = host_ml.borrow_mut().current_mut() {
			s.pointer_leave();
		}
	};

	let host_wh = host;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let mouse: &MouseEvent = &ev;
		let Some((x, y)) = pointer(mouse) else {
			return;
		};
		if let Some(s) = host_wh.borrow_mut().current_mut() {
			s.zoom_at(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="topology-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

/// One animation loop per canvas; it always draws whichever session is
/// current, so replacing a session never leaves an orphaned loop behind.
fn start_frame_loop(
	canvas: &HtmlCanvasElement,
	window: &web_sys::Window,
	host: Rc<RefCell<SessionHost>>,
	animate: FrameLoop,
) {
	let Some(ctx) = canvas
		.get_context("2d")
		.ok()
		.flatten()
		.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
	else {
		log::error!("canvas has no 2d context");
		return;
	};

	let animate_inner = animate.clone();
	*animate.borrow_mut() = Some(Closure::new(move || {
		if let Some(s) = host.borrow_mut().current_mut() {
			let dt = s.tick_dt;
			s.tick(dt);
			render::render(s, &ctx);
		}
		if let (Some(cb), Some(window)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	}));
	if let Some(ref cb) = *animate.borrow() {
		let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
	}
}
