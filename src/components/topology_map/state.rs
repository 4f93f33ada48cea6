use log::debug;

use super::builder::{LayoutGraph, NodeId};
use super::geometry::{self, Frame, Point};
use super::layout::LayoutEngine;
use super::selection::{Selection, SelectionEvent};
use crate::config::MapConfig;

/// Pointer travel, in screen pixels, that turns a press into a drag.
pub const CLICK_SLOP: f64 = 3.0;

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<NodeId>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Point,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Everything one rendered graph owns. Replaced wholesale on refresh.
pub struct GraphSession {
	pub graph: LayoutGraph,
	pub engine: LayoutEngine,
	pub selection: Selection,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	pub tick_dt: f32,
	zoom_extent: (f64, f64),
	generation: u64,
}

impl GraphSession {
	pub fn new(graph: LayoutGraph, config: &MapConfig) -> Self {
		let engine = LayoutEngine::new(&graph, config.layout.clone(), config.width, config.height);
		Self {
			graph,
			engine,
			selection: Selection::Unselected,
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			width: config.width,
			height: config.height,
			tick_dt: config.layout.tick_dt,
			zoom_extent: (config.min_zoom, config.max_zoom),
			generation: 0,
		}
	}

	#[cfg(test)]
	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn is_settled(&self) -> bool {
		self.engine.is_settled()
	}

	pub fn settle(&mut self) {
		self.engine.settle();
	}

	pub fn tick(&mut self, dt: f32) -> bool {
		self.engine.tick(dt)
	}

	pub fn frame(&self) -> Frame {
		geometry::project(&self.graph, &self.engine.positions(), self.selection.selected())
	}

	pub fn select(&mut self, id: NodeId) -> Option<SelectionEvent> {
		self.selection.select(&self.graph, id)
	}

	/// Select the lone coordinator, if there is one.
	pub fn select_default(&mut self) -> Option<SelectionEvent> {
		let id = self.graph.default_selection()?;
		self.select(id)
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost device under a screen position.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeId> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let cursor = Point::new(gx, gy);
		let positions = self.engine.positions();
		let mut found = None;
		for (id, device) in self.graph.devices() {
			let Some(&p) = positions.get(id.0) else {
				continue;
			};
			if p.distance(cursor) < geometry::device_radius(device.device_type) {
				found = Some(id);
			}
		}
		found
	}

	pub fn pointer_down(&mut self, x: f64, y: f64) {
		if let Some(id) = self.node_at_position(x, y) {
			let node_start = self.engine.position(id).unwrap_or_default();
			self.drag = DragState {
				node: Some(id),
				start_x: x,
				start_y: y,
				node_start,
				moved: false,
			};
			self.engine.pin(id, node_start);
		} else {
			self.pan = PanState {
				active: true,
				start_x: x,
				start_y: y,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		if let Some(id) = self.drag.node {
			let (dx, dy) = (x - self.drag.start_x, y - self.drag.start_y);
			if !self.drag.moved && dx.hypot(dy) <= CLICK_SLOP {
				return;
			}
			self.drag.moved = true;
			let k = self.transform.k;
			let at = Point::new(self.drag.node_start.x + dx / k, self.drag.node_start.y + dy / k);
			self.engine.pin(id, at);
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		}
	}

	/// Finish a gesture. A press on a node that never turned into a drag is
	/// a click and yields the selection event.
	pub fn pointer_up(&mut self) -> Option<SelectionEvent> {
		let drag = std::mem::take(&mut self.drag);
		self.pan.active = false;
		let id = drag.node?;
		self.engine.release(id);
		if drag.moved { None } else { self.select(id) }
	}

	pub fn pointer_leave(&mut self) {
		if let Some(id) = std::mem::take(&mut self.drag).node {
			self.engine.release(id);
		}
		self.pan.active = false;
	}

	/// Zoom around a screen point; `delta_y > 0` zooms out.
	pub fn zoom_at(&mut self, x: f64, y: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let (min, max) = self.zoom_extent;
		let new_k = (self.transform.k * factor).clamp(min, max);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}
}

/// Owns the single live [`GraphSession`]. Callbacks scheduled against an
/// older generation find nothing and do nothing.
#[derive(Default)]
pub struct SessionHost {
	session: Option<GraphSession>,
	generation: u64,
}

impl SessionHost {
	/// Drop the current session, then install `session` as the next
	/// generation.
	pub fn install(&mut self, mut session: GraphSession) -> u64 {
		self.teardown();
		self.generation += 1;
		session.generation = self.generation;
		debug!(
			"installed graph session {} ({} particles)",
			self.generation,
			session.graph.nodes.len()
		);
		self.session = Some(session);
		self.generation
	}

	pub fn teardown(&mut self) {
		if let Some(old) = self.session.take() {
			debug!("tearing down graph session {}", old.generation);
		}
	}

	#[cfg(test)]
	pub fn generation(&self) -> u64 {
		self.generation
	}

	#[cfg(test)]
	pub fn current(&self) -> Option<&GraphSession> {
		self.session.as_ref()
	}

	pub fn current_mut(&mut self) -> Option<&mut GraphSession> {
		self.session.as_mut()
	}

	pub fn session_mut(&mut self, generation: u64) -> Option<&mut GraphSession> {
		self.session.as_mut().filter(|s| s.generation == generation)
	}
}

/// What a finished refresh did to the graph on screen.
#[derive(Debug)]
pub enum RefreshOutcome<E> {
	/// A newer refresh started meanwhile; the result was dropped.
	Stale,
	Replaced,
	/// The previous graph is still shown.
	Failed(E),
}

impl<E> RefreshOutcome<E> {
	pub fn replaced(&self) -> bool {
		matches!(self, RefreshOutcome::Replaced)
	}
}

/// Orders overlapping refreshes so only the most recent one lands.
#[derive(Clone, Copy, Debug, Default)]
pub struct RefreshSequence {
	latest: u64,
}

impl RefreshSequence {
	pub fn begin(&mut self) -> u64 {
		self.latest += 1;
		self.latest
	}

	pub fn accept(&self, seq: u64) -> bool {
		seq == self.latest
	}

	pub fn apply<E>(
		&self,
		seq: u64,
		shown: &mut Option<LayoutGraph>,
		result: Result<LayoutGraph, E>,
	) -> RefreshOutcome<E> {
		if !self.accept(seq) {
			debug!("dropping result of superseded refresh {seq}");
			return RefreshOutcome::Stale;
		}
		match result {
			Ok(graph) => {
				*shown = Some(graph);
				RefreshOutcome::Replaced
			}
			Err(e) => RefreshOutcome::Failed(e),
		}
	}
}
