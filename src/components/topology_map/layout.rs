use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use super::builder::{GraphNode, LayoutGraph, NodeId};
use super::geometry::Point;

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutParams {
	pub charge: f32,
	pub spring: f32,
	pub max_force: f32,
	pub node_speed: f32,
	/// Velocity damping applied by the solver each step.
	pub friction: f32,
	/// Pull towards the surface center, per second of simulated time.
	pub gravity: f32,
	pub mass: f32,
	pub settle_iterations: usize,
	pub tick_dt: f32,
}

impl Default for LayoutParams {
	fn default() -> Self {
		Self {
			charge: 150.0,
			spring: 0.05,
			max_force: 100.0,
			node_speed: 3000.0,
			friction: 0.5,
			gravity: 0.1,
			mass: 10.0,
			settle_iterations: 10_000,
			tick_dt: 0.016,
		}
	}
}

/// Force simulation over every particle of a [`LayoutGraph`], midpoints
/// included. Live ticks are refused until the settle pass has run.
pub struct LayoutEngine {
	graph: ForceGraph<NodeId, ()>,
	slots: Vec<DefaultNodeIdx>,
	params: LayoutParams,
	center: (f32, f32),
	settled: bool,
}

impl LayoutEngine {
	pub fn new(layout: &LayoutGraph, params: LayoutParams, width: f64, height: f64) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: params.charge,
			force_spring: params.spring,
			force_max: params.max_force,
			node_speed: params.node_speed,
			damping_factor: params.friction,
		});
		let center = (width as f32 / 2.0, height as f32 / 2.0);
		let seeds = seed_positions(layout, width, height);

		let slots: Vec<DefaultNodeIdx> = seeds
			.iter()
			.enumerate()
			.map(|(i, p)| {
				graph.add_node(NodeData {
					x: p.x as f32,
					y: p.y as f32,
					mass: params.mass,
					is_anchor: false,
					user_data: NodeId(i),
				})
			})
			.collect();

		for link in &layout.sim_links {
			if let (Some(src), Some(tgt)) = (link.source, link.target) {
				graph.add_edge(slots[src.0], slots[tgt.0], EdgeData::default());
			}
		}

		Self {
			graph,
			slots,
			params,
			center,
			settled: false,
		}
	}

	pub fn is_settled(&self) -> bool {
		self.settled
	}

	/// Run the bounded synchronous burst that precedes the first paint.
	pub fn settle(&mut self) {
		if self.settled {
			return;
		}
		for _ in 0..self.params.settle_iterations {
			self.step(self.params.tick_dt);
		}
		self.settled = true;
		debug!(
			"layout settled after {} iterations over {} particles",
			self.params.settle_iterations,
			self.slots.len()
		);
	}

	/// Advance one live step. Returns false while the graph is unsettled.
	pub fn tick(&mut self, dt: f32) -> bool {
		if !self.settled {
			return false;
		}
		self.step(dt);
		true
	}

	fn step(&mut self, dt: f32) {
		self.graph.update(dt);
		let ((cx, cy), pull) = (self.center, (self.params.gravity * dt).min(1.0));
		if pull <= 0.0 {
			return;
		}
		self.graph.visit_nodes_mut(|node| {
			if !node.data.is_anchor {
				node.data.x += (cx - node.data.x) * pull;
				node.data.y += (cy - node.data.y) * pull;
			}
		});
	}

	/// Hold a particle at `at`, outside of force updates, until released.
	pub fn pin(&mut self, id: NodeId, at: Point) {
		let Some(&idx) = self.slots.get(id.0) else {
			return;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = at.x as f32;
				node.data.y = at.y as f32;
				node.data.is_anchor = true;
			}
		});
	}

	pub fn release(&mut self, id: NodeId) {
		let Some(&idx) = self.slots.get(id.0) else {
			return;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.is_anchor = false;
			}
		});
	}

	#[cfg(test)]
	pub fn is_pinned(&self, id: NodeId) -> bool {
		let mut pinned = false;
		if let Some(&idx) = self.slots.get(id.0) {
			self.graph.visit_nodes(|node| {
				if node.index() == idx {
					pinned = node.data.is_anchor;
				}
			});
		}
		pinned
	}

	/// Current position of every particle, indexed by [`NodeId`].
	pub fn positions(&self) -> Vec<Point> {
		let mut out = vec![Point::default(); self.slots.len()];
		self.graph.visit_nodes(|node| {
			if let Some(slot) = out.get_mut(node.data.user_data.0) {
				*slot = Point::new(node.x() as f64, node.y() as f64);
			}
		});
		out
	}

	pub fn position(&self, id: NodeId) -> Option<Point> {
		self.positions().get(id.0).copied()
	}
}

/// Devices start on a ring around the center; a midpoint starts between its
/// endpoints, nudged so parallel links do not coincide.
fn seed_positions(layout: &LayoutGraph, width: f64, height: f64) -> Vec<Point> {
	let (cx, cy) = (width / 2.0, height / 2.0);
	let device_count = layout.devices().count().max(1);
	let mut seeds = vec![Point::new(cx, cy); layout.nodes.len()];

	for (ring, (id, _)) in layout.devices().enumerate() {
		let angle = (ring as f64) * 2.0 * PI / device_count as f64;
		seeds[id.0] = Point::new(cx + 100.0 * angle.cos(), cy + 100.0 * angle.sin());
	}

	for bilink in &layout.bilinks {
		let GraphNode::Midpoint(mid) = &layout.nodes[bilink.midpoint.0] else {
			continue;
		};
		let end = |id: Option<NodeId>| id.map_or(Point::new(cx, cy), |id| seeds[id.0]);
		let (a, b) = (end(bilink.child), end(bilink.parent));
		let jitter = (mid.link_index as f64 + 1.0) * 0.7;
		seeds[bilink.midpoint.0] = Point::new(
			(a.x + b.x) / 2.0 + 2.0 * jitter.sin(),
			(a.y + b.y) / 2.0 + 2.0 * jitter.cos(),
		);
	}
	seeds
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::topology_map::builder::build;
	use crate::components::topology_map::types::TopologyRecord;
	use serde_json::json;

	fn mesh() -> LayoutGraph {
		let topo: TopologyRecord = serde_json::from_value(json!({
			"nodes": [
				{ "ieee_address": "C", "deviceType": "Coordinator" },
				{ "ieee_address": "R", "deviceType": "Router" },
				{ "ieee_address": "E", "deviceType": "End Device" }
			],
			"links": [
				{ "ieee_address": "R", "parent_ieee_address": "C", "rssi": -35 },
				{ "ieee_address": "E", "parent_ieee_address": "R", "rssi": -70 },
				{ "ieee_address": "E", "parent_ieee_address": "missing", "rssi": -99 }
			]
		}))
		.unwrap();
		build(&topo).unwrap()
	}

	fn quick() -> LayoutParams {
		LayoutParams {
			settle_iterations: 50,
			..LayoutParams::default()
		}
	}

	#[test]
	fn every_particle_gets_a_distinct_seed() {
		let graph = mesh();
		let seeds = seed_positions(&graph, 800.0, 600.0);
		assert_eq!(seeds.len(), graph.nodes.len());
		for (i, a) in seeds.iter().enumerate() {
			for b in &seeds[i + 1..] {
				assert!(a.distance(*b) > 0.5, "{a:?} overlaps {b:?}");
			}
		}
	}

	#[test]
	fn tick_waits_for_settle() {
		let graph = mesh();
		let mut engine = LayoutEngine::new(&graph, quick(), 800.0, 600.0);
		let before = engine.positions();
		assert!(!engine.tick(0.016));
		assert_eq!(engine.positions(), before);

		engine.settle();
		assert!(engine.is_settled());
		assert!(engine.tick(0.016));
	}

	#[test]
	fn settle_moves_particles_and_stays_finite() {
		let graph = mesh();
		let mut engine = LayoutEngine::new(&graph, quick(), 800.0, 600.0);
		let before = engine.positions();
		engine.settle();
		let after = engine.positions();
		assert_eq!(after.len(), graph.nodes.len());
		assert_ne!(before, after);
		assert!(after.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
	}

	#[test]
	fn pinned_particle_ignores_forces_until_released() {
		let graph = mesh();
		let mut engine = LayoutEngine::new(&graph, quick(), 800.0, 600.0);
		engine.settle();

		let hold = Point::new(10.0, 20.0);
		engine.pin(NodeId(1), hold);
		assert!(engine.is_pinned(NodeId(1)));
		for _ in 0..20 {
			engine.tick(0.016);
		}
		assert_eq!(engine.position(NodeId(1)), Some(hold));

		engine.release(NodeId(1));
		assert!(!engine.is_pinned(NodeId(1)));
		for _ in 0..20 {
			engine.tick(0.016);
		}
		assert_ne!(engine.position(NodeId(1)), Some(hold));
	}

	#[test]
	fn pin_out_of_range_is_ignored() {
		let graph = mesh();
		let mut engine = LayoutEngine::new(&graph, quick(), 800.0, 600.0);
		engine.pin(NodeId(999), Point::new(1.0, 1.0));
		engine.release(NodeId(999));
		assert!(!engine.is_pinned(NodeId(999)));
	}
}
