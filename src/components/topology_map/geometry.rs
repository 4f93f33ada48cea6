use super::builder::{LayoutGraph, NodeId};
use super::encode::{self, FALLBACK_RADIUS, HealthColor};
use super::types::DeviceType;

/// Edge arc radius as a multiple of the chord length.
pub const ARC_RADIUS_FACTOR: f64 = 2.0;
pub const MIN_ARC_RADIUS: f64 = 1.0;
/// Chords shorter than this are not drawn.
pub const MIN_CHORD: f64 = 0.001;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		let (dx, dy) = (other.x - self.x, other.y - self.y);
		(dx * dx + dy * dy).sqrt()
	}
}

/// Short, positive-sweep circular arc from `from` to `to`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeArc {
	pub from: Point,
	pub to: Point,
	pub radius: f64,
	pub center: Point,
	pub start_angle: f64,
	pub end_angle: f64,
}

impl EdgeArc {
	pub fn new(from: Point, to: Point) -> Self {
		let chord = from.distance(to);
		let radius = (chord * ARC_RADIUS_FACTOR).max(MIN_ARC_RADIUS);
		if is_short(chord) {
			return Self {
				from,
				to,
				radius,
				center: from,
				start_angle: 0.0,
				end_angle: 0.0,
			};
		}

		let (ux, uy) = ((to.x - from.x) / chord, (to.y - from.y) / chord);
		let half = chord / 2.0;
		let h = (radius * radius - half * half).max(0.0).sqrt();
		let center = Point::new(
			(from.x + to.x) / 2.0 - uy * h,
			(from.y + to.y) / 2.0 + ux * h,
		);
		let start_angle = (from.y - center.y).atan2(from.x - center.x);
		let mut end_angle = (to.y - center.y).atan2(to.x - center.x);
		if end_angle < start_angle {
			end_angle += 2.0 * std::f64::consts::PI;
		}
		Self {
			from,
			to,
			radius,
			center,
			start_angle,
			end_angle,
		}
	}

	pub fn is_degenerate(&self) -> bool {
		is_short(self.from.distance(self.to))
	}

	/// Point and heading on the arc, `back` units of arc length before `to`.
	pub fn point_before_end(&self, back: f64) -> (Point, f64) {
		let sweep = self.end_angle - self.start_angle;
		let angle = self.end_angle - (back / self.radius).clamp(0.0, sweep);
		let point = Point::new(
			self.center.x + self.radius * angle.cos(),
			self.center.y + self.radius * angle.sin(),
		);
		// tangent of a positive sweep
		(point, angle + std::f64::consts::FRAC_PI_2)
	}

	pub fn svg_path(&self) -> String {
		format!(
			"M{},{}A{},{} 0 0,1 {},{}",
			self.from.x, self.from.y, self.radius, self.radius, self.to.x, self.to.y
		)
	}
}

fn is_short(chord: f64) -> bool {
	chord.is_nan() || chord < MIN_CHORD
}

/// Halfway point between two endpoints, measured from the lower coordinate
/// on each axis so the label does not jump when the endpoints swap sides.
pub fn label_anchor(a: Point, b: Point) -> Point {
	let mid = |p: f64, q: f64| {
		let (lo, hi) = if q > p { (p, q) } else { (q, p) };
		lo + (hi - lo) / 2.0
	};
	Point::new(mid(a.x, b.x), mid(a.y, b.y))
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeFrame {
	pub child: NodeId,
	pub parent: NodeId,
	pub arc: EdgeArc,
	pub label_at: Point,
	pub label: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeFrame {
	pub id: NodeId,
	pub position: Point,
	pub radius: f64,
	pub color: HealthColor,
	pub glyph: Option<char>,
	pub selected: bool,
}

/// Screen geometry for one simulation step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
	pub edges: Vec<EdgeFrame>,
	pub nodes: Vec<NodeFrame>,
}

/// Project current particle positions onto drawable edges and devices.
/// Edges with an unresolved endpoint are skipped; midpoints are not drawn.
pub fn project(graph: &LayoutGraph, positions: &[Point], selected: Option<NodeId>) -> Frame {
	let at = |id: NodeId| positions.get(id.0).copied();

	let edges = graph
		.bilinks
		.iter()
		.filter_map(|bilink| {
			let (child, parent) = bilink.endpoints()?;
			let (from, to) = (at(child)?, at(parent)?);
			Some(EdgeFrame {
				child,
				parent,
				arc: EdgeArc::new(from, to),
				label_at: label_anchor(from, to),
				label: format!("{} dBm", bilink.rssi),
			})
		})
		.collect();

	let nodes = graph
		.devices()
		.filter_map(|(id, device)| {
			Some(NodeFrame {
				id,
				position: at(id)?,
				radius: device_radius(device.device_type),
				color: encode::health_color(device.lap_time_ms()),
				glyph: encode::glyph(device.device_type),
				selected: selected == Some(id),
			})
		})
		.collect();

	Frame { edges, nodes }
}

pub fn device_radius(device_type: DeviceType) -> f64 {
	encode::node_radius(device_type).unwrap_or(FALLBACK_RADIUS)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::topology_map::builder::build;
	use crate::components::topology_map::types::TopologyRecord;
	use serde_json::json;

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn arc_passes_through_both_endpoints() {
		let (from, to) = (Point::new(10.0, 20.0), Point::new(40.0, -5.0));
		let arc = EdgeArc::new(from, to);
		assert!(close(arc.radius, 2.0 * from.distance(to)));
		assert!(close(arc.center.distance(from), arc.radius));
		assert!(close(arc.center.distance(to), arc.radius));
		let sweep = arc.end_angle - arc.start_angle;
		assert!(sweep > 0.0 && sweep < std::f64::consts::PI);
	}

	#[test]
	fn arc_bulges_to_the_left_of_travel() {
		// moving along +x in screen space, a positive sweep bows towards -y
		let arc = EdgeArc::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
		assert!(arc.center.y > 0.0);
		let (top, _) = arc.point_before_end(arc.radius * (arc.end_angle - arc.start_angle) / 2.0);
		assert!(top.y < 0.0);
	}

	#[test]
	fn coincident_endpoints_are_clamped() {
		let p = Point::new(3.0, 3.0);
		let arc = EdgeArc::new(p, p);
		assert!(arc.is_degenerate());
		assert_eq!(arc.radius, MIN_ARC_RADIUS);
		assert!(arc.center.x.is_finite() && arc.center.y.is_finite());
		let (tip, heading) = arc.point_before_end(5.0);
		assert!(tip.x.is_finite() && heading.is_finite());
	}

	#[test]
	fn svg_path_uses_double_chord_radius() {
		let arc = EdgeArc::new(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
		assert_eq!(arc.svg_path(), "M0,0A10,10 0 0,1 3,4");
	}

	#[test]
	fn point_before_end_at_zero_is_the_end() {
		let arc = EdgeArc::new(Point::new(-7.0, 2.0), Point::new(5.0, 9.0));
		let (p, _) = arc.point_before_end(0.0);
		assert!(close(p.x, 5.0) && close(p.y, 9.0));
	}

	#[test]
	fn label_anchor_is_order_independent() {
		let (a, b) = (Point::new(0.0, 10.0), Point::new(8.0, -2.0));
		assert_eq!(label_anchor(a, b), Point::new(4.0, 4.0));
		assert_eq!(label_anchor(a, b), label_anchor(b, a));
	}

	#[test]
	fn project_draws_devices_and_resolved_edges() {
		let topo: TopologyRecord = serde_json::from_value(json!({
			"nodes": [
				{ "ieee_address": "A", "deviceType": "Coordinator" },
				{ "ieee_address": "B", "deviceType": "Router", "laptime": 100 }
			],
			"links": [
				{ "ieee_address": "B", "parent_ieee_address": "A", "rssi": -40 },
				{ "ieee_address": "B", "parent_ieee_address": "gone", "rssi": -90 }
			]
		}))
		.unwrap();
		let graph = build(&topo).unwrap();
		let positions = vec![Point::new(0.0, 0.0), Point::new(30.0, 40.0), Point::new(15.0, 20.0), Point::new(1.0, 1.0)];

		let frame = project(&graph, &positions, Some(NodeId(0)));
		assert_eq!(frame.nodes.len(), 2);
		assert_eq!(frame.edges.len(), 1);

		let edge = &frame.edges[0];
		assert_eq!((edge.child, edge.parent), (NodeId(1), NodeId(0)));
		assert_eq!(edge.label, "-40 dBm");
		assert_eq!(edge.label_at, Point::new(15.0, 20.0));
		assert!(close(edge.arc.radius, 100.0));

		let a = &frame.nodes[0];
		assert!(a.selected);
		assert_eq!(a.radius, 22.0);
		assert_eq!(a.glyph, Some('C'));
		assert_eq!(a.color, HealthColor::Unknown);

		let b = &frame.nodes[1];
		assert!(!b.selected);
		assert_eq!(b.color, HealthColor::Healthy);
	}
}
