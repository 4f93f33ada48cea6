use std::f64::consts::PI;

use web_sys::{CanvasRenderingContext2d, Path2d};

use super::geometry::{EdgeFrame, Frame, NodeFrame};
use super::state::GraphSession;

const BACKGROUND: &str = "#ffffff";
const EDGE_STROKE: &str = "#999999";
const TEXT_FILL: &str = "#444666";
const RING_RADIUS: f64 = 30.0;
const ARROW_SIZE: f64 = 10.0;

pub fn render(session: &GraphSession, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, session.width, session.height);
	if !session.is_settled() {
		return;
	}
	let frame = session.frame();
	ctx.save();
	let _ = ctx.translate(session.transform.x, session.transform.y);
	let _ = ctx.scale(session.transform.k, session.transform.k);
	draw_edges(&frame, ctx);
	draw_nodes(&frame, ctx);
	ctx.restore();
}

/// Radius of the drawn parent, so arrowheads stop at its rim.
fn parent_radius(frame: &Frame, edge: &EdgeFrame) -> f64 {
	frame
		.nodes
		.iter()
		.find(|n| n.id == edge.parent)
		.map_or(0.0, |n| n.radius)
}

fn draw_edges(frame: &Frame, ctx: &CanvasRenderingContext2d) {
	ctx.set_line_width(1.5);
	ctx.set_font("12px Arial");
	ctx.set_text_align("left");
	ctx.set_text_baseline("alphabetic");

	for edge in &frame.edges {
		let arc = &edge.arc;
		if arc.is_degenerate() {
			continue;
		}

		ctx.set_stroke_style_str(EDGE_STROKE);
		if let Ok(path) = Path2d::new_with_path_string(&arc.svg_path()) {
			ctx.stroke_with_path(&path);
		}

		let (tip, heading) = arc.point_before_end(parent_radius(frame, edge));
		let (ux, uy) = (heading.cos(), heading.sin());
		let (back_x, back_y) = (tip.x - ux * ARROW_SIZE, tip.y - uy * ARROW_SIZE);
		let (px, py) = (-uy * ARROW_SIZE * 0.5, ux * ARROW_SIZE * 0.5);
		ctx.set_fill_style_str(EDGE_STROKE);
		ctx.begin_path();
		ctx.move_to(tip.x, tip.y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();

		ctx.set_fill_style_str(TEXT_FILL);
		let _ = ctx.fill_text(&edge.label, edge.label_at.x, edge.label_at.y);
	}
}

fn draw_nodes(frame: &Frame, ctx: &CanvasRenderingContext2d) {
	ctx.set_font("20px Arial");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	for node in &frame.nodes {
		if node.selected {
			draw_ring(node, ctx);
		}
		let (x, y) = (node.position.x, node.position.y);
		ctx.begin_path();
		let _ = ctx.arc(x, y, node.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node.color.css());
		ctx.fill();

		if let Some(glyph) = node.glyph {
			ctx.set_fill_style_str(TEXT_FILL);
			let _ = ctx.fill_text(glyph.encode_utf8(&mut [0; 4]), x, y);
		}
	}
}

fn draw_ring(node: &NodeFrame, ctx: &CanvasRenderingContext2d) {
	let (x, y) = (node.position.x, node.position.y);
	ctx.begin_path();
	let _ = ctx.arc(x, y, RING_RADIUS, 0.0, 2.0 * PI);
	ctx.set_global_alpha(0.5);
	ctx.set_fill_style_str("#8badc4");
	ctx.fill();
	ctx.set_global_alpha(1.0);
	ctx.set_stroke_style_str("#3a72b2");
	ctx.set_line_width(1.5);
	ctx.stroke();
}
