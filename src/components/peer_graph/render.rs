//! Canvas rendering for the peer graph.
//!
//! Two passes in graph space (origin at the surface center):
//! 1. Links, stroked with their rate-derived width and focus opacity
//! 2. Nodes with hover colouring, then their labels

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::{LayoutState, NodeInfo};
use super::style::{Color, GraphStyle};

/// Renders the complete graph to the canvas.
pub fn render(state: &LayoutState, ctx: &CanvasRenderingContext2d, style: &GraphStyle) {
	ctx.clear_rect(0.0, 0.0, state.width, state.height);
	if style.surface.background.a > 0.0 {
		ctx.set_fill_style_str(&style.surface.background.to_css());
		ctx.fill_rect(0.0, 0.0, state.width, state.height);
	}

	ctx.save();
	let _ = ctx.translate(state.width / 2.0, state.height / 2.0);

	draw_links(state, ctx, style);
	draw_nodes(state, ctx, style);

	ctx.restore();
}

fn draw_links(state: &LayoutState, ctx: &CanvasRenderingContext2d, style: &GraphStyle) {
	let positions = state.positions();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
	ctx.set_line_cap("round");

	for link in &state.links {
		let (Some(&(x1, y1)), Some(&(x2, y2))) =
			(positions.get(&link.source), positions.get(&link.target))
		else {
			continue;
		};
		ctx.set_stroke_style_str(&style.link.color.with_alpha(link.opacity).to_css());
		ctx.set_line_width(link.width);
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
		ctx.stroke();
	}
}

/// Fill and optional outline of a node given the current hover.
fn node_paint(info: &NodeInfo, state: &LayoutState, style: &GraphStyle) -> (Color, Option<Color>) {
	let hover = &state.hover;
	if hover.node.as_deref() == Some(info.id.as_str()) {
		(style.node.hover, None)
	} else if hover.children.contains(&info.id) {
		(style.node.hover, Some(info.color))
	} else if hover.parents.contains(&info.id) {
		(style.node.dep, Some(info.color))
	} else {
		(info.color, None)
	}
}

fn draw_nodes(state: &LayoutState, ctx: &CanvasRenderingContext2d, style: &GraphStyle) {
	state.graph.visit_nodes(|node| {
		let info = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let (fill, outline) = node_paint(info, state, style);

		ctx.set_global_alpha(info.opacity);
		ctx.begin_path();
		let _ = ctx.arc(x, y, info.metrics.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&fill.to_css());
		ctx.fill();

		if let Some(outline) = outline {
			ctx.set_stroke_style_str(&outline.to_css());
			ctx.set_line_width(style.node.hover_stroke);
			ctx.stroke();
		}
	});

	ctx.set_text_align("center");
	ctx.set_fill_style_str(&style.text.color.to_css());
	state.graph.visit_nodes(|node| {
		let info = &node.data.user_data;
		ctx.set_global_alpha(info.opacity);
		ctx.set_font(&format!(
			"{}px {}",
			info.metrics.font_size, style.text.font_family
		));
		let _ = ctx.fill_text(
			&info.name,
			node.x() as f64,
			node.y() as f64 + info.metrics.label_offset,
		);
	});
	ctx.set_global_alpha(1.0);
}
