//! Canvas rendering for the knowledge graph.
//!
//! Rendering uses multiple passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Edge lines, arrowheads, then strength labels (world space)
//! 3. Nodes, then selection rings and labels on top
//! 4. Tooltip for the hovered element (screen space)

use std::collections::HashSet;
use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scale::{ScaleConfig, ScaledValues};
use super::state::{GraphState, Hover, SceneEdge, SceneNode};
use super::theme::Theme;

/// Which elements are drawn highlighted.
///
/// The live canvas follows the pointer and the selection; an export draws the
/// plain scene.
pub(crate) struct Emphasis<'a> {
	hover: Hover,
	selected: Option<&'a HashSet<usize>>,
}

impl<'a> Emphasis<'a> {
	pub(crate) fn live(state: &'a GraphState) -> Self {
		Self {
			hover: state.hover,
			selected: Some(&state.selected),
		}
	}

	pub(crate) fn none() -> Self {
		Self {
			hover: Hover::None,
			selected: None,
		}
	}

	fn is_selected(&self, node: usize) -> bool {
		self.selected.is_some_and(|s| s.contains(&node))
	}

	fn node(&self, i: usize) -> bool {
		self.hover == Hover::Node(i) || self.is_selected(i)
	}

	fn edge(&self, i: usize, from: usize) -> bool {
		self.hover == Hover::Edge(i) || self.is_selected(from)
	}

	fn rings(&self) -> impl Iterator<Item = usize> + '_ {
		self.selected.into_iter().flatten().copied()
	}
}

/// Renders the complete graph to the canvas.
pub fn render(state: &GraphState, ctx: &CanvasRenderingContext2d, config: &ScaleConfig) {
	render_scene(state, ctx, config, &Emphasis::live(state));
	draw_tooltip(state, ctx, config, &state.theme);
}

/// Renders background, edges and nodes.
///
/// The export path calls this on an offscreen context that is already scaled,
/// with [`Emphasis::none`].
pub(crate) fn render_scene(
	state: &GraphState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	emphasis: &Emphasis<'_>,
) {
	let scale = ScaledValues::new(config, state.transform.k);
	let theme = &state.theme;

	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	draw_edges(state, ctx, &scale, theme, emphasis);
	draw_nodes(state, ctx, &scale, theme, emphasis);

	ctx.restore();
}

fn draw_edges(
	state: &GraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	emphasis: &Emphasis<'_>,
) {
	for (i, edge) in state.scene.edges.iter().enumerate() {
		draw_edge(state, ctx, scale, theme, edge, emphasis.edge(i, edge.from));
	}

	ctx.set_font(&scale.edge_label_font);
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_line_join("round");
	for edge in &state.scene.edges {
		let (a, b) = (&state.scene.nodes[edge.from], &state.scene.nodes[edge.to]);
		let (mx, my) = ((a.pos.x + b.pos.x) / 2.0, (a.pos.y + b.pos.y) / 2.0);
		ctx.set_line_width(3.0 / scale.k);
		ctx.set_stroke_style_str(&theme.edge_text_stroke.to_css());
		let _ = ctx.stroke_text(&edge.view.label, mx, my);
		ctx.set_fill_style_str(&theme.edge_text.to_css());
		let _ = ctx.fill_text(&edge.view.label, mx, my);
	}
}

fn draw_edge(
	state: &GraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	edge: &SceneEdge,
	highlighted: bool,
) {
	let (a, b) = (&state.scene.nodes[edge.from], &state.scene.nodes[edge.to]);
	let (x1, y1, x2, y2) = (a.pos.x, a.pos.y, b.pos.x, b.pos.y);
	let (dx, dy) = (x2 - x1, y2 - y1);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}
	let (ux, uy) = (dx / dist, dy / dist);

	let start = boundary_offset(a, ux, uy);
	let end = boundary_offset(b, ux, uy);
	if start + end + scale.arrow_size >= dist {
		return;
	}

	let color = if highlighted && edge.color == edge.view.color {
		edge.view.highlight_color
	} else {
		edge.color
	};
	let width = if highlighted {
		edge.view.width * 1.5
	} else {
		edge.view.width
	};

	ctx.set_shadow_color(&theme.shadow.with_alpha(theme.shadow.a * 0.6).to_css());
	ctx.set_shadow_blur(5.0);
	ctx.set_stroke_style_str(&color.to_css());
	ctx.set_line_width(width);
	ctx.begin_path();
	ctx.move_to(x1 + ux * start, y1 + uy * start);
	ctx.line_to(
		x2 - ux * (end + scale.arrow_size),
		y2 - uy * (end + scale.arrow_size),
	);
	ctx.stroke();
	ctx.set_shadow_blur(0.0);
	ctx.set_shadow_color("transparent");

	let (tip_x, tip_y) = (x2 - ux * end, y2 - uy * end);
	let (back_x, back_y) = (tip_x - ux * scale.arrow_size, tip_y - uy * scale.arrow_size);
	let half = scale.arrow_size * 0.5 + width * 0.5;
	let (px, py) = (-uy * half, ux * half);

	ctx.set_fill_style_str(&color.to_css());
	ctx.begin_path();
	ctx.move_to(tip_x, tip_y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

/// Distance from a node center to its ellipse boundary along (ux, uy).
fn boundary_offset(node: &SceneNode, ux: f64, uy: f64) -> f64 {
	let (rx, ry) = node.radii();
	let denom = ((ux / rx).powi(2) + (uy / ry).powi(2)).sqrt();
	if denom == 0.0 { 0.0 } else { 1.0 / denom }
}

fn draw_nodes(
	state: &GraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	emphasis: &Emphasis<'_>,
) {
	// Pass 1: bodies
	for (i, node) in state.scene.nodes.iter().enumerate() {
		draw_node(ctx, node, theme, emphasis.node(i));
	}

	// Pass 2: selection rings
	for i in emphasis.rings() {
		let node = &state.scene.nodes[i];
		let (rx, ry) = node.radii();
		ctx.begin_path();
		let _ = ctx.ellipse(
			node.pos.x,
			node.pos.y,
			rx + scale.ring_offset,
			ry + scale.ring_offset,
			0.0,
			0.0,
			2.0 * PI,
		);
		ctx.set_stroke_style_str(&node.view.highlight_border.to_css());
		ctx.set_line_width(scale.ring_width);
		ctx.stroke();
	}

	// Pass 3: labels
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_line_join("round");
	for node in &state.scene.nodes {
		let view = &node.view;
		let weight = if view.bold { "bold " } else { "" };
		ctx.set_font(&format!("{weight}{}px Inter, sans-serif", view.font_size));
		ctx.set_line_width(view.text_stroke.width);
		ctx.set_stroke_style_str(&view.text_stroke.color.to_css());
		let _ = ctx.stroke_text(&view.label, node.pos.x, node.pos.y);
		ctx.set_fill_style_str(&view.text_color.to_css());
		let _ = ctx.fill_text(&view.label, node.pos.x, node.pos.y);
	}
}

fn draw_node(ctx: &CanvasRenderingContext2d, node: &SceneNode, theme: &Theme, emphasized: bool) {
	let (x, y) = (node.pos.x, node.pos.y);
	let (rx, ry) = node.radii();
	let view = &node.view;

	ctx.set_shadow_color(&theme.shadow.to_css());
	ctx.set_shadow_blur(if emphasized { 15.0 } else { 8.0 });
	ctx.set_shadow_offset_y(2.0);

	ctx.begin_path();
	let _ = ctx.ellipse(x, y, rx, ry, 0.0, 0.0, 2.0 * PI);
	let fill = if emphasized {
		view.color
	} else {
		view.color.darken(0.05)
	};
	ctx.set_fill_style_str(&fill.to_css());
	ctx.fill();

	ctx.set_shadow_blur(0.0);
	ctx.set_shadow_offset_y(0.0);
	ctx.set_shadow_color("transparent");

	let border = if emphasized {
		view.highlight_border
	} else {
		view.border_color
	};
	ctx.set_stroke_style_str(&border.to_css());
	ctx.set_line_width(if emphasized { 3.0 } else { 2.0 });
	ctx.stroke();
}

fn draw_tooltip(state: &GraphState, ctx: &CanvasRenderingContext2d, config: &ScaleConfig, theme: &Theme) {
	if state.drag.active || state.pan.active {
		return;
	}
	let text = match state.hover {
		Hover::Node(i) => &state.scene.nodes[i].view.tooltip,
		Hover::Edge(i) => &state.scene.edges[i].view.tooltip,
		Hover::None => return,
	};

	let lines: Vec<&str> = text.lines().collect();
	let line_height = config.tooltip_size * 1.4;
	ctx.set_font(&format!("{}px Inter, sans-serif", config.tooltip_size));
	ctx.set_text_align("left");
	ctx.set_text_baseline("top");

	let text_width = lines
		.iter()
		.filter_map(|l| ctx.measure_text(l).ok())
		.map(|m| m.width())
		.fold(0.0, f64::max);
	let (pad, offset) = (8.0, 14.0);
	let (w, h) = (text_width + 2.0 * pad, lines.len() as f64 * line_height + 2.0 * pad);

	let (px, py) = state.pointer;
	let x = (px + offset).min(state.width - w - 4.0).max(4.0);
	let y = (py + offset).min(state.height - h - 4.0).max(4.0);

	ctx.set_fill_style_str(&theme.tooltip_background.to_css());
	ctx.set_stroke_style_str(&theme.node_border.to_css());
	ctx.set_line_width(1.0);
	ctx.fill_rect(x, y, w, h);
	ctx.stroke_rect(x, y, w, h);

	ctx.set_fill_style_str(&theme.tooltip_text.to_css());
	for (i, line) in lines.iter().enumerate() {
		let _ = ctx.fill_text(line, x + pad, y + pad + i as f64 * line_height);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph::theme::Theme;

	fn hovered_and_selected() -> GraphState {
		let mut state = GraphState::new(800.0, 600.0, Theme::dark());
		state.hover = Hover::Node(1);
		state.selected.insert(0);
		state
	}

	#[test]
	fn live_emphasis_follows_pointer_and_selection() {
		let state = hovered_and_selected();
		let live = Emphasis::live(&state);
		assert!(live.node(0) && live.node(1));
		assert!(!live.node(2));
		assert!(live.edge(5, 0));
		assert!(!live.edge(5, 2));
		assert_eq!(live.rings().collect::<Vec<_>>(), vec![0]);
	}

	#[test]
	fn export_emphasis_ignores_pointer_and_selection() {
		let state = hovered_and_selected();
		let plain = Emphasis::none();
		assert!((0..3).all(|i| !plain.node(i)));
		assert!(!plain.edge(0, 0));
		assert_eq!(plain.rings().count(), 0);
		// The live state itself is untouched.
		assert_eq!(state.hover, Hover::Node(1));
	}
}
