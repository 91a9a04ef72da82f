//! Scene state and interaction tracking.
//!
//! Holds the laid-out nodes and edges of the current snapshot together with
//! the pan/zoom transform, drag and hover state, the selection, and the
//! smoothed camera transition used when focusing a search hit.

use std::collections::{HashMap, HashSet};

use crate::config::LayoutConfig;

use super::layout::{self, Position};
use super::scale::{ScaleConfig, ScaledValues};
use super::style::{self, EdgeView, NodeView};
use super::theme::{Color, Theme};
use super::types::{EdgeKey, GraphSnapshot};

/// Ellipse radii relative to the node size.
const NODE_RX: f64 = 1.6;
const NODE_RY: f64 = 0.85;

/// Smallest zoom factor, shared by wheel, buttons and fitting.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest zoom factor.
pub const MAX_ZOOM: f64 = 10.0;

/// A node with its layout position.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
	/// Derived display attributes.
	pub view: NodeView,
	/// Position in world space.
	pub pos: Position,
}

impl SceneNode {
	/// Horizontal and vertical radii of the drawn ellipse.
	pub fn radii(&self) -> (f64, f64) {
		(self.view.size * NODE_RX, self.view.size * NODE_RY)
	}

	fn contains(&self, gx: f64, gy: f64) -> bool {
		let (rx, ry) = self.radii();
		let (dx, dy) = ((gx - self.pos.x) / rx, (gy - self.pos.y) / ry);
		dx * dx + dy * dy <= 1.0
	}
}

/// An edge resolved to node indices, with its currently displayed color.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneEdge {
	/// Derived display attributes.
	pub view: EdgeView,
	/// Source node index.
	pub from: usize,
	/// Target node index.
	pub to: usize,
	/// Derived color, or a temporary override while a reinforce is pending.
	pub color: Color,
}

/// Laid-out graph ready to draw.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphScene {
	/// Nodes in id order.
	pub nodes: Vec<SceneNode>,
	/// Edges whose endpoints both exist.
	pub edges: Vec<SceneEdge>,
	index: HashMap<String, usize>,
}

impl GraphScene {
	/// Derive styles, drop dangling connections and place every node.
	pub fn build(snapshot: &GraphSnapshot, theme: &Theme, config: &LayoutConfig) -> Self {
		let (node_views, edge_views) = style::derive_views(snapshot, theme);
		let positions = layout::hierarchical(&node_views, &edge_views, config);
		let nodes: Vec<SceneNode> = node_views
			.into_iter()
			.zip(positions)
			.map(|(view, pos)| SceneNode { view, pos })
			.collect();
		let index: HashMap<String, usize> = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.view.id.clone(), i))
			.collect();
		let edges = edge_views
			.into_iter()
			.filter_map(|view| {
				let from = *index.get(&view.from)?;
				let to = *index.get(&view.to)?;
				Some(SceneEdge {
					color: view.color,
					view,
					from,
					to,
				})
			})
			.collect();
		Self {
			nodes,
			edges,
			index,
		}
	}

	/// Index of node `id`, if present.
	pub fn node_index(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Show overridden colors where present and derived colors elsewhere.
	///
	/// Removing an override therefore restores the pre-override color.
	pub fn apply_edge_overrides(&mut self, overrides: &HashMap<EdgeKey, Color>) {
		for edge in &mut self.edges {
			let key = (edge.view.from.clone(), edge.view.to.clone());
			edge.color = overrides.get(&key).copied().unwrap_or(edge.view.color);
		}
	}

	/// Bounds of all nodes including their ellipses.
	pub fn bounds(&self) -> Option<layout::Bounds> {
		let positions: Vec<Position> = self.nodes.iter().map(|n| n.pos).collect();
		layout::bounds(&positions, self.nodes.iter().map(|n| n.radii().0))
	}
}

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal translation in screen pixels.
	pub x: f64,
	/// Vertical translation in screen pixels.
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to `MIN_ZOOM..=MAX_ZOOM`).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

/// Tracks an in-progress node drag operation.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	/// A node press is in progress.
	pub active: bool,
	/// Pressed node, if any.
	pub node_idx: Option<usize>,
	/// Press x (screen).
	pub start_x: f64,
	/// Press y (screen).
	pub start_y: f64,
	/// Node position when the press started.
	pub node_start: Position,
	/// Set once the pointer travelled far enough to count as a drag, so the
	/// click that ends it does not open the editor.
	pub moved: bool,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// A background press is in progress.
	pub active: bool,
	/// Press x (screen).
	pub start_x: f64,
	/// Press y (screen).
	pub start_y: f64,
	/// Transform x offset when the press started.
	pub transform_start_x: f64,
	/// Transform y offset when the press started.
	pub transform_start_y: f64,
	/// Pointer travelled past the drag threshold.
	pub moved: bool,
}

/// What the pointer is over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Hover {
	/// Nothing under the pointer.
	#[default]
	None,
	/// Node index into the scene.
	Node(usize),
	/// Edge index into the scene.
	Edge(usize),
}

/// Pointer travel (screen px) after which a press becomes a drag.
const DRAG_THRESHOLD: f64 = 3.0;

/// Core view state, created once when the canvas mounts and mutated by event
/// handlers and the animation loop.
pub struct GraphState {
	/// Laid-out nodes and edges.
	pub scene: GraphScene,
	/// Palette of the current scene.
	pub theme: Theme,
	/// Current pan and zoom.
	pub transform: ViewTransform,
	/// Camera destination while a focus transition is running.
	target: Option<ViewTransform>,
	/// Node drag in progress.
	pub drag: DragState,
	/// Background pan in progress.
	pub pan: PanState,
	/// Element under the pointer.
	pub hover: Hover,
	/// Last pointer position in screen space, for tooltips.
	pub pointer: (f64, f64),
	/// Indices of selected nodes.
	pub selected: HashSet<usize>,
	/// Canvas width in CSS pixels.
	pub width: f64,
	/// Canvas height in CSS pixels.
	pub height: f64,
}

impl GraphState {
	/// Empty state centered on a `width` x `height` canvas.
	pub fn new(width: f64, height: f64, theme: Theme) -> Self {
		Self {
			scene: GraphScene::default(),
			theme,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			target: None,
			drag: DragState::default(),
			pan: PanState::default(),
			hover: Hover::None,
			pointer: (0.0, 0.0),
			selected: HashSet::new(),
			width,
			height,
		}
	}

	/// Replace the scene wholesale and fit it into view.
	pub fn set_scene(&mut self, scene: GraphScene, theme: Theme) {
		self.scene = scene;
		self.theme = theme;
		self.hover = Hover::None;
		self.drag = DragState::default();
		self.selected.clear();
		self.fit();
	}

	/// Zoom and center so the whole scene is visible.
	pub fn fit(&mut self) {
		self.target = None;
		let Some(b) = self.scene.bounds() else {
			self.transform = ViewTransform {
				x: self.width / 2.0,
				y: self.height / 2.0,
				k: 1.0,
			};
			return;
		};
		const PADDING: f64 = 40.0;
		let k = ((self.width - 2.0 * PADDING) / b.width().max(1.0))
			.min((self.height - 2.0 * PADDING) / b.height().max(1.0))
			.clamp(MIN_ZOOM, 1.0);
		let c = b.center();
		self.transform = ViewTransform {
			x: self.width / 2.0 - c.x * k,
			y: self.height / 2.0 - c.y * k,
			k,
		};
	}

	/// Convert screen coordinates to world coordinates.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under a screen position.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.scene.nodes.iter().rposition(|n| n.contains(gx, gy))
	}

	/// Closest edge within pick distance of a screen position.
	pub fn edge_at_position(&self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<usize> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let scale = ScaledValues::new(config, self.transform.k);
		self.scene
			.edges
			.iter()
			.enumerate()
			.filter_map(|(i, e)| {
				let (a, b) = (self.scene.nodes[e.from].pos, self.scene.nodes[e.to].pos);
				let d = distance_to_segment(gx, gy, a, b);
				(d <= e.view.width / 2.0 + scale.edge_hit_slop).then_some((i, d))
			})
			.min_by(|x, y| x.1.total_cmp(&y.1))
			.map(|(i, _)| i)
	}

	/// Update hover from a pointer position. Nodes win over edges.
	pub fn update_hover(&mut self, sx: f64, sy: f64, config: &ScaleConfig) {
		self.pointer = (sx, sy);
		self.hover = if let Some(i) = self.node_at_position(sx, sy) {
			Hover::Node(i)
		} else if let Some(i) = self.edge_at_position(sx, sy, config) {
			Hover::Edge(i)
		} else {
			Hover::None
		};
	}

	/// Start a drag on the node under the pointer, or a pan on the background.
	pub fn begin_press(&mut self, sx: f64, sy: f64) {
		if let Some(idx) = self.node_at_position(sx, sy) {
			self.drag = DragState {
				active: true,
				node_idx: Some(idx),
				start_x: sx,
				start_y: sy,
				node_start: self.scene.nodes[idx].pos,
				moved: false,
			};
			self.pan = PanState::default();
		} else {
			self.drag = DragState::default();
			self.pan = PanState {
				active: true,
				start_x: sx,
				start_y: sy,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
				moved: false,
			};
		}
	}

	/// Continue a drag or pan. Nothing moves until the pointer passes the drag threshold.
	pub fn move_press(&mut self, sx: f64, sy: f64) {
		if self.drag.active {
			let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
			self.drag.moved |= dx.hypot(dy) > DRAG_THRESHOLD;
			if let (Some(idx), true) = (self.drag.node_idx, self.drag.moved) {
				let k = self.transform.k;
				self.scene.nodes[idx].pos = Position {
					x: self.drag.node_start.x + dx / k,
					y: self.drag.node_start.y + dy / k,
				};
			}
		} else if self.pan.active {
			let (dx, dy) = (sx - self.pan.start_x, sy - self.pan.start_y);
			self.pan.moved |= dx.hypot(dy) > DRAG_THRESHOLD;
			self.target = None;
			self.transform.x = self.pan.transform_start_x + dx;
			self.transform.y = self.pan.transform_start_y + dy;
		}
	}

	/// Finish a press; returns whether it moved anything.
	pub fn end_press(&mut self) -> bool {
		let moved = self.drag.moved || self.pan.moved;
		self.drag.active = false;
		self.drag.node_idx = None;
		self.pan.active = false;
		moved
	}

	/// Clear transient interaction state when the pointer leaves the canvas.
	pub fn release(&mut self) {
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.hover = Hover::None;
	}

	/// Zoom by `factor` keeping the screen point (`sx`, `sy`) fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		self.target = None;
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Zoom around the canvas center.
	pub fn zoom_by(&mut self, factor: f64) {
		self.zoom_at(self.width / 2.0, self.height / 2.0, factor);
	}

	/// Start a smooth camera move centering `id` at zoom `k`.
	pub fn focus_on(&mut self, id: &str, k: f64) -> bool {
		let Some(idx) = self.scene.node_index(id) else {
			return false;
		};
		let pos = self.scene.nodes[idx].pos;
		let k = k.clamp(MIN_ZOOM, MAX_ZOOM);
		self.target = Some(ViewTransform {
			x: self.width / 2.0 - pos.x * k,
			y: self.height / 2.0 - pos.y * k,
			k,
		});
		true
	}

	/// Replace the selection with the nodes named in `ids`; unknown ids are skipped.
	pub fn select(&mut self, ids: &[String]) {
		self.selected = ids
			.iter()
			.filter_map(|id| self.scene.node_index(id))
			.collect();
	}

	/// Advance the camera transition using exponential smoothing.
	pub fn tick(&mut self, dt: f64) {
		const SPEED: f64 = 5.0;
		let Some(target) = self.target else {
			return;
		};
		let f = 1.0 - (-SPEED * dt).exp();
		let t = &mut self.transform;
		t.x += (target.x - t.x) * f;
		t.y += (target.y - t.y) * f;
		t.k += (target.k - t.k) * f;
		if (target.x - t.x).abs() < 0.5 && (target.y - t.y).abs() < 0.5 && (target.k - t.k).abs() < 1e-3 {
			*t = target;
			self.target = None;
		}
	}

	/// Adopt a new canvas size, keeping the view centered.
	pub fn resize(&mut self, width: f64, height: f64) {
		// Keep the graph point at the old center in the new center.
		self.transform.x += (width - self.width) / 2.0;
		self.transform.y += (height - self.height) / 2.0;
		self.width = width;
		self.height = height;
	}
}

fn distance_to_segment(px: f64, py: f64, a: Position, b: Position) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len2 = dx * dx + dy * dy;
	let t = if len2 == 0.0 {
		0.0
	} else {
		(((px - a.x) * dx + (py - a.y) * dy) / len2).clamp(0.0, 1.0)
	};
	(px - (a.x + t * dx)).hypot(py - (a.y + t * dy))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph::style::{MEDIUM_COLOR, REINFORCE_COLOR};
	use crate::components::graph::types::parse_snapshot;

	fn scene() -> GraphScene {
		let snapshot = parse_snapshot(
			r#"{
				"a": { "title": "A", "connections": {} },
				"b": { "title": "B", "connections": { "a": 50, "ghost": 90 } }
			}"#,
		)
		.unwrap();
		GraphScene::build(&snapshot, &Theme::dark(), &LayoutConfig::default())
	}

	fn state() -> GraphState {
		let mut s = GraphState::new(800.0, 600.0, Theme::dark());
		s.set_scene(scene(), Theme::dark());
		s
	}

	fn screen_pos(s: &GraphState, id: &str) -> (f64, f64) {
		let p = s.scene.nodes[s.scene.node_index(id).unwrap()].pos;
		(p.x * s.transform.k + s.transform.x, p.y * s.transform.k + s.transform.y)
	}

	#[test]
	fn dangling_edges_are_not_in_the_scene() {
		let scene = scene();
		assert_eq!(scene.nodes.len(), 2);
		assert_eq!(scene.edges.len(), 1);
		assert_eq!(scene.edges[0].view.to, "a");
	}

	#[test]
	fn override_then_revert_restores_color() {
		let mut scene = scene();
		let before = scene.edges[0].color;
		assert_eq!(before, MEDIUM_COLOR);

		let key = ("b".to_string(), "a".to_string());
		let mut overrides = HashMap::from([(key.clone(), REINFORCE_COLOR)]);
		scene.apply_edge_overrides(&overrides);
		assert_eq!(scene.edges[0].color, REINFORCE_COLOR);

		overrides.remove(&key);
		scene.apply_edge_overrides(&overrides);
		assert_eq!(scene.edges[0].color, before);
	}

	#[test]
	fn fit_keeps_everything_on_screen() {
		let s = state();
		for id in ["a", "b"] {
			let (x, y) = screen_pos(&s, id);
			assert!((0.0..=800.0).contains(&x) && (0.0..=600.0).contains(&y), "{id} at {x},{y}");
		}
	}

	#[test]
	fn hit_testing_nodes_and_edges() {
		let s = state();
		let (ax, ay) = screen_pos(&s, "a");
		let (bx, by) = screen_pos(&s, "b");
		assert_eq!(s.node_at_position(ax, ay), s.scene.node_index("a"));

		let (mx, my) = ((ax + bx) / 2.0, (ay + by) / 2.0);
		assert_eq!(s.node_at_position(mx, my), None);
		assert_eq!(s.edge_at_position(mx, my, &ScaleConfig::default()), Some(0));
		assert_eq!(s.edge_at_position(mx + 300.0, my, &ScaleConfig::default()), None);
	}

	#[test]
	fn dragging_moves_node_and_suppresses_click() {
		let mut s = state();
		let (ax, ay) = screen_pos(&s, "a");
		let idx = s.scene.node_index("a").unwrap();
		let before = s.scene.nodes[idx].pos;

		s.begin_press(ax, ay);
		s.move_press(ax + 1.0, ay);
		assert_eq!(s.scene.nodes[idx].pos, before, "below threshold");
		s.move_press(ax + 40.0, ay);
		assert!(s.scene.nodes[idx].pos.x > before.x);
		assert!(s.end_press());

		s.begin_press(ax + 40.0, ay);
		assert!(!s.end_press());
	}

	#[test]
	fn focus_converges_on_node() {
		let mut s = state();
		assert!(s.focus_on("a", 1.2));
		assert!(!s.focus_on("missing", 1.2));
		for _ in 0..600 {
			s.tick(1.0 / 60.0);
		}
		let settled = s.transform;
		s.tick(1.0 / 60.0);
		assert_eq!(s.transform, settled);
		assert_eq!(s.transform.k, 1.2);
		let (x, y) = screen_pos(&s, "a");
		assert!((x - 400.0).abs() < 1e-6 && (y - 300.0).abs() < 1e-6);
	}

	#[test]
	fn zoom_is_clamped_and_anchored() {
		let mut s = state();
		let (gx, gy) = s.screen_to_graph(100.0, 100.0);
		s.zoom_at(100.0, 100.0, 1.5);
		let (gx2, gy2) = s.screen_to_graph(100.0, 100.0);
		assert!((gx - gx2).abs() < 1e-9 && (gy - gy2).abs() < 1e-9);
		for _ in 0..100 {
			s.zoom_by(1.2);
		}
		assert_eq!(s.transform.k, MAX_ZOOM);
	}

	#[test]
	fn selection_ignores_unknown_ids() {
		let mut s = state();
		s.select(&["a".to_string(), "nope".to_string()]);
		assert_eq!(s.selected.len(), 1);
	}
}
