//! Visual attributes derived from raw graph data.
//!
//! Everything here is a pure function of the snapshot and the active theme,
//! recomputed on every fetch and theme change.

use super::theme::{Color, Theme, ThemeMode};
use super::types::{GraphNode, GraphSnapshot};

/// Fill of nodes nothing points at.
pub const ROOT_COLOR: Color = Color::rgb(139, 92, 246);
/// Strength below 30.
pub const WEAK_COLOR: Color = Color::rgb(239, 68, 68);
/// Strength from 30 up to 70.
pub const MEDIUM_COLOR: Color = Color::rgb(245, 158, 11);
/// Strength of 70 and above.
pub const STRONG_COLOR: Color = Color::rgb(16, 185, 129);

/// Color briefly applied to an edge while a reinforce request is in flight.
pub const REINFORCE_COLOR: Color = STRONG_COLOR;

const DARK_TEXT_ON_DARK_THEME: Color = Color::rgb(15, 23, 42);
const LIGHT_TEXT_ON_DARK_THEME: Color = Color::rgb(248, 250, 252);
const DARK_TEXT_ON_LIGHT_THEME: Color = Color::rgb(30, 41, 59);
const LIGHT_TEXT_ON_LIGHT_THEME: Color = Color::rgb(255, 255, 255);

/// Stroke drawn around a node label.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStroke {
	/// Line width in pixels.
	pub width: f64,
	/// Halo color.
	pub color: Color,
}

/// Display attributes of one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeView {
	/// Node id.
	pub id: String,
	/// Title drawn inside the node.
	pub label: String,
	/// Hover text: title, description and connection count.
	pub tooltip: String,
	/// No node connects to this one.
	pub is_root: bool,
	/// Fill color.
	pub color: Color,
	/// Border at rest.
	pub border_color: Color,
	/// Border while hovered or selected.
	pub highlight_border: Color,
	/// Label color chosen for contrast with `color`.
	pub text_color: Color,
	/// Halo behind the label.
	pub text_stroke: TextStroke,
	/// Node radius in world units.
	pub size: f64,
	/// Label font size in pixels.
	pub font_size: f64,
	/// Roots use a bold label.
	pub bold: bool,
}

/// Display attributes of one directed connection.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeView {
	/// Source node id.
	pub from: String,
	/// Target node id.
	pub to: String,
	/// Strength as served, 0 to 100.
	pub strength: i32,
	/// Text drawn at the midpoint.
	pub label: String,
	/// Hover text with the strength out of 100.
	pub tooltip: String,
	/// Color for the strength band.
	pub color: Color,
	/// Color while hovered or its source is selected.
	pub highlight_color: Color,
	/// Line width, one pixel per 20 strength points.
	pub width: f64,
}

/// Red below 30, amber below 70, green otherwise.
pub fn color_by_strength(strength: f64) -> Color {
	let s = strength.clamp(0.0, 100.0);
	if s < 30.0 {
		WEAK_COLOR
	} else if s < 70.0 {
		MEDIUM_COLOR
	} else {
		STRONG_COLOR
	}
}

/// Mean connection strength; a node without connections counts as fully strong.
pub fn average_strength(node: &GraphNode) -> f64 {
	if node.connections.is_empty() {
		return 100.0;
	}
	let total: f64 = node.connections.values().map(|&s| s as f64).sum();
	total / node.connections.len() as f64
}

/// A node is a root when no node lists it as a connection target.
pub fn is_root(id: &str, nodes: &GraphSnapshot) -> bool {
	!nodes.values().any(|n| n.connections.contains_key(id))
}

/// Label color with enough contrast against `background` for the theme.
pub fn optimal_text_color(background: Color, mode: ThemeMode) -> Color {
	let l = background.luminance();
	match mode {
		ThemeMode::Dark if l > 0.7 => DARK_TEXT_ON_DARK_THEME,
		ThemeMode::Dark => LIGHT_TEXT_ON_DARK_THEME,
		ThemeMode::Light if l > 0.5 => DARK_TEXT_ON_LIGHT_THEME,
		ThemeMode::Light => LIGHT_TEXT_ON_LIGHT_THEME,
	}
}

/// Halo opposing the text color so labels stay legible over shadows.
pub fn text_stroke(text: Color, mode: ThemeMode) -> TextStroke {
	let dark_text = text.luminance() < 0.5;
	let color = match (dark_text, mode) {
		(true, ThemeMode::Dark) => Color::rgba(255, 255, 255, 0.5),
		(true, ThemeMode::Light) => Color::rgba(255, 255, 255, 0.8),
		(false, ThemeMode::Dark) => Color::rgba(0, 0, 0, 0.6),
		(false, ThemeMode::Light) => Color::rgba(0, 0, 0, 0.35),
	};
	TextStroke {
		width: if mode.is_dark() { 2.0 } else { 1.0 },
		color,
	}
}

/// Display attributes of node `id` within `nodes`.
pub fn derive_node_view(id: &str, node: &GraphNode, nodes: &GraphSnapshot, theme: &Theme) -> NodeView {
	let root = is_root(id, nodes);
	let color = if root {
		ROOT_COLOR
	} else {
		color_by_strength(average_strength(node))
	};
	let text_color = optimal_text_color(color, theme.mode);
	let description = node
		.description
		.as_deref()
		.filter(|d| !d.is_empty())
		.unwrap_or("No description");

	NodeView {
		id: id.to_string(),
		label: node.title.clone(),
		tooltip: format!(
			"{}\n{}\nConnections: {}",
			node.title,
			description,
			node.connections.len()
		),
		is_root: root,
		color,
		border_color: theme.node_border,
		highlight_border: theme.node_highlight,
		text_color,
		text_stroke: text_stroke(text_color, theme.mode),
		size: if root { 35.0 } else { 28.0 },
		font_size: if root { 16.0 } else { 14.0 },
		bold: root,
	}
}

/// Display attributes of the connection `from -> to`.
pub fn derive_edge_view(from: &str, to: &str, strength: i32) -> EdgeView {
	let s = strength.clamp(0, 100);
	EdgeView {
		from: from.to_string(),
		to: to.to_string(),
		strength,
		label: strength.to_string(),
		tooltip: format!("Connection strength: {strength}/100"),
		color: color_by_strength(s as f64),
		highlight_color: color_by_strength((s + 20).min(100) as f64),
		width: (s as f64 / 20.0).max(1.0),
	}
}

/// Views for every node and every connection whose target exists.
pub fn derive_views(nodes: &GraphSnapshot, theme: &Theme) -> (Vec<NodeView>, Vec<EdgeView>) {
	let node_views = nodes
		.iter()
		.map(|(id, node)| derive_node_view(id, node, nodes, theme))
		.collect();
	let edge_views = nodes
		.iter()
		.flat_map(|(id, node)| {
			node.connections
				.iter()
				.filter(move |(target, _)| nodes.contains_key(*target))
				.map(move |(target, &strength)| derive_edge_view(id, target, strength))
		})
		.collect();
	(node_views, edge_views)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::BTreeMap;

	fn node(title: &str, connections: &[(&str, i32)]) -> GraphNode {
		GraphNode {
			id: String::new(),
			title: title.into(),
			description: None,
			connections: connections
				.iter()
				.map(|(k, v)| (k.to_string(), *v))
				.collect(),
		}
	}

	fn snapshot(entries: Vec<(&str, GraphNode)>) -> GraphSnapshot {
		entries
			.into_iter()
			.map(|(id, mut n)| {
				n.id = id.to_string();
				(id.to_string(), n)
			})
			.collect()
	}

	#[test]
	fn strength_bands() {
		for (s, expected) in [
			(0.0, WEAK_COLOR),
			(29.0, WEAK_COLOR),
			(30.0, MEDIUM_COLOR),
			(69.0, MEDIUM_COLOR),
			(70.0, STRONG_COLOR),
			(100.0, STRONG_COLOR),
		] {
			assert_eq!(color_by_strength(s), expected, "strength {s}");
		}
	}

	#[test]
	fn empty_connections_average_to_100() {
		assert_eq!(average_strength(&node("x", &[])), 100.0);
		assert_eq!(average_strength(&node("x", &[("a", 20), ("b", 40)])), 30.0);
	}

	#[test]
	fn root_iff_never_targeted() {
		let nodes = snapshot(vec![
			("a", node("A", &[])),
			("b", node("B", &[("a", 50)])),
			("c", node("C", &[("b", 10), ("a", 90)])),
		]);
		for id in nodes.keys() {
			let targeted = nodes
				.values()
				.any(|n| n.connections.contains_key(id.as_str()));
			assert_eq!(is_root(id, &nodes), !targeted, "node {id}");
		}
		assert!(is_root("c", &nodes));
		assert!(!is_root("a", &nodes));
	}

	#[test]
	fn referenced_node_is_colored_by_its_own_average() {
		let nodes = snapshot(vec![
			("a", node("A", &[])),
			("b", node("B", &[("a", 50)])),
		]);
		let (views, edges) = derive_views(&nodes, &Theme::dark());
		let a = views.iter().find(|v| v.id == "a").unwrap();
		let b = views.iter().find(|v| v.id == "b").unwrap();

		assert!(b.is_root);
		assert_eq!(b.color, ROOT_COLOR);
		assert!(b.bold);
		assert!(b.size > a.size);

		// `a` has no outgoing connections, so its average is 100.
		assert!(!a.is_root);
		assert_eq!(a.color, STRONG_COLOR);

		assert_eq!(edges.len(), 1);
		assert_eq!(edges[0].color, MEDIUM_COLOR);
	}

	#[test]
	fn dangling_targets_emit_no_edge() {
		let nodes = snapshot(vec![
			("a", node("A", &[("ghost", 80), ("b", 10)])),
			("b", node("B", &[])),
		]);
		let (_, edges) = derive_views(&nodes, &Theme::light());
		assert_eq!(edges.len(), 1);
		assert_eq!(edges[0].to, "b");
	}

	#[test]
	fn edge_width_label_and_highlight() {
		let weak = derive_edge_view("a", "b", 15);
		assert_eq!(weak.width, 1.0);
		assert_eq!(weak.label, "15");
		assert_eq!(weak.color, WEAK_COLOR);
		assert_eq!(weak.highlight_color, MEDIUM_COLOR);

		let strong = derive_edge_view("a", "b", 100);
		assert_eq!(strong.width, 5.0);
		assert_eq!(strong.highlight_color, STRONG_COLOR);
	}

	#[test]
	fn text_color_has_two_outcomes_per_theme() {
		let samples = [
			ROOT_COLOR,
			WEAK_COLOR,
			MEDIUM_COLOR,
			STRONG_COLOR,
			Color::rgb(255, 255, 255),
			Color::rgb(0, 0, 0),
			Color::rgb(200, 220, 120),
		];
		for mode in [ThemeMode::Dark, ThemeMode::Light] {
			let mut distinct: Vec<Color> = samples
				.iter()
				.map(|&c| optimal_text_color(c, mode))
				.collect();
			distinct.sort_by_key(|c| c.to_css());
			distinct.dedup();
			assert_eq!(distinct.len(), 2, "{mode}");
			for &c in &samples {
				assert_eq!(optimal_text_color(c, mode), optimal_text_color(c, mode));
			}
		}
	}

	#[test]
	fn bright_backgrounds_get_dark_text() {
		let white = Color::rgb(255, 255, 255);
		assert_eq!(optimal_text_color(white, ThemeMode::Dark), DARK_TEXT_ON_DARK_THEME);
		assert_eq!(optimal_text_color(white, ThemeMode::Light), DARK_TEXT_ON_LIGHT_THEME);
		// Amber sits between the two thresholds.
		assert_eq!(optimal_text_color(MEDIUM_COLOR, ThemeMode::Dark), LIGHT_TEXT_ON_DARK_THEME);
		assert_eq!(optimal_text_color(MEDIUM_COLOR, ThemeMode::Light), DARK_TEXT_ON_LIGHT_THEME);
	}

	#[test]
	fn stroke_opposes_text() {
		let on_dark = text_stroke(LIGHT_TEXT_ON_DARK_THEME, ThemeMode::Dark);
		assert_eq!(on_dark.width, 2.0);
		assert_eq!((on_dark.color.r, on_dark.color.a), (0, 0.6));

		let on_light = text_stroke(DARK_TEXT_ON_LIGHT_THEME, ThemeMode::Light);
		assert_eq!(on_light.width, 1.0);
		assert_eq!((on_light.color.r, on_light.color.a), (255, 0.8));
	}

	#[test]
	fn tooltip_mentions_description_or_placeholder() {
		let mut nodes: GraphSnapshot = BTreeMap::new();
		let mut n = node("Rust", &[]);
		n.description = Some("systems language".into());
		nodes.insert("r".into(), n);
		nodes.insert("s".into(), node("Serde", &[("r", 40)]));
		let (views, _) = derive_views(&nodes, &Theme::dark());
		assert_eq!(views[0].tooltip, "Rust\nsystems language\nConnections: 0");
		assert_eq!(views[1].tooltip, "Serde\nNo description\nConnections: 1");
	}
}
