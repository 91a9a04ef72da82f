//! Top-down hierarchical placement.
//!
//! Roots sit on level 0 and every connection pushes its target at least one
//! level below its source. Levels are found by longest-path relaxation capped
//! at the node count, so cycles terminate. Only connections leaving a node
//! that some root reaches push anything down; nodes no root reaches (pure
//! cycles and whatever hangs off them) stay on level 0. No physics runs after
//! placement.

use std::collections::HashMap;

use crate::config::LayoutConfig;

use super::style::{EdgeView, NodeView};

/// World-space position of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
	/// Horizontal world coordinate.
	pub x: f64,
	/// Vertical world coordinate; grows downward.
	pub y: f64,
}

/// Axis-aligned bounds of a set of positioned nodes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	/// Left edge.
	pub min_x: f64,
	/// Top edge.
	pub min_y: f64,
	/// Right edge.
	pub max_x: f64,
	/// Bottom edge.
	pub max_y: f64,
}

impl Bounds {
	/// Horizontal extent.
	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	/// Vertical extent.
	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}

	/// Midpoint of the bounds.
	pub fn center(&self) -> Position {
		Position {
			x: (self.min_x + self.max_x) / 2.0,
			y: (self.min_y + self.max_y) / 2.0,
		}
	}
}

/// Level of each node, indexed like `nodes`.
pub fn assign_levels(nodes: &[NodeView], edges: &[EdgeView]) -> Vec<usize> {
	let index: HashMap<&str, usize> = nodes
		.iter()
		.enumerate()
		.map(|(i, n)| (n.id.as_str(), i))
		.collect();
	let links: Vec<(usize, usize)> = edges
		.iter()
		.filter_map(|e| Some((*index.get(e.from.as_str())?, *index.get(e.to.as_str())?)))
		.filter(|(s, t)| s != t)
		.collect();

	let reachable = reachable_from_roots(nodes, &links);
	let mut levels = vec![0usize; nodes.len()];
	for _ in 0..nodes.len() {
		let mut changed = false;
		for &(src, tgt) in links.iter().filter(|(s, _)| reachable[*s]) {
			if levels[tgt] < levels[src] + 1 && levels[src] + 1 < nodes.len() {
				levels[tgt] = levels[src] + 1;
				changed = true;
			}
		}
		if !changed {
			break;
		}
	}
	levels
}

/// Marks every node a root can reach by following connections.
fn reachable_from_roots(nodes: &[NodeView], links: &[(usize, usize)]) -> Vec<bool> {
	let mut reachable: Vec<bool> = nodes.iter().map(|n| n.is_root).collect();
	let mut stack: Vec<usize> = (0..nodes.len()).filter(|&i| reachable[i]).collect();
	while let Some(src) = stack.pop() {
		for &(_, tgt) in links.iter().filter(|(s, _)| *s == src) {
			if !reachable[tgt] {
				reachable[tgt] = true;
				stack.push(tgt);
			}
		}
	}
	reachable
}

/// Positions for `nodes`, centered horizontally on x = 0 per level.
///
/// Nodes keep their input order within a level, so a sorted input gives a
/// stable picture across fetches.
pub fn hierarchical(nodes: &[NodeView], edges: &[EdgeView], config: &LayoutConfig) -> Vec<Position> {
	let levels = assign_levels(nodes, edges);
	let depth = levels.iter().copied().max().map_or(0, |m| m + 1);
	let mut rows: Vec<Vec<usize>> = vec![Vec::new(); depth];
	for (i, &level) in levels.iter().enumerate() {
		rows[level].push(i);
	}

	let mut positions = vec![Position::default(); nodes.len()];
	for (level, row) in rows.iter().enumerate() {
		let span = (row.len().saturating_sub(1)) as f64 * config.node_spacing;
		for (slot, &i) in row.iter().enumerate() {
			positions[i] = Position {
				x: slot as f64 * config.node_spacing - span / 2.0,
				y: level as f64 * config.level_separation,
			};
		}
	}
	positions
}

/// Bounds of the positions, padded by each node's radius.
pub fn bounds(positions: &[Position], radii: impl Iterator<Item = f64>) -> Option<Bounds> {
	positions.iter().zip(radii).fold(None, |acc, (p, r)| {
		let b = Bounds {
			min_x: p.x - r,
			min_y: p.y - r,
			max_x: p.x + r,
			max_y: p.y + r,
		};
		Some(match acc {
			None => b,
			Some(a) => Bounds {
				min_x: a.min_x.min(b.min_x),
				min_y: a.min_y.min(b.min_y),
				max_x: a.max_x.max(b.max_x),
				max_y: a.max_y.max(b.max_y),
			},
		})
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph::style::{derive_edge_view, derive_node_view};
	use crate::components::graph::theme::Theme;
	use crate::components::graph::types::{GraphNode, GraphSnapshot};

	/// `entries` lists each node with its space-separated targets.
	fn views(entries: &[(&str, &str)]) -> (Vec<NodeView>, Vec<EdgeView>) {
		let snapshot: GraphSnapshot = entries
			.iter()
			.map(|(id, targets)| {
				(
					id.to_string(),
					GraphNode {
						id: id.to_string(),
						title: id.to_uppercase(),
						description: None,
						connections: targets
							.split_whitespace()
							.map(|t| (t.to_string(), 50))
							.collect(),
					},
				)
			})
			.collect();
		let theme = Theme::dark();
		let nodes = snapshot
			.iter()
			.map(|(id, n)| derive_node_view(id, n, &snapshot, &theme))
			.collect();
		let edges = snapshot
			.iter()
			.flat_map(|(id, n)| n.connections.keys().map(move |t| derive_edge_view(id, t, 50)))
			.collect();
		(nodes, edges)
	}

	#[test]
	fn targets_sit_below_sources() {
		let (nodes, edges) = views(&[("a", "b c"), ("b", "d"), ("c", "d"), ("d", "")]);
		let levels = assign_levels(&nodes, &edges);
		assert_eq!(levels, vec![0, 1, 1, 2]);
	}

	#[test]
	fn longest_path_wins() {
		// a -> b -> c and a -> c: c must end up below b.
		let (nodes, edges) = views(&[("a", "b c"), ("b", "c"), ("c", "")]);
		assert_eq!(assign_levels(&nodes, &edges), vec![0, 1, 2]);
	}

	#[test]
	fn pure_cycle_stays_on_level_zero() {
		let (nodes, edges) = views(&[("a", "b"), ("b", "c"), ("c", "a")]);
		assert_eq!(assign_levels(&nodes, &edges), vec![0, 0, 0]);
	}

	#[test]
	fn cycle_below_a_root_terminates() {
		// r -> a -> b -> a: the loop is reachable, so relaxation hits the cap.
		let (nodes, edges) = views(&[("a", "b"), ("b", "a"), ("r", "a")]);
		let levels = assign_levels(&nodes, &edges);
		assert_eq!(levels[2], 0);
		assert!(levels[0] >= 1 && levels[1] >= 1);
		assert!(levels.iter().all(|&l| l < nodes.len()));
	}

	#[test]
	fn nodes_fed_only_by_a_cycle_stay_on_level_zero() {
		let (nodes, edges) = views(&[("a", "b"), ("b", "a x"), ("x", "")]);
		assert_eq!(assign_levels(&nodes, &edges), vec![0, 0, 0]);
	}

	#[test]
	fn rows_are_centered_and_separated() {
		let (nodes, edges) = views(&[("a", "b c"), ("b", ""), ("c", "")]);
		let config = LayoutConfig::default();
		let pos = hierarchical(&nodes, &edges, &config);
		assert_eq!(pos[0], Position { x: 0.0, y: 0.0 });
		assert_eq!(pos[1], Position { x: -100.0, y: 150.0 });
		assert_eq!(pos[2], Position { x: 100.0, y: 150.0 });
	}

	#[test]
	fn bounds_include_radius() {
		let pos = [Position { x: 0.0, y: 0.0 }, Position { x: 100.0, y: 50.0 }];
		let b = bounds(&pos, [10.0, 5.0].into_iter()).unwrap();
		assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (-10.0, -10.0, 105.0, 55.0));
		assert_eq!(b.center(), Position { x: 47.5, y: 22.5 });
		assert!(bounds(&[], std::iter::empty()).is_none());
	}
}
