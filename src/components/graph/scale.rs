//! Zoom-dependent sizing of decorations.
//!
//! Node radii and edge widths come from the styling deriver and live in world
//! space, so they grow and shrink with zoom like the layout itself. The values
//! here are decorations (arrowheads, selection rings, hit slop) whose size is
//! expressed in screen pixels or clamped to a screen-pixel range.
//!
//! - **World-space**: the coordinate system of the layout.
//! - **Screen-space**: canvas pixels, unaffected by zoom.

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug, PartialEq)]
pub enum ScaleBehavior {
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// World-space value for a base value at zoom level `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Sizing rules for every zoom-dependent decoration.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleConfig {
	/// Arrowhead length in world units.
	pub arrow_size: f64,
	/// How `arrow_size` follows zoom.
	pub arrow_behavior: ScaleBehavior,
	/// Edge label font size in world units.
	pub edge_label_size: f64,
	/// How `edge_label_size` follows zoom.
	pub edge_label_behavior: ScaleBehavior,
	/// Selection ring width and gap in screen pixels.
	pub ring_width: f64,
	/// Gap between node and selection ring in screen pixels.
	pub ring_offset: f64,
	/// Extra pick distance around edges in screen pixels.
	pub edge_hit_slop: f64,
	/// Tooltip font size in screen pixels.
	pub tooltip_size: f64,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			arrow_size: 10.0,
			arrow_behavior: ScaleBehavior::Clamped {
				min_screen: 4.0,
				max_screen: 18.0,
			},
			edge_label_size: 11.0,
			edge_label_behavior: ScaleBehavior::Clamped {
				min_screen: 8.0,
				max_screen: 16.0,
			},
			ring_width: 2.0,
			ring_offset: 4.0,
			edge_hit_slop: 6.0,
			tooltip_size: 12.0,
		}
	}
}

/// Pre-computed world-space sizes for a specific zoom level.
///
/// Create this once per frame and pass it to rendering functions.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaledValues {
	/// Zoom level these values were computed for.
	pub k: f64,
	/// Arrowhead length in world units.
	pub arrow_size: f64,
	/// CSS font for edge labels.
	pub edge_label_font: String,
	/// Selection ring width in world units.
	pub ring_width: f64,
	/// Gap between node and ring in world units.
	pub ring_offset: f64,
	/// Edge pick distance in world units.
	pub edge_hit_slop: f64,
}

impl ScaledValues {
	/// Sizes for zoom level `k`.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let edge_label_px = config
			.edge_label_behavior
			.apply(config.edge_label_size, k);
		Self {
			k,
			arrow_size: config.arrow_behavior.apply(config.arrow_size, k),
			edge_label_font: format!("{edge_label_px}px Inter, sans-serif"),
			ring_width: ScaleBehavior::Screen.apply(config.ring_width, k),
			ring_offset: ScaleBehavior::Screen.apply(config.ring_offset, k),
			edge_hit_slop: ScaleBehavior::Screen.apply(config.edge_hit_slop, k),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn screen_sizes_counter_zoom() {
		assert_eq!(ScaleBehavior::Screen.apply(10.0, 2.0), 5.0);
		let zoomed = ScaledValues::new(&ScaleConfig::default(), 2.0);
		assert_eq!((zoomed.ring_width, zoomed.ring_offset, zoomed.edge_hit_slop), (1.0, 2.0, 3.0));
	}

	#[test]
	fn clamped_sizes_respect_screen_bounds() {
		let b = ScaleBehavior::Clamped {
			min_screen: 4.0,
			max_screen: 18.0,
		};
		// Zoomed far out: 10 world units would be 1px, so clamp up to 4px.
		assert_eq!(b.apply(10.0, 0.1), 40.0);
		// Zoomed far in: 10 world units would be 50px, so clamp down to 18px.
		assert_eq!(b.apply(10.0, 5.0), 3.6);
		assert_eq!(b.apply(10.0, 1.0), 10.0);
	}

	#[test]
	fn scaled_values_at_unit_zoom() {
		let v = ScaledValues::new(&ScaleConfig::default(), 1.0);
		assert_eq!(v.arrow_size, 10.0);
		assert_eq!(v.ring_width, 2.0);
		assert_eq!(v.edge_label_font, "11px Inter, sans-serif");
	}
}
