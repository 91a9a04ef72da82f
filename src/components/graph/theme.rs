//! Light/dark theming for the graph.
//!
//! Provides the color type shared by the deriver and renderer, the palette of
//! each theme, and the persisted theme preference.

use std::fmt;

use serde::Deserialize;

use crate::error::Result;
use crate::storage::KeyValueStore;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity in [0, 1].
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with explicit opacity.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color with opacity `a`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	/// Perceived brightness in [0, 1]: `(0.299R + 0.587G + 0.114B) / 255`.
	pub fn luminance(self) -> f64 {
		(0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64) / 255.0
	}

	/// CSS color string: hex when opaque, `rgba()` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// The two supported themes.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
	/// Light background, dark text.
	Light,
	/// Dark background, light text.
	#[default]
	Dark,
}

impl ThemeMode {
	/// Name used for storage and the `data-theme` attribute.
	pub fn as_str(self) -> &'static str {
		match self {
			ThemeMode::Light => "light",
			ThemeMode::Dark => "dark",
		}
	}

	/// Inverse of [`ThemeMode::as_str`].
	pub fn parse(s: &str) -> Option<Self> {
		match s {
			"light" => Some(ThemeMode::Light),
			"dark" => Some(ThemeMode::Dark),
			_ => None,
		}
	}

	/// The other theme.
	pub fn toggled(self) -> Self {
		match self {
			ThemeMode::Light => ThemeMode::Dark,
			ThemeMode::Dark => ThemeMode::Light,
		}
	}

	/// Whether this is the dark theme.
	pub fn is_dark(self) -> bool {
		self == ThemeMode::Dark
	}
}

impl fmt::Display for ThemeMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Color tokens of one theme.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
	/// Which mode this palette belongs to.
	pub mode: ThemeMode,
	/// Canvas fill behind the graph.
	pub background: Color,
	/// Default node label color.
	pub node_text: Color,
	/// Edge label color.
	pub edge_text: Color,
	/// Halo drawn behind edge labels.
	pub edge_text_stroke: Color,
	/// Node border at rest.
	pub node_border: Color,
	/// Border of hovered/selected nodes.
	pub node_highlight: Color,
	/// Drop shadow under nodes and edges.
	pub shadow: Color,
	/// Tooltip box fill and text.
	pub tooltip_background: Color,
	/// Tooltip text.
	pub tooltip_text: Color,
}

impl Theme {
	/// Palette for the dark theme.
	pub fn dark() -> Self {
		Self {
			mode: ThemeMode::Dark,
			background: Color::rgb(15, 23, 42),
			node_text: Color::rgb(248, 250, 252),
			edge_text: Color::rgb(203, 213, 225),
			edge_text_stroke: Color::rgb(30, 41, 59),
			node_border: Color::rgb(100, 116, 139),
			node_highlight: Color::rgb(148, 163, 184),
			shadow: Color::rgba(0, 0, 0, 0.5),
			tooltip_background: Color::rgba(30, 41, 59, 0.95),
			tooltip_text: Color::rgb(241, 245, 249),
		}
	}

	/// Palette for the light theme.
	pub fn light() -> Self {
		Self {
			mode: ThemeMode::Light,
			background: Color::rgb(248, 250, 252),
			node_text: Color::rgb(255, 255, 255),
			edge_text: Color::rgb(100, 116, 139),
			edge_text_stroke: Color::rgb(255, 255, 255),
			node_border: Color::rgb(71, 85, 105),
			node_highlight: Color::rgb(51, 65, 85),
			shadow: Color::rgba(0, 0, 0, 0.15),
			tooltip_background: Color::rgba(255, 255, 255, 0.97),
			tooltip_text: Color::rgb(30, 41, 59),
		}
	}

	/// Palette for `mode`.
	pub fn for_mode(mode: ThemeMode) -> Self {
		match mode {
			ThemeMode::Light => Self::light(),
			ThemeMode::Dark => Self::dark(),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::for_mode(ThemeMode::default())
	}
}

/// Persisted theme preference.
pub struct ThemeStore<'a, S: KeyValueStore> {
	store: &'a S,
	key: &'a str,
	default: ThemeMode,
}

impl<'a, S: KeyValueStore> ThemeStore<'a, S> {
	/// Preference stored under `key`, falling back to `default`.
	pub fn new(store: &'a S, key: &'a str, default: ThemeMode) -> Self {
		Self {
			store,
			key,
			default,
		}
	}

	/// Stored theme, or the default when absent or unrecognised.
	pub fn get(&self) -> ThemeMode {
		self.store
			.get(self.key)
			.and_then(|v| ThemeMode::parse(&v))
			.unwrap_or(self.default)
	}

	/// Flip and persist the theme, returning the new one.
	pub fn toggle(&self) -> Result<ThemeMode> {
		let next = self.get().toggled();
		self.store.set(self.key, next.as_str())?;
		Ok(next)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::storage::MemoryStorage;

	#[test]
	fn css_output() {
		assert_eq!(Color::rgb(16, 185, 129).to_css(), "#10b981");
		assert_eq!(
			Color::rgba(0, 0, 0, 0.5).to_css(),
			"rgba(0, 0, 0, 0.5)"
		);
	}

	#[test]
	fn luminance_bounds() {
		assert_eq!(Color::rgb(0, 0, 0).luminance(), 0.0);
		assert!((Color::rgb(255, 255, 255).luminance() - 1.0).abs() < 1e-9);
	}

	#[test]
	fn store_defaults_to_dark() {
		let storage = MemoryStorage::default();
		let store = ThemeStore::new(&storage, "theme", ThemeMode::Dark);
		assert_eq!(store.get(), ThemeMode::Dark);
	}

	#[test]
	fn store_ignores_garbage() {
		let storage = MemoryStorage::default();
		storage.set("theme", "sepia").unwrap();
		let store = ThemeStore::new(&storage, "theme", ThemeMode::Dark);
		assert_eq!(store.get(), ThemeMode::Dark);
	}

	#[test]
	fn toggle_persists() {
		let storage = MemoryStorage::default();
		let store = ThemeStore::new(&storage, "theme", ThemeMode::Dark);
		assert_eq!(store.toggle().unwrap(), ThemeMode::Light);
		assert_eq!(storage.get("theme").as_deref(), Some("light"));
		assert_eq!(store.toggle().unwrap(), ThemeMode::Dark);
		assert_eq!(store.get(), ThemeMode::Dark);
	}

	#[test]
	fn palettes_differ_by_mode() {
		assert_eq!(Theme::for_mode(ThemeMode::Light).mode, ThemeMode::Light);
		assert_ne!(Theme::light().background, Theme::dark().background);
	}
}
