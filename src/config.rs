//! Runtime configuration read from the host page.
//!
//! The page may embed a `<script id="rekno-config" type="application/json">`
//! element. Every field is optional; anything missing falls back to the
//! defaults below.

use log::{info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

use crate::components::graph::ThemeMode;

/// Id of the script element holding the JSON configuration.
pub const CONFIG_ELEMENT_ID: &str = "rekno-config";

/// Spacing of the top-down hierarchical layout, in world units.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
	/// Horizontal distance between neighbours on the same level.
	pub node_spacing: f64,
	/// Vertical distance between levels.
	pub level_separation: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			node_spacing: 200.0,
			level_separation: 150.0,
		}
	}
}

/// Application settings.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
	/// Prefix for every backend path. Empty means same origin.
	pub api_base: String,
	/// `localStorage` key of the theme preference.
	pub theme_key: String,
	/// `localStorage` key of the first-visit flag.
	pub visited_key: String,
	/// Theme used when nothing is stored yet.
	pub default_theme: ThemeMode,
	/// How long a toast stays on screen.
	pub toast_ms: u32,
	/// Delay between a theme toggle and the graph re-render.
	pub theme_rerender_ms: u32,
	/// Trailing debounce applied to window resizes.
	pub resize_debounce_ms: u32,
	/// Hierarchical layout spacing.
	pub layout: LayoutConfig,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			api_base: String::new(),
			theme_key: "theme".into(),
			visited_key: "rekno-visited".into(),
			default_theme: ThemeMode::Dark,
			toast_ms: 3000,
			theme_rerender_ms: 100,
			resize_debounce_ms: 250,
			layout: LayoutConfig::default(),
		}
	}
}

impl AppConfig {
	/// Parse a JSON document, keeping defaults for absent fields.
	pub fn from_json(text: &str) -> crate::error::Result<Self> {
		Ok(serde_json::from_str(text)?)
	}

	/// Load the configuration embedded in the page, or the defaults.
	pub fn load() -> Self {
		let Some(text) = config_script_text() else {
			return Self::default();
		};
		match Self::from_json(&text) {
			Ok(config) => {
				info!("rekno: loaded configuration (api base {:?})", config.api_base);
				config
			}
			Err(e) => {
				warn!("rekno: ignoring invalid configuration: {}", e);
				Self::default()
			}
		}
	}
}

fn config_script_text() -> Option<String> {
	let document = web_sys::window()?.document()?;
	let element = document.get_element_by_id(CONFIG_ELEMENT_ID)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_object_yields_defaults() {
		assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
	}

	#[test]
	fn partial_overrides_keep_other_defaults() {
		let config = AppConfig::from_json(
			r#"{ "api_base": "/api", "default_theme": "light", "layout": { "node_spacing": 120 } }"#,
		)
		.unwrap();
		assert_eq!(config.api_base, "/api");
		assert_eq!(config.default_theme, ThemeMode::Light);
		assert_eq!(config.layout.node_spacing, 120.0);
		assert_eq!(config.layout.level_separation, 150.0);
		assert_eq!(config.toast_ms, 3000);
	}

	#[test]
	fn malformed_json_is_an_error() {
		assert!(AppConfig::from_json("{ api_base: ").is_err());
	}
}
