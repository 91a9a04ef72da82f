//! Knowledge graph visualization.
//!
//! Renders the Rekno graph on an HTML canvas with:
//! - Styling derived from connection strengths and the active theme
//! - A fixed top-down hierarchical layout (no physics)
//! - Pan, zoom, node dragging, click and edge double-click interactions
//! - Hover tooltips, selection rings and smooth focus transitions
//!
//! # Example
//!
//! ```ignore
//! view! {
//!     <GraphCanvas
//!         graph=snapshot
//!         theme=theme
//!         selection=selected
//!         edge_colors=overrides
//!         focus=focus
//!         zoom=zoom
//!         export=export
//!         on_node_click=open_editor
//!         on_edge_double_click=reinforce
//!         on_export=export_done
//!     />
//! }
//! ```

mod component;
pub mod layout;
pub(crate) mod render;
pub mod scale;
pub mod state;
pub mod style;
pub mod theme;
pub mod types;

pub use component::{FOCUS_ZOOM, GraphCanvas};
pub use theme::{Color, Theme, ThemeMode, ThemeStore};
pub use types::{EdgeKey, EditNode, GraphNode, GraphSnapshot, NodeForm, parse_snapshot};
