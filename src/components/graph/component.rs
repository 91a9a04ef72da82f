//! Leptos component wrapping the knowledge graph canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel event
//! handlers for node dragging, panning, zooming, clicking and edge
//! double-clicking. An animation loop runs via `requestAnimationFrame`,
//! advancing camera transitions and redrawing each frame while the page is
//! visible. Graph data, theme, selection and edge overrides arrive as signals;
//! one-shot commands (focus, zoom, export) arrive as request signals that the
//! component clears after handling.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use leptos::ev;
use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use crate::config::LayoutConfig;
use crate::error::{AppError, Result};
use crate::export::{self, ExportFormat, ExportReport};

use super::render;
use super::scale::ScaleConfig;
use super::state::{GraphScene, GraphState, Hover};
use super::theme::{Color, Theme, ThemeMode};
use super::types::{EdgeKey, GraphSnapshot};

/// Zoom level used when centering on a search hit.
pub const FOCUS_ZOOM: f64 = 1.2;

/// Bundles scene state with visual configuration.
struct GraphContext {
	state: GraphState,
	scale: ScaleConfig,
}

type SharedContext = Rc<RefCell<Option<GraphContext>>>;

/// Renders the knowledge graph on a canvas sized to its parent element.
#[component]
pub fn GraphCanvas(
	/// Latest snapshot; `None` until the first successful fetch.
	#[prop(into)]
	graph: Signal<Option<GraphSnapshot>>,
	/// Theme the scene is styled with.
	#[prop(into)]
	theme: Signal<ThemeMode>,
	/// Level and node spacing of the hierarchy.
	#[prop(default = LayoutConfig::default())]
	layout: LayoutConfig,
	/// Ids of nodes drawn with a selection ring.
	#[prop(into)]
	selection: Signal<Vec<String>>,
	/// Temporary edge colors keyed by `(from, to)`.
	#[prop(into)]
	edge_colors: Signal<HashMap<EdgeKey, Color>>,
	/// Request to center a node; cleared once handled.
	focus: RwSignal<Option<String>>,
	/// Request to zoom around the center by a factor; cleared once handled.
	zoom: RwSignal<Option<f64>>,
	/// Request to export the scene; cleared once handled.
	export: RwSignal<Option<ExportFormat>>,
	/// Quiet period before a window resize is applied.
	#[prop(default = 250)]
	resize_debounce_ms: u32,
	/// Click on a node that was not dragged.
	#[prop(into)]
	on_node_click: Callback<String>,
	/// Double click on an edge away from any node.
	#[prop(into)]
	on_edge_double_click: Callback<EdgeKey>,
	/// Outcome of each export request.
	#[prop(into)]
	on_export: Callback<Result<ExportReport>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: SharedContext = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let layout = Rc::new(layout);

	let (context_init, animate_init, layout_init) = (context.clone(), animate.clone(), layout.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if context_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(ctx) = context_2d(&canvas) else {
			warn!("rekno: canvas 2d context unavailable");
			return;
		};

		let (w, h) = container_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let theme = Theme::for_mode(theme.get_untracked());
		let mut state = GraphState::new(w, h, theme.clone());
		if let Some(snapshot) = graph.get_untracked() {
			state.set_scene(GraphScene::build(&snapshot, &theme, &layout_init), theme);
		}
		*context_init.borrow_mut() = Some(GraphContext {
			state,
			scale: ScaleConfig::default(),
		});

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let visible = web_sys::window()
				.and_then(|w| w.document())
				.is_some_and(|d| !d.hidden());
			if visible {
				if let Some(ref mut c) = *context_anim.borrow_mut() {
					c.state.tick(0.016);
					render::render(&c.state, &ctx, &c.scale);
				}
			}
			if let (Some(cb), Some(window)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let (Some(cb), Some(window)) = (&*animate_init.borrow(), web_sys::window()) {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// Rebuild the scene whenever the snapshot or the theme changes.
	let (context_scene, layout_scene) = (context.clone(), layout.clone());
	Effect::new(move |_| {
		let snapshot = graph.get();
		let theme = Theme::for_mode(theme.get());
		let mut guard = context_scene.borrow_mut();
		let Some(c) = guard.as_mut() else {
			return;
		};
		let scene = match snapshot {
			Some(snapshot) => GraphScene::build(&snapshot, &theme, &layout_scene),
			None => GraphScene::default(),
		};
		debug!(
			"rekno: scene rebuilt with {} nodes, {} edges",
			scene.nodes.len(),
			scene.edges.len()
		);
		c.state.set_scene(scene, theme);
		c.state.scene.apply_edge_overrides(&edge_colors.get_untracked());
		c.state.select(&selection.get_untracked());
	});

	let context_sel = context.clone();
	Effect::new(move |_| {
		let ids = selection.get();
		if let Some(ref mut c) = *context_sel.borrow_mut() {
			c.state.select(&ids);
		}
	});

	let context_colors = context.clone();
	Effect::new(move |_| {
		let overrides = edge_colors.get();
		if let Some(ref mut c) = *context_colors.borrow_mut() {
			c.state.scene.apply_edge_overrides(&overrides);
		}
	});

	let context_focus = context.clone();
	Effect::new(move |_| {
		let Some(id) = focus.get() else {
			return;
		};
		focus.set(None);
		if let Some(ref mut c) = *context_focus.borrow_mut() {
			if !c.state.focus_on(&id, FOCUS_ZOOM) {
				warn!("rekno: cannot focus unknown node {id}");
			}
		}
	});

	let context_zoom = context.clone();
	Effect::new(move |_| {
		let Some(factor) = zoom.get() else {
			return;
		};
		zoom.set(None);
		if let Some(ref mut c) = *context_zoom.borrow_mut() {
			c.state.zoom_by(factor);
		}
	});

	let context_export = context.clone();
	Effect::new(move |_| {
		let Some(format) = export.get() else {
			return;
		};
		export.set(None);
		let result = match &*context_export.borrow() {
			Some(c) if !c.state.scene.nodes.is_empty() => export::export_scene(&c.state, &c.scale, format),
			_ => Err(AppError::NoScene),
		};
		on_export.run(result);
	});

	// Trailing debounce: only the last resize in a burst re-sizes the canvas.
	let pending: Rc<Cell<Option<TimeoutHandle>>> = Rc::new(Cell::new(None));
	let context_resize = context.clone();
	let resize_handle = window_event_listener(ev::resize, move |_| {
		if let Some(handle) = pending.take() {
			handle.clear();
		}
		let context_resize = context_resize.clone();
		let handle = set_timeout_with_handle(
			move || {
				let Some(canvas) = canvas_ref.get_untracked() else {
					return;
				};
				let canvas: HtmlCanvasElement = canvas.into();
				let (w, h) = container_size(&canvas);
				canvas.set_width(w as u32);
				canvas.set_height(h as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.state.resize(w, h);
				}
			},
			Duration::from_millis(resize_debounce_ms.into()),
		);
		pending.set(handle.ok());
	});
	on_cleanup(move || resize_handle.remove());

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_md.borrow_mut() {
			c.state.begin_press(x, y);
		}
		set_cursor(canvas_ref, "grabbing");
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		let cursor = if let Some(ref mut c) = *context_mm.borrow_mut() {
			if c.state.drag.active || c.state.pan.active {
				c.state.move_press(x, y);
				c.state.pointer = (x, y);
				"grabbing"
			} else {
				c.state.update_hover(x, y, &c.scale);
				match c.state.hover {
					Hover::None => "grab",
					_ => "pointer",
				}
			}
		} else {
			"grab"
		};
		set_cursor(canvas_ref, cursor);
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		let clicked = match *context_mu.borrow_mut() {
			Some(ref mut c) => {
				let pressed = c.state.drag.node_idx;
				let moved = c.state.end_press();
				pressed
					.filter(|_| !moved)
					.map(|i| c.state.scene.nodes[i].view.id.clone())
			}
			None => None,
		};
		set_cursor(canvas_ref, "grab");
		if let Some(id) = clicked {
			on_node_click.run(id);
		}
	};

	let context_dbl = context.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		let edge = match &*context_dbl.borrow() {
			Some(c) if c.state.node_at_position(x, y).is_none() => c
				.state
				.edge_at_position(x, y, &c.scale)
				.map(|i| {
					let view = &c.state.scene.edges[i].view;
					(view.from.clone(), view.to.clone())
				}),
			_ => None,
		};
		if let Some(key) = edge {
			on_edge_double_click.run(key);
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.state.release();
		}
		set_cursor(canvas_ref, "grab");
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			c.state.zoom_at(x, y, factor);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:dblclick=on_dblclick
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

fn container_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or((800.0, 600.0))
}

fn local_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn set_cursor(canvas_ref: NodeRef<leptos::html::Canvas>, cursor: &str) {
	if let Some(canvas) = canvas_ref.get_untracked() {
		let canvas: HtmlCanvasElement = canvas.into();
		let _ = web_sys::HtmlElement::style(&canvas).set_property("cursor", cursor);
	}
}
