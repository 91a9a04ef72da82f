//! rekno-web: browser front-end for the Rekno knowledge graph.
//!
//! This crate provides a WASM client that draws the graph on a canvas with a
//! hierarchical layout, edits it through the Rekno REST API, and exports the
//! rendering to PNG or PDF.

use std::collections::HashMap;
use std::time::Duration;

use leptos::ev;
use leptos::html::Input;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::*;
use log::{Level, error, info, warn};
use web_sys::KeyboardEvent;

pub mod actions;
pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod export;
pub mod notify;
pub mod search;
pub mod storage;

use actions::UiSink;
use api::HttpBackend;
use components::dialogs::{EditModal, ExportDialog, Onboarding};
use components::graph::{Color, EdgeKey, EditNode, GraphCanvas, GraphSnapshot, NodeForm, ThemeStore};
use components::panels::{AddNodeForm, SearchBox, Toolbar};
use components::toast::ToastView;
use config::AppConfig;
use error::AppError;
use export::{ExportFormat, ExportReport, ExportState};
use notify::{Notifier, ToastKind};
use search::SearchOutcome;
use storage::{Storage, VisitFlag};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("rekno: logging initialized");
}

/// Page-wide reactive state written by the workflows.
#[derive(Clone, Copy)]
struct Page {
	graph: RwSignal<Option<GraphSnapshot>>,
	loading: RwSignal<bool>,
	selection: RwSignal<Vec<String>>,
	edge_colors: RwSignal<HashMap<EdgeKey, Color>>,
	notifier: Notifier,
}

impl UiSink for Page {
	fn notify(&self, kind: ToastKind, message: &str) {
		self.notifier.show(kind, message);
	}

	fn set_loading(&self, loading: bool) {
		self.loading.set(loading);
	}

	fn replace_graph(&self, snapshot: GraphSnapshot) {
		self.selection.set(Vec::new());
		self.graph.set(Some(snapshot));
	}

	fn set_edge_color(&self, edge: &EdgeKey, color: Option<Color>) {
		self.edge_colors.update(|colors| match color {
			Some(color) => {
				colors.insert(edge.clone(), color);
			}
			None => {
				colors.remove(edge);
			}
		});
	}
}

/// Global keyboard shortcuts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Shortcut {
	/// Ctrl/Cmd+Shift+T.
	ToggleTheme,
	/// Ctrl/Cmd+K.
	FocusSearch,
	/// Escape.
	CloseDialogs,
}

impl Shortcut {
	fn from_key(key: &str, modifier: bool, shift: bool) -> Option<Self> {
		if modifier && shift && key.eq_ignore_ascii_case("t") {
			Some(Shortcut::ToggleTheme)
		} else if modifier && key.eq_ignore_ascii_case("k") {
			Some(Shortcut::FocusSearch)
		} else if key == "Escape" {
			Some(Shortcut::CloseDialogs)
		} else {
			None
		}
	}
}

/// Closes every open dialog. Onboarding goes through its dismiss callback so
/// the visit is recorded.
fn close_dialogs(
	editing: RwSignal<Option<EditNode>>,
	export_open: RwSignal<bool>,
	onboarding: RwSignal<bool>,
	dismiss_onboarding: Callback<()>,
) {
	editing.set(None);
	export_open.set(false);
	if onboarding.get_untracked() {
		dismiss_onboarding.run(());
	}
}

/// Main application component.
/// Loads configuration from the DOM, fetches the graph and wires the toolbar,
/// forms and dialogs to the backend workflows.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = AppConfig::load();
	let storage = StoredValue::new_local(Storage::open_or_memory());
	let backend = HttpBackend::new(config.api_base.clone());
	let (theme_key, visited_key) = (config.theme_key.clone(), config.visited_key.clone());
	let initial_theme = storage.with_value(|s| ThemeStore::new(s, &theme_key, config.default_theme).get());
	let first_visit = storage.with_value(|s| !VisitFlag::new(s, &visited_key).has_visited());

	let page = Page {
		graph: RwSignal::new(None),
		loading: RwSignal::new(false),
		selection: RwSignal::new(Vec::new()),
		edge_colors: RwSignal::new(HashMap::new()),
		notifier: Notifier::new(config.toast_ms),
	};
	let notifier = page.notifier;

	// `theme` drives the page attribute at once; the canvas follows after a
	// short delay so the CSS transition settles first.
	let theme = RwSignal::new(initial_theme);
	let render_theme = RwSignal::new(initial_theme);

	let focus = RwSignal::new(None::<String>);
	let zoom = RwSignal::new(None::<f64>);
	let export_request = RwSignal::new(None::<ExportFormat>);
	let export_state = RwSignal::new(ExportState::default());
	let export_open = RwSignal::new(false);
	let onboarding = RwSignal::new(first_visit);
	let editing = RwSignal::new(None::<EditNode>);
	let form = RwSignal::new(NodeForm::default());
	let (saving, decaying, adding, mutating) =
		(RwSignal::new(false), RwSignal::new(false), RwSignal::new(false), RwSignal::new(false));
	let search_ref = NodeRef::<Input>::new();

	notifier.info("Loading your graph...");
	{
		let backend = backend.clone();
		spawn_local(async move {
			actions::refresh(&backend, &page).await;
		});
	}

	let rerender_ms = config.theme_rerender_ms;
	let toggle_theme = Callback::new(move |_: ()| {
		let next = storage
			.with_value(|s| ThemeStore::new(s, &theme_key, theme.get_untracked()).toggle())
			.unwrap_or_else(|e| {
				warn!("rekno: theme not persisted: {e}");
				theme.get_untracked().toggled()
			});
		theme.set(next);
		notifier.info(format!("Switched to {next} theme"));
		set_timeout(move || render_theme.set(next), Duration::from_millis(rerender_ms.into()));
	});

	let dismiss_onboarding = Callback::new(move |_: ()| {
		if let Err(e) = storage.with_value(|s| VisitFlag::new(s, &visited_key).mark_visited()) {
			warn!("rekno: onboarding flag not persisted: {e}");
		}
		onboarding.set(false);
	});

	let backend_save = backend.clone();
	let on_save = Callback::new(move |_: ()| {
		let backend = backend_save.clone();
		saving.set(true);
		spawn_local(async move {
			actions::save(&backend, &page).await;
			saving.set(false);
		});
	});

	let backend_decay = backend.clone();
	let on_decay = Callback::new(move |_: ()| {
		let backend = backend_decay.clone();
		decaying.set(true);
		spawn_local(async move {
			actions::decay(&backend, &page).await;
			decaying.set(false);
		});
	});

	let on_zoom = Callback::new(move |factor: f64| zoom.set(Some(factor)));

	let on_open_export = Callback::new(move |_: ()| {
		if page.graph.with_untracked(Option::is_none) {
			notifier.error("No graph to export");
		} else {
			export_open.set(true);
		}
	});

	let on_choose_export = Callback::new(move |format: ExportFormat| {
		if !export_state.try_update(|s| s.begin()).unwrap_or(false) {
			warn!("rekno: export already in progress");
			return;
		}
		notifier.info(format!("Preparing {format} export..."));
		export_request.set(Some(format));
	});

	let on_export_done = Callback::new(move |result: error::Result<ExportReport>| {
		export_state.update(ExportState::finish);
		match result {
			Ok(report) => {
				if report.fell_back {
					notifier.error("Failed to export PDF. Trying PNG fallback...");
				}
				notifier.success(format!("{} exported successfully!", report.format));
			}
			Err(AppError::NoScene) => notifier.error("No graph to export"),
			Err(e) => {
				error!("rekno: export failed: {e}");
				notifier.error("Failed to export PNG");
			}
		}
	});

	let backend_add = backend.clone();
	let on_add = Callback::new(move |submitted: NodeForm| {
		let backend = backend_add.clone();
		adding.set(true);
		spawn_local(async move {
			if actions::add_node(&backend, &page, &submitted).await {
				form.set(NodeForm::default());
			}
			adding.set(false);
		});
	});

	let on_node_click = Callback::new(move |id: String| {
		let edit = page.graph.with_untracked(|g| {
			let node = g.as_ref()?.get(&id)?;
			Some(EditNode {
				id: id.clone(),
				title: node.title.clone(),
				description: node.description.clone().unwrap_or_default(),
			})
		});
		if edit.is_some() {
			editing.set(edit);
		}
	});

	let backend_edit = backend.clone();
	let on_edit_save = Callback::new(move |edit: EditNode| {
		let backend = backend_edit.clone();
		mutating.set(true);
		spawn_local(async move {
			if actions::edit_node(&backend, &page, &edit).await {
				editing.set(None);
			}
			mutating.set(false);
		});
	});

	let backend_delete = backend.clone();
	let on_delete = Callback::new(move |id: String| {
		let backend = backend_delete.clone();
		mutating.set(true);
		spawn_local(async move {
			if actions::delete_node(&backend, &page, &id).await {
				editing.set(None);
			}
			mutating.set(false);
		});
	});

	let backend_reinforce = backend.clone();
	let on_edge_double_click = Callback::new(move |edge: EdgeKey| {
		let backend = backend_reinforce.clone();
		spawn_local(async move {
			actions::reinforce(&backend, &page, &edge).await;
		});
	});

	let on_search = Callback::new(move |query: String| {
		let outcome = page
			.graph
			.with_untracked(|g| g.as_ref().map(|g| search::search(g, &query)));
		let Some(outcome) = outcome else {
			return;
		};
		let message = outcome.message();
		match outcome {
			SearchOutcome::Empty => {}
			SearchOutcome::NotFound => notifier.info(message.unwrap_or_default()),
			SearchOutcome::Found { first, ids } => {
				focus.set(Some(first));
				page.selection.set(ids);
				notifier.success(message.unwrap_or_default());
			}
		}
	});

	let keys = window_event_listener(ev::keydown, move |ev: KeyboardEvent| {
		let modifier = ev.ctrl_key() || ev.meta_key();
		match Shortcut::from_key(&ev.key(), modifier, ev.shift_key()) {
			Some(Shortcut::ToggleTheme) => {
				ev.prevent_default();
				toggle_theme.run(());
			}
			Some(Shortcut::FocusSearch) => {
				ev.prevent_default();
				if let Some(input) = search_ref.get_untracked() {
					let _ = input.focus();
				}
			}
			Some(Shortcut::CloseDialogs) => close_dialogs(editing, export_open, onboarding, dismiss_onboarding),
			None => {}
		}
	});
	on_cleanup(move || keys.remove());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme=move || theme.get().as_str() />
		<Title text="Rekno" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<header class="app-header">
			<h1>"Rekno"</h1>
			<SearchBox input_ref=search_ref on_search=on_search />
			<Toolbar
				theme=theme
				saving=saving
				decaying=decaying
				exporting=Signal::derive(move || export_state.get().is_exporting())
				on_toggle_theme=toggle_theme
				on_save=on_save
				on_decay=on_decay
				on_zoom=on_zoom
				on_export=on_open_export
			/>
		</header>

		<main class="app-main">
			<aside class="sidebar">
				<h2>"Add node"</h2>
				<AddNodeForm form=form busy=adding on_submit=on_add />
			</aside>
			<div class="graph-container">
				<GraphCanvas
					graph=page.graph
					theme=render_theme
					layout=config.layout.clone()
					selection=page.selection
					edge_colors=page.edge_colors
					focus=focus
					zoom=zoom
					export=export_request
					resize_debounce_ms=config.resize_debounce_ms
					on_node_click=on_node_click
					on_edge_double_click=on_edge_double_click
					on_export=on_export_done
				/>
				<Show when=move || page.loading.get()>
					<div class="loading">"Loading your graph..."</div>
				</Show>
			</div>
		</main>

		<EditModal editing=editing busy=mutating on_save=on_edit_save on_delete=on_delete />
		<ExportDialog open=export_open on_choose=on_choose_export />
		<Onboarding open=onboarding on_dismiss=dismiss_onboarding />
		<ToastView notifier=notifier />
	}
}
