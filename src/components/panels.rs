//! Toolbar, add-node form and search box.

use leptos::html::Input;
use leptos::prelude::*;
use web_sys::KeyboardEvent;

use super::graph::{NodeForm, ThemeMode};

/// Zoom-in factor of the toolbar button.
pub const ZOOM_IN: f64 = 1.2;
/// Zoom-out factor.
pub const ZOOM_OUT: f64 = 0.8;

/// Global actions. Every button that starts a request is disabled while its
/// request is in flight.
#[component]
pub fn Toolbar(
	#[prop(into)] theme: Signal<ThemeMode>,
	#[prop(into)] saving: Signal<bool>,
	#[prop(into)] decaying: Signal<bool>,
	#[prop(into)] exporting: Signal<bool>,
	on_toggle_theme: Callback<()>,
	on_save: Callback<()>,
	on_decay: Callback<()>,
	on_zoom: Callback<f64>,
	on_export: Callback<()>,
) -> impl IntoView {
	let theme_label = move || match theme.get() {
		ThemeMode::Dark => "Light mode",
		ThemeMode::Light => "Dark mode",
	};

	view! {
		<div class="toolbar">
			<button class="theme-toggle" title="Ctrl+Shift+T" on:click=move |_| on_toggle_theme.run(())>
				{theme_label}
			</button>
			<button disabled=move || saving.get() on:click=move |_| on_save.run(())>
				{move || if saving.get() { "Saving..." } else { "Save" }}
			</button>
			<button disabled=move || decaying.get() on:click=move |_| on_decay.run(())>
				{move || if decaying.get() { "Decaying..." } else { "Decay" }}
			</button>
			<button title="Zoom in" on:click=move |_| on_zoom.run(ZOOM_IN)>"+"</button>
			<button title="Zoom out" on:click=move |_| on_zoom.run(ZOOM_OUT)>"-"</button>
			<button disabled=move || exporting.get() on:click=move |_| on_export.run(())>
				"Export"
			</button>
		</div>
	}
}

/// Form creating a node, optionally connected from a parent.
///
/// Field values live in `form`, so the owner can reset it after a successful
/// submit.
#[component]
pub fn AddNodeForm(form: RwSignal<NodeForm>, #[prop(into)] busy: Signal<bool>, on_submit: Callback<NodeForm>) -> impl IntoView {
	let field = move |read: fn(&NodeForm) -> &String| move || form.with(|f| read(f).clone());

	view! {
		<form
			class="add-form"
			on:submit=move |ev| {
				ev.prevent_default();
				on_submit.run(form.get_untracked());
			}
		>
			<input
				name="id"
				placeholder="Node ID"
				required
				prop:value=field(|f| &f.id)
				on:input=move |ev| form.update(|f| f.id = event_target_value(&ev))
			/>
			<input
				name="title"
				placeholder="Title"
				required
				prop:value=field(|f| &f.title)
				on:input=move |ev| form.update(|f| f.title = event_target_value(&ev))
			/>
			<input
				name="description"
				placeholder="Description"
				prop:value=field(|f| &f.description)
				on:input=move |ev| form.update(|f| f.description = event_target_value(&ev))
			/>
			<input
				name="parentId"
				placeholder="Parent ID (optional)"
				prop:value=field(|f| &f.parent_id)
				on:input=move |ev| form.update(|f| f.parent_id = event_target_value(&ev))
			/>
			<input
				name="strength"
				type="number"
				min="0"
				max="100"
				placeholder="Strength"
				prop:value=field(|f| &f.strength)
				on:input=move |ev| form.update(|f| f.strength = event_target_value(&ev))
			/>
			<button type="submit" disabled=move || busy.get()>
				{move || if busy.get() { "Adding..." } else { "Add node" }}
			</button>
		</form>
	}
}

/// Search input; Enter runs the query.
#[component]
pub fn SearchBox(input_ref: NodeRef<Input>, on_search: Callback<String>) -> impl IntoView {
	let on_keydown = move |ev: KeyboardEvent| {
		if ev.key() == "Enter" {
			on_search.run(event_target_value(&ev));
		}
	};

	view! {
		<div class="search-box">
			<input node_ref=input_ref type="search" placeholder="Search nodes (Ctrl+K)" on:keydown=on_keydown />
		</div>
	}
}
