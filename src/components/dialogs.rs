//! Modal dialogs: node editor, export chooser and first-visit onboarding.
//!
//! Each dialog closes on its cancel button or a click on the backdrop; the
//! page-level Escape handler closes whichever is open.

use leptos::prelude::*;
use log::warn;
use web_sys::MouseEvent;

use super::graph::EditNode;
use crate::export::ExportFormat;

const DELETE_PROMPT: &str = "Are you sure you want to delete this node? This action cannot be undone.";

/// True when the click landed on the element carrying the handler itself.
fn is_backdrop(ev: &MouseEvent) -> bool {
	ev.target().is_some() && ev.target() == ev.current_target()
}

/// Editor for the clicked node. `editing` is `None` while closed.
#[component]
pub fn EditModal(
	editing: RwSignal<Option<EditNode>>,
	#[prop(into)] busy: Signal<bool>,
	on_save: Callback<EditNode>,
	on_delete: Callback<String>,
) -> impl IntoView {
	let close = move || editing.set(None);
	let title = move || editing.with(|e| e.as_ref().map(|e| e.title.clone()).unwrap_or_default());
	let description = move || {
		editing.with(|e| {
			e.as_ref()
				.map(|e| e.description.clone())
				.unwrap_or_default()
		})
	};

	let save = move |_| {
		if let Some(edit) = editing.get_untracked() {
			on_save.run(edit);
		}
	};
	let delete = move |_| {
		let Some(id) = editing.with_untracked(|e| e.as_ref().map(|e| e.id.clone())) else {
			return;
		};
		match window().confirm_with_message(DELETE_PROMPT) {
			Ok(true) => on_delete.run(id),
			Ok(false) => {}
			Err(e) => warn!("rekno: confirm dialog failed: {e:?}"),
		}
	};

	view! {
		<Show when=move || editing.with(Option::is_some)>
			<div class="modal" on:click=move |ev| if is_backdrop(&ev) { close() }>
				<div class="modal-content">
					<h2>"Edit node"</h2>
					<input
						class="edit-title"
						placeholder="Title"
						prop:value=title
						on:input=move |ev| {
							let value = event_target_value(&ev);
							editing.update(|e| if let Some(e) = e { e.title = value });
						}
					/>
					<textarea
						class="edit-description"
						placeholder="Description"
						prop:value=description
						on:input=move |ev| {
							let value = event_target_value(&ev);
							editing.update(|e| if let Some(e) = e { e.description = value });
						}
					/>
					<div class="modal-actions">
						<button class="primary" disabled=move || busy.get() on:click=save>"Save"</button>
						<button class="danger" disabled=move || busy.get() on:click=delete>"Delete"</button>
						<button on:click=move |_| close()>"Cancel"</button>
					</div>
				</div>
			</div>
		</Show>
	}
}

/// Format chooser opened from the toolbar.
#[component]
pub fn ExportDialog(open: RwSignal<bool>, on_choose: Callback<ExportFormat>) -> impl IntoView {
	let choose = move |format: ExportFormat| {
		open.set(false);
		on_choose.run(format);
	};

	view! {
		<Show when=move || open.get()>
			<div class="modal" on:click=move |ev| if is_backdrop(&ev) { open.set(false) }>
				<div class="modal-content export-dialog">
					<h2>"Export graph"</h2>
					<button on:click=move |_| choose(ExportFormat::Pdf)>"PDF document"</button>
					<button on:click=move |_| choose(ExportFormat::Png)>"PNG image"</button>
					<button on:click=move |_| open.set(false)>"Cancel"</button>
				</div>
			</div>
		</Show>
	}
}

/// Welcome dialog shown until the visitor dismisses it once.
#[component]
pub fn Onboarding(#[prop(into)] open: Signal<bool>, on_dismiss: Callback<()>) -> impl IntoView {
	view! {
		<Show when=move || open.get()>
			<div class="modal" on:click=move |ev| if is_backdrop(&ev) { on_dismiss.run(()) }>
				<div class="modal-content onboarding">
					<h2>"Welcome to Rekno"</h2>
					<ul>
						<li>"Click a node to edit or delete it."</li>
						<li>"Double-click a connection to reinforce it."</li>
						<li>"Drag nodes to move them, drag the background to pan, scroll to zoom."</li>
						<li>"Press Ctrl+K to search and Ctrl+Shift+T to switch themes."</li>
						<li>"Decay weakens every connection a little; reinforce what you remember."</li>
					</ul>
					<button class="primary" on:click=move |_| on_dismiss.run(())>"Get started"</button>
				</div>
			</div>
		</Show>
	}
}
