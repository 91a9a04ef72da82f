//! Toast overlay.

use leptos::prelude::*;

use crate::notify::Notifier;

/// Shows the notifier's current toast; clicking it closes it early.
#[component]
pub fn ToastView(notifier: Notifier) -> impl IntoView {
	move || {
		notifier.current().map(|toast| {
			view! {
				<div class=toast.kind.class() role="status" on:click=move |_| notifier.close()>
					{toast.message}
				</div>
			}
		})
	}
}
