//! Transient status messages.
//!
//! One toast is visible at a time. A newer toast replaces the current one, and
//! each auto-dismiss timer only clears the toast it was started for.

use std::time::Duration;

use leptos::prelude::*;

/// Visual category of a toast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
	/// Green: an action succeeded.
	Success,
	/// Red: an action failed.
	Error,
	/// Neutral progress or status.
	Info,
}

impl ToastKind {
	/// CSS classes of the toast element.
	pub fn class(self) -> &'static str {
		match self {
			Self::Success => "toast toast-success",
			Self::Error => "toast toast-error",
			Self::Info => "toast toast-info",
		}
	}
}

/// A visible message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
	/// Distinguishes toasts with identical text.
	pub id: u64,
	/// Styling category.
	pub kind: ToastKind,
	/// Text shown to the user.
	pub message: String,
}

/// The currently visible toast, if any.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToastState {
	next_id: u64,
	current: Option<Toast>,
}

impl ToastState {
	/// Replace the visible toast and return the new toast's id.
	pub fn show(&mut self, kind: ToastKind, message: impl Into<String>) -> u64 {
		self.next_id += 1;
		self.current = Some(Toast {
			id: self.next_id,
			kind,
			message: message.into(),
		});
		self.next_id
	}

	/// Hide toast `id` if it is still the visible one.
	pub fn dismiss(&mut self, id: u64) -> bool {
		if self.current.as_ref().is_some_and(|t| t.id == id) {
			self.current = None;
			true
		} else {
			false
		}
	}

	/// The visible toast.
	pub fn current(&self) -> Option<&Toast> {
		self.current.as_ref()
	}
}

/// Reactive handle over [`ToastState`] with timed auto-dismiss.
#[derive(Clone, Copy, Debug)]
pub struct Notifier {
	state: RwSignal<ToastState>,
	duration_ms: u32,
}

impl Notifier {
	/// Notifier whose toasts disappear after `duration_ms`.
	pub fn new(duration_ms: u32) -> Self {
		Self {
			state: RwSignal::new(ToastState::default()),
			duration_ms,
		}
	}

	/// Show a toast and schedule its dismissal.
	pub fn show(&self, kind: ToastKind, message: impl Into<String>) {
		let Some(id) = self.state.try_update(|s| s.show(kind, message)) else {
			return;
		};
		let state = self.state;
		set_timeout(
			move || {
				state.update(|s| {
					s.dismiss(id);
				})
			},
			Duration::from_millis(self.duration_ms.into()),
		);
	}

	/// Show a success toast.
	pub fn success(&self, message: impl Into<String>) {
		self.show(ToastKind::Success, message);
	}

	/// Show an error toast.
	pub fn error(&self, message: impl Into<String>) {
		self.show(ToastKind::Error, message);
	}

	/// Show an info toast.
	pub fn info(&self, message: impl Into<String>) {
		self.show(ToastKind::Info, message);
	}

	/// Close the visible toast early.
	pub fn close(&self) {
		self.state.update(|s| {
			if let Some(id) = s.current().map(|t| t.id) {
				s.dismiss(id);
			}
		});
	}

	/// The visible toast, tracked reactively.
	pub fn current(&self) -> Option<Toast> {
		self.state.with(|s| s.current().cloned())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn newer_toast_replaces_older() {
		let mut state = ToastState::default();
		let first = state.show(ToastKind::Info, "Loading your graph...");
		let second = state.show(ToastKind::Success, "Graph saved successfully!");
		assert_ne!(first, second);
		assert_eq!(state.current().map(|t| t.kind), Some(ToastKind::Success));
	}

	#[test]
	fn stale_timer_does_not_hide_newer_toast() {
		let mut state = ToastState::default();
		let first = state.show(ToastKind::Info, "one");
		let second = state.show(ToastKind::Error, "two");
		assert!(!state.dismiss(first));
		assert_eq!(state.current().map(|t| t.message.as_str()), Some("two"));
		assert!(state.dismiss(second));
		assert!(state.current().is_none());
	}
}
