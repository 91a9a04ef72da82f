//! User-triggered workflows against the backend.
//!
//! Each workflow performs its request, reports the outcome through a
//! [`UiSink`] toast and re-fetches the graph after successful writes. They are
//! generic over [`GraphBackend`] and [`UiSink`] so they run without a browser.

use log::{error, info};

use crate::api::GraphBackend;
use crate::components::graph::style::REINFORCE_COLOR;
use crate::components::graph::theme::Color;
use crate::components::graph::types::{EdgeKey, EditNode, GraphSnapshot, NodeForm};
use crate::error::AppError;
use crate::notify::ToastKind;

/// Side effects a workflow may have on the page.
pub trait UiSink {
	/// Show a toast.
	fn notify(&self, kind: ToastKind, message: &str);
	/// Toggle the loading indicator.
	fn set_loading(&self, loading: bool);
	/// Replace the cached snapshot wholesale.
	fn replace_graph(&self, snapshot: GraphSnapshot);
	/// Override an edge color, or drop the override with `None`.
	fn set_edge_color(&self, edge: &EdgeKey, color: Option<Color>);
}

/// Toast texts for a write: backend rejected it vs. it never arrived.
struct FailureText {
	rejected: &'static str,
	failed: &'static str,
}

fn report_failure<U: UiSink>(ui: &U, action: &str, err: &AppError, text: FailureText) {
	error!("rekno: {action} failed: {err}");
	let message = match err {
		AppError::Status { .. } => text.rejected,
		_ => text.failed,
	};
	ui.notify(ToastKind::Error, message);
}

/// Fetch the graph and replace the cached snapshot.
///
/// On failure the previous snapshot stays in place.
pub async fn refresh<B: GraphBackend, U: UiSink>(backend: &B, ui: &U) -> bool {
	ui.set_loading(true);
	let ok = match backend.fetch_graph().await {
		Ok(snapshot) => {
			let edges: usize = snapshot.values().map(|n| n.connections.len()).sum();
			info!("rekno: loaded {} nodes, {} connections", snapshot.len(), edges);
			ui.replace_graph(snapshot);
			true
		}
		Err(e) => {
			error!("rekno: fetching graph failed: {e}");
			ui.notify(ToastKind::Error, "Failed to load graph");
			false
		}
	};
	ui.set_loading(false);
	ok
}

/// Create a node; returns whether the form should be reset.
pub async fn add_node<B: GraphBackend, U: UiSink>(backend: &B, ui: &U, form: &NodeForm) -> bool {
	if !form.is_complete() {
		ui.notify(ToastKind::Error, "Node ID and title are required");
		return false;
	}
	match backend.add_node(form).await {
		Ok(()) => {
			ui.notify(ToastKind::Success, "Node added successfully!");
			refresh(backend, ui).await;
			true
		}
		Err(e) => {
			report_failure(ui, "adding node", &e, FailureText {
				rejected: "Failed to add node",
				failed: "Error adding node",
			});
			false
		}
	}
}

/// Update a node's title and description; returns whether the editor closes.
pub async fn edit_node<B: GraphBackend, U: UiSink>(backend: &B, ui: &U, edit: &EditNode) -> bool {
	match backend.edit_node(edit).await {
		Ok(()) => {
			ui.notify(ToastKind::Success, "Node updated successfully!");
			refresh(backend, ui).await;
			true
		}
		Err(e) => {
			report_failure(ui, "updating node", &e, FailureText {
				rejected: "Failed to update node",
				failed: "Error updating node",
			});
			false
		}
	}
}

/// Delete a node; the caller has already asked for confirmation.
pub async fn delete_node<B: GraphBackend, U: UiSink>(backend: &B, ui: &U, id: &str) -> bool {
	match backend.delete_node(id).await {
		Ok(()) => {
			ui.notify(ToastKind::Success, "Node deleted successfully!");
			refresh(backend, ui).await;
			true
		}
		Err(e) => {
			report_failure(ui, "deleting node", &e, FailureText {
				rejected: "Failed to delete node",
				failed: "Error deleting node",
			});
			false
		}
	}
}

/// Strengthen one edge, showing it green while the request is in flight.
///
/// The override is dropped once the request settles: after the re-fetch on
/// success, immediately on failure so the edge shows its previous color.
pub async fn reinforce<B: GraphBackend, U: UiSink>(backend: &B, ui: &U, edge: &EdgeKey) -> bool {
	ui.set_edge_color(edge, Some(REINFORCE_COLOR));
	match backend.reinforce(&edge.0, &edge.1).await {
		Ok(()) => {
			ui.notify(ToastKind::Success, "Connection reinforced!");
			refresh(backend, ui).await;
			ui.set_edge_color(edge, None);
			true
		}
		Err(e) => {
			ui.set_edge_color(edge, None);
			report_failure(ui, "reinforcing connection", &e, FailureText {
				rejected: "Failed to reinforce connection",
				failed: "Error reinforcing connection",
			});
			false
		}
	}
}

/// Weaken every connection, then re-fetch once.
pub async fn decay<B: GraphBackend, U: UiSink>(backend: &B, ui: &U) -> bool {
	match backend.decay().await {
		Ok(()) => {
			ui.notify(ToastKind::Info, "Decay applied! Connections weakened by 5%");
			refresh(backend, ui).await;
			true
		}
		Err(e) => {
			report_failure(ui, "applying decay", &e, FailureText {
				rejected: "Failed to apply decay",
				failed: "Error applying decay",
			});
			false
		}
	}
}

/// Ask the backend to persist the graph. Nothing changes client-side.
pub async fn save<B: GraphBackend, U: UiSink>(backend: &B, ui: &U) -> bool {
	match backend.save().await {
		Ok(()) => {
			ui.notify(ToastKind::Success, "Graph saved successfully!");
			true
		}
		Err(e) => {
			report_failure(ui, "saving graph", &e, FailureText {
				rejected: "Failed to save graph",
				failed: "Error saving graph",
			});
			false
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;

	use async_trait::async_trait;
	use futures::executor::block_on;

	use super::*;
	use crate::components::graph::types::parse_snapshot;
	use crate::error::Result;

	/// Records every call and fails the ones listed in `failing`.
	#[derive(Default)]
	struct FakeBackend {
		calls: RefCell<Vec<String>>,
		failing: Vec<&'static str>,
		offline: bool,
	}

	impl FakeBackend {
		fn failing(ops: &[&'static str]) -> Self {
			Self {
				failing: ops.to_vec(),
				..Self::default()
			}
		}

		fn offline() -> Self {
			Self {
				offline: true,
				..Self::default()
			}
		}

		fn call(&self, op: &'static str) -> Result<()> {
			self.calls.borrow_mut().push(op.to_string());
			if self.offline {
				Err(AppError::Transport("offline".into()))
			} else if self.failing.contains(&op) {
				Err(AppError::Status { status: 500 })
			} else {
				Ok(())
			}
		}

		fn count(&self, op: &str) -> usize {
			self.calls.borrow().iter().filter(|c| *c == op).count()
		}
	}

	#[async_trait(?Send)]
	impl GraphBackend for FakeBackend {
		async fn fetch_graph(&self) -> Result<GraphSnapshot> {
			self.call("graph")?;
			Ok(parse_snapshot(r#"{ "a": { "title": "A", "connections": {} } }"#)?)
		}

		async fn add_node(&self, _form: &NodeForm) -> Result<()> {
			self.call("addNode")
		}

		async fn edit_node(&self, _edit: &EditNode) -> Result<()> {
			self.call("editNode")
		}

		async fn delete_node(&self, _id: &str) -> Result<()> {
			self.call("deleteNode")
		}

		async fn reinforce(&self, _from: &str, _to: &str) -> Result<()> {
			self.call("reinforce")
		}

		async fn decay(&self) -> Result<()> {
			self.call("decay")
		}

		async fn save(&self) -> Result<()> {
			self.call("save")
		}
	}

	#[derive(Debug, PartialEq)]
	enum Event {
		Toast(ToastKind, String),
		Loading(bool),
		Graph(usize),
		EdgeColor(EdgeKey, Option<Color>),
	}

	#[derive(Default)]
	struct RecordingSink {
		events: RefCell<Vec<Event>>,
	}

	impl RecordingSink {
		fn toasts(&self) -> Vec<(ToastKind, String)> {
			self.events
				.borrow()
				.iter()
				.filter_map(|e| match e {
					Event::Toast(k, m) => Some((*k, m.clone())),
					_ => None,
				})
				.collect()
		}

		fn graphs(&self) -> usize {
			self.events
				.borrow()
				.iter()
				.filter(|e| matches!(e, Event::Graph(_)))
				.count()
		}
	}

	impl UiSink for RecordingSink {
		fn notify(&self, kind: ToastKind, message: &str) {
			self.events
				.borrow_mut()
				.push(Event::Toast(kind, message.to_string()));
		}

		fn set_loading(&self, loading: bool) {
			self.events.borrow_mut().push(Event::Loading(loading));
		}

		fn replace_graph(&self, snapshot: GraphSnapshot) {
			self.events.borrow_mut().push(Event::Graph(snapshot.len()));
		}

		fn set_edge_color(&self, edge: &EdgeKey, color: Option<Color>) {
			self.events
				.borrow_mut()
				.push(Event::EdgeColor(edge.clone(), color));
		}
	}

	fn edge() -> EdgeKey {
		("b".to_string(), "a".to_string())
	}

	#[test]
	fn decay_notifies_and_fetches_exactly_once() {
		let (backend, ui) = (FakeBackend::default(), RecordingSink::default());
		assert!(block_on(decay(&backend, &ui)));
		assert_eq!(backend.count("decay"), 1);
		assert_eq!(backend.count("graph"), 1);
		assert_eq!(ui.toasts(), vec![(
			ToastKind::Info,
			"Decay applied! Connections weakened by 5%".to_string()
		)]);
		assert_eq!(ui.graphs(), 1);
	}

	#[test]
	fn reinforce_failure_reverts_color_and_reports() {
		let (backend, ui) = (FakeBackend::failing(&["reinforce"]), RecordingSink::default());
		assert!(!block_on(reinforce(&backend, &ui, &edge())));
		let events = ui.events.borrow();
		assert_eq!(events[0], Event::EdgeColor(edge(), Some(REINFORCE_COLOR)));
		assert_eq!(events[1], Event::EdgeColor(edge(), None));
		assert_eq!(
			events[2],
			Event::Toast(ToastKind::Error, "Failed to reinforce connection".into())
		);
		assert_eq!(backend.count("graph"), 0);
	}

	#[test]
	fn reinforce_success_refetches() {
		let (backend, ui) = (FakeBackend::default(), RecordingSink::default());
		assert!(block_on(reinforce(&backend, &ui, &edge())));
		assert_eq!(backend.count("graph"), 1);
		assert_eq!(ui.toasts()[0].1, "Connection reinforced!");
	}

	#[test]
	fn save_does_not_refetch() {
		let (backend, ui) = (FakeBackend::default(), RecordingSink::default());
		assert!(block_on(save(&backend, &ui)));
		assert_eq!(backend.count("graph"), 0);
		assert_eq!(ui.toasts(), vec![(ToastKind::Success, "Graph saved successfully!".into())]);
	}

	#[test]
	fn fetch_failure_keeps_graph_and_clears_loading() {
		let (backend, ui) = (FakeBackend::offline(), RecordingSink::default());
		assert!(!block_on(refresh(&backend, &ui)));
		assert_eq!(ui.graphs(), 0);
		let events = ui.events.borrow();
		assert_eq!(events.first(), Some(&Event::Loading(true)));
		assert_eq!(events.last(), Some(&Event::Loading(false)));
		assert!(events.contains(&Event::Toast(ToastKind::Error, "Failed to load graph".into())));
	}

	#[test]
	fn transport_errors_use_error_wording() {
		let (backend, ui) = (FakeBackend::offline(), RecordingSink::default());
		let form = NodeForm {
			id: "n".into(),
			title: "N".into(),
			..NodeForm::default()
		};
		assert!(!block_on(add_node(&backend, &ui, &form)));
		assert_eq!(ui.toasts(), vec![(ToastKind::Error, "Error adding node".into())]);
	}

	#[test]
	fn incomplete_form_sends_nothing() {
		let (backend, ui) = (FakeBackend::default(), RecordingSink::default());
		assert!(!block_on(add_node(&backend, &ui, &NodeForm::default())));
		assert!(backend.calls.borrow().is_empty());
		assert_eq!(ui.toasts().len(), 1);
	}

	#[test]
	fn edit_and_delete_refetch_on_success() {
		let (backend, ui) = (FakeBackend::default(), RecordingSink::default());
		let edit = EditNode {
			id: "a".into(),
			title: "A2".into(),
			description: String::new(),
		};
		assert!(block_on(edit_node(&backend, &ui, &edit)));
		assert!(block_on(delete_node(&backend, &ui, "a")));
		assert_eq!(backend.count("graph"), 2);
		assert_eq!(ui.graphs(), 2);
	}
}
