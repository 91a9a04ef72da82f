//! Graph data as served by the backend, and the payloads sent back to it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A knowledge item with outgoing weighted connections.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct GraphNode {
	/// Unique identifier. The snapshot key is authoritative; this is filled in
	/// from it when the backend omits the field.
	#[serde(default)]
	pub id: String,
	/// Display title.
	pub title: String,
	/// Optional free-text description.
	#[serde(default)]
	pub description: Option<String>,
	/// Target node id → strength (0–100).
	#[serde(default)]
	pub connections: BTreeMap<String, i32>,
}

/// Full graph as returned by `GET /graph`, keyed by node id.
///
/// A sorted map keeps layout and search order stable between fetches.
pub type GraphSnapshot = BTreeMap<String, GraphNode>;

/// Decode a `/graph` body, normalising node ids to their keys.
pub fn parse_snapshot(json: &str) -> serde_json::Result<GraphSnapshot> {
	let mut snapshot: GraphSnapshot = serde_json::from_str(json)?;
	normalize_ids(&mut snapshot);
	Ok(snapshot)
}

pub(crate) fn normalize_ids(snapshot: &mut GraphSnapshot) {
	for (id, node) in snapshot.iter_mut() {
		if node.id != *id {
			node.id = id.clone();
		}
	}
}

/// Directed edge identity: (source id, target id).
pub type EdgeKey = (String, String);

/// Fields of the add-node form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeForm {
	/// Id of the new node.
	pub id: String,
	/// Title of the new node.
	pub title: String,
	/// Description; omitted from the payload when blank.
	pub description: String,
	/// Optional parent the new node is connected from.
	pub parent_id: String,
	/// Strength of the parent connection, as typed.
	pub strength: String,
}

impl NodeForm {
	/// Flat key/value payload for `POST /addNode`. Blank optional fields are
	/// left out so the backend applies its own defaults.
	pub fn to_payload(&self) -> BTreeMap<&'static str, String> {
		let mut body = BTreeMap::new();
		body.insert("id", self.id.trim().to_string());
		body.insert("title", self.title.trim().to_string());
		let optional = [
			("description", &self.description),
			("parentId", &self.parent_id),
			("strength", &self.strength),
		];
		for (key, value) in optional {
			let value = value.trim();
			if !value.is_empty() {
				body.insert(key, value.to_string());
			}
		}
		body
	}

	/// Whether the required id and title are filled in.
	pub fn is_complete(&self) -> bool {
		!self.id.trim().is_empty() && !self.title.trim().is_empty()
	}
}

/// Body of `POST /editNode`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct EditNode {
	/// Id of the node being edited.
	pub id: String,
	/// Edited title.
	pub title: String,
	/// Edited description.
	pub description: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_backend_shape() {
		let json = r#"{
			"a": { "id": "a", "title": "A", "description": "first", "connections": {} },
			"b": { "title": "B", "connections": { "a": 50 } }
		}"#;
		let snapshot = parse_snapshot(json).unwrap();
		assert_eq!(snapshot.len(), 2);
		assert_eq!(snapshot["a"].description.as_deref(), Some("first"));
		assert_eq!(snapshot["b"].id, "b");
		assert_eq!(snapshot["b"].connections["a"], 50);
	}

	#[test]
	fn missing_connections_default_to_empty() {
		let snapshot = parse_snapshot(r#"{ "x": { "title": "X" } }"#).unwrap();
		assert!(snapshot["x"].connections.is_empty());
	}

	#[test]
	fn payload_omits_blank_optionals() {
		let form = NodeForm {
			id: " n1 ".into(),
			title: "Node".into(),
			description: "  ".into(),
			parent_id: "root".into(),
			strength: String::new(),
		};
		let body = form.to_payload();
		assert_eq!(body.get("id").map(String::as_str), Some("n1"));
		assert_eq!(body.get("parentId").map(String::as_str), Some("root"));
		assert!(!body.contains_key("description"));
		assert!(!body.contains_key("strength"));
	}

	#[test]
	fn form_requires_id_and_title() {
		let mut form = NodeForm::default();
		assert!(!form.is_complete());
		form.id = "x".into();
		form.title = "X".into();
		assert!(form.is_complete());
	}
}
