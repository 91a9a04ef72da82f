//! Case-insensitive node search.

use crate::components::graph::types::GraphSnapshot;

/// Result of running a query against the snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
	/// Blank query; nothing happens.
	Empty,
	/// Nothing matched.
	NotFound,
	/// Matching ids in id order; `first` is the one to focus.
	Found { first: String, ids: Vec<String> },
}

/// Match `query` against titles and descriptions.
///
/// The query is trimmed and lowercased; a node matches when either field
/// contains it.
pub fn search(snapshot: &GraphSnapshot, query: &str) -> SearchOutcome {
	let needle = query.trim().to_lowercase();
	if needle.is_empty() {
		return SearchOutcome::Empty;
	}
	let ids: Vec<String> = snapshot
		.iter()
		.filter(|(_, node)| {
			node.title.to_lowercase().contains(&needle)
				|| node
					.description
					.as_deref()
					.is_some_and(|d| d.to_lowercase().contains(&needle))
		})
		.map(|(id, _)| id.clone())
		.collect();
	match ids.first() {
		Some(first) => SearchOutcome::Found {
			first: first.clone(),
			ids,
		},
		None => SearchOutcome::NotFound,
	}
}

impl SearchOutcome {
	/// Toast text for a non-empty query.
	pub fn message(&self) -> Option<String> {
		match self {
			Self::Empty => None,
			Self::NotFound => Some("No matching nodes found".into()),
			Self::Found { ids, .. } => Some(format!("Found {} matching node(s)", ids.len())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::graph::types::parse_snapshot;

	fn snapshot() -> GraphSnapshot {
		parse_snapshot(
			r#"{
				"rust": { "title": "Rust", "description": "Ownership and borrowing" },
				"go": { "title": "Go", "description": "Goroutines" },
				"cpp": { "title": "C++" }
			}"#,
		)
		.unwrap()
	}

	#[test]
	fn blank_query_is_a_no_op() {
		assert_eq!(search(&snapshot(), "   "), SearchOutcome::Empty);
		assert_eq!(SearchOutcome::Empty.message(), None);
	}

	#[test]
	fn matches_title_and_description_case_insensitively() {
		let outcome = search(&snapshot(), "  BORROW ");
		assert_eq!(
			outcome,
			SearchOutcome::Found {
				first: "rust".into(),
				ids: vec!["rust".into()],
			}
		);
	}

	#[test]
	fn first_match_follows_id_order() {
		// "go" and "rust" both contain "o"; "go" sorts first.
		let SearchOutcome::Found { first, ids } = search(&snapshot(), "o") else {
			panic!("expected matches");
		};
		assert_eq!(first, "go");
		assert_eq!(ids, vec!["go".to_string(), "rust".to_string()]);
	}

	#[test]
	fn no_match_reports_not_found() {
		let outcome = search(&snapshot(), "haskell");
		assert_eq!(outcome, SearchOutcome::NotFound);
		assert_eq!(outcome.message().as_deref(), Some("No matching nodes found"));
	}
}
