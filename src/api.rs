//! REST client for the Rekno backend.
//!
//! Every call is judged solely by HTTP success; only `GET /graph` has a body
//! worth decoding.

use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder, Response};
use log::debug;

use crate::components::graph::types::{EditNode, GraphSnapshot, NodeForm, parse_snapshot};
use crate::error::{AppError, Result};

/// HTTP verbs used by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
	/// GET request.
	Get,
	/// POST request.
	Post,
	/// DELETE request.
	Delete,
}

/// One backend route with its query parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint<'a> {
	/// `GET /graph`: the whole snapshot.
	Graph,
	/// `POST /addNode` with a flat JSON node.
	AddNode,
	/// `POST /editNode` with id, title and description.
	EditNode,
	/// `DELETE /deleteNode?id=`.
	DeleteNode { id: &'a str },
	/// `POST /reinforce?id=&target=`.
	Reinforce { from: &'a str, to: &'a str },
	/// `POST /decay`: weakens every connection.
	Decay,
	/// `GET /save`: persists the graph server-side.
	Save,
}

impl<'a> Endpoint<'a> {
	/// HTTP verb of the route.
	pub fn method(&self) -> Method {
		match self {
			Self::Graph | Self::Save => Method::Get,
			Self::DeleteNode { .. } => Method::Delete,
			Self::AddNode | Self::EditNode | Self::Reinforce { .. } | Self::Decay => Method::Post,
		}
	}

	/// Path relative to the API base.
	pub fn path(&self) -> &'static str {
		match self {
			Self::Graph => "/graph",
			Self::AddNode => "/addNode",
			Self::EditNode => "/editNode",
			Self::DeleteNode { .. } => "/deleteNode",
			Self::Reinforce { .. } => "/reinforce",
			Self::Decay => "/decay",
			Self::Save => "/save",
		}
	}

	/// Query parameters, empty for routes without any.
	pub fn query(&self) -> Vec<(&'static str, &'a str)> {
		match *self {
			Self::DeleteNode { id } => vec![("id", id)],
			Self::Reinforce { from, to } => vec![("id", from), ("target", to)],
			_ => Vec::new(),
		}
	}
}

/// Operations the UI performs against the graph store.
#[async_trait(?Send)]
pub trait GraphBackend {
	/// Current graph snapshot.
	async fn fetch_graph(&self) -> Result<GraphSnapshot>;
	/// Create a node, optionally linked from a parent.
	async fn add_node(&self, form: &NodeForm) -> Result<()>;
	/// Overwrite a node's title and description.
	async fn edit_node(&self, edit: &EditNode) -> Result<()>;
	/// Remove a node and every connection pointing at it.
	async fn delete_node(&self, id: &str) -> Result<()>;
	/// Strengthen the connection `from -> to`.
	async fn reinforce(&self, from: &str, to: &str) -> Result<()>;
	/// Weaken every connection.
	async fn decay(&self) -> Result<()>;
	/// Persist the graph.
	async fn save(&self) -> Result<()>;
}

/// [`GraphBackend`] over `fetch`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HttpBackend {
	base: String,
}

impl HttpBackend {
	/// `base` is prefixed to every path; empty means same origin.
	pub fn new(base: impl Into<String>) -> Self {
		let base = base.into();
		Self {
			base: base.trim_end_matches('/').to_string(),
		}
	}

	/// Absolute URL of `endpoint`, without the query string.
	pub fn url(&self, endpoint: &Endpoint<'_>) -> String {
		format!("{}{}", self.base, endpoint.path())
	}

	fn request(&self, endpoint: &Endpoint<'_>) -> RequestBuilder {
		let url = self.url(endpoint);
		let builder = match endpoint.method() {
			Method::Get => Request::get(&url),
			Method::Post => Request::post(&url),
			Method::Delete => Request::delete(&url),
		};
		let query = endpoint.query();
		if query.is_empty() {
			builder
		} else {
			builder.query(query)
		}
	}

	async fn send(&self, endpoint: Endpoint<'_>) -> Result<Response> {
		debug!("rekno: {:?} {}", endpoint.method(), endpoint.path());
		checked(self.request(&endpoint).send().await?)
	}

	async fn send_json<T: serde::Serialize>(&self, endpoint: Endpoint<'_>, body: &T) -> Result<Response> {
		debug!("rekno: {:?} {}", endpoint.method(), endpoint.path());
		checked(self.request(&endpoint).json(body)?.send().await?)
	}
}

fn checked(response: Response) -> Result<Response> {
	if response.ok() {
		Ok(response)
	} else {
		Err(AppError::Status {
			status: response.status(),
		})
	}
}

#[async_trait(?Send)]
impl GraphBackend for HttpBackend {
	async fn fetch_graph(&self) -> Result<GraphSnapshot> {
		let body = self.send(Endpoint::Graph).await?.text().await?;
		Ok(parse_snapshot(&body)?)
	}

	async fn add_node(&self, form: &NodeForm) -> Result<()> {
		self.send_json(Endpoint::AddNode, &form.to_payload()).await?;
		Ok(())
	}

	async fn edit_node(&self, edit: &EditNode) -> Result<()> {
		self.send_json(Endpoint::EditNode, edit).await?;
		Ok(())
	}

	async fn delete_node(&self, id: &str) -> Result<()> {
		self.send(Endpoint::DeleteNode { id }).await?;
		Ok(())
	}

	async fn reinforce(&self, from: &str, to: &str) -> Result<()> {
		self.send(Endpoint::Reinforce { from, to }).await?;
		Ok(())
	}

	async fn decay(&self) -> Result<()> {
		self.send(Endpoint::Decay).await?;
		Ok(())
	}

	async fn save(&self) -> Result<()> {
		self.send(Endpoint::Save).await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn routes_match_backend() {
		let routes = [
			(Endpoint::Graph, Method::Get, "/graph"),
			(Endpoint::AddNode, Method::Post, "/addNode"),
			(Endpoint::EditNode, Method::Post, "/editNode"),
			(Endpoint::DeleteNode { id: "x" }, Method::Delete, "/deleteNode"),
			(Endpoint::Reinforce { from: "a", to: "b" }, Method::Post, "/reinforce"),
			(Endpoint::Decay, Method::Post, "/decay"),
			(Endpoint::Save, Method::Get, "/save"),
		];
		for (endpoint, method, path) in routes {
			assert_eq!(endpoint.method(), method, "{endpoint:?}");
			assert_eq!(endpoint.path(), path);
		}
	}

	#[test]
	fn query_parameters() {
		assert_eq!(Endpoint::DeleteNode { id: "n1" }.query(), vec![("id", "n1")]);
		assert_eq!(
			Endpoint::Reinforce { from: "a", to: "b" }.query(),
			vec![("id", "a"), ("target", "b")]
		);
		assert!(Endpoint::Decay.query().is_empty());
	}

	#[test]
	fn base_is_prefixed_without_double_slash() {
		assert_eq!(HttpBackend::default().url(&Endpoint::Graph), "/graph");
		assert_eq!(
			HttpBackend::new("http://localhost:8080/").url(&Endpoint::Save),
			"http://localhost:8080/save"
		);
	}
}
