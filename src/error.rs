//! Error types shared by the fetch, mutation and export paths.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Result alias using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

/// Everything that can go wrong between a user action and its toast.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
	/// The request never produced a response (offline, CORS, aborted).
	#[error("network error: {0}")]
	Transport(String),

	/// The backend answered with a non-2xx status.
	#[error("server returned HTTP {status}")]
	Status { status: u16 },

	/// The response body could not be decoded.
	#[error("invalid response: {0}")]
	Decode(String),

	/// A DOM element the action depends on is missing.
	#[error("missing element: {0}")]
	MissingElement(&'static str),

	/// No graph has been rendered yet.
	#[error("no graph to export")]
	NoScene,

	/// The canvas or PDF library failed while exporting.
	#[error("export failed: {0}")]
	Export(String),

	/// `localStorage` is unavailable (private mode, sandboxed iframe).
	#[error("storage unavailable")]
	StorageUnavailable,
}

impl AppError {
	/// Wrap a JavaScript exception raised during export.
	pub fn export(err: JsValue) -> Self {
		Self::Export(js_message(&err))
	}
}

impl From<gloo_net::Error> for AppError {
	fn from(err: gloo_net::Error) -> Self {
		match err {
			gloo_net::Error::SerdeError(e) => Self::Decode(e.to_string()),
			other => Self::Transport(other.to_string()),
		}
	}
}

impl From<serde_json::Error> for AppError {
	fn from(err: serde_json::Error) -> Self {
		Self::Decode(err.to_string())
	}
}

/// Best-effort human readable text for a thrown JS value.
pub fn js_message(value: &JsValue) -> String {
	value
		.as_string()
		.or_else(|| {
			js_sys::Reflect::get(value, &JsValue::from_str("message"))
				.ok()
				.and_then(|m| m.as_string())
		})
		.unwrap_or_else(|| format!("{value:?}"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_message_names_the_code() {
		let err = AppError::Status { status: 404 };
		assert_eq!(err.to_string(), "server returned HTTP 404");
	}

	#[test]
	fn json_errors_become_decode_errors() {
		let err: AppError = serde_json::from_str::<u32>("nope").unwrap_err().into();
		assert!(matches!(err, AppError::Decode(_)));
	}
}
