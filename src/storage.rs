//! Durable client-side key/value storage.
//!
//! [`KeyValueStore`] abstracts `localStorage` so the theme store and the
//! first-visit flag can be exercised without a browser.

use std::cell::RefCell;
use std::collections::HashMap;

use log::warn;

use crate::error::{AppError, Result};

/// Minimal string key/value storage.
pub trait KeyValueStore {
	/// Value under `key`, if any.
	fn get(&self, key: &str) -> Option<String>;
	/// Store `value` under `key`.
	fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// `window.localStorage`. Entries never expire.
#[derive(Clone, Debug)]
pub struct BrowserStorage {
	inner: web_sys::Storage,
}

impl BrowserStorage {
	/// The window's localStorage.
	pub fn open() -> Result<Self> {
		let inner = web_sys::window()
			.and_then(|w| w.local_storage().ok().flatten())
			.ok_or(AppError::StorageUnavailable)?;
		Ok(Self { inner })
	}
}

impl KeyValueStore for BrowserStorage {
	fn get(&self, key: &str) -> Option<String> {
		self.inner.get_item(key).ok().flatten()
	}

	fn set(&self, key: &str, value: &str) -> Result<()> {
		self.inner
			.set_item(key, value)
			.map_err(|_| AppError::StorageUnavailable)
	}
}

/// Volatile storage, used when `localStorage` is blocked and in tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
	entries: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStorage {
	fn get(&self, key: &str) -> Option<String> {
		self.entries.borrow().get(key).cloned()
	}

	fn set(&self, key: &str, value: &str) -> Result<()> {
		self.entries
			.borrow_mut()
			.insert(key.to_string(), value.to_string());
		Ok(())
	}
}

/// Either backend, chosen once at startup.
#[derive(Debug)]
pub enum Storage {
	/// Backed by localStorage.
	Browser(BrowserStorage),
	/// In-memory fallback.
	Memory(MemoryStorage),
}

impl Storage {
	/// Prefer `localStorage`, falling back to memory so the UI keeps working.
	pub fn open_or_memory() -> Self {
		match BrowserStorage::open() {
			Ok(s) => Self::Browser(s),
			Err(e) => {
				warn!("rekno: {}, preferences will not persist", e);
				Self::Memory(MemoryStorage::default())
			}
		}
	}
}

impl KeyValueStore for Storage {
	fn get(&self, key: &str) -> Option<String> {
		match self {
			Self::Browser(s) => s.get(key),
			Self::Memory(s) => s.get(key),
		}
	}

	fn set(&self, key: &str, value: &str) -> Result<()> {
		match self {
			Self::Browser(s) => s.set(key, value),
			Self::Memory(s) => s.set(key, value),
		}
	}
}

/// "Has visited before" flag driving the onboarding dialog.
pub struct VisitFlag<'a, S: KeyValueStore> {
	store: &'a S,
	key: &'a str,
}

impl<'a, S: KeyValueStore> VisitFlag<'a, S> {
	/// Flag stored under `key`.
	pub fn new(store: &'a S, key: &'a str) -> Self {
		Self { store, key }
	}

	/// Whether the flag was ever set.
	pub fn has_visited(&self) -> bool {
		self.store.get(self.key).as_deref() == Some("true")
	}

	/// Set the flag.
	pub fn mark_visited(&self) -> Result<()> {
		self.store.set(self.key, "true")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn memory_storage_round_trips() {
		let store = MemoryStorage::default();
		assert_eq!(store.get("k"), None);
		store.set("k", "v").unwrap();
		assert_eq!(store.get("k").as_deref(), Some("v"));
	}

	#[test]
	fn visit_flag_starts_unset_and_sticks() {
		let store = MemoryStorage::default();
		let flag = VisitFlag::new(&store, "rekno-visited");
		assert!(!flag.has_visited());
		flag.mark_visited().unwrap();
		assert!(flag.has_visited());
		assert!(VisitFlag::new(&store, "rekno-visited").has_visited());
	}
}
