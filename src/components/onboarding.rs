//! One-time hints, remembered across visits.

use log::warn;
use web_sys::Storage;

pub const GRAPH_HINT_KEY: &str = "anatomy-atlas.graph-hint-shown";

pub trait HintStore {
	fn is_shown(&self, key: &str) -> bool;
	fn mark_shown(&mut self, key: &str);
}

/// Flags in `window.localStorage`. Without storage (private mode, blocked
/// cookies) every hint counts as unseen and marking is a no-op.
pub struct LocalStorageHints {
	storage: Option<Storage>,
}

impl LocalStorageHints {
	pub fn open() -> Self {
		let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
		if storage.is_none() {
			warn!("localStorage unavailable, hints will show on every visit");
		}
		Self { storage }
	}
}

impl HintStore for LocalStorageHints {
	fn is_shown(&self, key: &str) -> bool {
		self.storage
			.as_ref()
			.and_then(|s| s.get_item(key).ok().flatten())
			.is_some()
	}

	fn mark_shown(&mut self, key: &str) {
		if let Some(storage) = &self.storage {
			if storage.set_item(key, "1").is_err() {
				warn!("could not persist hint flag {key}");
			}
		}
	}
}

/// True the first time it is called for `key`.
pub fn take_hint(store: &mut impl HintStore, key: &str) -> bool {
	if store.is_shown(key) {
		return false;
	}
	store.mark_shown(key);
	true
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	#[derive(Default)]
	struct MemoryHints(HashSet<String>);

	impl HintStore for MemoryHints {
		fn is_shown(&self, key: &str) -> bool {
			self.0.contains(key)
		}

		fn mark_shown(&mut self, key: &str) {
			self.0.insert(key.to_string());
		}
	}

	#[test]
	fn hint_shows_once() {
		let mut store = MemoryHints::default();
		assert!(take_hint(&mut store, GRAPH_HINT_KEY));
		assert!(!take_hint(&mut store, GRAPH_HINT_KEY));
		assert!(take_hint(&mut store, "another-hint"));
	}
}
