//! # Addon registry
//!
//! The store of every known addon. The resolver only ever borrows addons from here,
//! everything else refers to them by [`AddonId`].

use std::collections::HashMap;
use std::io::BufReader;
use std::path::Path;

mod addon;
pub use addon::Addon;
pub use addon::AddonId;
pub use addon::ExcludedValue;

#[derive(Debug, Default, Clone)]
pub struct AddonRegistry {
	addons: HashMap<AddonId, Addon>,
}

impl AddonRegistry {
	pub fn new() -> Self {
		Default::default()
	}

	/// Reads a JSON array of addons.
	///
	/// # Errors
	/// - [`IO`](crate::error::Error::IO) when opening or reading from the file.
	/// - [`SerdeJSON`](crate::error::Error::SerdeJSON) when deserializing the file.
	pub fn load_from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
		let file = std::fs::File::open(path.as_ref())?;
		let addons: Vec<Addon> = serde_json::from_reader(BufReader::new(file))?;
		log::debug!("Loaded {} addons from {}", addons.len(), path.as_ref().display());
		Ok(addons.into_iter().collect())
	}

	/// Adds an addon, replacing and returning any addon with the same identifier.
	pub fn insert(&mut self, addon: Addon) -> Option<Addon> {
		self.addons.insert(addon.id.clone(), addon)
	}

	pub fn get(&self, id: &AddonId) -> Option<&Addon> {
		self.addons.get(id)
	}

	pub fn contains(&self, id: &AddonId) -> bool {
		self.addons.contains_key(id)
	}

	pub fn len(&self) -> usize {
		self.addons.len()
	}

	pub fn is_empty(&self) -> bool {
		self.addons.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Addon> {
		self.addons.values()
	}
}

impl FromIterator<Addon> for AddonRegistry {
	fn from_iter<T: IntoIterator<Item = Addon>>(iter: T) -> Self {
		let mut registry = AddonRegistry::new();
		for addon in iter {
			registry.insert(addon);
		}
		registry
	}
}
