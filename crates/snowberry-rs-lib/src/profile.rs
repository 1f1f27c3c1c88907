//! Profiles select the settings and addons used for a launch.

use std::collections::HashMap;
use std::io::BufReader;
use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::registry::AddonId;

/// Load priority of an addon.
///
/// When two addons provide the same keyword the one with the higher priority overrides the other.
/// Addons with equal priority are in the same tier and have no override relationship.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(pub i32);

impl Priority {
	pub const DEFAULT: Priority = Priority(0);

	/// Priority of the addon at `index` in a load order, saturating at [`i32::MAX`].
	pub fn from_rank(index: usize) -> Self {
		Priority(i32::try_from(index).unwrap_or(i32::MAX))
	}
}

/// A configuration bundle selecting the settings and addons for a launch.
///
/// The conflict resolver only reads from a profile, except through [`exclude_addon()`](Profile::exclude_addon()).
pub trait Profile {
	/// Current value of a setting, `None` when the setting isn't set.
	fn value(&self, setting: &str) -> Option<String>;

	/// Addons in effective use, in load order.
	fn final_addons(&self) -> Vec<AddonId>;

	fn addon_priority(&self, _id: &AddonId) -> Priority {
		Priority::DEFAULT
	}

	/// Marks the addon as "do not use". Excluding an addon twice has no further effect.
	fn exclude_addon(&mut self, id: &AddonId);
}

/// A [`Profile`] held entirely in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryProfile {
	pub name: String,
	#[serde(default)]
	addons: Vec<AddonId>,
	#[serde(default)]
	priorities: HashMap<AddonId, Priority>,
	#[serde(default)]
	values: HashMap<String, String>,
	#[serde(default)]
	excluded: Vec<AddonId>,
}

impl MemoryProfile {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Default::default()
		}
	}

	/// Reads a profile from a JSON file.
	///
	/// # Errors
	/// - [`IO`](crate::error::Error::IO) when opening or reading from the file.
	/// - [`SerdeJSON`](crate::error::Error::SerdeJSON) when deserializing the file.
	pub fn load_from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
		let file = std::fs::File::open(path)?;
		Ok(serde_json::from_reader(BufReader::new(file))?)
	}

	/// Appends the addon to the load order. Clears any previous exclusion.
	pub fn use_addon(&mut self, id: impl Into<AddonId>) {
		let id = id.into();
		self.excluded.retain(|e| e != &id);
		if !self.addons.contains(&id) {
			self.addons.push(id);
		}
	}

	pub fn set_priority(&mut self, id: impl Into<AddonId>, priority: Priority) {
		self.priorities.insert(id.into(), priority);
	}

	pub fn set_value(&mut self, setting: impl Into<String>, value: impl Into<String>) {
		self.values.insert(setting.into(), value.into());
	}

	pub fn is_excluded(&self, id: &AddonId) -> bool {
		self.excluded.contains(id)
	}

	/// Addons marked "do not use", in the order they were excluded.
	pub fn excluded_addons(&self) -> &[AddonId] {
		&self.excluded
	}
}

impl Profile for MemoryProfile {
	fn value(&self, setting: &str) -> Option<String> {
		self.values.get(setting).cloned()
	}

	fn final_addons(&self) -> Vec<AddonId> {
		self.addons.iter()
			.filter(|id| !self.excluded.contains(id))
			.cloned()
			.collect()
	}

	fn addon_priority(&self, id: &AddonId) -> Priority {
		self.priorities.get(id).copied().unwrap_or_default()
	}

	fn exclude_addon(&mut self, id: &AddonId) {
		if !self.excluded.contains(id) {
			log::trace!("Profile {} no longer uses addon {}", self.name, id);
			self.excluded.push(id.clone());
		}
	}
}
