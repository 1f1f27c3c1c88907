use serde::{Serialize, Deserialize};

/// A unique identifier for addons.
///
/// Mainly used as an index into [`crate::AddonRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddonId(String);

impl AddonId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for AddonId {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}

impl From<String> for AddonId {
	fn from(value: String) -> Self {
		Self(value)
	}
}

impl AsRef<str> for AddonId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for AddonId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

/// A setting value an addon can't be loaded with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedValue {
	pub setting: String,
	pub value: String,
}

impl std::fmt::Display for ExcludedValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}={}", self.setting, self.value)
	}
}

/// The parts of an addon's metadata the conflict resolver cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addon {
	pub id: AddonId,
	/// Slash separated category path, e.g. `/gamedata/doom/maps`.
	#[serde(default)]
	pub category: String,
	/// Keywords provided in addition to the identifier.
	#[serde(default)]
	pub provides: Vec<String>,
	/// Keywords some other loaded addon has to provide.
	#[serde(default)]
	pub requires: Vec<String>,
	/// No addon in these categories can be loaded alongside this one.
	#[serde(default)]
	pub excludes_categories: Vec<String>,
	/// No addon providing these keywords can be loaded alongside this one.
	#[serde(default)]
	pub excludes_keywords: Vec<String>,
	#[serde(default)]
	pub excludes_values: Vec<ExcludedValue>,
}

impl Addon {
	pub fn new(id: impl Into<AddonId>) -> Self {
		Self {
			id: id.into(),
			category: String::new(),
			provides: Vec::new(),
			requires: Vec::new(),
			excludes_categories: Vec::new(),
			excludes_keywords: Vec::new(),
			excludes_values: Vec::new(),
		}
	}

	/// Every keyword this addon provides, starting with its own identifier.
	pub fn provided_keys(&self) -> impl Iterator<Item = &str> {
		let id = self.id.as_str();
		std::iter::once(id).chain(self.provides.iter().map(String::as_str).filter(move |k| *k != id))
	}

	pub fn provides_key(&self, key: &str) -> bool {
		self.provided_keys().any(|k| k == key)
	}

	/// An addon is in a category if its own category is the same path or nested under it.
	pub fn is_in_category(&self, category: &str) -> bool {
		let category = category.trim_end_matches('/');
		if category.is_empty() {
			return !self.category.is_empty()
		}
		match self.category.strip_prefix(category) {
			Some(rest) => rest.is_empty() || rest.starts_with('/'),
			None => false,
		}
	}
}
