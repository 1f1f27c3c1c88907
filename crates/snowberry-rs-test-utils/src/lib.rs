//! Various helper functions for testing
//!
//! functions in this module should use results and not use any panics to avoid confusion in callers

use std::collections::VecDeque;

use snowberry_rs::conflict_resolver::{CandidateSet, Conflict, Decision, Presenter};
use snowberry_rs::registry::ExcludedValue;
use snowberry_rs::resolution_log::{ConflictLog, LogEntry};
use snowberry_rs::{Addon, AddonId, AddonRegistry, MemoryProfile, Priority};

/// Shorthand for building an [`Addon`].
pub fn addon(id: &str) -> AddonBuilder {
	AddonBuilder { addon: Addon::new(id) }
}

pub struct AddonBuilder {
	addon: Addon,
}

impl AddonBuilder {
	pub fn category(mut self, category: &str) -> Self {
		self.addon.category = category.to_owned();
		self
	}

	pub fn provides(mut self, key: &str) -> Self {
		self.addon.provides.push(key.to_owned());
		self
	}

	pub fn requires(mut self, key: &str) -> Self {
		self.addon.requires.push(key.to_owned());
		self
	}

	pub fn excludes_category(mut self, category: &str) -> Self {
		self.addon.excludes_categories.push(category.to_owned());
		self
	}

	pub fn excludes_keyword(mut self, key: &str) -> Self {
		self.addon.excludes_keywords.push(key.to_owned());
		self
	}

	pub fn excludes_value(mut self, setting: &str, value: &str) -> Self {
		self.addon.excludes_values.push(ExcludedValue { setting: setting.to_owned(), value: value.to_owned() });
		self
	}

	pub fn build(self) -> Addon {
		self.addon
	}
}

pub fn registry(addons: impl IntoIterator<Item = AddonBuilder>) -> AddonRegistry {
	addons.into_iter().map(AddonBuilder::build).collect()
}

/// A profile using `ids` in load order, all at the default priority.
pub fn profile_with(ids: &[&str]) -> MemoryProfile {
	let mut profile = MemoryProfile::new("test");
	for id in ids {
		profile.use_addon(*id);
	}
	profile
}

/// A profile using `addons` in load order at the given priorities.
pub fn ranked_profile(addons: &[(&str, i32)]) -> MemoryProfile {
	let mut profile = MemoryProfile::new("test");
	for (id, priority) in addons {
		profile.use_addon(*id);
		profile.set_priority(*id, Priority(*priority));
	}
	profile
}

/// Identifiers of the candidates in load order.
pub fn ids(candidates: &CandidateSet) -> Vec<String> {
	candidates.ids().map(|id| id.to_string()).collect()
}

pub fn id(id: &str) -> AddonId {
	AddonId::from(id)
}

/// Answers conflicts with queued decisions, cancelling once the queue runs out.
#[derive(Debug, Default)]
pub struct ScriptedPresenter {
	decisions: VecDeque<Decision>,
	/// Every conflict presented, in order.
	pub presented: Vec<Conflict>,
}

impl ScriptedPresenter {
	pub fn new(decisions: impl IntoIterator<Item = Decision>) -> Self {
		Self {
			decisions: decisions.into_iter().collect(),
			presented: Vec::new(),
		}
	}

	pub fn remaining(&self) -> usize {
		self.decisions.len()
	}
}

impl Presenter for ScriptedPresenter {
	fn present(&mut self, conflict: &Conflict) -> Decision {
		self.presented.push(conflict.clone());
		self.decisions.pop_front().unwrap_or(Decision::Cancel)
	}
}

/// Keeps everything written to it.
#[derive(Debug, Default)]
pub struct RecordingLog {
	pub load_order: Option<Vec<AddonId>>,
	pub entries: Vec<LogEntry>,
	pub resolved: Option<Vec<AddonId>>,
}

impl RecordingLog {
	/// Every addon excluded from the profile across all entries.
	pub fn excluded(&self) -> Vec<AddonId> {
		self.entries.iter().flat_map(|e| e.excluded().iter().cloned()).collect()
	}
}

impl ConflictLog for RecordingLog {
	fn begin(&mut self, load_order: &[AddonId]) -> snowberry_rs::Result<()> {
		self.load_order = Some(load_order.to_vec());
		Ok(())
	}

	fn record(&mut self, entry: &LogEntry) -> snowberry_rs::Result<()> {
		self.entries.push(entry.clone());
		Ok(())
	}

	fn finish(&mut self, resolved: &[AddonId]) -> snowberry_rs::Result<()> {
		self.resolved = Some(resolved.to_vec());
		Ok(())
	}
}

/// A config whose runtime directory is a fresh temporary directory.
///
/// The directory is removed when the returned [`tempfile::TempDir`] is dropped.
pub fn temp_config() -> std::io::Result<(tempfile::TempDir, snowberry_rs::Config)> {
	let dir = tempfile::tempdir()?;
	let mut config = snowberry_rs::Config::default();
	if !config.set_runtime_dir(dir.path().to_path_buf()) {
		return Err(std::io::Error::new(std::io::ErrorKind::NotFound, "temporary directory missing"))
	}
	Ok((dir, config))
}
