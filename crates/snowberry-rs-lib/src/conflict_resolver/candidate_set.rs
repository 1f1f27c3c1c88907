use std::collections::HashSet;

use serde::{Serialize, Deserialize};

use crate::profile::{Priority, Profile};
use crate::registry::AddonId;

/// An addon being considered for the current launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
	pub id: AddonId,
	pub priority: Priority,
}

/// The addons under consideration for a launch, in the caller's load order (highest priority last).
///
/// Resolution only ever removes from the set so the remaining candidates always keep their relative order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Candidate>", into = "Vec<Candidate>")]
pub struct CandidateSet {
	candidates: Vec<Candidate>,
}

impl CandidateSet {
	/// Duplicate identifiers are dropped, keeping the first occurrence.
	pub fn new(candidates: impl IntoIterator<Item = Candidate>) -> Self {
		let mut seen = HashSet::<AddonId>::new();
		Self {
			candidates: candidates.into_iter()
				.filter(|c| seen.insert(c.id.clone()))
				.collect(),
		}
	}

	/// Every addon outranks all the addons loaded before it.
	pub fn from_load_order<I: Into<AddonId>>(ids: impl IntoIterator<Item = I>) -> Self {
		Self::new(
			ids.into_iter()
				.enumerate()
				.map(|(i, id)| Candidate { id: id.into(), priority: Priority::from_rank(i) })
		)
	}

	/// All addons share one tier, no addon overrides another.
	pub fn same_tier<I: Into<AddonId>>(ids: impl IntoIterator<Item = I>) -> Self {
		Self::new(ids.into_iter().map(|id| Candidate { id: id.into(), priority: Priority::DEFAULT }))
	}

	/// The profile's final addons with the priorities it assigns them.
	pub fn from_profile<P: Profile + ?Sized>(profile: &P) -> Self {
		Self::new(
			profile.final_addons()
				.into_iter()
				.map(|id| {
					let priority = profile.addon_priority(&id);
					Candidate { id, priority }
				})
		)
	}

	pub fn len(&self) -> usize {
		self.candidates.len()
	}

	pub fn is_empty(&self) -> bool {
		self.candidates.is_empty()
	}

	pub fn contains(&self, id: &AddonId) -> bool {
		self.candidates.iter().any(|c| &c.id == id)
	}

	pub fn priority_of(&self, id: &AddonId) -> Option<Priority> {
		self.candidates.iter().find(|c| &c.id == id).map(|c| c.priority)
	}

	/// Candidates in load order.
	pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
		self.candidates.iter()
	}

	pub fn ids(&self) -> impl Iterator<Item = &AddonId> {
		self.candidates.iter().map(|c| &c.id)
	}

	/// Candidates with the highest priority first.
	///
	/// Among equal priorities the addon loaded later comes first.
	pub fn by_priority(&self) -> Vec<&Candidate> {
		let mut ordered: Vec<_> = self.candidates.iter().rev().collect();
		ordered.sort_by(|a, b| b.priority.cmp(&a.priority));
		ordered
	}

	/// Returns `true` if the addon was in the set.
	pub fn remove(&mut self, id: &AddonId) -> bool {
		let before = self.candidates.len();
		self.candidates.retain(|c| &c.id != id);
		before != self.candidates.len()
	}

	pub fn into_ids(self) -> Vec<AddonId> {
		self.candidates.into_iter().map(|c| c.id).collect()
	}
}

/// Deserialized sets go through [`CandidateSet::new`] so they never hold an addon twice.
impl From<Vec<Candidate>> for CandidateSet {
	fn from(candidates: Vec<Candidate>) -> Self {
		Self::new(candidates)
	}
}

impl From<CandidateSet> for Vec<Candidate> {
	fn from(set: CandidateSet) -> Self {
		set.candidates
	}
}
