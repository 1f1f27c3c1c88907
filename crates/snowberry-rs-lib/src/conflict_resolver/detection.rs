//! Finding every conflict in a set of candidate addons.
//!
//! Detection is read only, the same input always gives the same conflicts in the same order:
//! 1. Overrides, one per winning addon.
//! 1. Provide conflicts, one per group of same tier providers connected by shared keywords.
//! 1. For each addon, highest priority first: missing requirements, category exclusions,
//! value exclusions and keyword exclusions.

use std::collections::HashMap;

use petgraph::unionfind::UnionFind;

use crate::profile::Profile;
use crate::registry::{Addon, AddonId, AddonRegistry};
use super::{Candidate, CandidateSet, Conflict};

/// A candidate along with its registry entry.
struct Entry<'a> {
	candidate: &'a Candidate,
	addon: &'a Addon,
	/// Index in the caller's load order.
	position: usize,
}

/// Which entries provide each keyword.
///
/// Keywords are kept in order of first appearance and their providers in priority order.
struct Providers<'a> {
	keys: Vec<(&'a str, Vec<usize>)>,
	index: HashMap<&'a str, usize>,
}

impl<'a> Providers<'a> {
	fn new(entries: &[Entry<'a>]) -> Self {
		let mut keys = Vec::<(&'a str, Vec<usize>)>::new();
		let mut index = HashMap::<&'a str, usize>::new();

		for (i, entry) in entries.iter().enumerate() {
			let addon: &'a Addon = entry.addon;
			for key in addon.provided_keys() {
				let slot = *index.entry(key).or_insert_with(|| {
					keys.push((key, Vec::new()));
					keys.len() - 1
				});
				let providers = &mut keys[slot].1;
				if providers.last() != Some(&i) {
					providers.push(i);
				}
			}
		}

		Self { keys, index }
	}

	fn get(&self, key: &str) -> &[usize] {
		self.index.get(key)
			.map(|&slot| self.keys[slot].1.as_slice())
			.unwrap_or(&[])
	}
}

/// Lists every conflict between the addons in `candidates`.
///
/// Candidates missing from the registry are skipped.
pub fn find_conflicts<P: Profile + ?Sized>(registry: &AddonRegistry, candidates: &CandidateSet, profile: &P) -> Vec<Conflict> {
	let positions: HashMap<&AddonId, usize> = candidates.ids()
		.enumerate()
		.map(|(i, id)| (id, i))
		.collect();

	let entries: Vec<Entry> = candidates.by_priority()
		.into_iter()
		.filter_map(|candidate| match registry.get(&candidate.id) {
			Some(addon) => Some(Entry { candidate, addon, position: positions[&candidate.id] }),
			None => {
				log::warn!("Addon {} is not in the registry, ignoring it.", candidate.id);
				None
			},
		})
		.collect();

	let providers = Providers::new(&entries);

	let mut conflicts = find_overrides(&entries, &providers);
	conflicts.extend(find_provide_conflicts(&entries, &providers));

	for (i, entry) in entries.iter().enumerate() {
		conflicts.extend(missing_requirements(entry, &providers));
		conflicts.extend(exclusion_by_category(i, &entries));
		conflicts.extend(exclusion_by_value(entry, profile));
		conflicts.extend(exclusion_by_keyword(i, &entries, &providers));
	}

	log::trace!("Found {} conflicts among {} candidates", conflicts.len(), entries.len());
	conflicts
}

fn find_overrides(entries: &[Entry], providers: &Providers) -> Vec<Conflict> {
	let mut by_winner = Vec::<(usize, Vec<(AddonId, String)>)>::new();

	for (key, list) in &providers.keys {
		/* Providers are in priority order so the first one always has the top priority */
		let winner = match list.first() {
			Some(&i) => i,
			None => continue,
		};
		let top = entries[winner].candidate.priority;

		let losers: Vec<_> = list.iter()
			.filter(|&&i| entries[i].candidate.priority < top)
			.map(|&i| (entries[i].candidate.id.clone(), key.to_string()))
			.collect();
		if losers.is_empty() {
			continue;
		}

		match by_winner.iter_mut().find(|(w, _)| *w == winner) {
			Some((_, existing)) => existing.extend(losers),
			None => by_winner.push((winner, losers)),
		}
	}

	by_winner.sort_by_key(|(w, _)| *w);
	by_winner.into_iter()
		.map(|(w, losers)| Conflict::Override { winner: entries[w].candidate.id.clone(), losers })
		.collect()
}

fn find_provide_conflicts(entries: &[Entry], providers: &Providers) -> Vec<Conflict> {
	let mut pairs = Vec::<(usize, usize, &str)>::new();

	for (key, list) in &providers.keys {
		let top = match list.first() {
			Some(&i) => entries[i].candidate.priority,
			None => continue,
		};

		/* Lower priority providers are overrides, only the top tier can clash */
		let mut tier: Vec<usize> = list.iter()
			.copied()
			.take_while(|&i| entries[i].candidate.priority == top)
			.collect();
		tier.sort_by_key(|&i| entries[i].position);

		for (n, &a) in tier.iter().enumerate() {
			for &b in &tier[n + 1..] {
				pairs.push((a, b, *key));
			}
		}
	}

	if pairs.is_empty() {
		return Vec::new()
	}

	/* Pairs sharing an addon have to be decided together */
	let mut groups = UnionFind::<usize>::new(entries.len());
	for &(a, b, _) in &pairs {
		groups.union(a, b);
	}

	let mut conflicts = Vec::<(usize, Vec<(AddonId, AddonId, String)>)>::new();
	for (a, b, key) in pairs {
		let root = groups.find(a);
		let pair = (entries[a].candidate.id.clone(), entries[b].candidate.id.clone(), key.to_owned());
		match conflicts.iter_mut().find(|(r, _)| *r == root) {
			Some((_, group)) => group.push(pair),
			None => conflicts.push((root, vec![pair])),
		}
	}

	conflicts.into_iter()
		.map(|(_, pairs)| Conflict::ProvideConflict { pairs })
		.collect()
}

fn missing_requirements(entry: &Entry, providers: &Providers) -> Option<Conflict> {
	let mut missing_keys = Vec::<String>::new();
	for key in &entry.addon.requires {
		if providers.get(key).is_empty() && !missing_keys.contains(key) {
			missing_keys.push(key.clone());
		}
	}

	(!missing_keys.is_empty()).then(|| Conflict::MissingRequirements {
		addon: entry.candidate.id.clone(),
		missing_keys,
	})
}

fn exclusion_by_category(i: usize, entries: &[Entry]) -> Option<Conflict> {
	let addon = entries[i].addon;
	if addon.excludes_categories.is_empty() {
		return None
	}

	let excluded: Vec<AddonId> = entries.iter()
		.enumerate()
		.filter(|(j, other)| *j != i && addon.excludes_categories.iter().any(|c| other.addon.is_in_category(c)))
		.map(|(_, other)| other.candidate.id.clone())
		.collect();

	(!excluded.is_empty()).then(|| Conflict::ExclusionByCategory {
		addon: entries[i].candidate.id.clone(),
		excluded,
	})
}

fn exclusion_by_value<P: Profile + ?Sized>(entry: &Entry, profile: &P) -> Option<Conflict> {
	let conflicting_values: Vec<String> = entry.addon.excludes_values.iter()
		.filter(|v| profile.value(&v.setting).as_deref() == Some(v.value.as_str()))
		.map(ToString::to_string)
		.collect();

	(!conflicting_values.is_empty()).then(|| Conflict::ExclusionByValue {
		addon: entry.candidate.id.clone(),
		conflicting_values,
	})
}

fn exclusion_by_keyword(i: usize, entries: &[Entry], providers: &Providers) -> Option<Conflict> {
	let mut conflicts = Vec::<(AddonId, String)>::new();
	for key in &entries[i].addon.excludes_keywords {
		for &j in providers.get(key) {
			if j == i {
				continue;
			}
			let pair = (entries[j].candidate.id.clone(), key.clone());
			if !conflicts.contains(&pair) {
				conflicts.push(pair);
			}
		}
	}

	(!conflicts.is_empty()).then(|| Conflict::ExclusionByKeyword {
		addon: entries[i].candidate.id.clone(),
		conflicts,
	})
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::profile::MemoryProfile;

	#[test]
	fn repeated_provides_are_counted_once() {
		let addon = Addon { provides: vec!["x".into(), "x".into()], ..Addon::new("a") };
		let registry: AddonRegistry = [addon].into_iter().collect();
		let candidates = CandidateSet::same_tier(["a"]);
		assert!(find_conflicts(&registry, &candidates, &MemoryProfile::default()).is_empty());
	}

	#[test]
	fn unknown_candidates_are_ignored() {
		let registry: AddonRegistry = [Addon::new("a")].into_iter().collect();
		let candidates = CandidateSet::same_tier(["a", "ghost"]);
		assert!(find_conflicts(&registry, &candidates, &MemoryProfile::default()).is_empty());
	}

	#[test]
	fn self_exclusion_is_not_a_conflict() {
		let addon = Addon {
			category: "/gamedata/doom".into(),
			excludes_categories: vec!["/gamedata".into()],
			excludes_keywords: vec!["a".into()],
			..Addon::new("a")
		};
		let registry: AddonRegistry = [addon].into_iter().collect();
		let candidates = CandidateSet::same_tier(["a"]);
		assert!(find_conflicts(&registry, &candidates, &MemoryProfile::default()).is_empty());
	}
}
