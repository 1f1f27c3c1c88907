use serde::{Serialize, Deserialize};

use crate::registry::AddonId;

/// An inconsistency found in a set of candidate addons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Conflict {
	/// `losers` provide a keyword also provided by the higher priority `winner`.
	///
	/// Resolved automatically by not loading the losers, never presented to the user.
	Override {
		winner: AddonId,
		losers: Vec<(AddonId, String)>,
	},
	/// Addons in the same tier provide the same keyword. Only one of them can stay.
	ProvideConflict {
		pairs: Vec<(AddonId, AddonId, String)>,
	},
	/// Nothing in the set provides these keywords required by `addon`.
	MissingRequirements {
		addon: AddonId,
		missing_keys: Vec<String>,
	},
	/// `addon` excludes a category containing the `excluded` addons.
	ExclusionByCategory {
		addon: AddonId,
		excluded: Vec<AddonId>,
	},
	/// `addon` can't be used with the current values of these settings.
	ExclusionByValue {
		addon: AddonId,
		conflicting_values: Vec<String>,
	},
	/// `addon` excludes keywords provided by other addons.
	ExclusionByKeyword {
		addon: AddonId,
		conflicts: Vec<(AddonId, String)>,
	},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
	Override,
	ProvideConflict,
	MissingRequirements,
	ExclusionByCategory,
	ExclusionByValue,
	ExclusionByKeyword,
}

impl std::fmt::Display for ConflictKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			ConflictKind::Override => "override",
			ConflictKind::ProvideConflict => "provide-conflict",
			ConflictKind::MissingRequirements => "missing-requirements",
			ConflictKind::ExclusionByCategory => "exclusion-by-category",
			ConflictKind::ExclusionByValue => "exclusion-by-value",
			ConflictKind::ExclusionByKeyword => "exclusion-by-keyword",
		})
	}
}

impl Conflict {
	pub fn kind(&self) -> ConflictKind {
		match self {
			Conflict::Override { .. } => ConflictKind::Override,
			Conflict::ProvideConflict { .. } => ConflictKind::ProvideConflict,
			Conflict::MissingRequirements { .. } => ConflictKind::MissingRequirements,
			Conflict::ExclusionByCategory { .. } => ConflictKind::ExclusionByCategory,
			Conflict::ExclusionByValue { .. } => ConflictKind::ExclusionByValue,
			Conflict::ExclusionByKeyword { .. } => ConflictKind::ExclusionByKeyword,
		}
	}

	pub fn is_override(&self) -> bool {
		matches!(self, Conflict::Override { .. })
	}

	/// The addon whose own rules caused the conflict.
	///
	/// `None` for overrides and provide conflicts which are caused by several addons at once.
	pub fn triggering_addon(&self) -> Option<&AddonId> {
		match self {
			Conflict::Override { .. } | Conflict::ProvideConflict { .. } => None,
			Conflict::MissingRequirements { addon, .. }
			| Conflict::ExclusionByCategory { addon, .. }
			| Conflict::ExclusionByValue { addon, .. }
			| Conflict::ExclusionByKeyword { addon, .. } => Some(addon),
		}
	}

	/// Every addon mentioned by the conflict, without duplicates, in order of first mention.
	///
	/// For a provide conflict this is the list the user picks the surviving provider from.
	pub fn involved_addons(&self) -> Vec<AddonId> {
		let mut involved = Vec::<AddonId>::new();
		let mut push = |id: &AddonId| {
			if !involved.contains(id) {
				involved.push(id.clone());
			}
		};

		match self {
			Conflict::Override { winner, losers } => {
				push(winner);
				losers.iter().for_each(|(a, _)| push(a));
			},
			Conflict::ProvideConflict { pairs } => {
				for (a, b, _) in pairs {
					push(a);
					push(b);
				}
			},
			Conflict::MissingRequirements { addon, .. } | Conflict::ExclusionByValue { addon, .. } => push(addon),
			Conflict::ExclusionByCategory { addon, excluded } => {
				push(addon);
				excluded.iter().for_each(&mut push);
			},
			Conflict::ExclusionByKeyword { addon, conflicts } => {
				push(addon);
				conflicts.iter().for_each(|(a, _)| push(a));
			},
		}

		involved
	}

	/// Keywords the conflict is about, without duplicates.
	///
	/// Empty for category and value exclusions.
	pub fn keys(&self) -> Vec<&str> {
		let all: Vec<&str> = match self {
			Conflict::Override { losers, .. } => losers.iter().map(|(_, k)| k.as_str()).collect(),
			Conflict::ProvideConflict { pairs } => pairs.iter().map(|(_, _, k)| k.as_str()).collect(),
			Conflict::MissingRequirements { missing_keys, .. } => missing_keys.iter().map(String::as_str).collect(),
			Conflict::ExclusionByKeyword { conflicts, .. } => conflicts.iter().map(|(_, k)| k.as_str()).collect(),
			Conflict::ExclusionByCategory { .. } | Conflict::ExclusionByValue { .. } => Vec::new(),
		};

		let mut keys = Vec::<&str>::with_capacity(all.len());
		for key in all {
			if !keys.contains(&key) {
				keys.push(key);
			}
		}
		keys
	}
}

impl std::fmt::Display for Conflict {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let involved = self.involved_addons()
			.iter()
			.map(AddonId::as_str)
			.collect::<Vec<_>>()
			.join(", ");
		write!(f, "{} [{}]", self.kind(), involved)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn provide_conflict_involves_union_of_pairs() {
		let conflict = Conflict::ProvideConflict {
			pairs: vec![
				("a".into(), "b".into(), "x".into()),
				("b".into(), "c".into(), "y".into()),
				("a".into(), "c".into(), "x".into()),
			],
		};
		assert_eq!(conflict.involved_addons(), vec![AddonId::from("a"), "b".into(), "c".into()]);
		assert_eq!(conflict.keys(), vec!["x", "y"]);
	}

	#[test]
	fn triggering_addon_only_for_single_addon_rules() {
		let missing = Conflict::MissingRequirements { addon: "e".into(), missing_keys: vec!["z".into()] };
		assert_eq!(missing.triggering_addon(), Some(&AddonId::from("e")));

		let keyword = Conflict::ExclusionByKeyword { addon: "k".into(), conflicts: vec![("m".into(), "music".into())] };
		assert_eq!(keyword.triggering_addon(), Some(&AddonId::from("k")));

		let provided = Conflict::ProvideConflict { pairs: vec![("c".into(), "d".into(), "y".into())] };
		assert_eq!(provided.triggering_addon(), None);
	}

	#[test]
	fn display_names_kind_and_addons() {
		let conflict = Conflict::ExclusionByCategory { addon: "a".into(), excluded: vec!["b".into(), "c".into()] };
		assert_eq!(conflict.to_string(), "exclusion-by-category [a, b, c]");
	}

	#[test]
	fn serializes_with_kebab_case_tag() {
		let conflict = Conflict::MissingRequirements { addon: "e".into(), missing_keys: vec!["z".into()] };
		let json = serde_json::to_value(&conflict).unwrap();
		assert_eq!(json["kind"], "missing-requirements");
		assert_eq!(json["addon"], "e");
	}
}
