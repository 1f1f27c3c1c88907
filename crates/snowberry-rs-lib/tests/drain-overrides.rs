use snowberry_rs::conflict_resolver::*;
use snowberry_rs::conflict_resolver::overrides::drain_overrides;
use snowberry_rs::resolution_log::{NullLog, Outcome};
use snowberry_rs::MemoryProfile;
use snowberry_rs_test_utils::*;

#[test]
fn drain_drops_losers() {
	let registry = registry([addon("a").provides("x"), addon("b").provides("x")]);
	let mut candidates = CandidateSet::from_load_order(["a", "b"]);

	let conflicts = find_conflicts(&registry, &candidates, &MemoryProfile::default());
	let removed = drain_overrides(&conflicts, &mut candidates, &mut NullLog).unwrap();

	assert_eq!(removed, vec![id("a")]);
	assert_eq!(ids(&candidates), vec!["b"]);
}

#[test]
fn drain_is_idempotent() {
	let registry = registry([
		addon("a").provides("x"),
		addon("b").provides("x"),
		addon("c").provides("y"),
		addon("d").provides("y"),
	]);
	let mut candidates = CandidateSet::from_load_order(["a", "b", "c", "d"]);
	let profile = MemoryProfile::default();

	let conflicts = find_conflicts(&registry, &candidates, &profile);
	drain_overrides(&conflicts, &mut candidates, &mut NullLog).unwrap();
	let drained = candidates.clone();

	/* Draining the same conflicts again finds nothing left to remove */
	assert!(drain_overrides(&conflicts, &mut candidates, &mut NullLog).unwrap().is_empty());
	assert_eq!(candidates, drained);

	/* Neither does a fresh detection pass */
	let conflicts = find_conflicts(&registry, &candidates, &profile);
	assert!(!conflicts.iter().any(Conflict::is_override));
	assert!(drain_overrides(&conflicts, &mut candidates, &mut NullLog).unwrap().is_empty());
	assert_eq!(candidates, drained);
}

#[test]
fn drain_never_removes_non_losers() {
	let registry = registry([
		addon("low").provides("x"),
		addon("e").requires("z"),
		addon("k").excludes_keyword("m"),
		addon("m"),
		addon("high").provides("x"),
	]);
	let mut candidates = CandidateSet::from_load_order(["low", "e", "k", "m", "high"]);

	let conflicts = find_conflicts(&registry, &candidates, &MemoryProfile::default());
	assert!(conflicts.len() > 1);
	let removed = drain_overrides(&conflicts, &mut candidates, &mut NullLog).unwrap();

	assert_eq!(removed, vec![id("low")]);
	assert_eq!(ids(&candidates), vec!["e", "k", "m", "high"]);
}

#[test]
fn next_problem_skips_overrides() {
	let registry = registry([
		addon("l").provides("x"),
		addon("h").provides("x"),
		addon("e").requires("z"),
	]);
	let mut profile = profile_with(&["l", "h", "e"]);
	profile.set_priority("h", snowberry_rs::Priority(1));
	let mut candidates = CandidateSet::from_profile(&profile);
	let mut log = RecordingLog::default();

	let next = get_next_problem(&registry, &mut candidates, &profile, &mut log).unwrap();

	assert_eq!(next, Some(Conflict::MissingRequirements { addon: id("e"), missing_keys: vec!["z".into()] }));
	assert_eq!(ids(&candidates), vec!["h", "e"]);
	assert_eq!(log.entries.len(), 1);
	assert_eq!(log.entries[0].outcome, Outcome::Overridden { winner: id("h"), not_loaded: vec![id("l")] });

	/* Overridden addons are only left out of the launch */
	assert!(profile.excluded_addons().is_empty());
}

#[test]
fn next_problem_on_clean_set() {
	let registry = registry([addon("a").provides("x"), addon("b").requires("x")]);
	let mut candidates = CandidateSet::same_tier(["a", "b"]);

	let next = get_next_problem(&registry, &mut candidates, &MemoryProfile::default(), &mut NullLog).unwrap();
	assert_eq!(next, None);
	assert_eq!(candidates.len(), 2);
}
