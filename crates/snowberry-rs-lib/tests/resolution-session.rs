use snowberry_rs::conflict_resolver::*;
use snowberry_rs::resolution_log::{NullLog, Outcome};
use snowberry_rs::{Error, Profile};
use snowberry_rs_test_utils::*;

fn resolve(
	registry: &snowberry_rs::AddonRegistry,
	profile: &mut snowberry_rs::MemoryProfile,
	presenter: &mut ScriptedPresenter,
	log: &mut RecordingLog)
	-> snowberry_rs::Result<ResolveOutcome>
{
	let candidates = CandidateSet::from_profile(&*profile);
	resolve_addon_conflicts(registry, profile, candidates, presenter, log, None)
}

#[test]
fn select_provider() {
	let registry = registry([addon("c").provides("y"), addon("d").provides("y")]);
	let mut profile = profile_with(&["c", "d"]);
	let mut presenter = ScriptedPresenter::new([Decision::Select(Some(id("c")))]);
	let mut log = RecordingLog::default();

	let outcome = resolve(&registry, &mut profile, &mut presenter, &mut log).unwrap();

	match outcome {
		ResolveOutcome::Resolved(candidates) => assert_eq!(ids(&candidates), vec!["c"]),
		ResolveOutcome::LaunchAborted => panic!("launch should not be aborted"),
	}
	assert_eq!(profile.excluded_addons(), &[id("d")]);
	assert_eq!(log.entries.len(), 1);
	assert_eq!(log.entries[0].outcome, Outcome::Excluded { excluded: vec![id("d")] });
}

#[test]
fn acknowledge_missing_requirements() {
	let registry = registry([addon("e").requires("z")]);
	let mut profile = profile_with(&["e"]);
	let mut presenter = ScriptedPresenter::new([Decision::Acknowledge]);
	let mut log = RecordingLog::default();

	let outcome = resolve(&registry, &mut profile, &mut presenter, &mut log).unwrap();

	assert_eq!(outcome, ResolveOutcome::Resolved(CandidateSet::default()));
	assert!(profile.is_excluded(&id("e")));
	assert_eq!(presenter.presented, vec![
		Conflict::MissingRequirements { addon: id("e"), missing_keys: vec!["z".into()] },
	]);
}

#[test]
fn acknowledge_value_exclusion() {
	let registry = registry([addon("a").excludes_value("renderer", "software"), addon("b")]);
	let mut profile = profile_with(&["a", "b"]);
	profile.set_value("renderer", "software");
	let mut presenter = ScriptedPresenter::new([Decision::Acknowledge]);
	let mut log = RecordingLog::default();

	let outcome = resolve(&registry, &mut profile, &mut presenter, &mut log).unwrap();

	assert_eq!(outcome, ResolveOutcome::Resolved(CandidateSet::same_tier(["b"])));
	assert_eq!(profile.final_addons(), vec![id("b")]);
}

#[test]
fn cancel_aborts_launch() {
	let registry = registry([
		addon("c").provides("y"),
		addon("d").provides("y"),
		addon("e").requires("z"),
	]);
	let mut profile = profile_with(&["c", "d", "e"]);
	let mut presenter = ScriptedPresenter::new([Decision::Cancel, Decision::Acknowledge]);
	let mut log = RecordingLog::default();

	let outcome = resolve(&registry, &mut profile, &mut presenter, &mut log).unwrap();

	assert_eq!(outcome, ResolveOutcome::LaunchAborted);
	assert_eq!(presenter.presented.len(), 1);
	assert_eq!(presenter.remaining(), 1);
	assert!(profile.excluded_addons().is_empty());
	assert_eq!(log.entries.len(), 1);
	assert_eq!(log.entries[0].outcome, Outcome::Cancelled);
}

#[test]
fn running_out_of_decisions_cancels() {
	let registry = registry([addon("e").requires("z")]);
	let mut profile = profile_with(&["e"]);
	let mut presenter = ScriptedPresenter::default();
	let mut log = RecordingLog::default();

	let outcome = resolve(&registry, &mut profile, &mut presenter, &mut log).unwrap();
	assert_eq!(outcome, ResolveOutcome::LaunchAborted);
	assert!(!profile.is_excluded(&id("e")));
}

#[test]
fn invalid_selection_is_presented_again() {
	let registry = registry([addon("c").provides("y"), addon("d").provides("y")]);
	let mut profile = profile_with(&["c", "d"]);
	let mut presenter = ScriptedPresenter::new([
		Decision::Select(None),
		Decision::Select(Some(id("nope"))),
		Decision::Acknowledge,
		Decision::Select(Some(id("d"))),
	]);
	let mut log = RecordingLog::default();

	let outcome = resolve(&registry, &mut profile, &mut presenter, &mut log).unwrap();

	assert_eq!(outcome, ResolveOutcome::Resolved(CandidateSet::same_tier(["d"])));
	assert_eq!(presenter.presented.len(), 4);
	assert_eq!(log.entries.len(), 1);
}

#[test]
fn category_exclusion_choices() {
	let registry = registry([
		addon("a").category("/gamedata/doom"),
		addon("b").category("/gamedata/heretic"),
		addon("x").excludes_category("/gamedata"),
	]);

	let mut profile = profile_with(&["a", "b", "x"]);
	let mut presenter = ScriptedPresenter::new([Decision::Choose(ExclusionChoice::DropExcluded)]);
	let outcome = resolve(&registry, &mut profile, &mut presenter, &mut RecordingLog::default()).unwrap();
	assert_eq!(outcome, ResolveOutcome::Resolved(CandidateSet::same_tier(["x"])));
	assert_eq!(profile.excluded_addons(), &[id("b"), id("a")]);

	let mut profile = profile_with(&["a", "b", "x"]);
	let mut presenter = ScriptedPresenter::new([Decision::Choose(ExclusionChoice::DropTriggering)]);
	let outcome = resolve(&registry, &mut profile, &mut presenter, &mut RecordingLog::default()).unwrap();
	assert_eq!(outcome, ResolveOutcome::Resolved(CandidateSet::same_tier(["a", "b"])));
	assert_eq!(profile.excluded_addons(), &[id("x")]);
}

#[test]
fn keyword_exclusion_choices() {
	let registry = registry([
		addon("k").excludes_keyword("music").excludes_keyword("n"),
		addon("m").provides("music"),
		addon("n"),
	]);

	let mut profile = profile_with(&["k", "m", "n"]);
	let mut presenter = ScriptedPresenter::new([Decision::Choose(ExclusionChoice::DropExcluded)]);
	let outcome = resolve(&registry, &mut profile, &mut presenter, &mut RecordingLog::default()).unwrap();
	assert_eq!(outcome, ResolveOutcome::Resolved(CandidateSet::same_tier(["k"])));

	let mut profile = profile_with(&["k", "m", "n"]);
	let mut presenter = ScriptedPresenter::new([Decision::Choose(ExclusionChoice::DropTriggering)]);
	let outcome = resolve(&registry, &mut profile, &mut presenter, &mut RecordingLog::default()).unwrap();
	assert_eq!(outcome, ResolveOutcome::Resolved(CandidateSet::same_tier(["m", "n"])));
}

#[test]
fn several_conflicts_keep_load_order() {
	let _ = env_logger::builder().is_test(true).try_init();

	let registry = registry([
		addon("a").excludes_keyword("c"),
		addon("b").requires("zz"),
		addon("c"),
		addon("d").provides("y"),
		addon("e").provides("y"),
	]);
	let load_order = ["a", "b", "c", "d", "e"];
	let mut profile = profile_with(&load_order);
	let mut presenter = ScriptedPresenter::new([
		Decision::Select(Some(id("e"))),
		Decision::Acknowledge,
		Decision::Choose(ExclusionChoice::DropTriggering),
	]);
	let mut log = RecordingLog::default();

	let outcome = resolve(&registry, &mut profile, &mut presenter, &mut log).unwrap();

	let kinds: Vec<_> = presenter.presented.iter().map(Conflict::kind).collect();
	assert_eq!(kinds, vec![ConflictKind::ProvideConflict, ConflictKind::MissingRequirements, ConflictKind::ExclusionByKeyword]);
	assert!(presenter.presented.len() <= load_order.len());

	let resolved = match outcome {
		ResolveOutcome::Resolved(candidates) => candidates,
		ResolveOutcome::LaunchAborted => panic!("launch should not be aborted"),
	};
	assert_eq!(ids(&resolved), vec!["c", "e"]);

	/* Survivors are a sub-order of the load order */
	let mut remaining = load_order.iter();
	for survivor in ids(&resolved) {
		assert!(remaining.any(|id| *id == survivor));
	}

	/* Every excluded addon is gone from both the profile and the launch */
	let excluded = log.excluded();
	assert_eq!(excluded, vec![id("d"), id("b"), id("a")]);
	for id in &excluded {
		assert!(profile.is_excluded(id));
		assert!(!profile.final_addons().contains(id));
		assert!(!resolved.contains(id));
	}
}

#[test]
fn session_state_machine() {
	let registry = registry([addon("c").provides("y"), addon("d").provides("y")]);
	let mut profile = profile_with(&["c", "d"]);
	let candidates = CandidateSet::from_profile(&profile);
	let mut log = NullLog;

	let mut session = ResolutionSession::new(&registry, &mut profile, &mut log, candidates);
	assert_eq!(session.state(), &SessionState::Idle);
	assert!(matches!(session.apply_decision(Decision::Acknowledge), Err(Error::InvalidState(_))));

	let expected = Conflict::ProvideConflict { pairs: vec![(id("c"), id("d"), "y".into())] };
	assert_eq!(session.start().unwrap(), &SessionState::AwaitingDecision(expected.clone()));
	assert!(matches!(session.start(), Err(Error::InvalidState(_))));
	assert_eq!(session.current_conflict(), Some(&expected));
	assert_eq!(session.involved_addons(), &[id("c"), id("d")]);

	/* Decisions that don't fit leave everything as it was */
	assert!(matches!(session.apply_decision(Decision::Select(None)), Err(Error::NoSelection)));
	assert!(matches!(session.apply_decision(Decision::Choose(ExclusionChoice::DropTriggering)), Err(Error::NoSelection)));
	assert_eq!(session.current_conflict(), Some(&expected));
	assert_eq!(session.candidates().len(), 2);

	assert_eq!(session.apply_decision(Decision::Select(Some(id("c")))).unwrap(), &SessionState::Resolved);
	assert!(session.involved_addons().is_empty());
	assert!(matches!(session.apply_decision(Decision::Cancel), Err(Error::InvalidState(_))));

	let outcome = session.finish().unwrap();
	assert_eq!(outcome, ResolveOutcome::Resolved(CandidateSet::same_tier(["c"])));
	assert_eq!(profile.excluded_addons(), &[id("d")]);
}

#[test]
fn finish_while_awaiting_decision() {
	let registry = registry([addon("e").requires("z")]);
	let mut profile = profile_with(&["e"]);
	let candidates = CandidateSet::from_profile(&profile);
	let mut log = NullLog;

	let mut session = ResolutionSession::new(&registry, &mut profile, &mut log, candidates);
	session.start().unwrap();
	assert!(matches!(session.finish(), Err(Error::InvalidState(_))));
}

#[test]
fn step_limit_stops_resolution() {
	let registry = registry([addon("e").requires("z")]);
	let mut profile = profile_with(&["e"]);
	let candidates = CandidateSet::from_profile(&profile);
	let mut presenter = ScriptedPresenter::new([Decision::Acknowledge]);

	let result = resolve_addon_conflicts(&registry, &mut profile, candidates, &mut presenter, &mut NullLog, Some(0));
	assert!(matches!(result, Err(Error::UnresolvableLoop { .. })));
	assert!(profile.excluded_addons().is_empty());
}

/// Fails to write anything but overrides.
struct BrokenLog;

impl snowberry_rs::resolution_log::ConflictLog for BrokenLog {
	fn record(&mut self, entry: &snowberry_rs::resolution_log::LogEntry) -> snowberry_rs::Result<()> {
		match entry.outcome {
			Outcome::Overridden { .. } => Ok(()),
			_ => Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into()),
		}
	}
}

#[test]
fn log_failure_after_exclusion_fails_session() {
	let registry = registry([addon("c").provides("y"), addon("d").provides("y")]);
	let mut profile = profile_with(&["c", "d"]);
	let candidates = CandidateSet::from_profile(&profile);
	let mut log = BrokenLog;

	let mut session = ResolutionSession::new(&registry, &mut profile, &mut log, candidates);
	session.start().unwrap();

	assert!(matches!(session.apply_decision(Decision::Select(Some(id("c")))), Err(Error::IO(_))));
	assert_eq!(session.state(), &SessionState::Failed);
	assert_eq!(session.current_conflict(), None);
	assert!(session.involved_addons().is_empty());
	assert_eq!(ids(session.candidates()), vec!["c"]);

	assert!(matches!(session.apply_decision(Decision::Select(Some(id("c")))), Err(Error::InvalidState(_))));
	assert!(matches!(session.finish(), Err(Error::InvalidState(_))));
	assert_eq!(profile.excluded_addons(), &[id("d")]);
}
