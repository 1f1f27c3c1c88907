//! Finding and resolving conflicts between the addons selected for a launch.
//!
//! # Usage
//! 1. Build a [`CandidateSet`] from the addons to be loaded, usually with [`CandidateSet::from_profile()`].
//! 1. [`resolve_addon_conflicts()`] with a [`Presenter`] to ask the user about each conflict.
//! 1. Launch with the candidates from [`ResolveOutcome::Resolved`], or don't launch at all on [`ResolveOutcome::LaunchAborted`].
//!
//! Overrides are resolved without asking: when addons of different priority provide the same keyword
//! the lower priority ones are simply not loaded. Every other [`Conflict`] is presented, one at a time,
//! through a [`ResolutionSession`].

mod candidate_set;
pub use candidate_set::Candidate;
pub use candidate_set::CandidateSet;

mod conflict;
pub use conflict::Conflict;
pub use conflict::ConflictKind;

pub mod detection;
pub use detection::find_conflicts;

pub mod overrides;
pub use overrides::get_next_problem;

pub mod session;
pub use session::Decision;
pub use session::ExclusionChoice;
pub use session::Presenter;
pub use session::ResolutionSession;
pub use session::SessionState;

use crate::profile::Profile;
use crate::registry::AddonRegistry;
use crate::resolution_log::ConflictLog;

/// The end result of resolving a launch's conflicts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
	/// Conflict free candidates, in the caller's load order.
	Resolved(CandidateSet),
	/// The user cancelled. Nothing should be launched.
	LaunchAborted,
}

/// Runs a [`ResolutionSession`] to completion, asking `presenter` for every decision.
///
/// Decisions that don't resolve the conflict are presented again.
///
/// # Parameters
/// - `step_limit` - overrides the session's default limit on accepted decisions.
/// # Errors
/// - [`UnresolvableLoop`](crate::Error::UnresolvableLoop) if resolving a conflict doesn't make it go away.
/// - Errors from writing to `log`.
pub fn resolve_addon_conflicts<P, L, Pr>(
	registry: &AddonRegistry,
	profile: &mut P,
	candidates: CandidateSet,
	presenter: &mut Pr,
	log: &mut L,
	step_limit: Option<usize>)
	-> crate::Result<ResolveOutcome>
where
	P: Profile + ?Sized,
	L: ConflictLog + ?Sized,
	Pr: Presenter + ?Sized,
{
	let mut session = ResolutionSession::new(registry, profile, log, candidates);
	if let Some(limit) = step_limit {
		session = session.with_step_limit(limit);
	}

	session.start()?;

	while let SessionState::AwaitingDecision(conflict) = session.state() {
		let decision = presenter.present(conflict);
		match session.apply_decision(decision) {
			Ok(_) => {},
			Err(crate::Error::NoSelection) => log::debug!("Nothing selected, presenting the conflict again."),
			Err(e) => return Err(e),
		}
	}

	session.finish()
}
