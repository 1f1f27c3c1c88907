use crate::profile::Profile;
use crate::registry::{AddonId, AddonRegistry};
use crate::resolution_log::{ConflictLog, LogEntry, Outcome};
use super::{overrides, CandidateSet, Conflict, ResolveOutcome};

/// Which side of an exclusion conflict to drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionChoice {
	/// Keep the triggering addon, stop using the addons it excludes.
	DropExcluded,
	/// Stop using the triggering addon.
	DropTriggering,
}

impl ExclusionChoice {
	/// Maps a presented option index to a choice, `0` being [`DropExcluded`](ExclusionChoice::DropExcluded).
	pub fn from_index(index: usize) -> Option<Self> {
		match index {
			0 => Some(ExclusionChoice::DropExcluded),
			1 => Some(ExclusionChoice::DropTriggering),
			_ => None,
		}
	}
}

/// The user's answer to a presented conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
	/// Keep this provider of a [`ProvideConflict`](Conflict::ProvideConflict). `None` when nothing was selected.
	Select(Option<AddonId>),
	/// Resolve an exclusion by category or keyword.
	Choose(ExclusionChoice),
	/// Accept the only resolution of a missing requirement or value exclusion.
	Acknowledge,
	/// Abort the launch.
	Cancel,
}

/// Shows a conflict to the user and waits for their decision.
///
/// This is the only place the resolver waits on the outside world.
pub trait Presenter {
	fn present(&mut self, conflict: &Conflict) -> Decision;
}

impl<T: Presenter + ?Sized> Presenter for &mut T {
	fn present(&mut self, conflict: &Conflict) -> Decision {
		(**self).present(conflict)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
	/// Nothing has been checked yet.
	Idle,
	/// `Conflict` has to be decided before the resolve can continue.
	AwaitingDecision(Conflict),
	/// No conflicts are left, the candidates can be launched.
	Resolved,
	/// The user cancelled. The candidates are left partially resolved and must not be launched.
	Cancelled,
	/// Resolution stopped on an error. The candidates may be partially resolved and must not be launched.
	Failed,
}

/// Resolves the conflicts in a set of candidates one decision at a time.
///
/// # Usage
/// 1. [`ResolutionSession::new()`] with the candidates to check.
/// 1. [`ResolutionSession::start()`] to drain overrides and find the first conflict.
/// 1. While the state is [`SessionState::AwaitingDecision`] present the conflict and pass the answer to
/// [`ResolutionSession::apply_decision()`]. An [`Error::NoSelection`](crate::Error::NoSelection) means the conflict should be presented again.
/// 1. [`ResolutionSession::finish()`] to get the [`ResolveOutcome`].
///
/// [`resolve_addon_conflicts()`](super::resolve_addon_conflicts()) does all of this with a [`Presenter`].
pub struct ResolutionSession<'a, P: Profile + ?Sized, L: ConflictLog + ?Sized> {
	registry: &'a AddonRegistry,
	profile: &'a mut P,
	log: &'a mut L,

	candidates: CandidateSet,
	state: SessionState,

	/// Addons involved in the conflict awaiting a decision.
	involved: Vec<AddonId>,

	steps: usize,
	step_limit: usize,
}

impl<'a, P: Profile + ?Sized, L: ConflictLog + ?Sized> ResolutionSession<'a, P, L> {
	/// The step limit defaults to one more than the number of candidates, every accepted decision removes at least one.
	pub fn new(registry: &'a AddonRegistry, profile: &'a mut P, log: &'a mut L, candidates: CandidateSet) -> Self {
		let step_limit = candidates.len() + 1;
		Self {
			registry,
			profile,
			log,
			candidates,
			state: SessionState::Idle,
			involved: Vec::new(),
			steps: 0,
			step_limit,
		}
	}

	/// Maximum number of decisions that may be accepted before the session gives up.
	pub fn with_step_limit(mut self, step_limit: usize) -> Self {
		self.step_limit = step_limit;
		self
	}

	pub fn state(&self) -> &SessionState {
		&self.state
	}

	pub fn current_conflict(&self) -> Option<&Conflict> {
		if let SessionState::AwaitingDecision(conflict) = &self.state {
			Some(conflict)
		} else {
			None
		}
	}

	/// Addons the current conflict is about. For a provide conflict these are the providers to pick from.
	pub fn involved_addons(&self) -> &[AddonId] {
		&self.involved
	}

	pub fn candidates(&self) -> &CandidateSet {
		&self.candidates
	}

	/// Drains the overrides and looks for the first conflict.
	///
	/// # Errors
	/// - [`InvalidState`](crate::Error::InvalidState) if the session was already started.
	/// - [`UnresolvableLoop`](crate::Error::UnresolvableLoop) from override draining.
	pub fn start(&mut self) -> crate::Result<&SessionState> {
		if self.state != SessionState::Idle {
			return Err(crate::Error::InvalidState("already started"))
		}
		log::debug!("Starting conflict resolution for {} candidates", self.candidates.len());
		if let Err(e) = self.advance() {
			self.fail();
			return Err(e)
		}
		Ok(&self.state)
	}

	/// Applies the decision to the conflict awaiting one, then looks for the next conflict.
	///
	/// # Errors
	/// - [`NoSelection`](crate::Error::NoSelection) when the decision doesn't fit the conflict. Nothing changes, ask again.
	/// - [`InvalidState`](crate::Error::InvalidState) when no conflict is awaiting a decision.
	/// - [`UnresolvableLoop`](crate::Error::UnresolvableLoop) when the conflict persists after being resolved
	/// or the step limit is reached.
	///
	/// Errors raised after the decision was applied leave the session [`Failed`](SessionState::Failed).
	pub fn apply_decision(&mut self, decision: Decision) -> crate::Result<&SessionState> {
		let conflict = match &self.state {
			SessionState::AwaitingDecision(conflict) => conflict.clone(),
			SessionState::Idle => return Err(crate::Error::InvalidState("not started")),
			SessionState::Resolved | SessionState::Cancelled => return Err(crate::Error::InvalidState("finished")),
			SessionState::Failed => return Err(crate::Error::InvalidState("failed")),
		};

		if decision == Decision::Cancel {
			log::info!("Conflict resolution cancelled at {}", conflict);
			self.log.record(&LogEntry::new(&conflict, Outcome::Cancelled))?;
			self.involved.clear();
			self.state = SessionState::Cancelled;
			return Ok(&self.state)
		}

		let excluded = match excluded_by_decision(&conflict, &decision) {
			Some(excluded) => excluded,
			None => {
				log::debug!("Decision {:?} doesn't resolve {}", decision, conflict);
				return Err(crate::Error::NoSelection)
			},
		};

		if self.steps >= self.step_limit {
			log::error!("Gave up on conflict resolution after {} decisions", self.steps);
			return Err(crate::Error::UnresolvableLoop { conflict: Box::new(conflict) })
		}
		self.steps += 1;

		for id in &excluded {
			self.exclude(id);
		}
		log::info!("Resolved {} by not using {:?}", conflict, excluded);

		/* The candidates have changed, the conflict can't be left awaiting a decision */
		let advanced = self.log.record(&LogEntry::new(&conflict, Outcome::Excluded { excluded }))
			.and_then(|_| self.advance());
		if let Err(e) = advanced {
			self.fail();
			return Err(e)
		}

		if self.current_conflict() == Some(&conflict) {
			self.fail();
			return Err(crate::Error::UnresolvableLoop { conflict: Box::new(conflict) })
		}

		Ok(&self.state)
	}

	/// Ends the session.
	///
	/// # Errors
	/// - [`InvalidState`](crate::Error::InvalidState) while the session is idle or awaiting a decision.
	pub fn finish(self) -> crate::Result<ResolveOutcome> {
		match self.state {
			SessionState::Resolved => Ok(ResolveOutcome::Resolved(self.candidates)),
			SessionState::Cancelled => Ok(ResolveOutcome::LaunchAborted),
			SessionState::Idle => Err(crate::Error::InvalidState("not started")),
			SessionState::Failed => Err(crate::Error::InvalidState("failed")),
			SessionState::AwaitingDecision(_) => Err(crate::Error::InvalidState("awaiting a decision")),
		}
	}

	fn advance(&mut self) -> crate::Result<()> {
		let next = overrides::get_next_problem(self.registry, &mut self.candidates, &*self.profile, &mut *self.log)?;

		self.state = match next {
			Some(conflict) => {
				log::debug!("Awaiting decision on {}", conflict);
				self.involved = conflict.involved_addons();
				SessionState::AwaitingDecision(conflict)
			},
			None => {
				log::debug!("No conflicts left among {} candidates", self.candidates.len());
				self.involved.clear();
				SessionState::Resolved
			},
		};

		Ok(())
	}

	fn fail(&mut self) {
		log::error!("Conflict resolution failed with {} candidates left", self.candidates.len());
		self.involved.clear();
		self.state = SessionState::Failed;
	}

	/// Stops using the addon for this launch and in the profile.
	fn exclude(&mut self, id: &AddonId) {
		self.profile.exclude_addon(id);
		self.candidates.remove(id);
	}
}

/// The addons to stop using for `decision` to resolve `conflict`.
///
/// `None` when the decision has the wrong shape for the conflict or selects something that isn't involved.
fn excluded_by_decision(conflict: &Conflict, decision: &Decision) -> Option<Vec<AddonId>> {
	match (conflict, decision) {
		(Conflict::ProvideConflict { .. }, Decision::Select(Some(selected))) => {
			let involved = conflict.involved_addons();
			if !involved.contains(selected) {
				return None
			}
			Some(involved.into_iter().filter(|id| id != selected).collect())
		},
		(Conflict::MissingRequirements { addon, .. }, Decision::Acknowledge)
		| (Conflict::ExclusionByValue { addon, .. }, Decision::Acknowledge) => Some(vec![addon.clone()]),
		(Conflict::ExclusionByCategory { addon, excluded }, Decision::Choose(choice)) => match choice {
			ExclusionChoice::DropExcluded => Some(excluded.clone()),
			ExclusionChoice::DropTriggering => Some(vec![addon.clone()]),
		},
		(Conflict::ExclusionByKeyword { addon, conflicts }, Decision::Choose(choice)) => match choice {
			ExclusionChoice::DropExcluded => {
				let mut excluded = Vec::<AddonId>::new();
				for (a, _) in conflicts {
					if !excluded.contains(a) {
						excluded.push(a.clone());
					}
				}
				Some(excluded)
			},
			ExclusionChoice::DropTriggering => Some(vec![addon.clone()]),
		},
		_ => None,
	}
}
