//! Automatic resolution of overrides.

use crate::profile::Profile;
use crate::registry::{AddonId, AddonRegistry};
use crate::resolution_log::{ConflictLog, LogEntry, Outcome};
use super::{detection, CandidateSet, Conflict};

/// Drops the losers of every override in `conflicts` from `candidates`.
///
/// Other kinds of conflict are ignored. The profile isn't touched, overridden addons are only
/// left out of this launch. Each override gets a log entry.
///
/// Returns the addons actually removed.
pub fn drain_overrides<L: ConflictLog + ?Sized>(conflicts: &[Conflict], candidates: &mut CandidateSet, log: &mut L) -> crate::Result<Vec<AddonId>> {
	let mut removed = Vec::<AddonId>::new();

	for conflict in conflicts {
		if let Conflict::Override { winner, losers } = conflict {
			let mut not_loaded = Vec::<AddonId>::new();
			for (loser, key) in losers {
				if !not_loaded.contains(loser) {
					not_loaded.push(loser.clone());
				}
				if candidates.remove(loser) {
					log::debug!("Not loading {} as {} overrides it (because of {})", loser, winner, key);
					removed.push(loser.clone());
				}
			}

			log.record(&LogEntry::new(conflict, Outcome::Overridden { winner: winner.clone(), not_loaded }))?;
		}
	}

	Ok(removed)
}

/// Resolves all overrides then returns the first conflict left in `candidates`, if any.
///
/// Overrides are drained a whole detection pass at a time and detection is run again
/// until a pass finds no overrides, so the returned conflict never refers to a dropped addon.
/// Call again after every change to the set.
///
/// # Errors
/// - [`UnresolvableLoop`](crate::Error::UnresolvableLoop) when a pass reports overrides but none of their losers are in the set.
/// - Errors from `log`.
pub fn get_next_problem<P, L>(registry: &AddonRegistry, candidates: &mut CandidateSet, profile: &P, log: &mut L) -> crate::Result<Option<Conflict>>
where
	P: Profile + ?Sized,
	L: ConflictLog + ?Sized,
{
	loop {
		let (overrides, remaining): (Vec<_>, Vec<_>) = detection::find_conflicts(registry, candidates, profile)
			.into_iter()
			.partition(Conflict::is_override);

		if overrides.is_empty() {
			return Ok(remaining.into_iter().next())
		}

		let removed = drain_overrides(&overrides, candidates, log)?;
		if removed.is_empty() {
			return Err(crate::Error::UnresolvableLoop { conflict: Box::new(overrides[0].clone()) })
		}
	}
}
