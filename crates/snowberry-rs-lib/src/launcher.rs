//! Preparing a profile for launch.

use crate::conflict_resolver::{self, CandidateSet, Presenter, ResolveOutcome};
use crate::profile::Profile;
use crate::registry::{AddonId, AddonRegistry};
use crate::resolution_log::ConflictLog;

/// Works out which of the profile's addons can be loaded together.
///
/// The candidates are the profile's final addons at the priorities the profile gives them.
/// Conflicts are resolved through `presenter`; addons the user drops are excluded from the profile.
/// The whole process, from the load order to the resolved addons, is written to `conflict_log`.
///
/// # Errors
/// - [`UnresolvableLoop`](crate::Error::UnresolvableLoop) if the resolver stops making progress.
/// - Errors from writing to `conflict_log`.
pub fn prepare_launch<P, Pr, L>(
	config: &crate::Config,
	registry: &AddonRegistry,
	profile: &mut P,
	presenter: &mut Pr,
	conflict_log: &mut L)
	-> crate::Result<ResolveOutcome>
where
	P: Profile + ?Sized,
	Pr: Presenter + ?Sized,
	L: ConflictLog + ?Sized,
{
	let candidates = CandidateSet::from_profile(&*profile);
	let load_order: Vec<AddonId> = candidates.ids().cloned().collect();

	log::info!("Preparing launch with {} addons", load_order.len());
	conflict_log.begin(&load_order)?;

	let outcome = conflict_resolver::resolve_addon_conflicts(
		registry,
		profile,
		candidates,
		presenter,
		conflict_log,
		config.resolution_step_limit()
	)?;

	match &outcome {
		ResolveOutcome::Resolved(resolved) => {
			let resolved: Vec<AddonId> = resolved.ids().cloned().collect();
			log::info!("Launching with {} of {} addons", resolved.len(), load_order.len());
			conflict_log.finish(&resolved)?;
		},
		ResolveOutcome::LaunchAborted => log::info!("Launch aborted during conflict resolution."),
	}

	Ok(outcome)
}
