//! Record of every conflict met during a launch attempt and how it was resolved.
//!
//! This is separate from the diagnostic `log` output, it's meant to be read by users
//! trying to work out why an addon wasn't loaded.

use std::io::Write;

use serde::Serialize;

use crate::conflict_resolver::{Conflict, ConflictKind};
use crate::registry::AddonId;

/// How a conflict ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum Outcome {
	/// The losers of an override were dropped from the launch. The profile is left alone.
	Overridden { winner: AddonId, not_loaded: Vec<AddonId> },
	/// These addons were marked "do not use" and dropped from the launch.
	Excluded { excluded: Vec<AddonId> },
	/// The user cancelled, the launch is aborted.
	Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
	pub kind: ConflictKind,
	pub involved: Vec<AddonId>,
	pub conflict: Conflict,
	#[serde(flatten)]
	pub outcome: Outcome,
}

impl LogEntry {
	pub fn new(conflict: &Conflict, outcome: Outcome) -> Self {
		Self {
			kind: conflict.kind(),
			involved: conflict.involved_addons(),
			conflict: conflict.clone(),
			outcome,
		}
	}

	/// Addons excluded from the profile by this resolution.
	///
	/// Overridden addons are only left out of the launch so they aren't included.
	pub fn excluded(&self) -> &[AddonId] {
		match &self.outcome {
			Outcome::Excluded { excluded } => excluded,
			Outcome::Overridden { .. } | Outcome::Cancelled => &[],
		}
	}
}

/// Append only sink for [`LogEntry`]s, written synchronously by the resolver.
pub trait ConflictLog {
	/// Start of a launch attempt with the addons that are going to be checked.
	fn begin(&mut self, _load_order: &[AddonId]) -> crate::Result<()> {
		Ok(())
	}

	fn record(&mut self, entry: &LogEntry) -> crate::Result<()>;

	/// The conflicts were all resolved, `resolved` will be loaded.
	fn finish(&mut self, _resolved: &[AddonId]) -> crate::Result<()> {
		Ok(())
	}
}

impl<L: ConflictLog + ?Sized> ConflictLog for &mut L {
	fn begin(&mut self, load_order: &[AddonId]) -> crate::Result<()> {
		(**self).begin(load_order)
	}

	fn record(&mut self, entry: &LogEntry) -> crate::Result<()> {
		(**self).record(entry)
	}

	fn finish(&mut self, resolved: &[AddonId]) -> crate::Result<()> {
		(**self).finish(resolved)
	}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLog;

impl ConflictLog for NullLog {
	fn record(&mut self, _entry: &LogEntry) -> crate::Result<()> {
		Ok(())
	}
}

/// Writes a plain text log, one block per conflict.
#[derive(Debug)]
pub struct WriterLog<W: Write> {
	writer: W,
}

impl WriterLog<std::io::BufWriter<std::fs::File>> {
	/// Recreates the conflict log file at [`conflict_log_path()`](crate::Config::conflict_log_path()).
	///
	/// # Errors
	/// - [`IO`](crate::error::Error::IO) when the runtime directory or the file can't be created.
	pub fn create(config: &crate::Config) -> crate::Result<Self> {
		std::fs::create_dir_all(config.runtime_dir())?;
		let path = config.conflict_log_path();
		log::debug!("Writing conflict log to {}", path.display());
		let file = std::fs::File::create(path)?;
		Ok(Self::new(std::io::BufWriter::new(file)))
	}
}

impl<W: Write> WriterLog<W> {
	pub fn new(writer: W) -> Self {
		Self { writer }
	}

	pub fn into_inner(self) -> W {
		self.writer
	}

	fn write_entry(&mut self, entry: &LogEntry) -> std::io::Result<()> {
		let w = &mut self.writer;
		writeln!(w, "\n{}:", entry.kind)?;

		match &entry.conflict {
			Conflict::Override { winner, losers } => {
				writeln!(w, "  preferred addon = {}", winner)?;
				writeln!(w, "  not loaded = [")?;
				for (addon, key) in losers {
					writeln!(w, "    {} (because of {})", addon, key)?;
				}
				writeln!(w, "  ]")?;
			},
			Conflict::ProvideConflict { pairs } => {
				writeln!(w, "  conflicting providers = [")?;
				for (a, b, key) in pairs {
					writeln!(w, "    {} / {} (because of {})", a, b, key)?;
				}
				writeln!(w, "  ]")?;
			},
			Conflict::MissingRequirements { addon, missing_keys } => {
				writeln!(w, "  {} requires the following = [", addon)?;
				for key in missing_keys {
					writeln!(w, "    {}", key)?;
				}
				writeln!(w, "  ]")?;
			},
			Conflict::ExclusionByCategory { addon, excluded } => {
				writeln!(w, "  addon = {}", addon)?;
				writeln!(w, "  excluded addons = [")?;
				for a in excluded {
					writeln!(w, "    {}", a)?;
				}
				writeln!(w, "  ]")?;
			},
			Conflict::ExclusionByValue { addon, conflicting_values } => {
				writeln!(w, "  addon = {}", addon)?;
				writeln!(w, "  conflicting values = [")?;
				for v in conflicting_values {
					writeln!(w, "    {}", v)?;
				}
				writeln!(w, "  ]")?;
			},
			Conflict::ExclusionByKeyword { addon, conflicts } => {
				writeln!(w, "  addon = {}", addon)?;
				writeln!(w, "  conflicted by = [")?;
				for (a, key) in conflicts {
					writeln!(w, "    {} (because of {})", a, key)?;
				}
				writeln!(w, "  ]")?;
			},
		}

		match &entry.outcome {
			/* Overrides already list everything that happened */
			Outcome::Overridden { .. } => {},
			Outcome::Excluded { excluded } => {
				let ids = excluded.iter().map(AddonId::as_str).collect::<Vec<_>>().join(", ");
				writeln!(w, "  resolution = not using [{}]", ids)?;
			},
			Outcome::Cancelled => writeln!(w, "  resolution = launch cancelled")?,
		}

		w.flush()
	}
}

impl<W: Write> ConflictLog for WriterLog<W> {
	fn begin(&mut self, load_order: &[AddonId]) -> crate::Result<()> {
		writeln!(self.writer, "{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))?;
		writeln!(self.writer, "Launching on {}", chrono::Local::now().format("%a, %d %b %Y %H:%M:%S"))?;
		writeln!(self.writer, "Addons to load:")?;
		for id in load_order {
			writeln!(self.writer, "  {}", id)?;
		}
		self.writer.flush()?;
		Ok(())
	}

	fn record(&mut self, entry: &LogEntry) -> crate::Result<()> {
		self.write_entry(entry)?;
		Ok(())
	}

	fn finish(&mut self, resolved: &[AddonId]) -> crate::Result<()> {
		writeln!(self.writer, "\nResolved addons:")?;
		for id in resolved {
			writeln!(self.writer, "  {}", id)?;
		}
		self.writer.flush()?;
		Ok(())
	}
}
