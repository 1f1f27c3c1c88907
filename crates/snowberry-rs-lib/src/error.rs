//! Library error type.

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

use crate::conflict_resolver::Conflict;

#[derive(Debug, Error)]
pub enum Error {
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	SerdeJSON(#[from] serde_json::Error),
	/// The decision did not select anything valid for the conflict being resolved.
	///
	/// The session is left untouched, the caller should ask again.
	#[error("no valid selection was made")]
	NoSelection,
	/// Detection and mutation disagree, the same conflict keeps coming back.
	#[error("conflict can't be resolved: {conflict}")]
	UnresolvableLoop { conflict: Box<Conflict> },
	#[error("resolution session is {0}")]
	InvalidState(&'static str),
}
