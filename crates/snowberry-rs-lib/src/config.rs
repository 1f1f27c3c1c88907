use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
	runtime_dir: PathBuf,
	#[serde(default)]
	resolution_step_limit: Option<usize>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			runtime_dir: {
				#[cfg(target_os = "windows")]
				let path = std::env::var_os("APPDATA").map(PathBuf::from).unwrap_or_default();

				#[cfg(not(target_os = "windows"))]
				let path = if let Some(e) = std::env::var_os("XDG_DATA_HOME") {
					PathBuf::from(e)
				} else {
					std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default().join(".local/share")
				};

				path.join("snowberry-rs").join("runtime")
			},
			resolution_step_limit: None,
		}
	}
}

impl Config {
	/// Location of the config file, `config.json` in the user's config directory.
	pub fn default_path() -> PathBuf {
		#[cfg(target_os = "windows")]
		let path = std::env::var_os("APPDATA").map(PathBuf::from).unwrap_or_default();

		#[cfg(not(target_os = "windows"))]
		let path = if let Some(e) = std::env::var_os("XDG_CONFIG_HOME") {
			PathBuf::from(e)
		} else {
			std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default().join(".config")
		};

		path.join("snowberry-rs").join("config.json")
	}

	/// Loads the config from [`default_path()`](Config::default_path()).
	///
	/// # Errors
	/// - [`IO`](crate::error::Error::IO) when the file can't be opened.
	/// - [`SerdeJSON`](crate::error::Error::SerdeJSON) when the file isn't a valid config.
	pub fn load_from_disk() -> crate::Result<Self> {
		Self::load_from_file(Self::default_path())
	}

	pub fn load_from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
		let file = std::fs::File::open(path)?;
		Ok(serde_json::from_reader(BufReader::new(file))?)
	}

	pub fn save_to_disk(&self) -> crate::Result<()> {
		self.save_to_file(Self::default_path())
	}

	pub fn save_to_file(&self, path: impl AsRef<Path>) -> crate::Result<()> {
		let path = path.as_ref();
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		let file = std::fs::File::create(path)?;
		serde_json::to_writer_pretty(file, self)?;
		Ok(())
	}

	/// Directory the launcher writes its runtime files to.
	pub fn runtime_dir(&self) -> &Path {
		&self.runtime_dir
	}
	/// returns if the directory is valid or not.
	pub fn set_runtime_dir(&mut self, runtime_dir: PathBuf) -> bool {
		if runtime_dir.is_dir() {
			self.runtime_dir = runtime_dir;
			true
		} else {
			false
		}
	}

	/// The conflict log is recreated here on every launch attempt.
	pub fn conflict_log_path(&self) -> PathBuf {
		self.runtime_dir.join("Conflicts.log")
	}

	/// Upper bound on accepted decisions in a single resolution session.
	///
	/// `None` lets the session derive a limit from the number of candidates.
	pub fn resolution_step_limit(&self) -> Option<usize> {
		self.resolution_step_limit
	}
	pub fn set_resolution_step_limit(&mut self, limit: Option<usize>) {
		self.resolution_step_limit = limit;
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn conflict_log_lives_in_runtime_dir() {
		let config = Config::default();
		assert_eq!(config.conflict_log_path(), config.runtime_dir().join("Conflicts.log"));
	}

	#[test]
	fn set_runtime_dir_rejects_missing_directory() {
		let mut config = Config::default();
		let before = config.runtime_dir().to_path_buf();
		assert!(!config.set_runtime_dir(PathBuf::from("/this/path/should/not/exist/snowberry")));
		assert_eq!(config.runtime_dir(), before);
	}

	#[test]
	fn missing_step_limit_deserializes_as_none() {
		let config: Config = serde_json::from_str(r#"{ "runtime_dir": "/tmp/runtime" }"#).unwrap();
		assert_eq!(config.resolution_step_limit(), None);
		assert_eq!(config.runtime_dir(), Path::new("/tmp/runtime"));
	}
}
