pub mod error;
pub use error::Result;
pub use error::Error;

pub mod config;
pub use config::Config;

pub mod registry;
pub use registry::AddonRegistry;
pub use registry::Addon;
pub use registry::AddonId;

pub mod profile;
pub use profile::Profile;
pub use profile::MemoryProfile;
pub use profile::Priority;

pub mod conflict_resolver;
pub mod resolution_log;
pub mod launcher;
