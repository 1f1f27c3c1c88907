use std::io::Write;

use snowberry_rs::conflict_resolver::{Conflict, Decision, ExclusionChoice, Presenter, ResolveOutcome};
use snowberry_rs::resolution_log::WriterLog;
use snowberry_rs::{Addon, AddonRegistry, MemoryProfile};

/// Everything needed to attempt a launch.
#[derive(Debug, serde::Deserialize)]
struct Scenario {
	addons: Vec<Addon>,
	profile: MemoryProfile,
}

fn main() {
	let mut opts;

	/* Parse console input */
	let parsed_options = {
		let args: Vec<String> = std::env::args().collect();

		opts = getopts::Options::new();
		opts.optflag( "h", "help",       "Show help");
		opts.optflag( "v", "verbose",    "Increased vebosity");
		opts.optopt(  "c", "config",     "Read the config from this file", "FILE");
		opts.parsing_style(getopts::ParsingStyle::FloatingFrees);

		let parsed_options = match opts.parse(&args[1..]) {
			Ok(m)  => { m }
			Err(e) => { println!("Unable to parse options: {}", e); return }
		};

		if parsed_options.opt_present("h") {
			eprintln!("{}", opts.usage("Usage: snowberry-rs-terminal [options] SCENARIO.json"));
			return;
		}

		parsed_options
	};

	if parsed_options.opt_present("v") {
		env_logger::Builder::from_default_env()
			.filter_level(log::LevelFilter::Debug)
			.init();
	} else {
		env_logger::init();
	}

	let config = match parsed_options.opt_str("c") {
		Some(path) => snowberry_rs::Config::load_from_file(path),
		None => snowberry_rs::Config::load_from_disk(),
	};
	let config = config.unwrap_or_else(|e| {
		log::warn!("Failed to read config file: {}", e);
		log::warn!("Using default config.");
		snowberry_rs::Config::default()
	});

	let scenario_path = match parsed_options.free.first() {
		Some(p) => p,
		None => { log::error!("Scenario file not provided."); return },
	};

	match launch(&config, scenario_path) {
		Ok(_) => {},
		Err(Error::UserCancelled) => println!("Launch aborted."),
		Err(e) => log::error!("Failed to prepare launch due to error: {}", e),
	}
}

fn launch(config: &snowberry_rs::Config, scenario_path: impl AsRef<std::path::Path>) -> Result<(), Error> {
	let scenario = load_scenario(scenario_path)?;
	let registry: AddonRegistry = scenario.addons.into_iter().collect();
	let mut profile = scenario.profile;

	let mut conflict_log = WriterLog::create(config)?;
	let mut presenter = TerminalPresenter;

	let outcome = snowberry_rs::launcher::prepare_launch(config, &registry, &mut profile, &mut presenter, &mut conflict_log)?;

	if !profile.excluded_addons().is_empty() {
		println!("No longer using:");
		for id in profile.excluded_addons() {
			println!("\t{}", id);
		}
	}

	match outcome {
		ResolveOutcome::Resolved(candidates) => {
			println!("Addons to load:");
			for candidate in candidates.iter() {
				println!("\t{} (priority {})", candidate.id, candidate.priority.0);
			}
			println!("Conflict log written to {}", config.conflict_log_path().display());
			Ok(())
		},
		ResolveOutcome::LaunchAborted => Err(Error::UserCancelled),
	}
}

fn load_scenario(path: impl AsRef<std::path::Path>) -> Result<Scenario, Error> {
	let file = std::fs::File::open(path).map_err(snowberry_rs::Error::from)?;
	let scenario: Scenario = serde_json::from_reader(std::io::BufReader::new(file)).map_err(snowberry_rs::Error::from)?;
	Ok(scenario)
}

/// Asks about conflicts on stdin.
struct TerminalPresenter;

impl TerminalPresenter {
	/// Reads the next line, `None` on end of input or a read error.
	fn read_answer() -> Option<String> {
		print!("> ");
		let _ = std::io::stdout().flush();
		let mut input = String::new();
		match std::io::stdin().read_line(&mut input) {
			Ok(0) | Err(_) => None,
			Ok(_) => Some(input.trim().to_lowercase()),
		}
	}

	fn print_options(options: &[String]) {
		for (i, opt) in options.iter().enumerate() {
			println!("{}) {}", i, opt);
		}
		println!("c) Cancel launch");
	}
}

impl Presenter for TerminalPresenter {
	fn present(&mut self, conflict: &Conflict) -> Decision {
		if conflict.is_override() {
			return Decision::Acknowledge
		}

		match conflict.triggering_addon() {
			Some(addon) => println!("\n{} raised by {}:", conflict.kind(), addon),
			None => println!("\n{}:", conflict.kind()),
		}

		let involved = conflict.involved_addons();

		let options: Vec<String> = match conflict {
			Conflict::Override { .. } => return Decision::Acknowledge,
			Conflict::ProvideConflict { .. } => {
				println!("These addons provide the same [{}]. Select the one to keep.", conflict.keys().join(", "));
				involved.iter().map(ToString::to_string).collect()
			},
			Conflict::MissingRequirements { addon, missing_keys } => {
				println!("{} requires [{}] which no addon provides.", addon, missing_keys.join(", "));
				vec![format!("Don't use {}", addon)]
			},
			Conflict::ExclusionByValue { addon, conflicting_values } => {
				println!("{} can't be used with [{}].", addon, conflicting_values.join(", "));
				vec![format!("Don't use {}", addon)]
			},
			Conflict::ExclusionByCategory { addon, excluded } => {
				let excluded: Vec<_> = excluded.iter().map(ToString::to_string).collect();
				println!("{} can't be used with [{}].", addon, excluded.join(", "));
				vec![format!("Don't use {}", excluded.join(", ")), format!("Don't use {}", addon)]
			},
			Conflict::ExclusionByKeyword { addon, conflicts } => {
				let mut excluded = Vec::<String>::new();
				for (a, key) in conflicts {
					println!("{} can't be used with {} (because of {})", addon, a, key);
					if !excluded.contains(&a.to_string()) {
						excluded.push(a.to_string());
					}
				}
				vec![format!("Don't use {}", excluded.join(", ")), format!("Don't use {}", addon)]
			},
		};

		Self::print_options(&options);

		let input = match Self::read_answer() {
			Some(input) => input,
			None => return Decision::Cancel,
		};
		if input == "c" {
			return Decision::Cancel
		}
		let index = input.parse::<usize>().ok().filter(|&i| i < options.len());

		/* Invalid answers come back as a NoSelection and the conflict is asked again */
		match conflict {
			Conflict::ProvideConflict { .. } => {
				if index.is_none() {
					println!("Input invalid.");
				}
				Decision::Select(index.map(|i| involved[i].clone()))
			},
			Conflict::MissingRequirements { .. } | Conflict::ExclusionByValue { .. } => match index {
				Some(_) => Decision::Acknowledge,
				None => {
					println!("Input invalid.");
					Decision::Select(None)
				},
			},
			_ => match index.and_then(ExclusionChoice::from_index) {
				Some(choice) => Decision::Choose(choice),
				None => {
					println!("Input invalid.");
					Decision::Select(None)
				},
			},
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Snowberry-rs error: {0}")]
	SnowberryRsError(#[from] snowberry_rs::Error),
	#[error("User cancelled an action")]
	UserCancelled,
}
