use std::process;

use chrono::Utc;
use clap::Parser;
use owo_colors::OwoColorize;
use owo_colors::Stream;
use sidebar_cli::SidebarCli;
use sidebar_core::FileStore;
use sidebar_core::OfflineSession;
use sidebar_core::PluginContext;
use sidebar_core::PluginRegistry;
use sidebar_core::PublishState;
use sidebar_core::RegionConfig;
use sidebar_core::Session;
use sidebar_core::StaticSession;
use sidebar_core::SyncOutcome;
use sidebar_core::Synchronizer;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled and `$stream` is a
/// terminal that supports them.
macro_rules! colored {
	($text:expr, $color:ident, $stream:ident) => {
		if color_enabled() {
			format!(
				"{}",
				$text.if_supports_color(Stream::$stream, |text| text.$color())
			)
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = SidebarCli::parse();

	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_logging(args.verbose, use_color);
	tracing::info!("Startup");

	if let Err(e) = run(&args) {
		match e.downcast::<sidebar_core::SidebarError>() {
			Ok(sidebar_err) => {
				let report: miette::Report = (*sidebar_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red, Stderr));
			}
		}
		process::exit(2);
	}

	tracing::info!("Complete");
}

/// Log to stderr. `RUST_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "info" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_file(true)
		.with_line_number(true)
		.init();
}

fn run(args: &SidebarCli) -> Result<(), Box<dyn std::error::Error>> {
	let config = RegionConfig::load(&args.config)?;
	tracing::debug!(regions = config.len(), config = %args.config.display(), "Loaded config");

	let session: Box<dyn Session> = match &args.listings {
		Some(path) => Box::new(StaticSession::from_json_file(args.site(), path)?),
		None => Box::new(OfflineSession::new(args.site())),
	};
	let registry = PluginRegistry::with_builtins();
	let ctx = PluginContext {
		subreddit: &args.subreddit,
		now: Utc::now(),
		session: session.as_ref(),
	};

	let store = FileStore::new(args.document_path());
	let outcome = Synchronizer::new(&registry, args.settings()).run(&store, &config, &ctx)?;

	if outcome.publish == PublishState::DryRun {
		print_dry_run(&outcome);
	}

	Ok(())
}

fn print_dry_run(outcome: &SyncOutcome) {
	println!(
		"Dry run: would update {} region(s): {}",
		outcome.changed_region_titles.len(),
		outcome.changed_region_titles.join(", ")
	);

	let Some(diff) = &outcome.diff else {
		return;
	};

	for line in diff.unified.lines() {
		if line.starts_with("@@") {
			println!("{}", colored!(line, cyan, Stdout));
		} else if line.starts_with('+') {
			println!("{}", colored!(line, green, Stdout));
		} else if line.starts_with('-') {
			println!("{}", colored!(line, red, Stdout));
		} else {
			println!("{line}");
		}
	}
}
