use std::path::PathBuf;

use clap::Parser;
use sidebar_core::DEFAULT_MAX_CONTENT_LENGTH;
use sidebar_core::DEFAULT_MAX_REASON_LENGTH;
use sidebar_core::SyncSettings;

/// Default session label when neither `--site` nor `REDDIT_SITE` is set.
pub const PROGRAM: &str = "sidebarupdater";

#[derive(Debug, Parser)]
#[command(
	author,
	version,
	about = "Regenerate marker-delimited regions of a subreddit sidebar from plugins.",
	long_about = "sidebarupdater keeps a subreddit sidebar fresh.\n\nEach `[section]` of the config \
	              file names a region bounded by `marker_start` and `marker_end` and the `plugin` \
	              that generates its content. Every run regenerates each region in order and \
	              publishes the sidebar only when it changed.\n\nSchedule it externally (cron, \
	              systemd timers) to keep the sidebar current."
)]
pub struct SidebarCli {
	/// Subreddit whose sidebar is synchronized.
	pub subreddit: String,

	/// Path to the INI file describing the regions.
	pub config: PathBuf,

	/// Run every region and log the diff, but do not publish.
	#[arg(long, short = 'n', default_value_t = false)]
	pub dry_run: bool,

	/// Enable debug logging.
	#[arg(long, short, default_value_t = false)]
	pub verbose: bool,

	/// Site label for the remote session.
	#[arg(long, short, env = "REDDIT_SITE")]
	pub site: Option<String>,

	/// Path of the sidebar document. Defaults to `<subreddit>.sidebar.md`.
	#[arg(long)]
	pub document: Option<PathBuf>,

	/// JSON file with subreddit listings served to the `submissions` plugin.
	#[arg(long)]
	pub listings: Option<PathBuf>,

	/// Sidebar length above which a warning is logged.
	#[arg(long, default_value_t = DEFAULT_MAX_CONTENT_LENGTH)]
	pub max_length: usize,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,
}

impl SidebarCli {
	pub fn document_path(&self) -> PathBuf {
		self.document
			.clone()
			.unwrap_or_else(|| PathBuf::from(format!("{}.sidebar.md", self.subreddit)))
	}

	pub fn site(&self) -> &str {
		self.site.as_deref().unwrap_or(PROGRAM)
	}

	pub fn settings(&self) -> SyncSettings {
		SyncSettings {
			max_content_length: self.max_length,
			max_reason_length: DEFAULT_MAX_REASON_LENGTH,
			dry_run: self.dry_run,
		}
	}
}
