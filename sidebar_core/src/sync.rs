use crate::DiffReport;
use crate::DocumentStore;
use crate::PluginContext;
use crate::PluginRegistry;
use crate::Region;
use crate::RegionConfig;
use crate::SidebarError;
use crate::SidebarResult;
use crate::SizeStatus;
use crate::SyncSettings;
use crate::check_size;
use crate::diff;
use crate::locate;
use crate::merge;
use crate::update_reason;

/// What happened to a single region during a pass.
#[derive(Debug)]
pub enum RegionOutcome {
	/// The plugin ran and its output changed the document.
	Applied,
	/// The plugin ran but the region already held the same content.
	Unchanged,
	/// One of the markers was not found; the plugin was not invoked.
	Skipped,
	/// The plugin could not be resolved or failed. The region was left as is.
	Failed(SidebarError),
}

impl RegionOutcome {
	pub fn is_applied(&self) -> bool {
		matches!(self, Self::Applied)
	}

	pub fn is_skipped(&self) -> bool {
		matches!(self, Self::Skipped)
	}

	pub fn is_failed(&self) -> bool {
		matches!(self, Self::Failed(_))
	}
}

/// The outcome of one region, tagged with its title.
#[derive(Debug)]
pub struct RegionReport {
	pub title: String,
	pub outcome: RegionOutcome,
}

/// Terminal state of a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishState {
	/// The document changed and was written.
	Published,
	/// The document did not change; nothing was written.
	NoChange,
	/// The document changed but the pass ran with `dry_run`.
	DryRun,
	/// The document changed but the store rejected the write. The error is
	/// logged and the pass still completes.
	Failed(String),
}

/// Everything a pass produced.
#[derive(Debug)]
pub struct SyncOutcome {
	/// The document after every region was processed.
	pub final_content: String,
	/// Titles of regions whose output changed the document, in processing
	/// order.
	pub changed_region_titles: Vec<String>,
	/// False when the final content exceeds the length ceiling.
	pub size_ok: bool,
	pub size: SizeStatus,
	/// Per-region outcomes in declaration order.
	pub regions: Vec<RegionReport>,
	/// The diff against the prior revision, when anything changed.
	pub diff: Option<DiffReport>,
	/// The edit reason handed to the store, when anything changed.
	pub reason: Option<String>,
	pub publish: PublishState,
}

impl SyncOutcome {
	pub fn is_changed(&self) -> bool {
		self.publish != PublishState::NoChange
	}

	pub fn region(&self, title: &str) -> Option<&RegionOutcome> {
		self.regions
			.iter()
			.find(|report| report.title == title)
			.map(|report| &report.outcome)
	}
}

/// Drives one synchronization pass over an ordered list of regions.
///
/// Regions are processed strictly in order against the progressively
/// updated content, so a region sees the output of every region before it.
#[derive(Debug)]
pub struct Synchronizer<'a> {
	registry: &'a PluginRegistry,
	settings: SyncSettings,
}

impl<'a> Synchronizer<'a> {
	pub fn new(registry: &'a PluginRegistry, settings: SyncSettings) -> Self {
		Self { registry, settings }
	}

	pub fn settings(&self) -> &SyncSettings {
		&self.settings
	}

	/// Regenerate a single region of `content`.
	///
	/// Returns the new content when the region was applied and the outcome
	/// in every case.
	pub fn sync_region(
		&self,
		content: &str,
		region: &Region,
		ctx: &PluginContext<'_>,
	) -> (Option<String>, RegionOutcome) {
		tracing::info!("Handling {}", region.title);
		tracing::debug!(
			"Looking for start=<{}>, end=<{}>",
			region.marker_start,
			region.marker_end
		);

		let Some(span) = locate(content, &region.marker_start, &region.marker_end) else {
			tracing::debug!("Not found");
			return (None, RegionOutcome::Skipped);
		};
		tracing::debug!(start = span.start, end = span.end, "Found");

		let body = match self.registry.invoke(&region.plugin, ctx, &region.parameters) {
			Ok(body) => body,
			Err(e) => {
				tracing::error!(
					region = %region.title,
					plugin = %region.plugin,
					"Error running plugin: {e:?}"
				);
				return (None, RegionOutcome::Failed(e));
			}
		};

		let merged = merge(
			content,
			span,
			&region.marker_start,
			&body,
			&region.marker_end,
		);

		if merged == content {
			(None, RegionOutcome::Unchanged)
		} else {
			(Some(merged), RegionOutcome::Applied)
		}
	}

	/// Run every region over `content` in order without touching any store.
	pub fn apply_regions(
		&self,
		content: &str,
		regions: &[Region],
		ctx: &PluginContext<'_>,
	) -> (String, Vec<RegionReport>) {
		let mut current = content.to_string();
		let mut reports = Vec::with_capacity(regions.len());

		for region in regions {
			let (updated, outcome) = self.sync_region(&current, region, ctx);
			if let Some(updated) = updated {
				current = updated;
			}

			reports.push(RegionReport {
				title: region.title.clone(),
				outcome,
			});
		}

		(current, reports)
	}

	/// Read the document, regenerate every region, and publish the result if
	/// it changed.
	///
	/// Only a failure to read the document is returned as an error. Plugin
	/// failures and publish failures are logged and reported in the outcome.
	pub fn run(
		&self,
		store: &dyn DocumentStore,
		config: &RegionConfig,
		ctx: &PluginContext<'_>,
	) -> SidebarResult<SyncOutcome> {
		let document = store.read()?;
		let span = tracing::info_span!(
			"sync",
			subreddit = ctx.subreddit,
			revision = %document.revision
		);
		let _entered = span.enter();
		tracing::debug!("{}", document.content);

		let (final_content, regions) = self.apply_regions(&document.content, config.regions(), ctx);
		let changed_region_titles: Vec<String> = regions
			.iter()
			.filter(|report| report.outcome.is_applied())
			.map(|report| report.title.clone())
			.collect();

		let size = check_size(&final_content, self.settings.max_content_length);
		match size {
			SizeStatus::Exceeded { length, limit } => {
				tracing::warn!("Sidebar too large {length}>{limit}!");
			}
			SizeStatus::Within { length, .. } => {
				tracing::debug!("Sidebar size: {length} chars");
			}
		}

		if final_content == document.content {
			tracing::info!("No changes");
			return Ok(SyncOutcome {
				final_content,
				changed_region_titles,
				size_ok: size.is_ok(),
				size,
				regions,
				diff: None,
				reason: None,
				publish: PublishState::NoChange,
			});
		}

		let report = diff(&document.content, &final_content, &document.revision, ctx.now);
		tracing::info!("Sidebar diff:\n{}", report.unified);

		let reason = update_reason(&changed_region_titles, self.settings.max_reason_length);
		let publish = self.publish(store, &final_content, &reason);

		Ok(SyncOutcome {
			final_content,
			changed_region_titles,
			size_ok: size.is_ok(),
			size,
			regions,
			diff: Some(report),
			reason: Some(reason),
			publish,
		})
	}

	fn publish(&self, store: &dyn DocumentStore, content: &str, reason: &str) -> PublishState {
		if self.settings.dry_run {
			tracing::info!(reason, "Dry run, not publishing");
			return PublishState::DryRun;
		}

		match store.write(content, reason) {
			Ok(()) => {
				tracing::info!(reason, "Published");
				PublishState::Published
			}
			Err(e) => {
				tracing::error!("Error updating sidebar: {e:?}");
				PublishState::Failed(e.to_string())
			}
		}
	}
}
