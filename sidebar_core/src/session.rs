use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::SidebarError;
use crate::SidebarResult;

/// A post as returned by a subreddit listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Submission {
	pub title: String,
	pub url: String,
	pub author: String,
	pub permalink: String,
	pub score: i64,
	pub num_comments: u64,
}

/// Opaque handle to the remote service that plugins may query.
pub trait Session {
	/// Short label for logs, such as the configured site name.
	fn label(&self) -> &str;

	/// Up to `limit` submissions from `listing` (`hot`, `new`, ...) of
	/// `subreddit`.
	fn submissions(
		&self,
		subreddit: &str,
		listing: &str,
		limit: usize,
	) -> SidebarResult<Vec<Submission>>;
}

/// A session without remote access. Every listing request fails.
#[derive(Debug, Clone, Default)]
pub struct OfflineSession {
	label: String,
}

impl OfflineSession {
	pub fn new(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
		}
	}
}

impl Session for OfflineSession {
	fn label(&self) -> &str {
		&self.label
	}

	fn submissions(
		&self,
		subreddit: &str,
		listing: &str,
		_limit: usize,
	) -> SidebarResult<Vec<Submission>> {
		Err(SidebarError::Store(format!(
			"no listing source available for r/{subreddit}/{listing}"
		)))
	}
}

/// Listings served from memory, keyed by subreddit and then listing name.
///
/// Loads from JSON shaped like:
///
/// ```json
/// { "nfl": { "hot": [{ "title": "Game thread", "url": "https://..." }] } }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct StaticSession {
	#[serde(skip)]
	label: String,
	listings: HashMap<String, HashMap<String, Vec<Submission>>>,
}

impl StaticSession {
	pub fn new(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			listings: HashMap::new(),
		}
	}

	/// Load listings from a JSON file.
	pub fn from_json_file(label: impl Into<String>, path: &Path) -> SidebarResult<Self> {
		let content = std::fs::read_to_string(path)?;
		let mut session: Self = serde_json::from_str(&content).map_err(|e| {
			SidebarError::ConfigParse(format!("invalid listings file `{}`: {e}", path.display()))
		})?;
		session.label = label.into();
		Ok(session)
	}

	pub fn with_listing(
		mut self,
		subreddit: impl Into<String>,
		listing: impl Into<String>,
		submissions: Vec<Submission>,
	) -> Self {
		self.listings
			.entry(subreddit.into())
			.or_default()
			.insert(listing.into(), submissions);
		self
	}
}

impl Session for StaticSession {
	fn label(&self) -> &str {
		&self.label
	}

	fn submissions(
		&self,
		subreddit: &str,
		listing: &str,
		limit: usize,
	) -> SidebarResult<Vec<Submission>> {
		let submissions = self
			.listings
			.get(subreddit)
			.and_then(|listings| listings.get(listing))
			.ok_or_else(|| SidebarError::Store(format!("no `{listing}` listing for r/{subreddit}")))?;

		Ok(submissions.iter().take(limit).cloned().collect())
	}
}
