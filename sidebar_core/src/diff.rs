use chrono::DateTime;
use chrono::Utc;
use similar::ChangeTag;
use similar::TextDiff;

/// Number of unchanged lines shown around each hunk.
pub const DIFF_CONTEXT_LINES: usize = 3;

/// Prefix of the edit reason sent with every publish.
pub const REASON_PREFIX: &str = "Automatic update of: ";

/// A unified diff between two revisions of the document. Used for logging
/// only; publishing is decided by plain equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffReport {
	/// Header label of the previous revision.
	pub from_label: String,
	/// Header label of the synchronized content.
	pub to_label: String,
	/// The rendered unified diff, headers included.
	pub unified: String,
	/// Count of inserted lines.
	pub insertions: usize,
	/// Count of deleted lines.
	pub deletions: usize,
}

impl DiffReport {
	pub fn is_empty(&self) -> bool {
		self.insertions == 0 && self.deletions == 0
	}
}

/// Compare `before` and `after` line by line. The headers carry the prior
/// `revision` token and the time of comparison.
pub fn diff(before: &str, after: &str, revision: &str, now: DateTime<Utc>) -> DiffReport {
	let from_label = format!("previous_sidebar\t{revision}");
	let to_label = format!("new_sidebar\t{}", now.timestamp());
	let text_diff = TextDiff::from_lines(before, after);

	let mut insertions = 0;
	let mut deletions = 0;
	for change in text_diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Insert => insertions += 1,
			ChangeTag::Delete => deletions += 1,
			ChangeTag::Equal => {}
		}
	}

	let unified = text_diff
		.unified_diff()
		.context_radius(DIFF_CONTEXT_LINES)
		.missing_newline_hint(false)
		.header(&from_label, &to_label)
		.to_string();

	DiffReport {
		from_label,
		to_label,
		unified,
		insertions,
		deletions,
	}
}

/// Whether the document length is within its ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeStatus {
	Within { length: usize, limit: usize },
	Exceeded { length: usize, limit: usize },
}

impl SizeStatus {
	pub fn is_ok(&self) -> bool {
		matches!(self, Self::Within { .. })
	}

	pub fn length(&self) -> usize {
		match self {
			Self::Within { length, .. } | Self::Exceeded { length, .. } => *length,
		}
	}
}

/// Measure `content` in characters against `max_length`. Exceeding the
/// ceiling is reported, never enforced.
pub fn check_size(content: &str, max_length: usize) -> SizeStatus {
	let length = content.chars().count();

	if length > max_length {
		SizeStatus::Exceeded {
			length,
			limit: max_length,
		}
	} else {
		SizeStatus::Within {
			length,
			limit: max_length,
		}
	}
}

/// Cut `reason` to at most `max_length` characters.
pub fn truncate_reason(reason: &str, max_length: usize) -> String {
	match reason.char_indices().nth(max_length) {
		Some((offset, _)) => reason[..offset].to_string(),
		None => reason.to_string(),
	}
}

/// `Automatic update of: a, b, c`, cut to `max_length` characters.
pub fn update_reason<S: AsRef<str>>(titles: &[S], max_length: usize) -> String {
	let names: Vec<&str> = titles.iter().map(AsRef::as_ref).collect();
	truncate_reason(&format!("{REASON_PREFIX}{}", names.join(", ")), max_length)
}
