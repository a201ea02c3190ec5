use std::borrow::Cow;
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde::Deserializer;
use serde::de::MapAccess;
use serde::de::Visitor;

use crate::Parameters;
use crate::SidebarError;
use crate::SidebarResult;

/// Token in marker strings that is replaced by the region's own title.
pub const CONFIG_NAME_PLACEHOLDER: &str = "CONFIGNAME";

/// Section whose keys are merged into every region, like keys declared
/// before the first section.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Maximum sidebar length before a warning is raised.
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 10_240;

/// Maximum length of the edit reason passed to the document store.
pub const DEFAULT_MAX_REASON_LENGTH: usize = 256;

pub const KEY_MARKER_START: &str = "marker_start";
pub const KEY_MARKER_END: &str = "marker_end";
pub const KEY_PLUGIN: &str = "plugin";

/// A named, marker-delimited span of the document regenerated by a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
	/// Section title. Unique within one config.
	pub title: String,
	/// Opening marker with the placeholder already substituted.
	pub marker_start: String,
	/// Closing marker with the placeholder already substituted.
	pub marker_end: String,
	/// Name the plugin is registered under.
	pub plugin: String,
	/// Every key of the section (defaults included), forwarded verbatim to
	/// the plugin.
	pub parameters: Parameters,
}

impl Region {
	/// Build a region from a section title and its merged key/value pairs.
	///
	/// `CONFIGNAME` in either marker is replaced by `title`. Missing required
	/// keys and markers that end up empty are configuration errors.
	pub fn from_section(title: &str, parameters: Parameters) -> SidebarResult<Self> {
		let marker_start = marker(title, &parameters, KEY_MARKER_START)?;
		let marker_end = marker(title, &parameters, KEY_MARKER_END)?;
		let plugin = required(title, &parameters, KEY_PLUGIN)?.trim().to_string();

		Ok(Self {
			title: title.to_string(),
			marker_start,
			marker_end,
			plugin,
			parameters,
		})
	}
}

fn required<'a>(title: &str, parameters: &'a Parameters, key: &str) -> SidebarResult<&'a str> {
	parameters.get(key).ok_or_else(|| {
		SidebarError::MissingKey {
			region: title.to_string(),
			key: key.to_string(),
		}
	})
}

fn marker(title: &str, parameters: &Parameters, key: &str) -> SidebarResult<String> {
	let marker = required(title, parameters, key)?.replace(CONFIG_NAME_PLACEHOLDER, title);

	if marker.is_empty() {
		return Err(SidebarError::EmptyMarker {
			region: title.to_string(),
			key: key.to_string(),
		});
	}

	Ok(marker)
}

/// The ordered list of regions loaded from an INI file.
///
/// ```ini
/// marker_start = [](#CONFIGNAME-start)
/// marker_end = [](#CONFIGNAME-end)
///
/// [countdown]
/// plugin = countdown
/// countdown_date = 2026-09-10 20:20
/// countdown_timezone = -04:00
/// countdown_future = Kickoff in {0}
///
/// [hot]
/// plugin = submissions
/// submissions_subreddit = nfl
/// submissions_count = 3
/// ```
///
/// Keys outside any section, and keys in a `[DEFAULT]` section, apply to
/// every region unless the region overrides them. A key set twice in the
/// same section is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionConfig {
	regions: Vec<Region>,
}

impl RegionConfig {
	/// Read and parse the region config at `path`.
	pub fn load(path: &Path) -> SidebarResult<Self> {
		let content = std::fs::read_to_string(path).map_err(|e| {
			SidebarError::ConfigParse(format!("unable to read `{}`: {e}", path.display()))
		})?;

		Self::from_ini(&content)
	}

	/// Parse region config from INI text, keeping declaration order.
	///
	/// Both `key = value` and `key: value` are accepted.
	pub fn from_ini(content: &str) -> SidebarResult<Self> {
		let content = normalize_delimiters(content);
		let raw: RawIni =
			serde_ini::from_str(&content).map_err(|e| SidebarError::ConfigParse(e.to_string()))?;

		let mut globals = Vec::new();
		let mut default_pairs = Vec::new();
		let mut sections = Vec::new();
		for (name, entry) in raw.0 {
			match entry {
				RawEntry::Value(value) => globals.push((name, value)),
				RawEntry::Section(pairs) if name == DEFAULT_SECTION => default_pairs.extend(pairs),
				RawEntry::Section(pairs) => sections.push((name, pairs)),
			}
		}

		let mut defaults = section_keys(DEFAULT_SECTION, globals)?;
		defaults.extend(section_keys(DEFAULT_SECTION, default_pairs)?);

		let mut seen = HashSet::new();
		let mut regions = Vec::with_capacity(sections.len());
		for (title, pairs) in sections {
			if !seen.insert(title.clone()) {
				return Err(SidebarError::DuplicateRegion(title));
			}

			let mut merged = defaults.clone();
			merged.extend(section_keys(&title, pairs)?);
			regions.push(Region::from_section(&title, Parameters::from(merged))?);
		}

		Ok(Self { regions })
	}

	/// Regions in declaration order.
	pub fn regions(&self) -> &[Region] {
		&self.regions
	}

	pub fn len(&self) -> usize {
		self.regions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.regions.is_empty()
	}
}

impl From<Vec<Region>> for RegionConfig {
	fn from(regions: Vec<Region>) -> Self {
		Self { regions }
	}
}

/// Lowercase and trim every key, rejecting keys repeated within the section.
fn section_keys(
	title: &str,
	pairs: Vec<(String, String)>,
) -> SidebarResult<BTreeMap<String, String>> {
	let mut keys = BTreeMap::new();
	for (key, value) in pairs {
		let key = key.trim().to_ascii_lowercase();
		if keys.contains_key(&key) {
			return Err(SidebarError::DuplicateKey {
				region: title.to_string(),
				key,
			});
		}
		keys.insert(key, value.trim().to_string());
	}

	Ok(keys)
}

/// Rewrite `key: value` lines as `key = value`. Whichever of `=` or `:`
/// comes first separates the key from the value.
fn normalize_delimiters(content: &str) -> String {
	content
		.lines()
		.map(normalize_line)
		.collect::<Vec<_>>()
		.join("\n")
}

fn normalize_line(line: &str) -> Cow<'_, str> {
	if line.trim_start().starts_with(['[', ';', '#']) {
		return Cow::Borrowed(line);
	}

	match line.find(['=', ':']) {
		Some(index) if line.as_bytes()[index] == b':' => {
			Cow::Owned(format!("{}={}", &line[..index], &line[index + 1..]))
		}
		_ => Cow::Borrowed(line),
	}
}

/// Runtime limits and switches for one synchronization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
	/// Sidebar length (in characters) above which a warning is logged.
	pub max_content_length: usize,
	/// Edit reasons are cut to this many characters.
	pub max_reason_length: usize,
	/// When true, everything runs except the final write.
	pub dry_run: bool,
}

impl Default for SyncSettings {
	fn default() -> Self {
		Self {
			max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
			max_reason_length: DEFAULT_MAX_REASON_LENGTH,
			dry_run: false,
		}
	}
}

/// Top level of an INI document: global keys and sections in file order.
struct RawIni(Vec<(String, RawEntry)>);

enum RawEntry {
	Value(String),
	Section(Vec<(String, String)>),
}

impl<'de> Deserialize<'de> for RawIni {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct RawIniVisitor;

		impl<'de> Visitor<'de> for RawIniVisitor {
			type Value = RawIni;

			fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
				f.write_str("an INI document")
			}

			fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawIni, A::Error> {
				let mut entries = Vec::new();
				while let Some((name, entry)) = map.next_entry::<String, RawEntry>()? {
					entries.push((name, entry));
				}
				Ok(RawIni(entries))
			}
		}

		deserializer.deserialize_map(RawIniVisitor)
	}
}

impl<'de> Deserialize<'de> for RawEntry {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct RawEntryVisitor;

		impl<'de> Visitor<'de> for RawEntryVisitor {
			type Value = RawEntry;

			fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
				f.write_str("a value or a section")
			}

			fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<RawEntry, E> {
				Ok(RawEntry::Value(value.to_string()))
			}

			fn visit_string<E: serde::de::Error>(self, value: String) -> Result<RawEntry, E> {
				Ok(RawEntry::Value(value))
			}

			fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawEntry, A::Error> {
				let mut pairs = Vec::new();
				while let Some(pair) = map.next_entry::<String, String>()? {
					pairs.push(pair);
				}
				Ok(RawEntry::Section(pairs))
			}
		}

		deserializer.deserialize_any(RawEntryVisitor)
	}
}
