use std::cell::Cell;
use std::cell::RefCell;
use std::path::Path;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use crate::SidebarError;
use crate::SidebarResult;

/// The shared document together with the revision it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
	pub content: String,
	/// Opaque version token, only used to label diffs.
	pub revision: String,
}

impl Document {
	pub fn new(content: impl Into<String>, revision: impl Into<String>) -> Self {
		Self {
			content: content.into(),
			revision: revision.into(),
		}
	}
}

impl Default for Document {
	fn default() -> Self {
		Self::new("", "0")
	}
}

/// Where the document is read from and published to.
pub trait DocumentStore {
	fn read(&self) -> SidebarResult<Document>;

	/// Persist `content`. `reason` has already been cut to the configured
	/// maximum length.
	fn write(&self, content: &str, reason: &str) -> SidebarResult<()>;
}

/// A document kept in a local file. The revision is the file's modification
/// time in unix seconds.
#[derive(Debug, Clone)]
pub struct FileStore {
	path: PathBuf,
}

impl FileStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl DocumentStore for FileStore {
	fn read(&self) -> SidebarResult<Document> {
		let content = std::fs::read_to_string(&self.path).map_err(|e| {
			SidebarError::Store(format!("unable to read `{}`: {e}", self.path.display()))
		})?;
		let revision = std::fs::metadata(&self.path)
			.and_then(|metadata| metadata.modified())
			.ok()
			.and_then(|time| time.duration_since(UNIX_EPOCH).ok())
			.map_or(0, |duration| duration.as_secs());

		Ok(Document::new(content, revision.to_string()))
	}

	fn write(&self, content: &str, reason: &str) -> SidebarResult<()> {
		let temp_path = self
			.path
			.with_extension(format!("tmp-{}", std::process::id()));

		if let Err(e) = std::fs::write(&temp_path, content) {
			let _ = std::fs::remove_file(&temp_path);
			return Err(SidebarError::Store(format!(
				"unable to write `{}`: {e}",
				temp_path.display()
			)));
		}

		if let Err(e) = std::fs::rename(&temp_path, &self.path) {
			let _ = std::fs::remove_file(&temp_path);
			return Err(SidebarError::Store(format!(
				"unable to replace `{}`: {e}",
				self.path.display()
			)));
		}

		tracing::debug!(path = %self.path.display(), reason, "Wrote document");
		Ok(())
	}
}

/// An in-memory document that records every write.
#[derive(Debug, Default)]
pub struct MemoryStore {
	document: RefCell<Document>,
	writes: RefCell<Vec<(String, String)>>,
	reject_writes: bool,
	revision: Cell<u64>,
}

impl MemoryStore {
	pub fn new(content: impl Into<String>) -> Self {
		Self {
			document: RefCell::new(Document::new(content, "1")),
			revision: Cell::new(1),
			..Self::default()
		}
	}

	/// A store whose writes always fail.
	pub fn rejecting(content: impl Into<String>) -> Self {
		Self {
			reject_writes: true,
			..Self::new(content)
		}
	}

	pub fn content(&self) -> String {
		self.document.borrow().content.clone()
	}

	/// Every successful write as `(content, reason)`, oldest first.
	pub fn writes(&self) -> Vec<(String, String)> {
		self.writes.borrow().clone()
	}
}

impl DocumentStore for MemoryStore {
	fn read(&self) -> SidebarResult<Document> {
		Ok(self.document.borrow().clone())
	}

	fn write(&self, content: &str, reason: &str) -> SidebarResult<()> {
		if self.reject_writes {
			return Err(SidebarError::Store("write rejected".to_string()));
		}

		let revision = self.revision.get() + 1;
		self.revision.set(revision);
		*self.document.borrow_mut() = Document::new(content, revision.to_string());
		self.writes
			.borrow_mut()
			.push((content.to_string(), reason.to_string()));
		Ok(())
	}
}
