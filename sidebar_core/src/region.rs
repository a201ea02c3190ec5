use std::ops::Range;

/// Byte range of a located region, covering both markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
	/// Offset of the first byte of the start marker.
	pub start: usize,
	/// Offset one past the last byte of the end marker.
	pub end: usize,
}

impl Span {
	pub fn new(start: usize, end: usize) -> Self {
		Self { start, end }
	}

	pub fn range(&self) -> Range<usize> {
		self.start..self.end
	}

	pub fn len(&self) -> usize {
		self.end - self.start
	}

	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}
}

/// Returns true when both markers occur anywhere in `content`.
///
/// This is only the cheap existence check. A region can pass it and still
/// have no span when every end marker precedes the first start marker.
pub fn markers_present(content: &str, marker_start: &str, marker_end: &str) -> bool {
	content.contains(marker_start) && content.contains(marker_end)
}

/// Find the shortest span that starts at the first `marker_start` and ends
/// at the first `marker_end` following it.
///
/// Markers are literal text. Returns `None` when either marker is missing or
/// no end marker follows the start marker.
pub fn locate(content: &str, marker_start: &str, marker_end: &str) -> Option<Span> {
	if marker_start.is_empty()
		|| marker_end.is_empty()
		|| !markers_present(content, marker_start, marker_end)
	{
		return None;
	}

	let start = content.find(marker_start)?;
	let search_from = start + marker_start.len();
	let end = content[search_from..].find(marker_end)? + search_from + marker_end.len();

	Some(Span::new(start, end))
}

/// The text written in place of a region: start marker, body and end marker
/// separated by blank lines.
pub fn render_region(marker_start: &str, body: &str, marker_end: &str) -> String {
	format!("{marker_start}\n\n{body}\n\n{marker_end}")
}

/// Replace `span` in `content` with the rendered region. Content outside the
/// span is copied unchanged.
pub fn merge(
	content: &str,
	span: Span,
	marker_start: &str,
	body: &str,
	marker_end: &str,
) -> String {
	let replacement = render_region(marker_start, body, marker_end);
	let mut result = String::with_capacity(content.len() - span.len() + replacement.len());
	result.push_str(&content[..span.start]);
	result.push_str(&replacement);
	result.push_str(&content[span.end..]);
	result
}

/// Locate the region and splice `body` into it in one step. Returns `None`
/// when the region is not present.
pub fn replace_region(
	content: &str,
	marker_start: &str,
	marker_end: &str,
	body: &str,
) -> Option<String> {
	let span = locate(content, marker_start, marker_end)?;
	Some(merge(content, span, marker_start, body, marker_end))
}
