//! Document segmentation and per-line field scanning
//!
//! A document is split on its block-start marker (`--- !u!<tag> &<handle>`).
//! Each segment is then scanned line by line:
//! - the first zero-indent `Label:` line names the block type
//! - `key: value` lines become raw fields
//! - a key with no value opens a group; following `x:`/`y:`/`z:`/`w:` lines,
//!   `- item` lines or deeper keys fill it until the next field key
//!
//! Nothing here fails. Lines that fit no pattern are ignored.

use crate::value::{decode, is_component_key, FieldValue, VectorParts};
use indexmap::IndexMap;

/// Block-start marker
pub const BLOCK_MARKER: &str = "--- ";

/// Raw segment between two block markers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Text after the marker on the marker line (`!u!1 &123`)
    pub header: &'a str,
    /// Remaining lines of the segment
    pub lines: Vec<&'a str>,
}

impl Segment<'_> {
    /// True if the segment has no content besides the marker
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.header.trim().is_empty() && self.lines.iter().all(|l| l.trim().is_empty())
    }
}

/// Parsed block header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Header {
    /// Numeric class tag from `!u!<tag>`
    pub tag: Option<u32>,
    /// Handle from `&<handle>`
    pub handle: Option<i64>,
    /// Prefab-stripped placeholder block
    pub stripped: bool,
}

/// Split a document into segments; preamble lines before the first marker
/// are dropped
#[must_use]
pub fn split_segments(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut current: Option<Segment<'_>> = None;

    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(header) = marker_header(line) {
            if let Some(done) = current.take() {
                segments.push(done);
            }
            current = Some(Segment {
                header,
                lines: Vec::new(),
            });
        } else if let Some(segment) = current.as_mut() {
            segment.lines.push(line);
        }
    }
    segments.extend(current);

    segments.retain(|s| !s.is_blank());
    segments
}

fn marker_header(line: &str) -> Option<&str> {
    if line == "---" {
        return Some("");
    }
    line.strip_prefix(BLOCK_MARKER)
}

/// Parse `!u!<tag> &<handle> [stripped]`
#[must_use]
pub fn parse_header(header: &str) -> Header {
    let mut parsed = Header::default();
    for token in header.split_whitespace() {
        if let Some(tag) = token.strip_prefix("!u!") {
            parsed.tag = tag.parse().ok();
        } else if let Some(handle) = token.strip_prefix('&') {
            parsed.handle = handle.parse().ok();
        } else if token == "stripped" {
            parsed.stripped = true;
        }
    }
    parsed
}

/// Type label and raw fields recovered from a segment body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScannedBody {
    /// First zero-indent `Label:` line, without the colon
    pub label: Option<String>,
    /// Fields in document order; a repeated key keeps its last value
    pub fields: IndexMap<String, FieldValue>,
}

#[derive(Debug)]
enum Group {
    Pending,
    Vector(VectorParts),
    List(Vec<FieldValue>),
    Map(IndexMap<String, FieldValue>),
}

impl Group {
    fn into_value(self) -> FieldValue {
        match self {
            Self::Pending => FieldValue::Empty,
            Self::Vector(parts) => FieldValue::Vector(parts),
            Self::List(items) => FieldValue::List(items),
            Self::Map(entries) => FieldValue::Map(entries),
        }
    }
}

/// Scanner state for one segment
///
/// `open` is the group introduced by the most recent empty-valued field key.
/// Any later field key closes it, so stray sub-lines can never reach back
/// into an older group.
struct BodyScanner {
    body: ScannedBody,
    field_indent: Option<usize>,
    open: Option<(String, Group)>,
}

impl BodyScanner {
    fn new() -> Self {
        Self {
            body: ScannedBody::default(),
            field_indent: None,
            open: None,
        }
    }

    fn close(&mut self) {
        if let Some((key, group)) = self.open.take() {
            self.body.fields.insert(key, group.into_value());
        }
    }

    fn line(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return;
        }
        let indent = line.len() - line.trim_start().len();

        if self.body.label.is_none() && indent == 0 {
            if let Some(label) = trimmed.strip_suffix(':') {
                self.body.label = Some(label.trim().to_string());
                return;
            }
        }

        if let Some(item) = trimmed.strip_prefix('-') {
            self.list_item(item);
            return;
        }

        let Some((key, raw)) = split_key(trimmed) else {
            return;
        };
        let field_indent = *self.field_indent.get_or_insert(indent);

        if indent > field_indent || (is_component_key(key) && self.accepts_component()) {
            self.sub_line(key, raw);
            return;
        }
        if indent < field_indent {
            // Shallower than the first field: not part of this block's body.
            return;
        }

        self.close();
        let value = decode(raw);
        if value == FieldValue::Empty {
            self.open = Some((key.to_string(), Group::Pending));
        } else {
            self.body.fields.insert(key.to_string(), value);
        }
    }

    fn accepts_component(&self) -> bool {
        matches!(
            self.open,
            Some((_, Group::Pending | Group::Vector(_)))
        )
    }

    fn sub_line(&mut self, key: &str, raw: &str) {
        let Some((_, group)) = self.open.as_mut() else {
            return;
        };
        let value = decode(raw);
        if is_component_key(key) {
            let Some(n) = value.as_f64() else { return };
            match group {
                Group::Pending => {
                    let mut parts = VectorParts::default();
                    parts.set(key, n);
                    *group = Group::Vector(parts);
                }
                Group::Vector(parts) => {
                    parts.set(key, n);
                }
                Group::Map(entries) => {
                    entries.insert(key.to_string(), value);
                }
                Group::List(_) => {}
            }
            return;
        }
        match group {
            Group::Pending => {
                let mut entries = IndexMap::new();
                entries.insert(key.to_string(), value);
                *group = Group::Map(entries);
            }
            Group::Map(entries) => {
                entries.insert(key.to_string(), value);
            }
            Group::Vector(_) | Group::List(_) => {}
        }
    }

    fn list_item(&mut self, item: &str) {
        let Some((_, group)) = self.open.as_mut() else {
            return;
        };
        let item = item.trim();
        // `- component: {fileID: 5}` keeps only the value
        let value = match split_key(item) {
            Some((_, raw)) if !item.starts_with('{') && !raw.trim().is_empty() => decode(raw),
            _ => decode(item),
        };
        match group {
            Group::Pending => *group = Group::List(vec![value]),
            Group::List(items) => items.push(value),
            Group::Vector(_) | Group::Map(_) => {}
        }
    }

    fn finish(mut self) -> ScannedBody {
        self.close();
        self.body
    }
}

/// Split `key: value` (or `key:`) at the first colon that ends a key
fn split_key(line: &str) -> Option<(&str, &str)> {
    let (key, rest) = if let Some(idx) = line.find(": ") {
        (&line[..idx], &line[idx + 2..])
    } else if let Some(key) = line.strip_suffix(':') {
        (key, "")
    } else {
        line.split_once(':')?
    };
    let key = key.trim();
    if key.is_empty() || key.contains(['{', '}', '[', ']', ' ']) {
        return None;
    }
    Some((key, rest))
}

/// Scan a segment body into its label and raw fields
#[must_use]
pub fn scan_body(lines: &[&str]) -> ScannedBody {
    let mut scanner = BodyScanner::new();
    for line in lines {
        scanner.line(line);
    }
    scanner.finish()
}
